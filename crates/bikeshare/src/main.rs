mod bootstrap;
mod pager;
mod prompt;

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use bikeshare_core::formatting::{format_report, format_timings};
use bikeshare_core::models::{City, FilterSelection};
use bikeshare_core::settings::{LastUsedParams, Settings};
use bikeshare_data::analysis::{analyze_city, AnalysisResult};
use bikeshare_data::reader::RecordSource;
use tracing::{info, warn};

use crate::pager::RawDataPager;
use crate::prompt::{is_input_closed, Prompter, GREETING, RESTART_QUESTION};

fn main() -> Result<()> {
    let settings = Settings::load();
    settings.validate()?;

    bootstrap::ensure_directories()?;
    let _log_guard = bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    info!("bikeshare v{} starting", env!("CARGO_PKG_VERSION"));

    let last_used_path = LastUsedParams::config_path();
    if settings.clear {
        LastUsedParams::clear_at(&last_used_path)
            .with_context(|| format!("could not remove {}", last_used_path.display()))?;
        info!("Cleared remembered selections");
    }

    let data_dir = bootstrap::discover_data_dir(settings.data_dir.as_deref()).context(
        "no data directory found; pass --data-dir or set BIKESHARE_DATA_DIR",
    )?;
    let source = RecordSource::new(&data_dir)
        .with_context(|| format!("cannot use data directory {}", data_dir.display()))?;
    info!("Reading city files from {}", source.data_dir().display());
    if source.available_cities().is_empty() {
        warn!("no city files found in {}", source.data_dir().display());
    }

    if settings.is_interactive() {
        let stdin = io::stdin();
        let mut prompter = Prompter::new(stdin.lock(), io::stdout());
        run_interactive(&settings, &source, &mut prompter, &last_used_path)
    } else {
        run_once(&settings, &source)
    }
}

// ── Run modes ──────────────────────────────────────────────────────────────────

/// Single run driven entirely by flags: no prompts, pager or restart.
fn run_once(settings: &Settings, source: &RecordSource) -> Result<()> {
    let city = settings
        .city
        .context("--non-interactive requires --city")?;
    let selection = settings.preset_selection().unwrap_or_default();

    let result = analyze(source, city, selection)?;
    print!("{}", render_output(settings, &result)?);
    io::stdout().flush()?;
    Ok(())
}

/// Prompt, report, page and offer a restart until the user stops.
///
/// Flags fix the answers of the first round only; later rounds prompt for
/// everything, offering the previous answers.
fn run_interactive<R: BufRead, W: Write>(
    settings: &Settings,
    source: &RecordSource,
    prompter: &mut Prompter<R, W>,
    last_used_path: &Path,
) -> Result<()> {
    let mut last_used = LastUsedParams::load_from(last_used_path);
    let mut presets = Some(settings);

    prompter.say(GREETING)?;
    loop {
        let (city, selection) = match choose(presets.take(), &last_used, prompter) {
            Ok(choice) => choice,
            Err(e) if is_input_closed(&e) => {
                info!("Input closed; ending session");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let result = analyze(source, city, selection)?;

        last_used.remember(city, &selection);
        if let Err(e) = last_used.save_to(last_used_path) {
            warn!("could not remember selections: {}", e);
        }

        prompter.say(&render_output(settings, &result)?)?;

        let filtered = result.filtered();
        RawDataPager::new(&filtered).run(prompter)?;

        if !prompter.confirm(RESTART_QUESTION)? {
            return Ok(());
        }
    }
}

/// City and filters for one round: flags first, then prompts.
fn choose<R: BufRead, W: Write>(
    presets: Option<&Settings>,
    last_used: &LastUsedParams,
    prompter: &mut Prompter<R, W>,
) -> Result<(City, FilterSelection)> {
    let city = match presets.and_then(|s| s.city) {
        Some(city) => city,
        None => prompter.ask_city(last_used.last_city())?,
    };
    let month = match presets.and_then(|s| s.month) {
        Some(month) => month,
        None => prompter.ask_month(last_used.last_month())?,
    };
    let day = match presets.and_then(|s| s.day) {
        Some(day) => day,
        None => prompter.ask_day(last_used.last_day())?,
    };
    Ok((city, FilterSelection::new(month, day)))
}

fn analyze(source: &RecordSource, city: City, selection: FilterSelection) -> Result<AnalysisResult> {
    let result = analyze_city(source, city, selection)
        .with_context(|| format!("could not analyze trips for {city}"))?;
    info!(
        "Matched {} of {} rows in {:.3}s load",
        result.metadata.rows_matched,
        result.metadata.rows_loaded,
        result.metadata.load_time_seconds
    );
    Ok(result)
}

// ── Output ─────────────────────────────────────────────────────────────────────

/// The report as text or JSON, with timings when requested.
fn render_output(settings: &Settings, result: &AnalysisResult) -> Result<String> {
    if settings.wants_json() {
        let mut doc = serde_json::Map::new();
        doc.insert("report".to_string(), serde_json::to_value(&result.report)?);
        if settings.timings {
            doc.insert(
                "metadata".to_string(),
                serde_json::to_value(&result.metadata)?,
            );
        }
        let mut text = serde_json::to_string_pretty(&serde_json::Value::Object(doc))?;
        text.push('\n');
        return Ok(text);
    }

    let mut text = format_report(&result.report);
    if settings.timings {
        text.push_str(&format_timings(&result.metadata.sections));
    }
    Ok(text)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
