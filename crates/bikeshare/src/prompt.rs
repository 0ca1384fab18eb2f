use std::io::{self, BufRead, Write};
use std::str::FromStr;

use anyhow::Result;
use bikeshare_core::models::{City, DaySelector, MonthSelector};

// ── Prompt text ────────────────────────────────────────────────────────────────

pub const GREETING: &str = "Hello! Let's explore some US bikeshare data!";

const CITY_QUESTION: &str =
    "Enter the city you would like data for (Chicago, Washington, New York City)";
const CITY_INVALID: &str =
    "That's not a valid city. Please choose from Chicago, New York City, or Washington.";

const MONTH_QUESTION: &str =
    "Enter the month you would like data for (January, February, March, April, May, June, or all)";
const MONTH_INVALID: &str = "That's not a valid month or there is no data for that month. \
     Accepted months are January to June. If you would like all months, please input \"all\".";

const DAY_QUESTION: &str = "Enter the day of the week you would like data for \
     (Monday, Tuesday, Wednesday, Thursday, Friday, Saturday, Sunday, or all)";
const DAY_INVALID: &str =
    "That's not a valid day of the week. If you would like all days, please input \"all\".";

pub const RAW_DATA_QUESTION: &str = "Would you like to see 5 lines of raw data? Enter yes or no.";
pub const RESTART_QUESTION: &str = "Would you like to restart? Enter yes or no.";

// ── Prompter ───────────────────────────────────────────────────────────────────

/// Line-oriented question/answer loop over any reader and writer.
///
/// Answers are trimmed and matched case-insensitively. When a remembered
/// answer is offered, an empty line accepts it.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `text` followed by a newline.
    pub fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}")?;
        self.output.flush()?;
        Ok(())
    }

    pub fn ask_city(&mut self, remembered: Option<City>) -> Result<City> {
        self.ask_until(
            CITY_QUESTION,
            CITY_INVALID,
            remembered.map(|c| (c, c.id().to_string())),
        )
    }

    pub fn ask_month(&mut self, remembered: Option<MonthSelector>) -> Result<MonthSelector> {
        self.ask_until(
            MONTH_QUESTION,
            MONTH_INVALID,
            remembered.map(|m| (m, m.to_string().to_lowercase())),
        )
    }

    pub fn ask_day(&mut self, remembered: Option<DaySelector>) -> Result<DaySelector> {
        self.ask_until(
            DAY_QUESTION,
            DAY_INVALID,
            remembered.map(|d| (d, d.to_string().to_lowercase())),
        )
    }

    /// Ask a yes/no question. Only `yes` counts as yes; end of input is no.
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        writeln!(self.output, "\n{question}")?;
        self.output.flush()?;
        Ok(match self.read_line()? {
            Some(answer) => answer.trim().eq_ignore_ascii_case("yes"),
            None => false,
        })
    }

    #[cfg(test)]
    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    // ── Private ────────────────────────────────────────────────────────────────

    /// Re-ask `question` until the answer parses.
    ///
    /// `remembered` pairs the value an empty answer selects with the label
    /// shown for it.
    fn ask_until<T: FromStr>(
        &mut self,
        question: &str,
        invalid: &str,
        mut remembered: Option<(T, String)>,
    ) -> Result<T> {
        loop {
            match &remembered {
                Some((_, label)) => writeln!(self.output, "{question} [{label}]:")?,
                None => writeln!(self.output, "{question}:")?,
            }
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Err(input_closed().into());
            };
            let answer = line.trim();

            if answer.is_empty() {
                if let Some((value, _)) = remembered.take() {
                    writeln!(self.output, "\nThank you\n")?;
                    return Ok(value);
                }
            } else if let Ok(value) = answer.parse::<T>() {
                writeln!(self.output, "\nThank you\n")?;
                return Ok(value);
            }
            writeln!(self.output, "{invalid}\n")?;
        }
    }

    /// Next input line, or `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

fn input_closed() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "input closed before an answer was given")
}

/// Whether `err` came from the input closing mid-question.
pub fn is_input_closed(err: &anyhow::Error) -> bool {
    err.downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == io::ErrorKind::UnexpectedEof)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
