use std::io::{BufRead, Write};

use anyhow::Result;
use bikeshare_core::formatting::format_record;
use bikeshare_data::filter::{FilteredTable, PAGE_SIZE};

use crate::prompt::{Prompter, RAW_DATA_QUESTION};

/// Walks a [`FilteredTable`] five rows at a time.
pub struct RawDataPager<'t, 'a> {
    table: &'t FilteredTable<'a>,
    offset: usize,
}

impl<'t, 'a> RawDataPager<'t, 'a> {
    pub fn new(table: &'t FilteredTable<'a>) -> Self {
        Self { table, offset: 0 }
    }

    #[cfg(test)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_exhausted(&self) -> bool {
        self.offset >= self.table.len()
    }

    /// Render the next page and advance, or `None` once every row was shown.
    pub fn next_page(&mut self) -> Option<String> {
        let rows = self.table.page(self.offset, PAGE_SIZE);
        if rows.is_empty() {
            return None;
        }
        let schema = self.table.schema();
        let text = rows
            .iter()
            .enumerate()
            .map(|(i, record)| format_record(record, self.offset + i, schema))
            .collect::<Vec<_>>()
            .join("\n");
        self.offset += rows.len();
        Some(text)
    }

    /// Offer pages until the reader declines or the table runs out.
    pub fn run<R: BufRead, W: Write>(&mut self, prompter: &mut Prompter<R, W>) -> Result<()> {
        while !self.is_exhausted() {
            if !prompter.confirm(RAW_DATA_QUESTION)? {
                return Ok(());
            }
            if let Some(page) = self.next_page() {
                prompter.say(&page)?;
            }
        }
        if !self.table.is_empty() {
            prompter.say(&format!("No more rows: all {} shown.", self.table.len()))?;
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
