//! Header resolution shared by the CSV readers.

use csv::StringRecord;

use crate::error::{PipelineError, PipelineResult};

/// A required column and the header spellings accepted for it.
pub(super) struct Column {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

impl Column {
    pub const fn new(name: &'static str) -> Self {
        Self { name, aliases: &[] }
    }

    pub const fn with_aliases(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self { name, aliases }
    }

    fn matches(&self, header: &str) -> bool {
        header == self.name || self.aliases.contains(&header)
    }
}

/// Positions of the required columns within a header row.
pub(super) struct ColumnIndex {
    source_name: &'static str,
    positions: Vec<usize>,
}

impl ColumnIndex {
    /// Resolves every required column against the header row.
    ///
    /// Fails with [`PipelineError::MissingColumn`] on the first column that
    /// has no matching header.
    pub fn resolve(
        source_name: &'static str,
        headers: &StringRecord,
        columns: &[Column],
    ) -> PipelineResult<Self> {
        let positions = columns
            .iter()
            .map(|column| {
                headers
                    .iter()
                    .position(|header| column.matches(header.trim()))
                    .ok_or_else(|| PipelineError::MissingColumn {
                        source_name: source_name.to_string(),
                        column: column.name.to_string(),
                    })
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        Ok(Self {
            source_name,
            positions,
        })
    }

    /// Returns the trimmed cell for the `column`-th required column.
    pub fn cell<'r>(&self, record: &'r StringRecord, column: usize) -> &'r str {
        record.get(self.positions[column]).unwrap_or("").trim()
    }

    /// Returns the cell, or `None` when it is blank.
    pub fn optional_cell(&self, record: &StringRecord, column: usize) -> Option<String> {
        let value = self.cell(record, column);
        (!value.is_empty()).then(|| value.to_string())
    }

    /// Parses the cell with `FromStr`, describing the cell when it cannot be read.
    pub fn parse_cell<T: std::str::FromStr>(
        &self,
        record: &StringRecord,
        column: usize,
        name: &str,
    ) -> Result<T, String> {
        let value = self.cell(record, column);
        value
            .parse()
            .map_err(|_| format!("{} '{}' is not a number", name, value))
    }

    /// Returns the source this index was resolved for.
    pub fn source_name(&self) -> &'static str {
        self.source_name
    }
}
