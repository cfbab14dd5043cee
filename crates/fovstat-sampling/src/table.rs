//! Result tables
//!
//! A [`ResultTable`] holds one [`SampleRecord`] per accepted window, in
//! acceptance order. A [`ResultSet`] maps image identifiers to their
//! tables, in the order the images were processed.

use crate::error::{SamplingError, SamplingResult};
use std::fmt;
use std::io::Write;

/// CSV header line, without the line terminator.
pub const CSV_HEADER: &str = "Number,Area fraction";

/// Statistics of one accepted window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRecord {
    /// Number of valid components
    pub number: usize,
    /// Cumulative component area divided by the nominal window area
    pub area_fraction: f64,
}

/// Mean and sample standard deviation of one column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSummary {
    pub mean: f64,
    /// Sample (n - 1) standard deviation; zero for a single row
    pub std_dev: f64,
}

impl ColumnSummary {
    fn from_values(values: impl Iterator<Item = f64> + Clone) -> Option<Self> {
        let n = values.clone().count();
        if n == 0 {
            return None;
        }
        let mean = values.clone().sum::<f64>() / n as f64;
        let std_dev = if n > 1 {
            let ss: f64 = values.map(|v| (v - mean) * (v - mean)).sum();
            (ss / (n - 1) as f64).sqrt()
        } else {
            0.0
        };
        Some(Self { mean, std_dev })
    }
}

/// Column summaries of a table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableSummary {
    pub rows: usize,
    pub number: ColumnSummary,
    pub area_fraction: ColumnSummary,
}

/// Per-image table of window records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    records: Vec<SampleRecord>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Append a record as the next row
    pub fn push(&mut self, record: SampleRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SampleRecord> {
        self.records.iter()
    }

    /// Mean and spread of both columns, or `None` for an empty table.
    pub fn summary(&self) -> Option<TableSummary> {
        let number = ColumnSummary::from_values(self.records.iter().map(|r| r.number as f64))?;
        let area_fraction = ColumnSummary::from_values(self.records.iter().map(|r| r.area_fraction))?;
        Some(TableSummary {
            rows: self.records.len(),
            number,
            area_fraction,
        })
    }

    /// Write the table as CSV with a `Number,Area fraction` header.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        write!(writer, "{}", self)?;
        writer.flush()
    }

    /// The table as a CSV string
    pub fn to_csv_string(&self) -> String {
        self.to_string()
    }
}

/// Formats the table as CSV.
impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", CSV_HEADER)?;
        for r in &self.records {
            writeln!(f, "{},{}", r.number, r.area_fraction)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a SampleRecord;
    type IntoIter = std::slice::Iter<'a, SampleRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<SampleRecord> for ResultTable {
    fn from_iter<I: IntoIterator<Item = SampleRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Tables keyed by image identifier, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    entries: Vec<(String, ResultTable)>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the table for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SamplingError::Configuration`] if `id` is already present.
    pub fn insert(&mut self, id: impl Into<String>, table: ResultTable) -> SamplingResult<()> {
        let id = id.into();
        if self.contains(&id) {
            return Err(SamplingError::Configuration(format!(
                "duplicate image identifier '{}'",
                id
            )));
        }
        self.entries.push((id, table));
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == id)
    }

    pub fn get(&self, id: &str) -> Option<&ResultTable> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, t)| t)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifiers in insertion order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// `(id, table)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResultTable)> {
        self.entries.iter().map(|(k, t)| (k.as_str(), t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(number: usize, area_fraction: f64) -> SampleRecord {
        SampleRecord {
            number,
            area_fraction,
        }
    }

    #[test]
    fn test_csv() {
        let table: ResultTable = [rec(1, 0.5), rec(0, 0.0), rec(3, 0.125)].into_iter().collect();
        assert_eq!(
            table.to_csv_string(),
            "Number,Area fraction\n1,0.5\n0,0\n3,0.125\n"
        );
    }

    #[test]
    fn test_write_csv_matches_string() {
        let table: ResultTable = [rec(2, 0.25), rec(0, 0.0)].into_iter().collect();
        let mut buf = Vec::new();
        table.write_csv(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), table.to_csv_string());
    }

    #[test]
    fn test_csv_empty_table() {
        assert_eq!(ResultTable::new().to_csv_string(), "Number,Area fraction\n");
    }

    #[test]
    fn test_summary() {
        let table: ResultTable = [rec(1, 0.2), rec(3, 0.4)].into_iter().collect();
        let s = table.summary().unwrap();
        assert_eq!(s.rows, 2);
        assert!((s.number.mean - 2.0).abs() < 1e-12);
        assert!((s.number.std_dev - 2f64.sqrt()).abs() < 1e-12);
        assert!((s.area_fraction.mean - 0.3).abs() < 1e-12);

        let single: ResultTable = [rec(4, 0.1)].into_iter().collect();
        assert_eq!(single.summary().unwrap().number.std_dev, 0.0);
        assert!(ResultTable::new().summary().is_none());
    }

    #[test]
    fn test_result_set_order_and_duplicates() {
        let mut set = ResultSet::new();
        set.insert("b", ResultTable::new()).unwrap();
        set.insert("a", [rec(1, 0.1)].into_iter().collect()).unwrap();
        assert!(set.insert("b", ResultTable::new()).is_err());
        assert_eq!(set.ids().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(set.get("a").map(ResultTable::len), Some(1));
        assert!(set.get("c").is_none());
    }
}
