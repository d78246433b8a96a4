//! In-memory workbook model
//!
//! A `Workbook` is an ordered list of `Sheet`s. A sheet is a grid of cells
//! addressed from the top-left corner; row 0 is the header row.

use crate::value_encoding::Cell;

/// One worksheet: a named grid of cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Create an empty sheet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Sheet name; for exported sheets this is the collection name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every row, header included
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Append a row
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Append a row of field names
    pub fn push_header(&mut self, fields: &[String]) {
        self.rows
            .push(fields.iter().map(|f| Cell::Text(f.clone())).collect());
    }

    /// Number of rows present, header included
    pub fn physical_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of rows after the header
    pub fn data_row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Field names read from the header row. Blank cells yield empty names.
    pub fn header(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| row.iter().map(Cell::to_text).collect())
            .unwrap_or_default()
    }

    /// Rows after the header
    pub fn data_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().skip(1).map(Vec::as_slice)
    }

    /// Whether the sheet has no rows at all
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An ordered collection of sheets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create an empty workbook
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet
    pub fn push(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    /// Sheets in workbook order
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Look up a sheet by name
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Number of sheets
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// Whether the workbook has no sheets
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl FromIterator<Sheet> for Workbook {
    fn from_iter<I: IntoIterator<Item = Sheet>>(iter: I) -> Self {
        Self {
            sheets: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sheet() {
        let sheet = Sheet::new("users");
        assert!(sheet.is_empty());
        assert_eq!(sheet.physical_rows(), 0);
        assert_eq!(sheet.data_row_count(), 0);
        assert!(sheet.header().is_empty());
        assert_eq!(sheet.data_rows().count(), 0);
    }

    #[test]
    fn test_header_and_data_rows() {
        let mut sheet = Sheet::new("users");
        sheet.push_header(&["_id".to_string(), "name".to_string()]);
        sheet.push_row(vec![Cell::Text("a".into()), Cell::Text("ada".into())]);
        sheet.push_row(vec![Cell::Text("b".into())]);

        assert_eq!(sheet.physical_rows(), 3);
        assert_eq!(sheet.data_row_count(), 2);
        assert_eq!(sheet.header(), vec!["_id", "name"]);
        assert_eq!(sheet.data_rows().nth(1), Some(&[Cell::Text("b".into())][..]));
    }

    #[test]
    fn test_header_reads_non_text_cells() {
        let mut sheet = Sheet::new("odd");
        sheet.push_row(vec![Cell::Number(1.0), Cell::Empty, Cell::Bool(true)]);
        assert_eq!(sheet.header(), vec!["1", "", "true"]);
    }

    #[test]
    fn test_workbook_lookup() {
        let workbook: Workbook = [Sheet::new("a"), Sheet::new("b")].into_iter().collect();
        assert_eq!(workbook.len(), 2);
        assert_eq!(workbook.sheet("b").map(Sheet::name), Some("b"));
        assert!(workbook.sheet("c").is_none());
    }
}
