//! XLSX persistence for workbooks
//!
//! Writing goes through `rust_xlsxwriter`, reading through `calamine`. Cells
//! keep their absolute positions: leading blank rows and columns in a file
//! are preserved as empty cells when it is read back.

use calamine::{Data, Range, Reader, Xlsx, XlsxError, open_workbook};
use rust_xlsxwriter::Worksheet;
use std::path::Path;

use crate::artifact::ArtifactError;
use crate::value_encoding::Cell;
use crate::workbook::{Sheet, Workbook};

/// Write a workbook to `path`, one worksheet per sheet
pub fn write_workbook(workbook: &Workbook, path: &Path) -> Result<(), ArtifactError> {
    let write_error = |message: String| ArtifactError::ArtifactWrite {
        path: path.to_path_buf(),
        message,
    };

    let mut xlsx = rust_xlsxwriter::Workbook::new();
    for sheet in workbook.sheets() {
        let worksheet = xlsx.add_worksheet();
        worksheet
            .set_name(sheet.name())
            .map_err(|e| write_error(format!("sheet {:?}: {}", sheet.name(), e)))?;
        write_sheet(worksheet, sheet)
            .map_err(|e| write_error(format!("sheet {:?}: {}", sheet.name(), e)))?;
    }

    xlsx.save(path).map_err(|e| write_error(e.to_string()))?;
    tracing::debug!(path = %path.display(), sheets = workbook.len(), "workbook written");
    Ok(())
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<(), String> {
    for (row_index, row) in sheet.rows().iter().enumerate() {
        let row_number = u32::try_from(row_index).map_err(|e| e.to_string())?;
        for (col_index, cell) in row.iter().enumerate() {
            let col_number = u16::try_from(col_index).map_err(|e| e.to_string())?;
            let written = match cell {
                Cell::Empty => continue,
                Cell::Text(s) if s.is_empty() => continue,
                Cell::Text(s) => worksheet.write_string(row_number, col_number, s),
                Cell::Number(n) => worksheet.write_number(row_number, col_number, *n),
                Cell::Bool(b) => worksheet.write_boolean(row_number, col_number, *b),
            };
            written.map_err(|e| format!("cell ({}, {}): {}", row_number, col_number, e))?;
        }
    }
    Ok(())
}

/// Read every worksheet of the file at `path`
pub fn read_workbook(path: &Path) -> Result<Workbook, ArtifactError> {
    let unreadable = |message: String| ArtifactError::ArtifactUnreadable {
        path: path.to_path_buf(),
        message,
    };

    let mut xlsx: Xlsx<_> = open_workbook(path).map_err(|e: XlsxError| unreadable(e.to_string()))?;

    let mut workbook = Workbook::new();
    for name in xlsx.sheet_names() {
        let range = xlsx
            .worksheet_range(&name)
            .map_err(|e| unreadable(format!("sheet {:?}: {}", name, e)))?;
        workbook.push(sheet_from_range(name, &range));
    }

    tracing::debug!(path = %path.display(), sheets = workbook.len(), "workbook read");
    Ok(workbook)
}

fn sheet_from_range(name: String, range: &Range<Data>) -> Sheet {
    let mut sheet = Sheet::new(name);
    let Some((start_row, start_col)) = range.start() else {
        return sheet;
    };

    for _ in 0..start_row {
        sheet.push_row(Vec::new());
    }
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col as usize];
        cells.extend(row.iter().map(cell_from_data));
        sheet.push_row(cells);
    }
    sheet
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        _ => Cell::Empty,
    }
}
