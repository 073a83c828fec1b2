//! Spreadsheet reading for corpus and new-word sources (Excel and CSV)

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::path::Path;

use crate::error::{QuizError, Result};

/// One spreadsheet row as trimmed cell text; empty cells keep their column
pub type Row = Vec<String>;

/// Read all non-blank rows of a source file.
///
/// `sheet` selects a worksheet by name; `None` reads the first sheet.
/// CSV files have a single unnamed sheet, so asking for a named one fails.
pub fn read_rows(path: &Path, sheet: Option<&str>) -> Result<Vec<Row>> {
    if !path.exists() {
        return Err(QuizError::NotFound(path.display().to_string()));
    }

    let extension = path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => read_workbook_rows(path, sheet),
        "csv" => match sheet {
            None => read_csv_rows(path),
            Some(name) => Err(QuizError::NotFound(format!(
                "sheet '{}' in {} (CSV sources have no named sheets)",
                name,
                path.display()
            ))),
        },
        _ => Err(QuizError::UnsupportedFormat(extension)),
    }
}

fn read_workbook_rows(path: &Path, sheet: Option<&str>) -> Result<Vec<Row>> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names();

    let sheet_name = match sheet {
        None => names.first()
            .ok_or_else(|| QuizError::Empty(format!("no sheets in {}", path.display())))?
            .clone(),
        Some(wanted) => names.iter()
            .find(|n| n.trim() == wanted.trim())
            .ok_or_else(|| QuizError::NotFound(format!("sheet '{}' in {}", wanted, path.display())))?
            .clone(),
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    let rows = range.rows()
        .map(|row| row.iter().map(cell_text).collect::<Row>())
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .collect();

    Ok(rows)
}

fn read_csv_rows(path: &Path) -> Result<Vec<Row>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Row = record.iter().map(|s| s.trim().to_string()).collect();
        if row.iter().any(|c| !c.is_empty()) {
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Vocabulary text of a cell. Whole floats drop their ".0"; booleans,
/// dates and error cells carry no words.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{:.0}", f),
        Data::Float(f) => f.to_string(),
        _ => String::new(),
    }
}
