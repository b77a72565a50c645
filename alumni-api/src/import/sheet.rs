//! Spreadsheet reading for bulk import
//!
//! Thin boundary over calamine: the first worksheet becomes plain
//! in-memory rows of trimmed optional strings, which is all the
//! reconciliation core ever sees.

use alumni_common::{Error, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// A parsed cell: trimmed text, or None when blank/unreadable
pub type Cell = Option<String>;

/// Read the first worksheet into rows of cells
pub fn read_first_sheet(path: &Path) -> Result<Vec<Vec<Cell>>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| Error::Internal(format!("Unable to read spreadsheet: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::InvalidInput("No worksheet found".to_string()))?
        .map_err(|e| Error::Internal(format!("Unable to read worksheet: {}", e)))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

fn cell_to_string(cell: &Data) -> Cell {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.trim().to_string(),
        // Integral floats are how xlsx stores numbers like years and rolls
        Data::Float(f) if f.fract() == 0.0 && f.is_finite() => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_error_cells_become_none() {
        assert_eq!(cell_to_string(&Data::Empty), None);
        assert_eq!(cell_to_string(&Data::String("   ".to_string())), None);
    }

    #[test]
    fn numeric_cells_render_without_decimal_point() {
        assert_eq!(cell_to_string(&Data::Float(2019.0)), Some("2019".to_string()));
        assert_eq!(cell_to_string(&Data::Int(42)), Some("42".to_string()));
    }

    #[test]
    fn text_cells_are_trimmed() {
        assert_eq!(
            cell_to_string(&Data::String("  R1  ".to_string())),
            Some("R1".to_string())
        );
    }
}
