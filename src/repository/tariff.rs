use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};

use crate::domain::tariff::TariffCode;
use crate::repository::{RepositoryError, RepositoryResult, TariffCodeReader};

/// HSN/SAC reference table read from the first worksheet of a spreadsheet.
pub struct SpreadsheetTariffSource {
    path: PathBuf,
    code_column: String,
    description_column: String,
}

impl SpreadsheetTariffSource {
    pub fn new(
        path: impl Into<PathBuf>,
        code_column: impl Into<String>,
        description_column: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            code_column: code_column.into(),
            description_column: description_column.into(),
        }
    }
}

impl TariffCodeReader for SpreadsheetTariffSource {
    fn list_tariff_codes(&self) -> RepositoryResult<Vec<TariffCode>> {
        let spreadsheet_error = |e: calamine::Error| RepositoryError::Spreadsheet {
            path: self.path.clone(),
            message: e.to_string(),
        };

        let mut workbook = open_workbook_auto(&self.path).map_err(spreadsheet_error)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| RepositoryError::EmptySheet(self.path.clone()))?
            .map_err(spreadsheet_error)?;

        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>());
        rows_to_tariff_codes(
            &self.path,
            rows,
            &self.code_column,
            &self.description_column,
        )
    }
}

/// Converts header + data rows into tariff codes, locating the two columns
/// by header name.
pub(crate) fn rows_to_tariff_codes<I>(
    path: &Path,
    mut rows: I,
    code_column: &str,
    description_column: &str,
) -> RepositoryResult<Vec<TariffCode>>
where
    I: Iterator<Item = Vec<String>>,
{
    let header = rows
        .next()
        .ok_or_else(|| RepositoryError::EmptySheet(path.to_path_buf()))?;

    let find_column = |name: &str| {
        header
            .iter()
            .position(|cell| cell.trim() == name)
            .ok_or_else(|| RepositoryError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
    };
    let code_at = find_column(code_column)?;
    let description_at = find_column(description_column)?;

    Ok(rows
        .map(|row| {
            let cell = |at: usize| row.get(at).map(|v| v.trim()).unwrap_or("").to_string();
            TariffCode::new(cell(code_at), cell(description_at))
        })
        .collect())
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{:.0}", f)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => format!("{}", i),
        Data::Bool(b) => b.to_string(),
        Data::Error(_) => String::new(),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}
