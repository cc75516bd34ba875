use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

// DD/MM/YYYY -> YYYY-MM-DD, anything else is returned as-is
pub fn normalize_date(date: &str) -> String {
    let trimmed = date.trim();
    let parts: Vec<&str> = trimmed.split('/').collect();
    let well_formed = parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));

    if !well_formed {
        return trimmed.to_string();
    }
    parts.into_iter().rev().collect::<Vec<_>>().join("-")
}

/// Polls `predicate` every `interval` until it yields `true` or `timeout`
/// elapses. A single check never outlives the deadline.
pub async fn wait_until<F, Fut>(timeout: Duration, interval: Duration, mut predicate: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if let Ok(true) = tokio::time::timeout(remaining, predicate()).await {
            return true;
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return false;
        }
        tokio::time::sleep(interval.min(remaining)).await;
    }
}

// Spreadsheet input and output
pub mod excel_utils {
    use crate::errors::{CotacoesError, Result};
    use crate::models::quote::{FetchResult, SymbolRow};
    use calamine::{open_workbook_auto, Data, DataType, Reader};
    use log::{debug, info};
    use rust_xlsxwriter::{Format, Workbook, XlsxError};
    use std::path::Path;

    pub const RESULT_HEADERS: [&str; 5] = ["symbol", "preco", "oscilacao", "data", "hora"];
    pub const ENRICHED_HEADERS: [&str; 5] = ["Símbolo", "Preço", "Oscilação", "Data", "Hora"];

    fn cell_text(cell: &Data) -> String {
        cell.to_string().trim().to_string()
    }

    /// Reads the symbol column of the first worksheet. Every cell is taken as
    /// text so tickers never go through numeric coercion.
    pub fn load_symbols(path: &Path, symbol_column: &str) -> Result<Vec<SymbolRow>> {
        let mut workbook = open_workbook_auto(path).map_err(|e| {
            CotacoesError::InputError(format!("cannot open {}: {}", path.display(), e))
        })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| {
                CotacoesError::InputError(format!("{} has no worksheet", path.display()))
            })?
            .map_err(|e| {
                CotacoesError::InputError(format!("cannot read {}: {}", path.display(), e))
            })?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|header| header.iter().map(cell_text).collect())
            .unwrap_or_default();
        debug!("Columns in {}: {:?}", path.display(), headers);

        let column = headers
            .iter()
            .position(|h| h == symbol_column)
            .ok_or_else(|| {
                CotacoesError::InputError(format!(
                    "column '{}' not found in {}",
                    symbol_column,
                    path.display()
                ))
            })?;

        let symbols: Vec<SymbolRow> = rows
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .map(|row| {
                let symbol = row.get(column).map(cell_text).unwrap_or_default();
                SymbolRow::new(&symbol)
            })
            .collect();

        info!("File '{}' loaded with {} symbols", path.display(), symbols.len());
        Ok(symbols)
    }

    fn write_sheet(
        path: &Path,
        headers: &[&str; 5],
        rows: &[[&str; 5]],
    ) -> std::result::Result<(), XlsxError> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();

        for (col, header) in headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
        }
        for (i, row) in rows.iter().enumerate() {
            for (col, value) in row.iter().enumerate() {
                worksheet.write_string(i as u32 + 1, col as u16, *value)?;
            }
        }
        worksheet.autofit();

        workbook.save(path)
    }

    fn prepare_parent(path: &Path) -> Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CotacoesError::OutputError(format!("cannot create {}: {}", parent.display(), e))
                })
            }
            _ => Ok(()),
        }
    }

    /// Writes one row per fetched symbol, replacing any existing file.
    pub fn save_results(results: &[FetchResult], path: &Path) -> Result<()> {
        info!("Saving {} quotes to {}", results.len(), path.display());
        prepare_parent(path)?;

        let rows: Vec<[&str; 5]> = results
            .iter()
            .map(|r| {
                [
                    r.symbol.as_str(),
                    r.price.as_str(),
                    r.variation.as_str(),
                    r.date.as_str(),
                    r.time.as_str(),
                ]
            })
            .collect();

        write_sheet(path, &RESULT_HEADERS, &rows).map_err(|e| {
            CotacoesError::OutputError(format!("cannot write {}: {}", path.display(), e))
        })
    }

    /// Writes the whole input table; symbols without a quote keep empty cells.
    pub fn save_enriched(rows: &[SymbolRow], path: &Path) -> Result<()> {
        info!("Saving enriched sheet with {} rows to {}", rows.len(), path.display());
        prepare_parent(path)?;

        let cells: Vec<[&str; 5]> = rows
            .iter()
            .map(|r| {
                [
                    r.symbol.as_str(),
                    r.price().unwrap_or_default(),
                    r.variation().unwrap_or_default(),
                    r.date().unwrap_or_default(),
                    r.time().unwrap_or_default(),
                ]
            })
            .collect();

        write_sheet(path, &ENRICHED_HEADERS, &cells).map_err(|e| {
            CotacoesError::OutputError(format!("cannot write {}: {}", path.display(), e))
        })
    }


}
