use b3_cotacoes::config::DEFAULT_INPUT;
use b3_cotacoes::util::excel_utils::ENRICHED_HEADERS;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

const SAMPLE_SYMBOLS: [&str; 5] = ["PETR4", "VALE3", "ITUB4", "BBDC4", "ABEV3"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(DEFAULT_INPUT);
    if path.exists() {
        println!("{} already exists, leaving it alone", path.display());
        return Ok(());
    }

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();

    // 'Símbolo' is required, the other columns get filled by --enriched runs
    for (col, header) in ENRICHED_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    for (row, symbol) in SAMPLE_SYMBOLS.iter().enumerate() {
        worksheet.write_string(row as u32 + 1, 0, *symbol)?;
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    workbook.save(path)?;

    println!("Created {} with {} symbols", path.display(), SAMPLE_SYMBOLS.len());
    Ok(())
}
