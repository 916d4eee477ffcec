//! Spreadsheet export of generated cards.

use std::fs;
use std::path::{Path, PathBuf};

use lernkarten_core::CardRow;
use rust_xlsxwriter::{Format, Workbook};
use serde_json::json;
use tracing::info;

use crate::error::PipelineError;

pub const CSV_HEADER: [&str; 5] = ["Front", "Back", "Quelle", "Labels", "Original"];

pub const XLSX_SHEET: &str = "Lernkarten";
pub const XLSX_HEADER: [&str; 5] = ["Original", "Frage", "Antwort", "Labels", "Quelle"];

/// Files written by [`export_cards`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub xlsx: PathBuf,
    pub meta: PathBuf,
}

/// Write `rows` to `path` as semicolon-separated CSV, one line per
/// question/answer pair. Returns the number of cards written.
pub fn write_csv(rows: &[CardRow], path: &Path) -> Result<usize, PipelineError> {
    create_parent(path)?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)?;
    writer.write_record(CSV_HEADER)?;

    let mut cards = 0;
    for row in rows {
        let labels = row.labels.join(", ");
        for (question, answer) in row.pairs() {
            writer.write_record([
                question,
                answer,
                row.source.as_str(),
                labels.as_str(),
                row.original.as_str(),
            ])?;
            cards += 1;
        }
    }
    writer.flush().map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(cards)
}

/// Write `rows` to an Excel workbook with a single "Lernkarten" sheet, one
/// row per question/answer pair. Returns the number of cards written.
pub fn write_xlsx(rows: &[CardRow], path: &Path) -> Result<usize, PipelineError> {
    create_parent(path)?;

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(XLSX_SHEET)?;
    for (col, title) in XLSX_HEADER.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }
    sheet.set_column_width(0, 60)?;
    sheet.set_column_width(1, 40)?;
    sheet.set_column_width(2, 40)?;

    let mut line: u32 = 0;
    for row in rows {
        let labels = row.labels.join(", ");
        for (question, answer) in row.pairs() {
            line += 1;
            sheet.write_string(line, 0, &row.original)?;
            sheet.write_string(line, 1, question)?;
            sheet.write_string(line, 2, answer)?;
            sheet.write_string(line, 3, &labels)?;
            sheet.write_string(line, 4, &row.source)?;
        }
    }

    workbook.save(path)?;
    Ok(line as usize)
}

fn create_parent(path: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PipelineError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Write `<base>_<timestamp>.csv`, `<base>_<timestamp>.xlsx` and a
/// `<base>_<timestamp>.json` summary into `out_dir`.
pub fn export_cards(
    rows: &[CardRow],
    out_dir: &Path,
    base_name: &str,
) -> Result<ExportPaths, PipelineError> {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let csv = out_dir.join(format!("{base_name}_{stamp}.csv"));
    let xlsx = out_dir.join(format!("{base_name}_{stamp}.xlsx"));
    let meta = out_dir.join(format!("{base_name}_{stamp}.json"));

    let cards = write_csv(rows, &csv)?;
    write_xlsx(rows, &xlsx)?;

    let summary = json!({ "rows": rows.len(), "cards": cards });
    let body = serde_json::to_string_pretty(&summary)?;
    fs::write(&meta, body).map_err(|source| PipelineError::Io {
        path: meta.clone(),
        source,
    })?;

    info!(rows = rows.len(), cards, path = %csv.display(), "exported cards");
    Ok(ExportPaths { csv, xlsx, meta })
}
