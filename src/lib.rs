//! xlsxcsv - Streaming XLSX to CSV converter
//!
//! This crate converts the first worksheet of an Office Open XML spreadsheet
//! (`.xlsx`) into a CSV file. The worksheet XML is read as a stream of events
//! and every row is written as soon as it ends, so large sheets are never held
//! in memory.
//!
//! Cell values are written the way they are displayed: shared strings are
//! resolved and numbers go through their number format (`0.00`, `#,##0`,
//! `0%`, `yyyy-mm-dd`, ...). Every field is double-quoted, embedded quotes are
//! doubled and fields are joined with `,`.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! fn main() -> Result<(), xlsxcsv::XlsxToCsvError> {
//!     let summary = xlsxcsv::convert("report.xlsx", "report.csv")?;
//!     println!("{}: {} rows", summary.sheet_name, summary.rows);
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use xlsxcsv::{ConverterBuilder, FormulaMode};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new()
//!         .with_formula_mode(FormulaMode::Formula) // write formulas instead of results
//!         .fill_missing_cells(false) // keep sparse rows as they are
//!         .build()?;
//!
//!     converter.convert_file("report.xlsx", "report.csv")?;
//!     Ok(())
//! }
//! ```
//!
//! # Custom Handlers
//!
//! `SpreadsheetPackage::read_sheet` drives any `SheetContentsHandler`, so the
//! worksheet stream can be consumed without producing CSV at all.

mod api;
mod builder;
mod error;
mod format;
mod formatter;
mod output;
mod parser;
mod security;
mod types;

use std::path::Path;

use log::error;

// 公開API
pub use api::{ConversionSummary, FormulaMode};
pub use builder::{Converter, ConverterBuilder};
pub use error::XlsxToCsvError;
pub use output::{CsvRowHandler, LINE_ENDING};
pub use parser::{
    CellStyle, SheetContentsHandler, SheetEntry, SheetReadOptions, SheetStats, SpreadsheetPackage,
};
pub use security::SecurityConfig;
pub use types::CellRef;

/// デフォルト設定で最初のワークシートをCSVに変換する
///
/// 入力を開けない場合、出力ファイルは作成されません。
pub fn convert(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
) -> Result<ConversionSummary, XlsxToCsvError> {
    ConverterBuilder::new()
        .build()?
        .convert_file(source, destination)
}

/// エラーを返さない変換
///
/// 失敗した場合はエラーを`error!`で記録し、`None`を返します。
pub fn convert_best_effort(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
) -> Option<ConversionSummary> {
    let source = source.as_ref();
    match convert(source, destination) {
        Ok(summary) => Some(summary),
        Err(e) => {
            error!("Failed to convert {}: {}", source.display(), e);
            None
        }
    }
}
