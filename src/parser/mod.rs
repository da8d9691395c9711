//! Parser Module
//!
//! zipとquick-xmlによるXLSXパッケージのストリーミング解析。
//! 共有文字列とスタイルを先に読み込み、ワークシートは1行ずつ処理します。

mod handler;
mod package;
mod shared_strings;
mod sheet;
mod styles;

pub use handler::SheetContentsHandler;
pub use package::{SheetEntry, SpreadsheetPackage};
pub use sheet::{SheetReadOptions, SheetStats};
pub use styles::CellStyle;
