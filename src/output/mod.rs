//! Output Module
//!
//! ワークシートの通知をCSVとして書き出すハンドラーを提供するモジュール。

mod csv;

pub use csv::{CsvRowHandler, LINE_ENDING};
