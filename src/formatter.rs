//! Formatter Module
//!
//! 数値セルの生の値（`<v>`の文字列）を、セルの数値書式に従って
//! Excelの画面表示と同じ文字列へ変換するモジュール。

use std::collections::HashMap;

use log::trace;

use crate::format::{format_general, FormatParser};

/// セルフォーマッター
///
/// 書式文字列ごとに解析済みの`FormatParser`をキャッシュします。
/// 1つのワークシートの読み込み中、同じインスタンスを使い回してください。
#[derive(Debug)]
pub(crate) struct CellFormatter {
    /// 書式文字列 -> 解析済みパーサー
    cache: HashMap<String, FormatParser>,

    /// ブックが1904年日付システムを使用しているか
    date1904: bool,
}

impl CellFormatter {
    /// 新しいCellFormatterインスタンスを生成
    ///
    /// # 引数
    ///
    /// * `date1904` - ブックの`workbookPr@date1904`
    pub fn new(date1904: bool) -> Self {
        Self {
            cache: HashMap::new(),
            date1904,
        }
    }

    /// 生のセル値を書式に従ってフォーマット
    ///
    /// # 引数
    ///
    /// * `raw` - `<v>`要素の文字列（例: `"45658"`, `"0.5"`）
    /// * `format_code` - 数値書式文字列（例: `"yyyy-mm-dd"`, `"0.00%"`）
    ///
    /// # 戻り値
    ///
    /// 表示文字列。`raw`が有限の数値として解釈できない場合は`raw`をそのまま返します。
    pub fn format_raw_cell_contents(&mut self, raw: &str, format_code: &str) -> String {
        let value = match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => return raw.to_string(),
        };

        if is_general_format(format_code) {
            return format_general(value);
        }

        if !self.cache.contains_key(format_code) {
            trace!("Parsing number format: {}", format_code);
            self.cache
                .insert(format_code.to_string(), FormatParser::parse(format_code));
        }

        match self.cache.get(format_code) {
            Some(parser) => parser.format_number(value, self.date1904),
            None => format_general(value),
        }
    }
}

/// 標準書式として扱う書式文字列かどうか
fn is_general_format(format_code: &str) -> bool {
    let code = format_code.trim();
    code.is_empty() || code.eq_ignore_ascii_case("general") || code == "@"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_formats() {
        let mut formatter = CellFormatter::new(false);
        assert_eq!(formatter.format_raw_cell_contents("30", "General"), "30");
        assert_eq!(formatter.format_raw_cell_contents("0.5", ""), "0.5");
        assert_eq!(formatter.format_raw_cell_contents("42", "@"), "42");
        assert_eq!(
            formatter.format_raw_cell_contents("1.0000000000000002", "General"),
            "1"
        );
    }

    #[test]
    fn test_non_numeric_raw_is_passed_through() {
        let mut formatter = CellFormatter::new(false);
        assert_eq!(formatter.format_raw_cell_contents("abc", "0.00"), "abc");
        assert_eq!(formatter.format_raw_cell_contents("", "0.00"), "");
        assert_eq!(formatter.format_raw_cell_contents("inf", "0.00"), "inf");
    }

    #[test]
    fn test_custom_formats() {
        let mut formatter = CellFormatter::new(false);
        assert_eq!(formatter.format_raw_cell_contents("3.14159", "0.00"), "3.14");
        assert_eq!(formatter.format_raw_cell_contents("0.25", "0%"), "25%");
        assert_eq!(
            formatter.format_raw_cell_contents("45658", "yyyy-mm-dd"),
            "2025-01-01"
        );
    }

    #[test]
    fn test_date1904() {
        let mut formatter = CellFormatter::new(true);
        assert_eq!(
            formatter.format_raw_cell_contents("0", "yyyy-mm-dd"),
            "1904-01-01"
        );
    }

    #[test]
    fn test_cache_is_reused() {
        let mut formatter = CellFormatter::new(false);
        formatter.format_raw_cell_contents("1", "0.0");
        formatter.format_raw_cell_contents("2", "0.0");
        formatter.format_raw_cell_contents("3", "0.00");
        assert_eq!(formatter.cache.len(), 2);
    }
}
