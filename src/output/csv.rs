//! CSV Row Handler
//!
//! 1行分の表示文字列をバッファし、行の終了時にCSVの1行として書き出します。

use std::io::Write;

use log::trace;

use crate::error::XlsxToCsvError;
use crate::parser::{CellStyle, SheetContentsHandler};
use crate::types::CellRef;

/// 行の終端文字列
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
/// 行の終端文字列
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// CSV出力用のハンドラー
///
/// すべての値をダブルクォートで囲み、値に含まれる`"`は`""`にエスケープします。
///
/// # 使用例
///
/// ```rust
/// use xlsxcsv::{CellRef, CsvRowHandler, SheetContentsHandler};
///
/// # fn main() -> Result<(), xlsxcsv::XlsxToCsvError> {
/// let mut handler = CsvRowHandler::new(Vec::new());
/// handler.start_row(0)?;
/// handler.cell(CellRef::new(0, 0), "Name", None)?;
/// handler.cell(CellRef::new(0, 1), "say \"hi\"", None)?;
/// handler.end_row(0)?;
///
/// let csv = String::from_utf8(handler.into_inner()).unwrap();
/// assert!(csv.starts_with(r#""Name","say ""hi""""#));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CsvRowHandler<W: Write> {
    writer: W,
    row: Vec<String>,
    rows_written: usize,
}

impl<W: Write> CsvRowHandler<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            row: Vec::new(),
            rows_written: 0,
        }
    }

    /// 書き出した行数
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// 出力先を取り出す
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_row(&mut self) -> Result<(), XlsxToCsvError> {
        let mut line = String::new();
        for (i, value) in self.row.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            line.push('"');
            line.push_str(&value.replace('"', "\"\""));
            line.push('"');
        }
        line.push_str(LINE_ENDING);
        self.writer.write_all(line.as_bytes())?;
        Ok(())
    }
}

impl<W: Write> SheetContentsHandler for CsvRowHandler<W> {
    fn start_row(&mut self, row: u32) -> Result<(), XlsxToCsvError> {
        trace!("Row {} start", row);
        self.row.clear();
        Ok(())
    }

    fn cell(
        &mut self,
        _reference: CellRef,
        formatted_value: &str,
        _style: Option<&CellStyle<'_>>,
    ) -> Result<(), XlsxToCsvError> {
        self.row.push(formatted_value.to_string());
        Ok(())
    }

    fn end_row(&mut self, _row: u32) -> Result<(), XlsxToCsvError> {
        self.write_row()?;
        self.row.clear();
        self.rows_written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn write_rows(rows: &[&[&str]]) -> String {
        let mut handler = CsvRowHandler::new(Vec::new());
        for (r, values) in rows.iter().enumerate() {
            handler.start_row(r as u32).unwrap();
            for (c, value) in values.iter().enumerate() {
                handler
                    .cell(CellRef::new(r as u32, c as u32), value, None)
                    .unwrap();
            }
            handler.end_row(r as u32).unwrap();
        }
        assert_eq!(handler.rows_written(), rows.len());
        String::from_utf8(handler.into_inner()).unwrap()
    }

    #[test]
    fn test_quoted_and_joined() {
        let csv = write_rows(&[&["A", "B", "C"]]);
        assert_eq!(csv, format!("\"A\",\"B\",\"C\"{}", LINE_ENDING));
    }

    #[test]
    fn test_empty_value_and_empty_row() {
        let csv = write_rows(&[&["", "x"], &[]]);
        assert_eq!(
            csv,
            format!("\"\",\"x\"{}{}", LINE_ENDING, LINE_ENDING)
        );
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        let csv = write_rows(&[&["say \"hi\"", "a,b", "line1\nline2"]]);
        assert_eq!(
            csv,
            format!(
                "\"say \"\"hi\"\"\",\"a,b\",\"line1\nline2\"{}",
                LINE_ENDING
            )
        );
    }

    #[test]
    fn test_row_buffer_cleared_between_rows() {
        let csv = write_rows(&[&["1", "2"], &["3"]]);
        let lines: Vec<&str> = csv.split(LINE_ENDING).collect();
        assert_eq!(lines, vec!["\"1\",\"2\"", "\"3\"", ""]);
    }

    #[test]
    fn test_start_row_discards_unterminated_row() {
        let mut handler = CsvRowHandler::new(Vec::new());
        handler.start_row(0).unwrap();
        handler.cell(CellRef::new(0, 0), "stale", None).unwrap();
        handler.start_row(1).unwrap();
        handler.cell(CellRef::new(1, 0), "fresh", None).unwrap();
        handler.end_row(1).unwrap();
        let csv = String::from_utf8(handler.into_inner()).unwrap();
        assert_eq!(csv, format!("\"fresh\"{}", LINE_ENDING));
    }

    #[test]
    fn test_write_failure_is_reported() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut handler = CsvRowHandler::new(Broken);
        handler.start_row(0).unwrap();
        handler.cell(CellRef::new(0, 0), "x", None).unwrap();
        let result = handler.end_row(0);
        assert!(matches!(result, Err(XlsxToCsvError::Io(_))));
        assert_eq!(handler.rows_written(), 0);
    }

    proptest! {
        #[test]
        fn prop_line_shape(values in proptest::collection::vec("[a-z\" ,]{0,8}", 1..6)) {
            let mut handler = CsvRowHandler::new(Vec::new());
            handler.start_row(0).unwrap();
            for (c, value) in values.iter().enumerate() {
                handler.cell(CellRef::new(0, c as u32), value, None).unwrap();
            }
            handler.end_row(0).unwrap();
            let csv = String::from_utf8(handler.into_inner()).unwrap();

            prop_assert!(csv.ends_with(LINE_ENDING));
            let line = &csv[..csv.len() - LINE_ENDING.len()];
            prop_assert!(line.starts_with('"'));
            prop_assert!(line.ends_with('"'));

            let quotes = line.matches('"').count();
            let embedded: usize = values.iter().map(|v| v.matches('"').count()).sum();
            prop_assert_eq!(quotes, values.len() * 2 + embedded * 2);
        }
    }
}
