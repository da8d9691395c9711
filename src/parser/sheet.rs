//! Worksheet Reader Module
//!
//! ワークシートXMLをquick-xmlのイベントとして先頭から順に読み、
//! 行の開始・セル値・行の終了を`SheetContentsHandler`へ通知します。
//! シート全体をメモリに保持することはありません。

use std::io::BufRead;

use log::{trace, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::api::FormulaMode;
use crate::error::XlsxToCsvError;
use crate::formatter::CellFormatter;
use crate::parser::handler::SheetContentsHandler;
use crate::parser::shared_strings::SharedStringsTable;
use crate::parser::styles::{CellStyle, StylesTable};
use crate::types::{CellRef, MAX_ROWS};

/// ヘッダー・フッターとして通知する要素
const HEADER_FOOTER_TAGS: [&[u8]; 6] = [
    b"oddHeader",
    b"oddFooter",
    b"evenHeader",
    b"evenFooter",
    b"firstHeader",
    b"firstFooter",
];

/// ワークシート読み込みのオプション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetReadOptions {
    /// 数式セルの出力モード
    pub formula_mode: FormulaMode,
    /// 行内で欠落している列を空文字列のセルとして補完するか
    pub fill_missing_cells: bool,
}

impl Default for SheetReadOptions {
    fn default() -> Self {
        Self {
            formula_mode: FormulaMode::CachedValue,
            fill_missing_cells: true,
        }
    }
}

/// ワークシート読み込みの統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SheetStats {
    /// 通知した行数
    pub rows: usize,
    /// 通知したセル数（補完したセルを含む）
    pub cells: usize,
}

/// セルの`t`属性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellType {
    /// `t="n"`または省略
    Number,
    /// `t="s"`
    SharedString,
    /// `t="inlineStr"`
    InlineString,
    /// `t="b"`
    Boolean,
    /// `t="e"`
    Error,
    /// `t="str"`（数式の文字列結果）
    FormulaString,
    /// その他（`t="d"`など）。値をそのまま出力します
    Other,
}

impl CellType {
    fn from_attr(value: &str) -> Self {
        match value {
            "n" => CellType::Number,
            "s" => CellType::SharedString,
            "inlineStr" => CellType::InlineString,
            "b" => CellType::Boolean,
            "e" => CellType::Error,
            "str" => CellType::FormulaString,
            _ => CellType::Other,
        }
    }
}

/// 読み込み中の`<c>`要素
#[derive(Debug)]
struct PendingCell {
    reference: CellRef,
    cell_type: CellType,
    style_index: Option<u32>,
    value: Option<String>,
    formula: Option<String>,
    inline: Option<String>,
}

/// 文字列を収集中の要素
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    None,
    Value,
    Formula,
    InlineText,
    HeaderFooter,
}

/// ワークシートXMLのイベントリーダー
pub(crate) struct SheetXmlReader<'a> {
    shared_strings: &'a SharedStringsTable,
    styles: &'a StylesTable,
    formatter: CellFormatter,
    options: SheetReadOptions,
}

impl<'a> SheetXmlReader<'a> {
    pub fn new(
        shared_strings: &'a SharedStringsTable,
        styles: &'a StylesTable,
        date1904: bool,
        options: &SheetReadOptions,
    ) -> Self {
        Self {
            shared_strings,
            styles,
            formatter: CellFormatter::new(date1904),
            options: *options,
        }
    }

    /// ワークシートXMLを最後まで読み、ハンドラーへ通知する
    pub fn read<B: BufRead, H: SheetContentsHandler>(
        mut self,
        source: B,
        handler: &mut H,
    ) -> Result<SheetStats, XlsxToCsvError> {
        let mut reader = Reader::from_reader(source);
        reader.trim_text(false);

        let mut buf = Vec::new();
        let mut stats = SheetStats::default();
        let mut text = String::new();
        let mut capture = Capture::None;

        let mut current_row: Option<u32> = None;
        let mut last_row: Option<u32> = None;
        let mut next_col: u32 = 0;
        let mut cell: Option<PendingCell> = None;
        let mut phonetic_depth = 0usize;
        let mut in_header_footer = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"row" => {
                        let row = Self::row_index(&e, last_row)?;
                        handler.start_row(row)?;
                        current_row = Some(row);
                        next_col = 0;
                    }
                    b"c" => {
                        cell = Some(Self::start_cell(&e, current_row.unwrap_or(0), next_col)?);
                    }
                    b"v" if cell.is_some() => {
                        capture = Capture::Value;
                        text.clear();
                    }
                    b"f" if cell.is_some() => {
                        capture = Capture::Formula;
                        text.clear();
                    }
                    b"is" => {
                        if let Some(pending) = cell.as_mut() {
                            pending.inline = Some(String::new());
                        }
                    }
                    b"rPh" => phonetic_depth += 1,
                    b"t" if phonetic_depth == 0
                        && cell.as_ref().is_some_and(|c| c.inline.is_some()) =>
                    {
                        capture = Capture::InlineText;
                        text.clear();
                    }
                    b"headerFooter" => in_header_footer = true,
                    name if in_header_footer && HEADER_FOOTER_TAGS.iter().any(|t| *t == name) => {
                        capture = Capture::HeaderFooter;
                        text.clear();
                    }
                    _ => {}
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"row" => {
                        let row = Self::row_index(&e, last_row)?;
                        handler.start_row(row)?;
                        handler.end_row(row)?;
                        last_row = Some(row);
                        stats.rows += 1;
                    }
                    b"c" => {
                        let pending = Self::start_cell(&e, current_row.unwrap_or(0), next_col)?;
                        self.finish_cell(pending, &mut next_col, handler, &mut stats)?;
                    }
                    _ => {}
                },
                Event::Text(e) => {
                    if capture != Capture::None {
                        text.push_str(&e.unescape()?);
                    }
                }
                Event::CData(e) => {
                    if capture != Capture::None {
                        text.push_str(std::str::from_utf8(&e.into_inner())?);
                    }
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"v" if capture == Capture::Value => {
                        if let Some(pending) = cell.as_mut() {
                            pending.value = Some(std::mem::take(&mut text));
                        }
                        capture = Capture::None;
                    }
                    b"f" if capture == Capture::Formula => {
                        if let Some(pending) = cell.as_mut() {
                            pending.formula = Some(std::mem::take(&mut text));
                        }
                        capture = Capture::None;
                    }
                    b"t" if capture == Capture::InlineText => {
                        if let Some(inline) = cell.as_mut().and_then(|c| c.inline.as_mut()) {
                            inline.push_str(&text);
                        }
                        text.clear();
                        capture = Capture::None;
                    }
                    b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                    b"c" => {
                        if let Some(pending) = cell.take() {
                            self.finish_cell(pending, &mut next_col, handler, &mut stats)?;
                        }
                    }
                    b"row" => {
                        if let Some(row) = current_row.take() {
                            handler.end_row(row)?;
                            last_row = Some(row);
                            stats.rows += 1;
                        }
                    }
                    b"headerFooter" => in_header_footer = false,
                    name if capture == Capture::HeaderFooter => {
                        let tag = std::str::from_utf8(name)?;
                        handler.header_footer(&text, tag.ends_with("Header"), tag)?;
                        text.clear();
                        capture = Capture::None;
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(stats)
    }

    /// `<row r="3">`の行インデックス（0始まり）
    ///
    /// `r`属性が無い場合は直前の行の次。
    fn row_index(e: &BytesStart<'_>, last_row: Option<u32>) -> Result<u32, XlsxToCsvError> {
        for attr in e.attributes() {
            let attr = attr?;
            if attr.key.local_name().as_ref() == b"r" {
                let value = attr.unescape_value()?;
                return value
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .and_then(|r| r.checked_sub(1))
                    .filter(|r| *r < MAX_ROWS)
                    .ok_or_else(|| {
                        XlsxToCsvError::InvalidPackage(format!("invalid row number: {}", value))
                    });
            }
        }
        Ok(last_row.map_or(0, |r| r.saturating_add(1)))
    }

    /// `<c r="B2" t="s" s="1">`の属性を読む
    ///
    /// `r`属性が無い場合は同じ行の次の列とみなします。
    fn start_cell(
        e: &BytesStart<'_>,
        row: u32,
        next_col: u32,
    ) -> Result<PendingCell, XlsxToCsvError> {
        let mut reference = CellRef::new(row, next_col);
        let mut cell_type = CellType::Number;
        let mut style_index = None;

        for attr in e.attributes() {
            let attr = attr?;
            match attr.key.local_name().as_ref() {
                b"r" => {
                    let value = attr.unescape_value()?;
                    reference = CellRef::parse(&value).ok_or_else(|| {
                        XlsxToCsvError::InvalidPackage(format!("invalid cell reference: {}", value))
                    })?;
                }
                b"t" => cell_type = CellType::from_attr(attr.unescape_value()?.trim()),
                b"s" => {
                    let value = attr.unescape_value()?;
                    style_index = Some(value.trim().parse::<u32>().map_err(|_| {
                        XlsxToCsvError::InvalidPackage(format!("invalid style index: {}", value))
                    })?);
                }
                _ => {}
            }
        }

        if !reference.is_in_sheet() {
            return Err(XlsxToCsvError::InvalidPackage(format!(
                "cell reference outside worksheet: {}",
                reference
            )));
        }

        Ok(PendingCell {
            reference,
            cell_type,
            style_index,
            value: None,
            formula: None,
            inline: None,
        })
    }

    /// `</c>`で値を確定し、通知する
    fn finish_cell<H: SheetContentsHandler>(
        &mut self,
        pending: PendingCell,
        next_col: &mut u32,
        handler: &mut H,
        stats: &mut SheetStats,
    ) -> Result<(), XlsxToCsvError> {
        let formula = match (self.options.formula_mode, &pending.formula) {
            (FormulaMode::Formula, Some(f)) if !f.is_empty() => Some(f.clone()),
            _ => None,
        };

        if formula.is_none() && pending.value.is_none() && pending.inline.is_none() {
            return Ok(());
        }

        let style = self.resolve_style(pending.style_index);
        let value = match formula {
            Some(formula) => formula,
            None => self.render(&pending, style.as_ref()),
        };

        let reference = pending.reference;
        if self.options.fill_missing_cells {
            for col in *next_col..reference.col {
                handler.cell(CellRef::new(reference.row, col), "", None)?;
                stats.cells += 1;
            }
        }

        trace!("Cell {} = {:?}", reference, value);
        handler.cell(reference, &value, style.as_ref())?;
        stats.cells += 1;
        *next_col = reference.col.saturating_add(1);
        Ok(())
    }

    /// セルのスタイルを解決
    ///
    /// `s`属性が無いセルはスタイル0を使用します。スタイルが1つも無いブックでは`None`。
    fn resolve_style(&self, index: Option<u32>) -> Option<CellStyle<'a>> {
        let styles: &'a StylesTable = self.styles;
        if styles.is_empty() {
            return None;
        }
        let index = index.unwrap_or(0);
        let style = styles.cell_style(index);
        if style.is_none() {
            warn!("Style index {} out of range; value emitted unformatted", index);
        }
        style
    }

    /// セルの種類に応じて表示文字列を作る
    fn render(&mut self, pending: &PendingCell, style: Option<&CellStyle<'_>>) -> String {
        let raw = pending.value.as_deref().unwrap_or("");

        match pending.cell_type {
            CellType::SharedString => match raw.trim().parse::<usize>() {
                Ok(index) => self.shared_strings.get(index).to_string(),
                Err(_) => {
                    warn!("Invalid shared string index: {}", raw);
                    raw.to_string()
                }
            },
            CellType::InlineString => match &pending.inline {
                Some(inline) => inline.clone(),
                None => raw.to_string(),
            },
            CellType::Boolean => {
                if raw.is_empty() || raw.starts_with('0') {
                    "FALSE".to_string()
                } else {
                    "TRUE".to_string()
                }
            }
            CellType::Error => format!("ERROR:{}", raw),
            CellType::Number | CellType::FormulaString => match style {
                Some(style) if !raw.is_empty() => {
                    self.formatter.format_raw_cell_contents(raw, style.format_code)
                }
                _ => raw.to_string(),
            },
            CellType::Other => raw.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 通知をそのまま記録するハンドラー
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl SheetContentsHandler for Recorder {
        fn start_row(&mut self, row: u32) -> Result<(), XlsxToCsvError> {
            self.events.push(format!("start {}", row));
            Ok(())
        }

        fn cell(
            &mut self,
            reference: CellRef,
            formatted_value: &str,
            _style: Option<&CellStyle<'_>>,
        ) -> Result<(), XlsxToCsvError> {
            self.events.push(format!("{}={}", reference, formatted_value));
            Ok(())
        }

        fn end_row(&mut self, row: u32) -> Result<(), XlsxToCsvError> {
            self.events.push(format!("end {}", row));
            Ok(())
        }

        fn header_footer(
            &mut self,
            text: &str,
            is_header: bool,
            tag_name: &str,
        ) -> Result<(), XlsxToCsvError> {
            self.events
                .push(format!("{} {} {}", tag_name, is_header, text));
            Ok(())
        }
    }

    fn sheet(rows: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
            rows
        )
    }

    fn read_with(
        xml: &str,
        strings: &SharedStringsTable,
        styles: &StylesTable,
        options: SheetReadOptions,
    ) -> (Vec<String>, SheetStats) {
        let mut recorder = Recorder::default();
        let stats = SheetXmlReader::new(strings, styles, false, &options)
            .read(xml.as_bytes(), &mut recorder)
            .unwrap();
        (recorder.events, stats)
    }

    fn read(xml: &str) -> Vec<String> {
        read_with(
            xml,
            &SharedStringsTable::empty(),
            &StylesTable::empty(),
            SheetReadOptions::default(),
        )
        .0
    }

    fn strings(items: &[&str]) -> SharedStringsTable {
        let xml: String = items
            .iter()
            .map(|s| format!("<si><t>{}</t></si>", s))
            .collect();
        SharedStringsTable::parse(format!("<sst>{}</sst>", xml).as_bytes()).unwrap()
    }

    #[test]
    fn test_shared_and_number_cells() {
        let xml = sheet(
            r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
<row r="2"><c r="A2" t="s"><v>2</v></c><c r="B2"><v>30</v></c></row>"#,
        );
        let (events, stats) = read_with(
            &xml,
            &strings(&["Name", "Age", "Alice"]),
            &StylesTable::empty(),
            SheetReadOptions::default(),
        );
        assert_eq!(
            events,
            vec![
                "start 0", "A1=Name", "B1=Age", "end 0", "start 1", "A2=Alice", "B2=30", "end 1"
            ]
        );
        assert_eq!(stats, SheetStats { rows: 2, cells: 4 });
    }

    #[test]
    fn test_inline_boolean_error_and_str_cells() {
        let xml = sheet(
            r#"<row r="1"><c r="A1" t="inlineStr"><is><t>inline</t></is></c><c r="B1" t="b"><v>1</v></c><c r="C1" t="b"><v>0</v></c><c r="D1" t="e"><v>#DIV/0!</v></c><c r="E1" t="str"><f>A1&amp;"x"</f><v>inlinex</v></c></row>"#,
        );
        assert_eq!(
            read(&xml),
            vec![
                "start 0",
                "A1=inline",
                "B1=TRUE",
                "C1=FALSE",
                "D1=ERROR:#DIV/0!",
                "E1=inlinex",
                "end 0"
            ]
        );
    }

    #[test]
    fn test_inline_rich_text_excludes_phonetic() {
        let xml = sheet(
            r#"<row r="1"><c r="A1" t="inlineStr"><is><r><t>ab</t></r><r><t xml:space="preserve"> cd</t></r><rPh sb="0" eb="1"><t>ph</t></rPh></is></c></row>"#,
        );
        assert_eq!(read(&xml), vec!["start 0", "A1=ab cd", "end 0"]);
    }

    #[test]
    fn test_cells_without_value_are_skipped() {
        let xml = sheet(r#"<row r="1"><c r="A1" s="0"/><c r="B1"><v>2</v></c></row>"#);
        assert_eq!(read(&xml), vec!["start 0", "A1=", "B1=2", "end 0"]);

        let options = SheetReadOptions {
            fill_missing_cells: false,
            ..SheetReadOptions::default()
        };
        let (events, _) = read_with(
            &xml,
            &SharedStringsTable::empty(),
            &StylesTable::empty(),
            options,
        );
        assert_eq!(events, vec!["start 0", "B1=2", "end 0"]);
    }

    #[test]
    fn test_sparse_cells_are_filled() {
        let xml = sheet(r#"<row r="1"><c r="A1"><v>1</v></c><c r="D1"><v>4</v></c></row>"#);
        assert_eq!(
            read(&xml),
            vec!["start 0", "A1=1", "B1=", "C1=", "D1=4", "end 0"]
        );
    }

    #[test]
    fn test_missing_rows_are_not_synthesized() {
        let xml = sheet(
            r#"<row r="1"><c r="A1"><v>1</v></c></row><row r="4"><c r="A4"><v>4</v></c></row>"#,
        );
        assert_eq!(
            read(&xml),
            vec!["start 0", "A1=1", "end 0", "start 3", "A4=4", "end 3"]
        );
    }

    #[test]
    fn test_rows_and_cells_without_references() {
        let xml = sheet(
            r#"<row><c><v>1</v></c><c><v>2</v></c></row><row/><row><c t="inlineStr"><is><t>x</t></is></c></row>"#,
        );
        assert_eq!(
            read(&xml),
            vec![
                "start 0", "A1=1", "B1=2", "end 0", "start 1", "end 1", "start 2", "A3=x", "end 2"
            ]
        );
    }

    #[test]
    fn test_empty_row_element() {
        let xml = sheet(r#"<row r="1" spans="1:3"/><row r="2"></row>"#);
        assert_eq!(read(&xml), vec!["start 0", "end 0", "start 1", "end 1"]);
    }

    #[test]
    fn test_formula_mode() {
        let xml = sheet(
            r#"<row r="1"><c r="A1"><v>1</v></c><c r="B1"><f>A1*2</f><v>2</v></c><c r="C1"><f>SUM(A1:B1)</f></c></row>"#,
        );
        assert_eq!(read(&xml), vec!["start 0", "A1=1", "B1=2", "end 0"]);

        let options = SheetReadOptions {
            formula_mode: FormulaMode::Formula,
            ..SheetReadOptions::default()
        };
        let (events, _) = read_with(
            &xml,
            &SharedStringsTable::empty(),
            &StylesTable::empty(),
            options,
        );
        assert_eq!(
            events,
            vec!["start 0", "A1=1", "B1=A1*2", "C1=SUM(A1:B1)", "end 0"]
        );
    }

    #[test]
    fn test_number_formats_are_applied() {
        let styles = StylesTable::parse(
            r#"<styleSheet><numFmts><numFmt numFmtId="164" formatCode="yyyy-mm-dd"/></numFmts>
<cellXfs><xf numFmtId="0"/><xf numFmtId="164"/><xf numFmtId="2"/><xf numFmtId="9"/></cellXfs></styleSheet>"#
                .as_bytes(),
        )
        .unwrap();
        let xml = sheet(
            r#"<row r="1"><c r="A1"><v>0.5</v></c><c r="B1" s="1"><v>45658</v></c><c r="C1" s="2"><v>3.14159</v></c><c r="D1" s="3"><v>0.25</v></c><c r="E1" s="9"><v>7</v></c></row>"#,
        );
        let (events, _) = read_with(
            &xml,
            &SharedStringsTable::empty(),
            &styles,
            SheetReadOptions::default(),
        );
        assert_eq!(
            events,
            vec![
                "start 0",
                "A1=0.5",
                "B1=2025-01-01",
                "C1=3.14",
                "D1=25%",
                "E1=7",
                "end 0"
            ]
        );
    }

    #[test]
    fn test_raw_values_without_styles() {
        let xml = sheet(r#"<row r="1"><c r="A1"><v>1.50</v></c></row>"#);
        assert_eq!(read(&xml), vec!["start 0", "A1=1.50", "end 0"]);
    }

    #[test]
    fn test_header_footer() {
        let xml = r#"<worksheet><sheetData><row r="1"><c r="A1"><v>1</v></c></row></sheetData>
<headerFooter><oddHeader>&amp;CTitle</oddHeader><oddFooter>Page &amp;P</oddFooter></headerFooter></worksheet>"#;
        assert_eq!(
            read(xml),
            vec![
                "start 0",
                "A1=1",
                "end 0",
                "oddHeader true &CTitle",
                "oddFooter false Page &P"
            ]
        );
    }

    #[test]
    fn test_invalid_references() {
        let mut recorder = Recorder::default();
        let xml = sheet(r#"<row r="x"><c r="A1"><v>1</v></c></row>"#);
        let result = SheetXmlReader::new(
            &SharedStringsTable::empty(),
            &StylesTable::empty(),
            false,
            &SheetReadOptions::default(),
        )
        .read(xml.as_bytes(), &mut recorder);
        assert!(matches!(result, Err(XlsxToCsvError::InvalidPackage(_))));

        let xml = sheet(r#"<row r="1"><c r="1A"><v>1</v></c></row>"#);
        let result = SheetXmlReader::new(
            &SharedStringsTable::empty(),
            &StylesTable::empty(),
            false,
            &SheetReadOptions::default(),
        )
        .read(xml.as_bytes(), &mut recorder);
        assert!(matches!(result, Err(XlsxToCsvError::InvalidPackage(_))));
    }

    /// セル通知の回数だけを数えるハンドラー
    #[derive(Default)]
    struct CellCounter {
        cells: usize,
    }

    impl SheetContentsHandler for CellCounter {
        fn start_row(&mut self, _row: u32) -> Result<(), XlsxToCsvError> {
            Ok(())
        }

        fn cell(
            &mut self,
            _reference: CellRef,
            _formatted_value: &str,
            _style: Option<&CellStyle<'_>>,
        ) -> Result<(), XlsxToCsvError> {
            self.cells += 1;
            Ok(())
        }

        fn end_row(&mut self, _row: u32) -> Result<(), XlsxToCsvError> {
            Ok(())
        }
    }

    #[test]
    fn test_references_outside_worksheet_are_rejected() {
        let rows = [
            r#"<row r="1"><c r="ZZZZ1"><v>1</v></c></row>"#,
            r#"<row r="1"><c r="AAAAAAA1"><v>1</v></c></row>"#,
            r#"<row r="1"><c r="XFE1"><v>1</v></c></row>"#,
            r#"<row r="1048577"><c><v>1</v></c></row>"#,
            r#"<row r="1"><c r="A1048577"><v>1</v></c></row>"#,
        ];

        for row in rows {
            let mut counter = CellCounter::default();
            let result = SheetXmlReader::new(
                &SharedStringsTable::empty(),
                &StylesTable::empty(),
                false,
                &SheetReadOptions::default(),
            )
            .read(sheet(row).as_bytes(), &mut counter);

            assert!(
                matches!(result, Err(XlsxToCsvError::InvalidPackage(_))),
                "{}: {:?}",
                row,
                result
            );
            assert_eq!(counter.cells, 0, "{}", row);
        }
    }

    #[test]
    fn test_last_column_is_filled_up_to_xfd() {
        let mut counter = CellCounter::default();
        let stats = SheetXmlReader::new(
            &SharedStringsTable::empty(),
            &StylesTable::empty(),
            false,
            &SheetReadOptions::default(),
        )
        .read(
            sheet(r#"<row r="1"><c r="XFD1"><v>1</v></c></row>"#).as_bytes(),
            &mut counter,
        )
        .unwrap();

        assert_eq!(counter.cells, 16_384);
        assert_eq!(stats.cells, 16_384);
    }

    #[test]
    fn test_malformed_xml() {
        let mut recorder = Recorder::default();
        let xml = sheet(r#"<row r="1"><c r="A1"><v>1</c></row>"#);
        let result = SheetXmlReader::new(
            &SharedStringsTable::empty(),
            &StylesTable::empty(),
            false,
            &SheetReadOptions::default(),
        )
        .read(xml.as_bytes(), &mut recorder);
        assert!(matches!(result, Err(XlsxToCsvError::Xml(_))));
    }

    #[test]
    fn test_handler_error_stops_reading() {
        struct Failing;
        impl SheetContentsHandler for Failing {
            fn start_row(&mut self, _row: u32) -> Result<(), XlsxToCsvError> {
                Ok(())
            }
            fn cell(
                &mut self,
                _reference: CellRef,
                _formatted_value: &str,
                _style: Option<&CellStyle<'_>>,
            ) -> Result<(), XlsxToCsvError> {
                Err(XlsxToCsvError::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "closed",
                )))
            }
            fn end_row(&mut self, _row: u32) -> Result<(), XlsxToCsvError> {
                Ok(())
            }
        }

        let xml = sheet(r#"<row r="1"><c r="A1"><v>1</v></c></row>"#);
        let result = SheetXmlReader::new(
            &SharedStringsTable::empty(),
            &StylesTable::empty(),
            false,
            &SheetReadOptions::default(),
        )
        .read(xml.as_bytes(), &mut Failing);
        assert!(matches!(result, Err(XlsxToCsvError::Io(_))));
    }
}
