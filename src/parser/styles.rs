//! Styles Module
//!
//! `xl/styles.xml`から数値書式（`numFmts`）とセル書式（`cellXfs`）を解析します。

use std::collections::HashMap;
use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::XlsxToCsvError;

/// セルに適用されているスタイル
///
/// `SheetContentsHandler::cell`に渡されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStyle<'a> {
    /// `cellXfs`内のインデックス（セルの`s`属性）
    pub index: u32,
    /// 数値書式ID
    pub num_fmt_id: u32,
    /// 数値書式文字列（例: `"0.00"`, `"yyyy-mm-dd"`）
    pub format_code: &'a str,
}

/// スタイルテーブル
#[derive(Debug, Clone, Default)]
pub(crate) struct StylesTable {
    /// numFmtId -> formatCode（`<numFmts>`で定義されたもの）
    num_formats: HashMap<u32, String>,
    /// cellXfsのインデックス順のnumFmtId
    cell_xfs: Vec<u32>,
}

impl StylesTable {
    /// 空のテーブル（styles.xmlが存在しない場合）
    pub fn empty() -> Self {
        Self::default()
    }

    /// styles.xmlを解析
    pub fn parse<B: BufRead>(source: B) -> Result<Self, XlsxToCsvError> {
        let mut reader = Reader::from_reader(source);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut num_formats = HashMap::new();
        let mut cell_xfs = Vec::new();
        let mut in_num_fmts = false;
        let mut in_cell_xfs = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"numFmts" => in_num_fmts = true,
                    b"cellXfs" => in_cell_xfs = true,
                    b"numFmt" if in_num_fmts => Self::read_num_fmt(&e, &mut num_formats)?,
                    // <xf numFmtId="14"><alignment .../></xf>
                    b"xf" if in_cell_xfs => cell_xfs.push(Self::read_xf(&e)?),
                    _ => {}
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"numFmt" if in_num_fmts => Self::read_num_fmt(&e, &mut num_formats)?,
                    b"xf" if in_cell_xfs => cell_xfs.push(Self::read_xf(&e)?),
                    _ => {}
                },
                Event::End(e) => match e.local_name().as_ref() {
                    b"numFmts" => in_num_fmts = false,
                    b"cellXfs" => in_cell_xfs = false,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(Self {
            num_formats,
            cell_xfs,
        })
    }

    /// `<numFmt numFmtId="165" formatCode="0.000"/>`
    fn read_num_fmt(
        e: &BytesStart<'_>,
        num_formats: &mut HashMap<u32, String>,
    ) -> Result<(), XlsxToCsvError> {
        let mut id = None;
        let mut code = None;
        for attr in e.attributes() {
            let attr = attr?;
            match attr.key.local_name().as_ref() {
                b"numFmtId" => id = Some(attr.unescape_value()?.trim().parse::<u32>()?),
                b"formatCode" => code = Some(attr.unescape_value()?.into_owned()),
                _ => {}
            }
        }
        if let (Some(id), Some(code)) = (id, code) {
            num_formats.insert(id, code);
        }
        Ok(())
    }

    /// `<xf numFmtId="14" .../>`のnumFmtId（省略時は0）
    fn read_xf(e: &BytesStart<'_>) -> Result<u32, XlsxToCsvError> {
        for attr in e.attributes() {
            let attr = attr?;
            if attr.key.local_name().as_ref() == b"numFmtId" {
                return Ok(attr.unescape_value()?.trim().parse::<u32>()?);
            }
        }
        Ok(0)
    }

    /// スタイルが1つも定義されていないか
    pub fn is_empty(&self) -> bool {
        self.cell_xfs.is_empty()
    }

    /// インデックスのスタイルを取得
    ///
    /// `cellXfs`の範囲外の場合は`None`。
    pub fn cell_style(&self, index: u32) -> Option<CellStyle<'_>> {
        let num_fmt_id = *self.cell_xfs.get(index as usize)?;
        Some(CellStyle {
            index,
            num_fmt_id,
            format_code: self.format_code(num_fmt_id),
        })
    }

    /// 数値書式IDの書式文字列
    ///
    /// カスタム書式 → ビルトイン書式 → `"General"`の順に解決します。
    pub fn format_code(&self, num_fmt_id: u32) -> &str {
        self.num_formats
            .get(&num_fmt_id)
            .map(String::as_str)
            .or_else(|| builtin_format(num_fmt_id))
            .unwrap_or("General")
    }
}

/// ビルトイン書式ID（0-49）のマッピング
///
/// Excelの標準書式IDとフォーマット文字列の対応表です。
/// 23-36はロケール依存のため定義しません（`General`として扱われます）。
fn builtin_format(id: u32) -> Option<&'static str> {
    match id {
        0 => Some("General"),
        1 => Some("0"),
        2 => Some("0.00"),
        3 => Some("#,##0"),
        4 => Some("#,##0.00"),
        5 => Some("\"$\"#,##0_);(\"$\"#,##0)"),
        6 => Some("\"$\"#,##0_);[Red](\"$\"#,##0)"),
        7 => Some("\"$\"#,##0.00_);(\"$\"#,##0.00)"),
        8 => Some("\"$\"#,##0.00_);[Red](\"$\"#,##0.00)"),
        9 => Some("0%"),
        10 => Some("0.00%"),
        11 => Some("0.00E+00"),
        12 => Some("# ?/?"),
        13 => Some("# ??/??"),
        14 => Some("m/d/yy"),
        15 => Some("d-mmm-yy"),
        16 => Some("d-mmm"),
        17 => Some("mmm-yy"),
        18 => Some("h:mm AM/PM"),
        19 => Some("h:mm:ss AM/PM"),
        20 => Some("h:mm"),
        21 => Some("h:mm:ss"),
        22 => Some("m/d/yy h:mm"),
        37 => Some("#,##0_);(#,##0)"),
        38 => Some("#,##0_);[Red](#,##0)"),
        39 => Some("#,##0.00_);(#,##0.00)"),
        40 => Some("#,##0.00_);[Red](#,##0.00)"),
        41 => Some("_(* #,##0_);_(* (#,##0);_(* \"-\"_);_(@_)"),
        42 => Some("_(\"$\"* #,##0_);_(\"$\"* (#,##0);_(\"$\"* \"-\"_);_(@_)"),
        43 => Some("_(* #,##0.00_);_(* (#,##0.00);_(* \"-\"??_);_(@_)"),
        44 => Some("_(\"$\"* #,##0.00_);_(\"$\"* (#,##0.00);_(\"$\"* \"-\"??_);_(@_)"),
        45 => Some("mm:ss"),
        46 => Some("[h]:mm:ss"),
        47 => Some("mm:ss.0"),
        48 => Some("##0.0E+0"),
        49 => Some("@"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="2">
    <numFmt numFmtId="164" formatCode="yyyy\-mm\-dd"/>
    <numFmt numFmtId="165" formatCode="&quot;$&quot;#,##0.00"/>
  </numFmts>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0"/></cellStyleXfs>
  <cellXfs count="4">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="164" fontId="0" applyNumberFormat="1"/>
    <xf numFmtId="10" fontId="0" applyNumberFormat="1"><alignment horizontal="center"/></xf>
    <xf numFmtId="165" fontId="0"/>
  </cellXfs>
</styleSheet>"#;

    #[test]
    fn test_builtin_format() {
        assert_eq!(builtin_format(0), Some("General"));
        assert_eq!(builtin_format(1), Some("0"));
        assert_eq!(builtin_format(14), Some("m/d/yy"));
        assert_eq!(builtin_format(49), Some("@"));
        assert_eq!(builtin_format(30), None);
        assert_eq!(builtin_format(50), None);
        assert_eq!(builtin_format(164), None);
    }

    #[test]
    fn test_parse_styles() {
        let styles = StylesTable::parse(STYLES_XML.as_bytes()).unwrap();
        assert!(!styles.is_empty());
        assert_eq!(styles.cell_xfs, vec![0, 164, 10, 165]);

        let date = styles.cell_style(1).unwrap();
        assert_eq!(date.num_fmt_id, 164);
        assert_eq!(date.format_code, "yyyy\\-mm\\-dd");

        assert_eq!(styles.cell_style(2).unwrap().format_code, "0.00%");
        assert_eq!(styles.cell_style(3).unwrap().format_code, "\"$\"#,##0.00");
        assert_eq!(styles.cell_style(0).unwrap().format_code, "General");
        assert!(styles.cell_style(4).is_none());
    }

    #[test]
    fn test_cell_style_xfs_are_not_cell_xfs() {
        let styles = StylesTable::parse(STYLES_XML.as_bytes()).unwrap();
        assert_eq!(styles.cell_xfs.len(), 4);
    }

    #[test]
    fn test_unknown_format_id_falls_back_to_general() {
        let styles = StylesTable::parse(
            r#"<styleSheet><cellXfs><xf numFmtId="30"/><xf/></cellXfs></styleSheet>"#.as_bytes(),
        )
        .unwrap();
        assert_eq!(styles.cell_style(0).unwrap().format_code, "General");
        assert_eq!(styles.cell_style(1).unwrap().num_fmt_id, 0);
    }

    #[test]
    fn test_empty_table() {
        let styles = StylesTable::empty();
        assert!(styles.is_empty());
        assert!(styles.cell_style(0).is_none());
    }

    #[test]
    fn test_invalid_num_fmt_id() {
        let result = StylesTable::parse(
            r#"<styleSheet><cellXfs><xf numFmtId="abc"/></cellXfs></styleSheet>"#.as_bytes(),
        );
        assert!(matches!(result, Err(XlsxToCsvError::ParseInt(_))));
    }
}
