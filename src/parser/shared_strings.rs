//! Shared Strings Module
//!
//! `xl/sharedStrings.xml`（共有文字列テーブル）の解析を提供します。

use std::io::BufRead;

use log::warn;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::XlsxToCsvError;

/// 共有文字列テーブル
///
/// `<sst>`の`<si>`要素を出現順に保持します。
/// リッチテキスト（`<r><t>`）は連結し、ふりがな（`<rPh>`）は除外します。
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedStringsTable {
    strings: Vec<String>,
}

impl SharedStringsTable {
    /// 空のテーブル（sharedStrings.xmlが存在しない場合）
    pub fn empty() -> Self {
        Self::default()
    }

    /// sharedStrings.xmlを解析
    ///
    /// 空白は保持します（`xml:space="preserve"`の有無に関わらず）。
    pub fn parse<B: BufRead>(source: B) -> Result<Self, XlsxToCsvError> {
        let mut reader = Reader::from_reader(source);
        reader.trim_text(false);

        let mut buf = Vec::new();
        let mut strings = Vec::new();
        let mut current = String::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut phonetic_depth = 0usize;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    b"rPh" => phonetic_depth += 1,
                    b"t" if in_si && phonetic_depth == 0 => in_t = true,
                    _ => {}
                },
                Event::Empty(e) => {
                    if e.local_name().as_ref() == b"si" {
                        strings.push(String::new());
                    }
                }
                Event::Text(e) if in_t => current.push_str(&e.unescape()?),
                Event::CData(e) if in_t => {
                    current.push_str(std::str::from_utf8(&e.into_inner())?);
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"si" => {
                        strings.push(std::mem::take(&mut current));
                        in_si = false;
                    }
                    b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                    b"t" => in_t = false,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { strings })
    }

    /// インデックスの文字列を取得
    ///
    /// 範囲外の場合は警告を出して空文字列を返します。
    pub fn get(&self, index: usize) -> &str {
        match self.strings.get(index) {
            Some(s) => s,
            None => {
                warn!(
                    "Shared string index {} out of range (table size: {})",
                    index,
                    self.strings.len()
                );
                ""
            }
        }
    }

    /// 文字列の数
    pub fn len(&self) -> usize {
        self.strings.len()
    }
}
