//! Spreadsheet Package Module
//!
//! XLSXファイル（ZIPアーカイブ）を開き、ワークブック・リレーションシップ・
//! 共有文字列・スタイルを解決します。ワークシート本体は`read_sheet`で
//! 必要になった時点で1つだけストリーミング読み込みします。

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::XlsxToCsvError;
use crate::parser::handler::SheetContentsHandler;
use crate::parser::shared_strings::SharedStringsTable;
use crate::parser::sheet::{SheetReadOptions, SheetStats, SheetXmlReader};
use crate::parser::styles::StylesTable;
use crate::security::SecurityConfig;

/// パッケージのルートリレーションシップ
const ROOT_RELS_PART: &str = "_rels/.rels";

/// ルートリレーションシップが無い場合のワークブック
const DEFAULT_WORKBOOK_PART: &str = "xl/workbook.xml";

/// ワークシートの一覧エントリ
///
/// `workbook.xml`の`<sheet>`要素1つに対応します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    /// シート名（`<sheet name="...">`）
    pub name: String,
    /// ZIPアーカイブ内のパート名（例: `xl/worksheets/sheet1.xml`）
    pub part_name: String,
}

/// `.rels`パートの`<Relationship>`要素
#[derive(Debug, Clone)]
struct Relationship {
    rel_type: String,
    target: String,
}

/// スプレッドシートパッケージ
///
/// 開いている間、ZIPアーカイブと共有文字列・スタイルのテーブルを保持します。
/// ドロップ時にファイルハンドルも閉じられます。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxcsv::{SecurityConfig, SpreadsheetPackage};
///
/// # fn main() -> Result<(), xlsxcsv::XlsxToCsvError> {
/// let package = SpreadsheetPackage::open("report.xlsx", &SecurityConfig::default())?;
/// for sheet in package.sheets() {
///     println!("{} -> {}", sheet.name, sheet.part_name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct SpreadsheetPackage<R: Read + Seek> {
    archive: ZipArchive<R>,
    shared_strings: SharedStringsTable,
    styles: StylesTable,
    sheets: Vec<SheetEntry>,
    date1904: bool,
}

impl SpreadsheetPackage<BufReader<File>> {
    /// ファイルパスからパッケージを開く（読み取り専用）
    pub fn open(
        path: impl AsRef<Path>,
        security: &SecurityConfig,
    ) -> Result<Self, XlsxToCsvError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        security.check_input_size(file.metadata()?.len())?;
        debug!("Opened spreadsheet package: {}", path.display());
        Self::from_reader(BufReader::new(file), security)
    }
}

impl<R: Read + Seek> SpreadsheetPackage<R> {
    /// 任意のリーダーからパッケージを開く
    ///
    /// セキュリティ検査はXMLを読む前に行います。
    pub fn from_reader(mut reader: R, security: &SecurityConfig) -> Result<Self, XlsxToCsvError> {
        let size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        security.check_input_size(size)?;

        let mut archive = ZipArchive::new(reader)?;
        security.check_archive(&mut archive)?;

        let workbook_part = Self::find_workbook_part(&mut archive)?;
        let workbook_rels = Self::read_relationships(&mut archive, &rels_part_for(&workbook_part))?;
        let (date1904, declared_sheets) = Self::read_workbook(&mut archive, &workbook_part)?;
        let base_dir = parent_dir(&workbook_part);

        let mut sheets = Vec::with_capacity(declared_sheets.len());
        for (name, rel_id) in declared_sheets {
            match workbook_rels.get(&rel_id) {
                Some(rel) => sheets.push(SheetEntry {
                    name,
                    part_name: resolve_target(base_dir, &rel.target),
                }),
                None => warn!(
                    "Sheet '{}' references missing relationship '{}'; skipped",
                    name, rel_id
                ),
            }
        }

        if sheets.is_empty() {
            return Err(XlsxToCsvError::InvalidPackage(
                "workbook contains no worksheets".to_string(),
            ));
        }

        let related_part = |suffix: &str, fallback: &str| {
            workbook_rels
                .values()
                .find(|rel| rel.rel_type.ends_with(suffix))
                .map(|rel| resolve_target(base_dir, &rel.target))
                .unwrap_or_else(|| fallback.to_string())
        };
        let shared_strings_part = related_part("/sharedStrings", "xl/sharedStrings.xml");
        let styles_part = related_part("/styles", "xl/styles.xml");

        let shared_strings = match archive.by_name(&shared_strings_part) {
            Ok(file) => SharedStringsTable::parse(BufReader::new(file))?,
            Err(ZipError::FileNotFound) => SharedStringsTable::empty(),
            Err(e) => return Err(e.into()),
        };

        let styles = match archive.by_name(&styles_part) {
            Ok(file) => StylesTable::parse(BufReader::new(file))?,
            Err(ZipError::FileNotFound) => StylesTable::empty(),
            Err(e) => return Err(e.into()),
        };

        debug!(
            "Package resolved: workbook={}, sheets={}, shared_strings={}, date1904={}",
            workbook_part,
            sheets.len(),
            shared_strings.len(),
            date1904
        );

        Ok(Self {
            archive,
            shared_strings,
            styles,
            sheets,
            date1904,
        })
    }

    /// ワークシートの一覧（ワークブックでの定義順）
    pub fn sheets(&self) -> &[SheetEntry] {
        &self.sheets
    }

    /// 1904年日付システムを使用しているか
    pub fn is_1904(&self) -> bool {
        self.date1904
    }

    /// ワークシートを1つ読み込み、内容をハンドラーへ通知する
    ///
    /// 指定したシートのパートのみを開きます。
    pub fn read_sheet<H: SheetContentsHandler>(
        &mut self,
        entry: &SheetEntry,
        options: &SheetReadOptions,
        handler: &mut H,
    ) -> Result<SheetStats, XlsxToCsvError> {
        debug!("Reading worksheet '{}' ({})", entry.name, entry.part_name);
        let file = self.archive.by_name(&entry.part_name)?;
        let reader = SheetXmlReader::new(
            &self.shared_strings,
            &self.styles,
            self.date1904,
            options,
        );
        reader.read(BufReader::new(file), handler)
    }

    /// `_rels/.rels`のofficeDocumentリレーションシップからワークブックを探す
    fn find_workbook_part(archive: &mut ZipArchive<R>) -> Result<String, XlsxToCsvError> {
        let root_rels = Self::read_relationships(archive, ROOT_RELS_PART)?;
        let part = root_rels
            .values()
            .find(|rel| rel.rel_type.ends_with("/officeDocument"))
            .map(|rel| resolve_target("", &rel.target))
            .unwrap_or_else(|| DEFAULT_WORKBOOK_PART.to_string());

        if archive.file_names().any(|name| name == part) {
            Ok(part)
        } else {
            Err(XlsxToCsvError::InvalidPackage(format!(
                "workbook part not found: {}",
                part
            )))
        }
    }

    /// `.rels`パートを解析（存在しない場合は空）
    ///
    /// Id -> Relationship のマッピングを返します。外部リンク（`TargetMode="External"`）は除外します。
    fn read_relationships(
        archive: &mut ZipArchive<R>,
        part: &str,
    ) -> Result<HashMap<String, Relationship>, XlsxToCsvError> {
        let file = match archive.by_name(part) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = Reader::from_reader(BufReader::new(file));
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut relationships = HashMap::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        if let Some((id, rel)) = Self::read_relationship(&e)? {
                            relationships.insert(id, rel);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(relationships)
    }

    fn read_relationship(
        e: &BytesStart<'_>,
    ) -> Result<Option<(String, Relationship)>, XlsxToCsvError> {
        let mut id = None;
        let mut rel_type = String::new();
        let mut target = None;
        let mut external = false;

        for attr in e.attributes() {
            let attr = attr?;
            match attr.key.local_name().as_ref() {
                b"Id" => id = Some(attr.unescape_value()?.into_owned()),
                b"Type" => rel_type = attr.unescape_value()?.into_owned(),
                b"Target" => target = Some(attr.unescape_value()?.into_owned()),
                b"TargetMode" => external = attr.unescape_value()? == "External",
                _ => {}
            }
        }

        match (id, target) {
            (Some(id), Some(target)) if !external => {
                Ok(Some((id, Relationship { rel_type, target })))
            }
            _ => Ok(None),
        }
    }

    /// workbook.xmlを解析
    ///
    /// `<workbookPr date1904>`と、`<sheet name r:id>`の一覧（定義順）を返します。
    fn read_workbook(
        archive: &mut ZipArchive<R>,
        part: &str,
    ) -> Result<(bool, Vec<(String, String)>), XlsxToCsvError> {
        let file = archive.by_name(part)?;
        let mut reader = Reader::from_reader(BufReader::new(file));
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut date1904 = false;
        let mut sheets = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                    b"workbookPr" => {
                        for attr in e.attributes() {
                            let attr = attr?;
                            if attr.key.local_name().as_ref() == b"date1904" {
                                let value = attr.unescape_value()?;
                                date1904 = value == "1" || value == "true";
                            }
                        }
                    }
                    b"sheet" => {
                        let mut name = None;
                        let mut rel_id = None;
                        for attr in e.attributes() {
                            let attr = attr?;
                            match attr.key.local_name().as_ref() {
                                b"name" => name = Some(attr.unescape_value()?.into_owned()),
                                b"id" => rel_id = Some(attr.unescape_value()?.into_owned()),
                                _ => {}
                            }
                        }
                        match (name, rel_id) {
                            (Some(name), Some(rel_id)) => sheets.push((name, rel_id)),
                            _ => {
                                return Err(XlsxToCsvError::InvalidPackage(
                                    "<sheet> element without name or r:id".to_string(),
                                ))
                            }
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok((date1904, sheets))
    }
}

/// パートに対応する`.rels`パート名（`xl/workbook.xml` -> `xl/_rels/workbook.xml.rels`）
fn rels_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// パートのディレクトリ（`xl/workbook.xml` -> `xl`）
fn parent_dir(part: &str) -> &str {
    part.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// リレーションシップのTargetをパート名に解決
///
/// `/`で始まる場合はパッケージルートからの絶対パス、それ以外は`base_dir`からの相対パス。
/// `.`と`..`は正規化します。
fn resolve_target(base_dir: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None if base_dir.is_empty() => target.to_string(),
        None => format!("{}/{}", base_dir, target),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}
