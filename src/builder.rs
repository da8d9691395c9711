//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;

use log::{debug, info};

use crate::api::{ConversionSummary, FormulaMode};
use crate::error::XlsxToCsvError;
use crate::output::CsvRowHandler;
use crate::parser::{SheetReadOptions, SpreadsheetPackage};
use crate::security::SecurityConfig;

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone, Default)]
pub(crate) struct ConversionConfig {
    /// ワークシート読み込みのオプション
    pub read_options: SheetReadOptions,

    /// セキュリティ制限
    pub security: SecurityConfig,
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust
/// use xlsxcsv::{ConverterBuilder, FormulaMode};
///
/// # fn main() -> Result<(), xlsxcsv::XlsxToCsvError> {
/// let converter = ConverterBuilder::new()
///     .with_formula_mode(FormulaMode::Formula)
///     .fill_missing_cells(false)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConverterBuilder {
    /// 内部設定（構築中）
    config: ConversionConfig,
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 数式モード: キャッシュ値を出力
    /// - 欠落列の補完: 有効
    /// - セキュリティ制限: `SecurityConfig::default()`
    pub fn new() -> Self {
        Self::default()
    }

    /// 数式セルの出力モードを指定する
    pub fn with_formula_mode(mut self, mode: FormulaMode) -> Self {
        self.config.read_options.formula_mode = mode;
        self
    }

    /// 行内で欠落している列を空の値で補完するかを指定する
    ///
    /// # 引数
    ///
    /// * `fill: bool`:
    ///   * `true`: `A1`, `C1`のみを持つ行を`"a","","c"`として出力（デフォルト）
    ///   * `false`: XMLに存在するセルのみを出力（`"a","c"`）
    pub fn fill_missing_cells(mut self, fill: bool) -> Self {
        self.config.read_options.fill_missing_cells = fill;
        self
    }

    /// セキュリティ制限を指定する
    pub fn with_security_config(mut self, security: SecurityConfig) -> Self {
        self.config.security = security;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `XlsxToCsvError::Config(String)`: セキュリティ制限に0が含まれる場合や、
    ///   エントリ単位の上限が合計の上限を超える場合
    pub fn build(self) -> Result<Converter, XlsxToCsvError> {
        self.config.security.validate()?;
        Ok(Converter {
            config: self.config,
        })
    }
}

/// 変換処理のファサード
///
/// XLSXパッケージの最初のワークシートをCSVに変換します。
/// 設定は不変のため、同じインスタンスを繰り返し使用できます。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxcsv::ConverterBuilder;
///
/// # fn main() -> Result<(), xlsxcsv::XlsxToCsvError> {
/// let converter = ConverterBuilder::new().build()?;
/// let summary = converter.convert_file("example.xlsx", "example.csv")?;
/// println!("{}: {} rows", summary.sheet_name, summary.rows);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    /// 変換設定
    config: ConversionConfig,
}

impl Converter {
    /// XLSXファイルをCSVファイルに変換
    ///
    /// 入力を先に開き、開けなかった場合は出力ファイルを作成しません。
    /// 出力ファイルは作成または切り詰められます。
    ///
    /// エラー発生時点までに書き出された行は削除されません。
    pub fn convert_file(
        &self,
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
    ) -> Result<ConversionSummary, XlsxToCsvError> {
        let source = source.as_ref();
        let destination = destination.as_ref();
        info!(
            "Converting {} -> {}",
            source.display(),
            destination.display()
        );

        let package = SpreadsheetPackage::open(source, &self.config.security)?;
        let output = File::create(destination)?;
        self.convert_package(package, output)
    }

    /// XLSXパッケージの最初のワークシートをCSVとして書き出す
    ///
    /// # 引数
    ///
    /// * `input` - XLSXパッケージを読み込むためのリーダー（Read + Seekトレイトを実装）
    /// * `output` - CSV出力先のライター（Writeトレイトを実装）
    ///
    /// # 処理フロー
    ///
    /// 1. パッケージのセキュリティ検証とworkbook/rels、共有文字列、スタイルの読み込み
    /// 2. ワークブック順で最初のワークシートを選択
    /// 3. ワークシートXMLをストリーミングで読み、行ごとにCSVへ書き出し
    /// 4. 出力バッファをフラッシュ
    ///
    /// ## メモリバッファからの変換
    ///
    /// ```rust,no_run
    /// use std::io::Cursor;
    /// use xlsxcsv::ConverterBuilder;
    ///
    /// # fn main() -> Result<(), xlsxcsv::XlsxToCsvError> {
    /// let converter = ConverterBuilder::new().build()?;
    /// let xlsx: Vec<u8> = std::fs::read("example.xlsx")?;
    /// let mut csv = Vec::new();
    /// converter.convert(Cursor::new(xlsx), &mut csv)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn convert<R: Read + Seek, W: Write>(
        &self,
        input: R,
        output: W,
    ) -> Result<ConversionSummary, XlsxToCsvError> {
        let package = SpreadsheetPackage::from_reader(input, &self.config.security)?;
        self.convert_package(package, output)
    }

    /// XLSXパッケージをCSV文字列に変換
    pub fn convert_to_string<R: Read + Seek>(&self, input: R) -> Result<String, XlsxToCsvError> {
        let mut buffer = Vec::new();
        self.convert(input, &mut buffer)?;

        let result = String::from_utf8(buffer).map_err(|e| {
            XlsxToCsvError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;

        Ok(result)
    }

    fn convert_package<R: Read + Seek, W: Write>(
        &self,
        mut package: SpreadsheetPackage<R>,
        output: W,
    ) -> Result<ConversionSummary, XlsxToCsvError> {
        let entry = package
            .sheets()
            .first()
            .cloned()
            .ok_or_else(|| XlsxToCsvError::InvalidPackage("workbook contains no worksheets".into()))?;
        debug!("First worksheet: {} ({})", entry.name, entry.part_name);

        let mut handler = CsvRowHandler::new(BufWriter::new(output));
        let stats = package.read_sheet(&entry, &self.config.read_options, &mut handler)?;
        let rows = handler.rows_written();
        handler.into_inner().flush()?;

        info!(
            "Converted sheet '{}': {} rows, {} cells",
            entry.name, rows, stats.cells
        );
        Ok(ConversionSummary {
            sheet_name: entry.name,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converter_builder_new() {
        let builder = ConverterBuilder::new();
        assert_eq!(
            builder.config.read_options.formula_mode,
            FormulaMode::CachedValue
        );
        assert!(builder.config.read_options.fill_missing_cells);
        assert_eq!(builder.config.security, SecurityConfig::default());
    }

    #[test]
    fn test_with_formula_mode() {
        let builder = ConverterBuilder::new().with_formula_mode(FormulaMode::Formula);
        assert_eq!(builder.config.read_options.formula_mode, FormulaMode::Formula);
    }

    #[test]
    fn test_fill_missing_cells() {
        let builder = ConverterBuilder::new().fill_missing_cells(false);
        assert!(!builder.config.read_options.fill_missing_cells);
    }

    #[test]
    fn test_build_success() {
        assert!(ConverterBuilder::new().build().is_ok());
    }

    #[test]
    fn test_build_with_invalid_security_config() {
        let result = ConverterBuilder::new()
            .with_security_config(SecurityConfig {
                max_file_count: 0,
                ..SecurityConfig::default()
            })
            .build();
        assert!(matches!(result, Err(XlsxToCsvError::Config(_))));
    }

    #[test]
    fn test_converter_convert_to_string_with_invalid_input() {
        let converter = ConverterBuilder::new().build().unwrap();
        let result = converter.convert_to_string(std::io::Cursor::new(Vec::<u8>::new()));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_source_does_not_create_destination() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("out.csv");
        let converter = ConverterBuilder::new().build().unwrap();

        let result = converter.convert_file(dir.path().join("missing.xlsx"), &destination);
        assert!(matches!(result, Err(XlsxToCsvError::Io(_))));
        assert!(!destination.exists());
    }
}
