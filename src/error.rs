//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// xlsxcsvクレート全体で使用するエラー型
///
/// パッケージのオープン、ワークシートの読み込み、XML解析、CSV出力の
/// いずれかで発生したエラーを統一的に扱います。
///
/// # エラーの種類
///
/// - `Io`: ファイルのオープン・読み込み・書き込みの失敗
/// - `Zip`: ZIPコンテナとして読めない、エントリが存在しない
/// - `Xml`: ワークシートなどのXMLが不正
/// - `InvalidPackage`: ZIPとしては正しいがスプレッドシートとして構造が不正
/// - `Config`: `ConverterBuilder`の設定が不正
/// - `SecurityViolation`: セキュリティ制限に違反
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxcsv::XlsxToCsvError;
///
/// match xlsxcsv::convert("input.xlsx", "output.csv") {
///     Ok(summary) => println!("{} rows", summary.rows),
///     Err(XlsxToCsvError::Io(e)) => eprintln!("I/O: {}", e),
///     Err(e) => eprintln!("{}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum XlsxToCsvError {
    /// I/O操作中に発生したエラー
    ///
    /// 入力ファイルが存在しない、出力先に書き込めないなど。
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIPアーカイブの解析エラー
    ///
    /// 入力がZIPではない、破損している、参照されたパートが存在しない場合に発生します。
    #[error("ZIP archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML解析エラー
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// UTF-8文字列の変換エラー
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// 数値属性の解析エラー（例: `<row r="abc">`）
    #[error("Number parse error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    /// スプレッドシートパッケージとして構造が不正
    ///
    /// workbook.xmlが存在しない、シートが1つもない、などの場合に発生します。
    #[error("Invalid spreadsheet package: {0}")]
    InvalidPackage(String),

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時に発生します。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use xlsxcsv::{ConverterBuilder, SecurityConfig, XlsxToCsvError};
    ///
    /// let result = ConverterBuilder::new()
    ///     .with_security_config(SecurityConfig {
    ///         max_file_count: 0,
    ///         ..SecurityConfig::default()
    ///     })
    ///     .build();
    ///
    /// if let Err(XlsxToCsvError::Config(msg)) = result {
    ///     println!("設定エラー: {}", msg);
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb、パストラバーサル、ファイルサイズ制限などに違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl From<quick_xml::events::attributes::AttrError> for XlsxToCsvError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        XlsxToCsvError::Xml(err.into())
    }
}
