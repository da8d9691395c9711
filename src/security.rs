//! Security Module
//!
//! セキュリティ対策を実装するモジュール。
//! ZIP bomb攻撃、パストラバーサル攻撃、巨大ファイルへの対策を提供します。

use std::io::{Read, Seek};

use zip::ZipArchive;

use crate::error::XlsxToCsvError;

/// セキュリティ設定
///
/// 入力パッケージ処理時のセキュリティ制限を定義します。
/// サイズはZIPのセントラルディレクトリに記録された展開後サイズで判定します。
///
/// # 使用例
///
/// ```rust
/// use xlsxcsv::{ConverterBuilder, SecurityConfig};
///
/// # fn main() -> Result<(), xlsxcsv::XlsxToCsvError> {
/// let converter = ConverterBuilder::new()
///     .with_security_config(SecurityConfig {
///         max_input_file_size: 10 * 1024 * 1024,
///         ..SecurityConfig::default()
///     })
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityConfig {
    /// 展開後の最大合計サイズ（バイト）
    /// デフォルト: 1GB (1_073_741_824 bytes)
    pub max_decompressed_size: u64,
    /// ZIPアーカイブ内の最大ファイル数
    /// デフォルト: 10000
    pub max_file_count: usize,
    /// 単一エントリの最大展開後サイズ（バイト）
    /// デフォルト: 100MB (104_857_600 bytes)
    pub max_file_size: u64,
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 2GB (2_147_483_648 bytes)
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_decompressed_size: 1_073_741_824, // 1GB
            max_file_count: 10_000,
            max_file_size: 104_857_600,         // 100MB
            max_input_file_size: 2_147_483_648, // 2GB
        }
    }
}

impl SecurityConfig {
    /// 設定値の整合性を検証する
    ///
    /// `ConverterBuilder::build()`から呼び出されます。
    pub(crate) fn validate(&self) -> Result<(), XlsxToCsvError> {
        if self.max_input_file_size == 0
            || self.max_file_count == 0
            || self.max_file_size == 0
            || self.max_decompressed_size == 0
        {
            return Err(XlsxToCsvError::Config(
                "Security limits must be greater than zero".to_string(),
            ));
        }

        if self.max_file_size > self.max_decompressed_size {
            return Err(XlsxToCsvError::Config(format!(
                "max_file_size ({}) exceeds max_decompressed_size ({})",
                self.max_file_size, self.max_decompressed_size
            )));
        }

        Ok(())
    }

    /// 入力サイズの上限チェック
    pub(crate) fn check_input_size(&self, size: u64) -> Result<(), XlsxToCsvError> {
        if size > self.max_input_file_size {
            return Err(XlsxToCsvError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                size, self.max_input_file_size
            )));
        }
        Ok(())
    }

    /// ZIPアーカイブ全体の検査
    ///
    /// エントリ数、各エントリのパス、展開後サイズ（単体・合計）を検証します。
    /// XMLを1バイトも読む前に呼び出すこと。
    pub(crate) fn check_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
    ) -> Result<(), XlsxToCsvError> {
        if archive.len() > self.max_file_count {
            return Err(XlsxToCsvError::SecurityViolation(format!(
                "ZIP archive contains too many files: {} (max: {})",
                archive.len(),
                self.max_file_count
            )));
        }

        let mut total_decompressed_size = 0u64;
        for i in 0..archive.len() {
            let file = archive.by_index(i)?;

            let file_name = file.name();
            validate_zip_path(file_name).map_err(|e| {
                XlsxToCsvError::SecurityViolation(format!("Invalid ZIP path: {}", e))
            })?;

            let file_size = file.size();
            if file_size > self.max_file_size {
                return Err(XlsxToCsvError::SecurityViolation(format!(
                    "File '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                    file_name, file_size, self.max_file_size
                )));
            }

            total_decompressed_size =
                total_decompressed_size
                    .checked_add(file_size)
                    .ok_or_else(|| {
                        XlsxToCsvError::SecurityViolation(
                            "Total decompressed size calculation overflow".to_string(),
                        )
                    })?;

            if total_decompressed_size > self.max_decompressed_size {
                return Err(XlsxToCsvError::SecurityViolation(format!(
                    "Total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                    total_decompressed_size, self.max_decompressed_size
                )));
            }
        }

        Ok(())
    }
}

/// ZIPエントリパスの検証
///
/// パストラバーサル攻撃を防ぐため、ファイルパスを検証します。
///
/// # 戻り値
///
/// * `Ok(())` - パスが安全な場合
/// * `Err(String)` - パスが危険な場合（`..`や絶対パスを含む）
pub(crate) fn validate_zip_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    // Windows形式の`C:\`やUnix形式の`/`で始まるパス
    if path.starts_with('/') || path.get(1..3) == Some(":\\") {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    if path.split('/').any(|segment| segment == "..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    Ok(())
}
