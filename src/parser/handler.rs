//! Sheet Contents Handler Module
//!
//! ワークシートの読み込み結果を受け取るコールバックを定義します。

use crate::error::XlsxToCsvError;
use crate::parser::styles::CellStyle;
use crate::types::CellRef;

/// ワークシートの内容を受け取るハンドラー
///
/// `SpreadsheetPackage::read_sheet`はワークシートXMLを先頭から読み進めながら、
/// 行の開始・セル・行の終了をこの順に通知します。
///
/// # 呼び出し順序
///
/// ```text
/// start_row(0) -> cell(A1) -> cell(B1) -> end_row(0) -> start_row(1) -> ...
/// ```
///
/// いずれかのメソッドが`Err`を返すと、読み込みはその時点で中断されます。
///
/// # 使用例
///
/// ```rust
/// use xlsxcsv::{CellRef, CellStyle, SheetContentsHandler, XlsxToCsvError};
///
/// #[derive(Default)]
/// struct CellCounter {
///     cells: usize,
/// }
///
/// impl SheetContentsHandler for CellCounter {
///     fn start_row(&mut self, _row: u32) -> Result<(), XlsxToCsvError> {
///         Ok(())
///     }
///
///     fn cell(
///         &mut self,
///         _reference: CellRef,
///         _formatted_value: &str,
///         _style: Option<&CellStyle<'_>>,
///     ) -> Result<(), XlsxToCsvError> {
///         self.cells += 1;
///         Ok(())
///     }
///
///     fn end_row(&mut self, _row: u32) -> Result<(), XlsxToCsvError> {
///         Ok(())
///     }
/// }
/// ```
pub trait SheetContentsHandler {
    /// 行の開始（`row`は0始まり）
    fn start_row(&mut self, row: u32) -> Result<(), XlsxToCsvError>;

    /// セルの値（書式適用済みの表示文字列）
    ///
    /// 値を持たないセルは通知されません。
    /// 欠落列の補完が有効な場合、補完されたセルは空文字列・スタイルなしで通知されます。
    fn cell(
        &mut self,
        reference: CellRef,
        formatted_value: &str,
        style: Option<&CellStyle<'_>>,
    ) -> Result<(), XlsxToCsvError>;

    /// 行の終了
    fn end_row(&mut self, row: u32) -> Result<(), XlsxToCsvError>;

    /// ヘッダー・フッター（`tag_name`は`oddHeader`など要素名）
    fn header_footer(
        &mut self,
        _text: &str,
        _is_header: bool,
        _tag_name: &str,
    ) -> Result<(), XlsxToCsvError> {
        Ok(())
    }
}
