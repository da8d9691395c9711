//! Public API Types
//!
//! 公開APIで使用する列挙型と変換結果を定義するモジュール。

/// 数式セルの出力モード
///
/// 数式を持つセルをCSVに書き出す際の出力方法を指定します。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum FormulaMode {
    /// キャッシュされた結果値を出力（デフォルト）
    ///
    /// 例: `=SUM(A1:A10)` → `100`
    #[default]
    CachedValue,

    /// 数式文字列を出力
    ///
    /// `<f>`要素の文字列をそのまま出力します（先頭の`=`は付きません）。
    /// 例: `=SUM(A1:A10)` → `SUM(A1:A10)`
    Formula,
}

/// 変換結果の概要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    /// 変換したワークシートの名前
    pub sheet_name: String,
    /// 書き出した行数
    pub rows: usize,
}
