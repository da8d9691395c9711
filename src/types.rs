//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use std::fmt;

/// ワークシートの最大行数（1,048,576行）
pub const MAX_ROWS: u32 = 1_048_576;

/// ワークシートの最大列数（XFD列 = 16,384列）
pub const MAX_COLUMNS: u32 = 16_384;

/// セル参照（0始まり）
///
/// ワークシートXMLの`r`属性（A1記法）と相互変換できます。
///
/// # 使用例
///
/// ```rust
/// use xlsxcsv::CellRef;
///
/// let cell = CellRef::parse("AB12").unwrap();
/// assert_eq!(cell, CellRef::new(11, 27));
/// assert_eq!(cell.to_string(), "AB12");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    /// 行インデックス（0始まり）
    pub row: u32,
    /// 列インデックス（0始まり）
    pub col: u32,
}

impl CellRef {
    /// 新しいセル参照を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1記法の文字列を解析する（例: "A1" -> (0, 0)）
    ///
    /// 列文字は大文字・小文字を区別しません。`$`による絶対参照記号は無視します。
    /// 列または行が欠落している場合、行番号が0の場合、
    /// ワークシートの範囲（XFD1048576）を超える場合は`None`を返します。
    pub fn parse(reference: &str) -> Option<Self> {
        let reference = reference.trim().trim_start_matches('$');
        let split = reference
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(reference.len());
        let (letters, digits) = reference.split_at(split);
        let digits = digits.trim_start_matches('$');

        if letters.is_empty() || digits.is_empty() {
            return None;
        }

        let col = column_index(letters)?;
        let row = digits.parse::<u32>().ok()?.checked_sub(1)?;

        let cell = Self { row, col };
        cell.is_in_sheet().then_some(cell)
    }

    /// ワークシートの範囲内（A1〜XFD1048576）か
    pub fn is_in_sheet(&self) -> bool {
        self.row < MAX_ROWS && self.col < MAX_COLUMNS
    }

    /// 列名を取得（0 -> "A", 25 -> "Z", 26 -> "AA"）
    pub fn column_name(&self) -> String {
        column_name(self.col)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row as u64 + 1)
    }
}

/// 列文字（"A", "AB"など）を0始まりの列インデックスに変換
///
/// 列文字以外が含まれる場合、またはu32の範囲を超える場合は`None`を返します。
pub(crate) fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }

    let mut col: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
    }

    Some(col - 1)
}

/// 0始まりの列インデックスを列文字に変換
pub(crate) fn column_name(mut col: u32) -> String {
    let mut result = String::new();
    loop {
        let remainder = col % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result
}
