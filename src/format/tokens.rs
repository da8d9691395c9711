//! FormatToken Module
//!
//! Excel Number Format Stringのトークン定義を提供します。

/// フォーマットトークン
///
/// Excel Number Format Stringを解析した際に生成されるトークンです。
/// 数値プレースホルダーは整数部・小数部の区別を持たず、
/// `DecimalPoint`と`Exponent`の位置で領域が決まります。
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FormatToken {
    /// "General"（標準書式）
    General,

    /// 年（例: "yyyy" -> 4, "yy" -> 2）
    Year(usize),

    /// 月（"m" -> 1, "mm" -> 2, "mmm" -> 短縮名, "mmmm" -> 完全名, "mmmmm" -> 頭文字）
    Month(usize),

    /// 日（"d" -> 1, "dd" -> 2, "ddd" -> 短縮曜日, "dddd" -> 完全曜日）
    Day(usize),

    /// 時（例: "hh" -> 2桁, "h" -> 1桁）
    Hour(usize),

    /// 分（"h"の直後または"s"の直前にある"m"/"mm"）
    Minute(usize),

    /// 秒（例: "ss" -> 2桁, "s" -> 1桁）
    Second(usize),

    /// 経過時間（例: "[h]"）
    ElapsedHours(usize),

    /// 経過分（例: "[mm]"）
    ElapsedMinutes(usize),

    /// 経過秒（例: "[ss]"）
    ElapsedSeconds(usize),

    /// 午前/午後（"AM/PM" または "A/P"）
    AmPm {
        /// "A/P"形式
        short: bool,
        /// "a/p"のように小文字で指定された
        lowercase: bool,
    },

    /// 必須桁（"0"の連続数）
    DigitZero(usize),

    /// 任意桁（"#"の連続数）
    DigitHash(usize),

    /// 空白埋め桁（"?"の連続数）
    DigitSpace(usize),

    /// 小数点
    DecimalPoint,

    /// 千の位区切り（末尾にある場合は1000分の1スケール）
    ThousandSeparator,

    /// パーセント記号
    Percent,

    /// 指数記号（"E+" / "E-"）
    Exponent {
        /// "E+"の場合は正の指数にも符号を付ける
        show_plus: bool,
    },

    /// リテラル文字列（例: "$", "-", " kg"）
    Literal(String),

    /// 色指定（例: "[Red]"）。出力では無視されます
    Color(String),

    /// テキストプレースホルダー（"@"）
    TextPlaceholder,
}

impl FormatToken {
    /// トークンが日付・時刻関連かどうかを判定
    pub fn is_datetime(&self) -> bool {
        matches!(
            self,
            FormatToken::Year(_)
                | FormatToken::Month(_)
                | FormatToken::Day(_)
                | FormatToken::Hour(_)
                | FormatToken::Minute(_)
                | FormatToken::Second(_)
                | FormatToken::ElapsedHours(_)
                | FormatToken::ElapsedMinutes(_)
                | FormatToken::ElapsedSeconds(_)
                | FormatToken::AmPm { .. }
        )
    }

    /// トークンが数値プレースホルダーかどうかを判定
    pub fn is_digit(&self) -> bool {
        matches!(
            self,
            FormatToken::DigitZero(_) | FormatToken::DigitHash(_) | FormatToken::DigitSpace(_)
        )
    }

    /// トークンが数値書式を構成するかどうかを判定
    pub fn is_numeric(&self) -> bool {
        self.is_digit()
            || matches!(
                self,
                FormatToken::DecimalPoint
                    | FormatToken::ThousandSeparator
                    | FormatToken::Percent
                    | FormatToken::Exponent { .. }
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_datetime() {
        assert!(FormatToken::Year(4).is_datetime());
        assert!(FormatToken::Month(2).is_datetime());
        assert!(FormatToken::Day(2).is_datetime());
        assert!(FormatToken::Hour(2).is_datetime());
        assert!(FormatToken::Minute(2).is_datetime());
        assert!(FormatToken::Second(2).is_datetime());
        assert!(FormatToken::ElapsedHours(1).is_datetime());
        assert!(FormatToken::AmPm {
            short: false,
            lowercase: false
        }
        .is_datetime());
        assert!(!FormatToken::DigitZero(1).is_datetime());
        assert!(!FormatToken::Literal("$".to_string()).is_datetime());
    }

    #[test]
    fn test_is_numeric() {
        assert!(FormatToken::DigitZero(1).is_numeric());
        assert!(FormatToken::DigitHash(1).is_numeric());
        assert!(FormatToken::DigitSpace(2).is_numeric());
        assert!(FormatToken::DecimalPoint.is_numeric());
        assert!(FormatToken::ThousandSeparator.is_numeric());
        assert!(FormatToken::Percent.is_numeric());
        assert!(FormatToken::Exponent { show_plus: true }.is_numeric());
        assert!(!FormatToken::Year(4).is_numeric());
        assert!(!FormatToken::General.is_numeric());
        assert!(!FormatToken::Literal("$".to_string()).is_numeric());
    }

    #[test]
    fn test_is_digit() {
        assert!(FormatToken::DigitHash(3).is_digit());
        assert!(!FormatToken::DecimalPoint.is_digit());
    }
}
