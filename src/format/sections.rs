//! FormatSection Module
//!
//! Excel Number Format Stringのセクション定義を提供します。

use super::tokens::FormatToken;

/// セクションの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SectionKind {
    /// 正数
    Positive,
    /// 負数
    Negative,
    /// ゼロ
    Zero,
    /// テキスト
    Text,
}

/// フォーマットのセクション（正数、負数、ゼロ、テキスト）
///
/// Excel Number Format Stringは最大4つのセクションに分割されます:
/// 1. 正数
/// 2. 負数
/// 3. ゼロ
/// 4. テキスト
#[derive(Debug, Clone)]
pub(crate) struct FormatSection {
    /// セクションの種類
    pub kind: SectionKind,

    /// フォーマットトークン
    pub tokens: Vec<FormatToken>,
}

impl FormatSection {
    /// 新しいセクションを生成
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            tokens: Vec::new(),
        }
    }

    /// リテラルを追加（直前もリテラルなら連結する）
    pub fn push_literal(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(FormatToken::Literal(last)) = self.tokens.last_mut() {
            last.push_str(text);
        } else {
            self.tokens.push(FormatToken::Literal(text.to_string()));
        }
    }

    /// セクションが日付・時刻書式かどうかを判定
    pub fn is_datetime(&self) -> bool {
        self.tokens.iter().any(|t| t.is_datetime())
    }

    /// セクションが数値プレースホルダーを含むかどうかを判定
    pub fn is_numeric(&self) -> bool {
        self.tokens.iter().any(|t| t.is_digit())
    }

    /// 12時間表記（AM/PM）を使用するかどうか
    pub fn uses_12_hour(&self) -> bool {
        self.tokens
            .iter()
            .any(|t| matches!(t, FormatToken::AmPm { .. }))
    }

    /// 秒の小数部の桁数（"ss.000" -> 3）。最大3桁
    pub fn subsecond_digits(&self) -> usize {
        let mut seen_second = false;
        let mut iter = self.tokens.iter().peekable();
        while let Some(token) = iter.next() {
            match token {
                FormatToken::Second(_) | FormatToken::ElapsedSeconds(_) => seen_second = true,
                FormatToken::DecimalPoint if seen_second => {
                    if let Some(FormatToken::DigitZero(n)) = iter.peek() {
                        return (*n).min(3);
                    }
                }
                _ => {}
            }
        }
        0
    }

    /// 分数書式（"# ?/?"など）かどうか
    pub fn is_fraction(&self) -> bool {
        self.tokens
            .iter()
            .any(|t| matches!(t, FormatToken::DigitSpace(_)))
            && self
                .tokens
                .iter()
                .any(|t| matches!(t, FormatToken::Literal(s) if s.contains('/')))
    }
}
