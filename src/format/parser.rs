//! FormatParser Module
//!
//! Excel Number Format Stringの構文解析と適用を提供します。

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use super::general::{format_general, round_half_up};
use super::sections::{FormatSection, SectionKind};
use super::tokens::FormatToken;

/// Excelが扱える最大のシリアル値（10000-01-01）
const MAX_DATE_SERIAL: f64 = 2_958_466.0;

/// 1日の秒数
const SECONDS_PER_DAY: i64 = 86_400;

/// 数値書式の領域（整数部、小数部、指数部）
const INT_REGION: usize = 0;
const FRAC_REGION: usize = 1;
const EXP_REGION: usize = 2;

/// Number Format Stringパーサー
///
/// Excel Number Format Stringを解析し、数値をフォーマットします。
/// 解析は失敗しません。解釈できない文字はリテラルとして扱います。
#[derive(Debug, Clone)]
pub(crate) struct FormatParser {
    /// パースされたセクション
    sections: Vec<FormatSection>,
}

impl FormatParser {
    /// フォーマット文字列をパース
    ///
    /// # 引数
    ///
    /// * `format_string` - Excel Number Format String
    pub fn parse(format_string: &str) -> Self {
        if format_string.trim().is_empty() {
            let mut section = FormatSection::new(SectionKind::Positive);
            section.tokens.push(FormatToken::General);
            return Self {
                sections: vec![section],
            };
        }

        let sections = Self::split_sections(format_string)
            .iter()
            .zip([
                SectionKind::Positive,
                SectionKind::Negative,
                SectionKind::Zero,
                SectionKind::Text,
            ])
            .map(|(section_str, kind)| Self::parse_section(section_str, kind))
            .collect();

        Self { sections }
    }

    /// セクションに分割
    ///
    /// Excel Number Format Stringは';'でセクションに分割されます。
    /// 引用符、'['と']'で囲まれた部分、'\\'でエスケープされた文字は除外します。
    fn split_sections(format_string: &str) -> Vec<String> {
        let mut sections = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut in_brackets = false;
        let mut escaped = false;

        for ch in format_string.chars() {
            if escaped {
                current.push(ch);
                escaped = false;
                continue;
            }

            match ch {
                '\\' if !in_quotes => {
                    escaped = true;
                    current.push(ch);
                }
                '"' => {
                    in_quotes = !in_quotes;
                    current.push(ch);
                }
                '[' if !in_quotes => {
                    in_brackets = true;
                    current.push(ch);
                }
                ']' if !in_quotes => {
                    in_brackets = false;
                    current.push(ch);
                }
                ';' if !in_quotes && !in_brackets => {
                    sections.push(std::mem::take(&mut current));
                }
                _ => current.push(ch),
            }
        }

        sections.push(current);
        sections
    }

    /// セクションをパース
    ///
    /// # 引数
    ///
    /// * `section_str` - セクション文字列
    /// * `kind` - セクションの種類
    fn parse_section(section_str: &str, kind: SectionKind) -> FormatSection {
        let mut section = FormatSection::new(kind);
        let chars: Vec<char> = section_str.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];
            match ch {
                '"' => {
                    let end = chars[i + 1..]
                        .iter()
                        .position(|&c| c == '"')
                        .map_or(chars.len(), |p| i + 1 + p);
                    let literal: String = chars[i + 1..end].iter().collect();
                    section.push_literal(&literal);
                    i = end + 1;
                }
                '\\' => {
                    if let Some(&next) = chars.get(i + 1) {
                        section.push_literal(&next.to_string());
                    }
                    i += 2;
                }
                // "_x"は文字xの幅の空白
                '_' => {
                    if i + 1 < chars.len() {
                        section.push_literal(" ");
                    }
                    i += 2;
                }
                // "*x"は繰り返し文字。CSVでは幅の概念がないため無視
                '*' => i += 2,
                '[' => match chars[i + 1..].iter().position(|&c| c == ']') {
                    Some(p) => {
                        let content: String = chars[i + 1..i + 1 + p].iter().collect();
                        Self::parse_bracket(&content, &mut section);
                        i += p + 2;
                    }
                    None => {
                        section.push_literal("[");
                        i += 1;
                    }
                },
                '@' => {
                    section.tokens.push(FormatToken::TextPlaceholder);
                    i += 1;
                }
                '0' | '#' | '?' => {
                    let count = Self::run_length(&chars, i, ch);
                    section.tokens.push(match ch {
                        '0' => FormatToken::DigitZero(count),
                        '#' => FormatToken::DigitHash(count),
                        _ => FormatToken::DigitSpace(count),
                    });
                    i += count;
                }
                '.' => {
                    section.tokens.push(FormatToken::DecimalPoint);
                    i += 1;
                }
                ',' => {
                    section.tokens.push(FormatToken::ThousandSeparator);
                    i += 1;
                }
                '%' => {
                    section.tokens.push(FormatToken::Percent);
                    i += 1;
                }
                'E' | 'e' if matches!(chars.get(i + 1), Some('+') | Some('-')) => {
                    section.tokens.push(FormatToken::Exponent {
                        show_plus: chars[i + 1] == '+',
                    });
                    i += 2;
                }
                'G' | 'g' if Self::matches_at(&chars, i, "general") => {
                    section.tokens.push(FormatToken::General);
                    i += "general".len();
                }
                'A' | 'a' if Self::matches_at(&chars, i, "am/pm") => {
                    section.tokens.push(FormatToken::AmPm {
                        short: false,
                        lowercase: ch == 'a',
                    });
                    i += "am/pm".len();
                }
                'A' | 'a' if Self::matches_at(&chars, i, "a/p") => {
                    section.tokens.push(FormatToken::AmPm {
                        short: true,
                        lowercase: ch == 'a',
                    });
                    i += "a/p".len();
                }
                'y' | 'Y' | 'm' | 'M' | 'd' | 'D' | 'h' | 'H' | 's' | 'S' => {
                    let count = Self::run_length(&chars, i, ch);
                    section.tokens.push(match ch.to_ascii_lowercase() {
                        'y' => FormatToken::Year(count),
                        'm' => FormatToken::Month(count),
                        'd' => FormatToken::Day(count),
                        'h' => FormatToken::Hour(count),
                        _ => FormatToken::Second(count),
                    });
                    i += count;
                }
                _ => {
                    section.push_literal(&ch.to_string());
                    i += 1;
                }
            }
        }

        Self::resolve_minutes(&mut section.tokens);
        section
    }

    /// 角括弧の中身を解釈
    ///
    /// - `[h]`, `[mm]`, `[ss]`: 経過時間
    /// - `[$€-407]`: 通貨記号（ロケール部分は捨てる）
    /// - `[Red]`, `[Color10]`: 色指定
    /// - `[>100]`などの条件は無視
    fn parse_bracket(content: &str, section: &mut FormatSection) {
        let lower = content.to_ascii_lowercase();
        let uniform = |c: char| !lower.is_empty() && lower.chars().all(|x| x == c);

        if uniform('h') {
            section.tokens.push(FormatToken::ElapsedHours(lower.len()));
        } else if uniform('m') {
            section.tokens.push(FormatToken::ElapsedMinutes(lower.len()));
        } else if uniform('s') {
            section.tokens.push(FormatToken::ElapsedSeconds(lower.len()));
        } else if let Some(rest) = content.strip_prefix('$') {
            let symbol = rest.find('-').map_or(rest, |p| &rest[..p]);
            section.push_literal(symbol);
        } else if content.starts_with(|c: char| c.is_ascii_alphabetic()) {
            section.tokens.push(FormatToken::Color(content.to_string()));
        }
    }

    /// `m`/`mm`を文脈に応じて分に置き換える
    ///
    /// 直前の日時トークンが時、または直後の日時トークンが秒の場合は分。
    fn resolve_minutes(tokens: &mut [FormatToken]) {
        for i in 0..tokens.len() {
            let count = match tokens[i] {
                FormatToken::Month(count) if count <= 2 => count,
                _ => continue,
            };

            let after_hour = matches!(
                tokens[..i].iter().rev().find(|t| t.is_datetime()),
                Some(FormatToken::Hour(_)) | Some(FormatToken::ElapsedHours(_))
            );
            let before_second = matches!(
                tokens[i + 1..].iter().find(|t| t.is_datetime()),
                Some(FormatToken::Second(_)) | Some(FormatToken::ElapsedSeconds(_))
            );

            if after_hour || before_second {
                tokens[i] = FormatToken::Minute(count);
            }
        }
    }

    /// 同じ文字（大文字・小文字を区別しない）の連続数
    fn run_length(chars: &[char], start: usize, target: char) -> usize {
        chars[start..]
            .iter()
            .take_while(|c| c.eq_ignore_ascii_case(&target))
            .count()
    }

    /// 位置`start`から`pattern`（小文字）が始まるかどうか
    fn matches_at(chars: &[char], start: usize, pattern: &str) -> bool {
        let len = pattern.chars().count();
        chars.len() >= start + len
            && chars[start..start + len]
                .iter()
                .zip(pattern.chars())
                .all(|(c, p)| c.to_ascii_lowercase() == p)
    }

    /// 数値をフォーマット
    ///
    /// # 引数
    ///
    /// * `value` - フォーマットする数値
    /// * `date1904` - ブックが1904年日付システムを使用しているか
    ///
    /// 日付として表示できない値（負数、範囲外）は標準書式で出力します。
    pub fn format_number(&self, value: f64, date1904: bool) -> String {
        if !value.is_finite() {
            return format_general(value);
        }

        let (section, explicit_negative) = self.select_section(value);

        if section.is_datetime() {
            if value < 0.0 {
                return format_general(value);
            }
            return Self::format_datetime(value, section, date1904)
                .unwrap_or_else(|| format_general(value));
        }

        if section.is_fraction() {
            return format_general(value);
        }

        if section.is_numeric() {
            Self::format_numeric(value, section, explicit_negative)
        } else {
            Self::format_plain(value, section, explicit_negative)
        }
    }

    /// 値に応じてセクションを選択
    ///
    /// 戻り値の`bool`は負数専用セクションが選ばれたかどうか。
    /// その場合、符号はセクション側のリテラルに任せます。
    fn select_section(&self, value: f64) -> (&FormatSection, bool) {
        let numeric_sections = self.sections.len().min(3);

        if value < 0.0 && numeric_sections >= 2 {
            (&self.sections[1], true)
        } else if value == 0.0 && numeric_sections >= 3 {
            (&self.sections[2], false)
        } else {
            (&self.sections[0], false)
        }
    }

    /// 日付・時刻をフォーマット
    ///
    /// 変換できない場合は`None`を返します。
    fn format_datetime(value: f64, section: &FormatSection, date1904: bool) -> Option<String> {
        let subsecond_digits = section.subsecond_digits();
        let datetime = serial_to_datetime(value, date1904, subsecond_digits)?;
        let twelve_hour = section.uses_12_hour();
        let total_seconds = (value * SECONDS_PER_DAY as f64).round() as i64;

        let pad = |number: i64, count: usize| {
            if count >= 2 {
                format!("{:0width$}", number, width = count)
            } else {
                number.to_string()
            }
        };

        let mut result = String::new();
        let mut tokens = section.tokens.iter().peekable();
        while let Some(token) = tokens.next() {
            match token {
                FormatToken::Year(count) => {
                    if *count <= 2 {
                        result.push_str(&format!("{:02}", datetime.year() % 100));
                    } else {
                        result.push_str(&format!("{:04}", datetime.year()));
                    }
                }
                FormatToken::Month(count) => match *count {
                    1 | 2 => result.push_str(&pad(datetime.month() as i64, *count)),
                    3 => result.push_str(&datetime.format("%b").to_string()),
                    4 => result.push_str(&datetime.format("%B").to_string()),
                    _ => result.extend(datetime.format("%B").to_string().chars().take(1)),
                },
                FormatToken::Day(count) => match *count {
                    1 | 2 => result.push_str(&pad(datetime.day() as i64, *count)),
                    3 => result.push_str(&datetime.format("%a").to_string()),
                    _ => result.push_str(&datetime.format("%A").to_string()),
                },
                FormatToken::Hour(count) => {
                    let hour = if twelve_hour {
                        match datetime.hour() % 12 {
                            0 => 12,
                            h => h,
                        }
                    } else {
                        datetime.hour()
                    };
                    result.push_str(&pad(hour as i64, *count));
                }
                FormatToken::Minute(count) => {
                    result.push_str(&pad(datetime.minute() as i64, *count));
                }
                FormatToken::Second(count) => {
                    result.push_str(&pad(datetime.second() as i64, *count));
                }
                FormatToken::ElapsedHours(count) => {
                    result.push_str(&pad(total_seconds / 3600, *count));
                }
                FormatToken::ElapsedMinutes(count) => {
                    result.push_str(&pad(total_seconds / 60, *count));
                }
                FormatToken::ElapsedSeconds(count) => {
                    result.push_str(&pad(total_seconds, *count));
                }
                FormatToken::AmPm { short, lowercase } => {
                    let marker = match (*short, datetime.hour() >= 12) {
                        (false, false) => "AM",
                        (false, true) => "PM",
                        (true, false) => "A",
                        (true, true) => "P",
                    };
                    if *lowercase {
                        result.push_str(&marker.to_ascii_lowercase());
                    } else {
                        result.push_str(marker);
                    }
                }
                FormatToken::DecimalPoint => {
                    result.push('.');
                    if subsecond_digits > 0 {
                        if let Some(FormatToken::DigitZero(_)) = tokens.peek() {
                            tokens.next();
                            let fraction =
                                datetime.nanosecond() / 10u32.pow(9 - subsecond_digits as u32);
                            result.push_str(&format!(
                                "{:0width$}",
                                fraction,
                                width = subsecond_digits
                            ));
                        }
                    }
                }
                FormatToken::ThousandSeparator => result.push(','),
                FormatToken::Percent => result.push('%'),
                FormatToken::Literal(s) => result.push_str(s),
                _ => {}
            }
        }

        Some(result)
    }

    /// 数値プレースホルダーを含むセクションをフォーマット
    fn format_numeric(value: f64, section: &FormatSection, explicit_negative: bool) -> String {
        let tokens = &section.tokens;
        let exponent_pos = tokens
            .iter()
            .position(|t| matches!(t, FormatToken::Exponent { .. }));
        let mantissa_end = exponent_pos.unwrap_or(tokens.len());
        let mantissa = &tokens[..mantissa_end];
        let point_pos = mantissa
            .iter()
            .position(|t| *t == FormatToken::DecimalPoint);

        let int_tokens = &mantissa[..point_pos.unwrap_or(mantissa_end)];
        let int_spec = DigitSpec::from_tokens(int_tokens);
        let frac_spec = match point_pos {
            Some(p) => DigitSpec::from_tokens(&mantissa[p + 1..]),
            None => DigitSpec::default(),
        };

        let percent_count = tokens
            .iter()
            .filter(|t| **t == FormatToken::Percent)
            .count();
        let magnitude = value.abs() * 100f64.powi(percent_count as i32);

        let (int_digits, frac_digits, exp_sign, exp_digits) = match exponent_pos {
            Some(pos) => {
                let exp_spec = DigitSpec::from_tokens(&tokens[pos + 1..]);
                let show_plus = matches!(tokens[pos], FormatToken::Exponent { show_plus: true });
                let (int_digits, frac_digits, exponent) =
                    scientific_parts(magnitude, &int_spec, &frac_spec);
                let exp_sign = if exponent < 0 {
                    "-"
                } else if show_plus {
                    "+"
                } else {
                    ""
                };
                let exp_digits = format!(
                    "{:0width$}",
                    exponent.abs(),
                    width = exp_spec.required.max(1)
                );
                (int_digits, frac_digits, exp_sign, exp_digits)
            }
            None => {
                let scaling = trailing_separators(mantissa);
                let scaled = magnitude / 1000f64.powi(scaling as i32);
                let (int_digits, frac_digits) = round_half_up(scaled, frac_spec.total);
                (int_digits, frac_digits, "", String::new())
            }
        };

        let all_zero = int_digits
            .bytes()
            .chain(frac_digits.bytes())
            .all(|b| b == b'0');
        let negative = value < 0.0 && !explicit_negative && !all_zero;

        let int_chunks = split_into_runs(&int_spec.shape_integer(&int_digits), int_tokens);
        let parts = [
            String::new(),
            frac_spec.shape_fraction(&frac_digits),
            exp_digits,
        ];

        let mut result = String::new();
        if negative {
            result.push('-');
        }

        let mut region = INT_REGION;
        let mut emitted = [false; 3];
        let mut int_run = 0;
        for token in tokens {
            match token {
                t if t.is_digit() && region == INT_REGION => {
                    if !emitted[INT_REGION] {
                        if let Some(chunk) = int_chunks.get(int_run) {
                            result.push_str(chunk);
                        }
                        emitted[INT_REGION] = true;
                    }
                }
                t if t.is_digit() => {
                    if !emitted[region] {
                        result.push_str(&parts[region]);
                        emitted[region] = true;
                    }
                }
                FormatToken::Literal(s) if region == INT_REGION => {
                    // リテラルで区切られた整数部（"000-0000"）は次の桁グループへ
                    if emitted[INT_REGION] {
                        int_run += 1;
                        emitted[INT_REGION] = false;
                    }
                    result.push_str(s);
                }
                FormatToken::DecimalPoint => {
                    if region == INT_REGION {
                        region = FRAC_REGION;
                    }
                    result.push('.');
                }
                FormatToken::Exponent { .. } => {
                    region = EXP_REGION;
                    result.push('E');
                    result.push_str(exp_sign);
                }
                FormatToken::Percent => result.push('%'),
                FormatToken::Literal(s) => result.push_str(s),
                _ => {}
            }
        }

        result
    }

    /// 数値プレースホルダーを含まないセクション（"General", "@", リテラルのみ）
    fn format_plain(value: f64, section: &FormatSection, explicit_negative: bool) -> String {
        let shown = if explicit_negative { value.abs() } else { value };
        let mut result = String::new();
        for token in &section.tokens {
            match token {
                FormatToken::Literal(s) => result.push_str(s),
                FormatToken::General | FormatToken::TextPlaceholder => {
                    result.push_str(&format_general(shown));
                }
                FormatToken::Percent => result.push('%'),
                _ => {}
            }
        }
        result
    }
}

/// 整数部・小数部・指数部それぞれのプレースホルダー構成
#[derive(Debug, Default, Clone, Copy)]
struct DigitSpec {
    /// "0"の数
    required: usize,
    /// "?"の数
    spaces: usize,
    /// プレースホルダーの総数
    total: usize,
    /// 千の位区切りを表示するか
    grouping: bool,
}

impl DigitSpec {
    fn from_tokens(tokens: &[FormatToken]) -> Self {
        let mut spec = Self::default();
        let last_digit = tokens.iter().rposition(|t| t.is_digit());

        for (idx, token) in tokens.iter().enumerate() {
            match token {
                FormatToken::DigitZero(n) => {
                    spec.required += n;
                    spec.total += n;
                }
                FormatToken::DigitHash(n) => spec.total += n,
                FormatToken::DigitSpace(n) => {
                    spec.spaces += n;
                    spec.total += n;
                }
                FormatToken::ThousandSeparator => {
                    if last_digit.is_some_and(|last| idx < last) {
                        spec.grouping = true;
                    }
                }
                _ => {}
            }
        }

        spec
    }

    /// 整数部: 先頭の0を除去し、必須桁まで0埋め、区切りを挿入、"?"分を空白埋め
    fn shape_integer(&self, digits: &str) -> String {
        let trimmed = digits.trim_start_matches('0');
        let mut shaped = String::with_capacity(self.total.max(trimmed.len()));
        for _ in trimmed.len()..self.required {
            shaped.push('0');
        }
        shaped.push_str(trimmed);

        if self.grouping {
            shaped = add_thousand_separators(&shaped);
        }

        let width = self.required + self.spaces;
        let digit_count = shaped.chars().filter(|c| c.is_ascii_digit()).count();
        if digit_count < width {
            shaped.insert_str(0, &" ".repeat(width - digit_count));
        }
        shaped
    }

    /// 小数部: 末尾の0を任意桁から除去（"?"の位置は空白に置換）
    fn shape_fraction(&self, digits: &str) -> String {
        let mut chars: Vec<char> = digits.chars().collect();
        let mut idx = chars.len();
        while idx > self.required && chars[idx - 1] == '0' {
            if idx <= self.required + self.spaces {
                chars[idx - 1] = ' ';
            } else {
                chars.pop();
            }
            idx -= 1;
        }
        chars.into_iter().collect()
    }
}

/// 指数表記の仮数部（整数部・小数部）と指数を計算
///
/// 整数部に"#"を含む場合（"##0.0E+0"）は指数を整数部の桁数の倍数に揃えます。
fn scientific_parts(
    magnitude: f64,
    int_spec: &DigitSpec,
    frac_spec: &DigitSpec,
) -> (String, String, i32) {
    if magnitude == 0.0 {
        let (int_digits, frac_digits) = round_half_up(0.0, frac_spec.total);
        return (int_digits, frac_digits, 0);
    }

    let int_places = int_spec.total.max(1) as i32;
    let engineering = int_places > 1 && int_spec.required < int_spec.total;
    let step = if engineering { int_places } else { 1 };

    let mut exponent = magnitude.log10().floor() as i32;
    exponent -= if engineering {
        exponent.rem_euclid(int_places)
    } else {
        int_places - 1
    };

    let (mut int_digits, mut frac_digits) =
        round_half_up(magnitude / 10f64.powi(exponent), frac_spec.total);
    if int_digits.len() > int_places as usize {
        exponent += step;
        let rounded = round_half_up(magnitude / 10f64.powi(exponent), frac_spec.total);
        int_digits = rounded.0;
        frac_digits = rounded.1;
    }

    (int_digits, frac_digits, exponent)
}

/// 仮数部末尾の","の数（1つにつき1000分の1）
fn trailing_separators(mantissa: &[FormatToken]) -> usize {
    let last_digit = mantissa.iter().rposition(|t| t.is_digit());
    match last_digit {
        Some(last) => mantissa[last + 1..]
            .iter()
            .filter(|t| **t == FormatToken::ThousandSeparator)
            .count(),
        None => 0,
    }
}

/// 整数部の文字列を、リテラルで区切られた桁グループに右から割り当てる
///
/// 先頭のグループは桁数を超えた分も含めてすべて受け取ります。
fn split_into_runs(text: &str, int_tokens: &[FormatToken]) -> Vec<String> {
    let mut runs = Vec::new();
    let mut width = 0;
    for token in int_tokens {
        match token {
            FormatToken::DigitZero(n) | FormatToken::DigitHash(n) | FormatToken::DigitSpace(n) => {
                width += n;
            }
            FormatToken::Literal(_) if width > 0 => runs.push(std::mem::take(&mut width)),
            _ => {}
        }
    }
    if width > 0 {
        runs.push(width);
    }

    if runs.len() <= 1 {
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    let mut chunks = vec![String::new(); runs.len()];
    let mut end = chars.len();
    for k in (1..runs.len()).rev() {
        let start = end.saturating_sub(runs[k]);
        chunks[k] = chars[start..end].iter().collect();
        end = start;
    }
    chunks[0] = chars[..end].iter().collect();
    chunks
}

/// 千の位区切りを追加
fn add_thousand_separators(s: &str) -> String {
    let len = s.len();
    let mut result = String::with_capacity(len + len / 3);
    for (i, ch) in s.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result
}

/// Excelシリアル値を日時に変換
///
/// - 1900年日付システム: 1 = 1900-01-01。60以下は1899-12-31起点、61以上は1899-12-30起点
///   （存在しない1900-02-29を挟むため）。60は1900-03-01になります
/// - 1904年日付システム: 0 = 1904-01-01
///
/// 時刻は`subsecond_digits`桁の秒精度で四捨五入します。
/// 負数、有限でない値、9999-12-31を超える値は`None`。
pub(crate) fn serial_to_datetime(
    value: f64,
    date1904: bool,
    subsecond_digits: usize,
) -> Option<NaiveDateTime> {
    if !value.is_finite() || value < 0.0 || value >= MAX_DATE_SERIAL {
        return None;
    }

    let scale = 10i64.pow(subsecond_digits as u32);
    let units_per_day = SECONDS_PER_DAY * scale;
    let total = (value * units_per_day as f64).round() as i64;
    let days = total / units_per_day;
    let remainder = total % units_per_day;

    let base = if date1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?
    } else if days < 61 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };

    let date = base.checked_add_days(Days::new(days as u64))?;
    let seconds = (remainder / scale) as u32;
    let nanos = ((remainder % scale) * 10i64.pow(9 - subsecond_digits as u32)) as u32;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos)?;

    Some(NaiveDateTime::new(date, time))
}
