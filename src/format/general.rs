//! General Format Module
//!
//! Excelの標準書式（General）による数値表示と、10進丸めのヘルパーを提供します。

/// 標準書式で表示する有効桁数
const GENERAL_SIGNIFICANT_DIGITS: i32 = 10;

/// 指数表記に切り替える上限（これ以上は指数表記）
const SCIENTIFIC_UPPER: f64 = 1e11;

/// 指数表記に切り替える下限（これ以下は指数表記）
const SCIENTIFIC_LOWER: f64 = 1e-10;

/// 標準書式（General）で数値を文字列化する
///
/// - 整数値は小数点なしで出力（`30.0` -> `"30"`）
/// - 小数は有効数字10桁に丸め、末尾の0を除去（`0.1 + 0.2` -> `"0.3"`）
/// - 絶対値が1e11以上または1e-10以下の場合は指数表記（`"1.23457E+11"`）
pub(crate) fn format_general(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };

    if abs >= SCIENTIFIC_UPPER || abs <= SCIENTIFIC_LOWER {
        return format!("{}{}", sign, format_general_scientific(abs));
    }

    let magnitude = abs.log10().floor() as i32 + 1;
    let decimals = (GENERAL_SIGNIFICANT_DIGITS - magnitude).max(0) as usize;
    let (int_part, frac_part) = round_half_up(abs, decimals);
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        if int_part.bytes().all(|b| b == b'0') {
            return "0".to_string();
        }
        format!("{}{}", sign, int_part)
    } else {
        format!("{}{}.{}", sign, int_part, frac_part)
    }
}

/// 標準書式の指数表記（仮数部は最大6桁、指数部は2桁以上）
fn format_general_scientific(abs: f64) -> String {
    let mut exponent = abs.log10().floor() as i32;
    let mut mantissa = abs / 10f64.powi(exponent);
    let (mut int_part, mut frac_part) = round_half_up(mantissa, 5);

    // 9.999995 -> 10.00000 のように桁上がりした場合
    if int_part.len() > 1 {
        exponent += 1;
        mantissa = abs / 10f64.powi(exponent);
        let rounded = round_half_up(mantissa, 5);
        int_part = rounded.0;
        frac_part = rounded.1;
    }

    let frac_part = frac_part.trim_end_matches('0');
    let exp_sign = if exponent < 0 { '-' } else { '+' };
    if frac_part.is_empty() {
        format!("{}E{}{:02}", int_part, exp_sign, exponent.abs())
    } else {
        format!("{}.{}E{}{:02}", int_part, frac_part, exp_sign, exponent.abs())
    }
}

/// 絶対値を小数点以下`decimals`桁で四捨五入し、整数部と小数部の数字列を返す
///
/// 2進浮動小数点の誤差を避けるため、最短表現の10進文字列に対して丸めを行います。
/// （`1.005`は`"1"`, `"01"`になります）
pub(crate) fn round_half_up(value: f64, decimals: usize) -> (String, String) {
    let repr = value.abs().to_string();
    let (int_str, frac_str) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    let mut digits: Vec<u8> = int_str.bytes().collect();
    digits.extend(
        frac_str
            .bytes()
            .chain(std::iter::repeat(b'0'))
            .take(decimals),
    );

    let round_up = frac_str
        .as_bytes()
        .get(decimals)
        .is_some_and(|&d| d >= b'5');

    if round_up {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let int_len = digits.len() - decimals;
    let int_part: String = digits[..int_len].iter().map(|&b| b as char).collect();
    let frac_part: String = digits[int_len..].iter().map(|&b| b as char).collect();
    (int_part, frac_part)
}
