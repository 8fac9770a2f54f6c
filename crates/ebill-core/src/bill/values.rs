//! Parsing of matched text into typed field values.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Parse a money amount such as "¥1,234.56" or "1 234.56元".
///
/// Currency symbols, thousands separators and spaces are dropped.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .trim()
        .trim_end_matches('元')
        .chars()
        .filter(|c| !matches!(c, '¥' | '￥' | ',' | '，' | ' ' | '\u{00a0}'))
        .collect();

    parse_decimal(&cleaned)
}

/// Parse a plain decimal quantity such as "1234.5" or "-12".
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() || !s.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    Decimal::from_str(s).ok()
}

/// Parse a bill date into a calendar date.
///
/// Accepts `YYYYMMDD`, `YYYY-MM-DD`, `YYYY/MM/DD` and `YYYY年M月D日`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    if s.len() == 8 && s.chars().all(|c| c.is_ascii_digit()) {
        let year: i32 = s[0..4].parse().ok()?;
        let month: u32 = s[4..6].parse().ok()?;
        let day: u32 = s[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    ["%Y-%m-%d", "%Y/%m/%d", "%Y年%m月%d日"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
}

/// Collapse an identifier broken by whitespace or line breaks.
pub fn clean_identifier(s: &str) -> Option<String> {
    let cleaned: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Trim free text.
pub fn clean_text(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("¥12 345.00"), Some(dec("12345.00")));
        assert_eq!(parse_amount("￥88.8元"), Some(dec("88.8")));
        assert_eq!(parse_amount("-3.20"), Some(dec("-3.20")));
        assert_eq!(parse_amount("元"), None);
        assert_eq!(parse_amount("1.2.3"), None);
    }

    #[test]
    fn test_parse_decimal_keeps_scale() {
        assert_eq!(parse_decimal("100.00").unwrap().to_string(), "100.00");
        assert_eq!(parse_decimal("-"), None);
        assert_eq!(parse_decimal(""), None);
    }

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert_eq!(parse_date("20240301"), expected);
        assert_eq!(parse_date("2024-03-01"), expected);
        assert_eq!(parse_date("2024/3/1"), expected);
        assert_eq!(parse_date("2024年3月1日"), expected);
        assert_eq!(parse_date("20241301"), None);
        assert_eq!(parse_date("2024"), None);
    }

    #[test]
    fn test_clean_identifier() {
        assert_eq!(clean_identifier("0300SG\n0012345"), Some("0300SG0012345".to_string()));
        assert_eq!(clean_identifier(" \n"), None);
    }
}
