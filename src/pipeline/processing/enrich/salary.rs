use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::pipeline::processing::diagnostics::{Field, FieldError};

static RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d[\d,]*(?:\.\d+)?)\s*-\s*(\d[\d,]*(?:\.\d+)?)").unwrap());
static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").unwrap());
static SYMBOL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d\s,.\-]+").unwrap());
static UP_TO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^up\s+to\s+(\d[\d,]*)\s*(?:ks|kyats?|mmk)?$").unwrap());

/// Textual salary conventions seen across the boards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalaryFormat {
    /// `"5,000-7,000 SGD"` or `"6000 SGD"`: amount token, then currency token
    SpaceSeparated,
    /// `"$5,500 - $6,500"`, `"฿25,000-35,000"`, `"RM 4,500 per month"`
    Symbol,
    /// `"Up to 800,000 Ks"`, `"500,000 - 800,000 Ks"`, `"Negotiable"`
    Kyat,
}

/// Decomposed salary. `avg` is always present; the bounds only when the text gave them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub avg: i64,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub currency: Option<String>,
}

impl SalaryRange {
    fn range(a: i64, b: i64, currency: Option<String>) -> Self {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        Self {
            avg: floor_mean(min, max),
            min: Some(min),
            max: Some(max),
            currency,
        }
    }

    fn exact(value: i64, currency: Option<String>) -> Self {
        Self {
            avg: value,
            min: Some(value),
            max: Some(value),
            currency,
        }
    }
}

fn floor_mean(a: i64, b: i64) -> i64 {
    ((a as i128 + b as i128).div_euclid(2)) as i64
}

/// Literal the boards use instead of a figure
pub fn is_negotiable(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("negotiable")
}

fn is_undisclosed(text: &str) -> bool {
    let t = text.trim();
    t.is_empty() || t.eq_ignore_ascii_case("n/a") || is_negotiable(t)
}

/// Whole units; a decimal fraction ("5,500.00") is truncated
fn parse_amount(raw: &str, input: &str) -> Result<i64, FieldError> {
    let digits: String = raw.chars().filter(|c| *c != ',').collect();
    let digits = match digits.trim().split_once('.') {
        Some((whole, fraction)) if !fraction.is_empty() && fraction.chars().all(|c| c.is_ascii_digit()) => whole,
        Some(_) => return Err(FieldError::new(Field::Salary, input, format!("bad amount '{}'", raw))),
        None => digits.trim(),
    };
    if digits.is_empty() {
        return Err(FieldError::new(Field::Salary, input, "empty amount"));
    }
    digits
        .parse::<i64>()
        .map_err(|e| FieldError::new(Field::Salary, input, format!("bad amount '{}': {}", raw, e)))
}

/// Parse a salary string.
///
/// `Ok(None)` means the board did not disclose a figure (blank, `N/A`,
/// `Negotiable`). `Err` means there was text but it did not fit the
/// board's convention; callers record a diagnostic and treat it as missing.
pub fn parse_salary(
    text: Option<&str>,
    format: SalaryFormat,
    fixed_currency: Option<&str>,
) -> Result<Option<SalaryRange>, FieldError> {
    let text = match text {
        Some(t) if !is_undisclosed(t) => t.trim(),
        _ => return Ok(None),
    };

    let parsed = match format {
        SalaryFormat::SpaceSeparated => parse_space_separated(text, fixed_currency)?,
        SalaryFormat::Symbol => parse_symbol(text, fixed_currency)?,
        SalaryFormat::Kyat => parse_kyat(text, fixed_currency)?,
    };
    Ok(Some(parsed))
}

fn parse_space_separated(text: &str, fixed_currency: Option<&str>) -> Result<SalaryRange, FieldError> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.len() > 2 {
        return Err(FieldError::new(
            Field::Salary,
            text,
            format!("expected '<amount> <currency>', got {} tokens", parts.len()),
        ));
    }

    let currency = parts
        .get(1)
        .map(|c| c.to_string())
        .or_else(|| fixed_currency.map(str::to_string));

    match parts[0].split_once('-') {
        Some((low, high)) => {
            let min = parse_amount(low, text)?;
            let max = parse_amount(high, text)?;
            Ok(SalaryRange::range(min, max, currency))
        }
        None => {
            let value = parse_amount(parts[0], text)?;
            Ok(SalaryRange {
                avg: value,
                min: None,
                max: None,
                currency,
            })
        }
    }
}

fn clean_dashes(text: &str) -> String {
    text.replace(['\u{2013}', '\u{2014}'], "-").replace('\u{a0}', " ")
}

fn parse_symbol(text: &str, fixed_currency: Option<&str>) -> Result<SalaryRange, FieldError> {
    let cleaned = clean_dashes(text);
    let currency = fixed_currency
        .map(str::to_string)
        .or_else(|| SYMBOL_RE.find(&cleaned).map(|m| m.as_str().to_string()));

    // Symbols sit between the dash and the second amount ("$5,500 - $6,500")
    let numeric: String = cleaned
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-' | ' '))
        .collect();

    if let Some(caps) = RANGE_RE.captures(&numeric) {
        let min = parse_amount(&caps[1], text)?;
        let max = parse_amount(&caps[2], text)?;
        return Ok(SalaryRange::range(min, max, currency));
    }

    if let Some(m) = AMOUNT_RE.find(&numeric) {
        let value = parse_amount(m.as_str(), text)?;
        return Ok(SalaryRange::exact(value, currency));
    }

    Err(FieldError::new(Field::Salary, text, "no numeric amount"))
}

fn parse_kyat(text: &str, fixed_currency: Option<&str>) -> Result<SalaryRange, FieldError> {
    let currency = Some(fixed_currency.unwrap_or("Ks").to_string());
    if let Some(caps) = UP_TO_RE.captures(text) {
        let max = parse_amount(&caps[1], text)?;
        return Ok(SalaryRange {
            avg: max,
            min: None,
            max: Some(max),
            currency,
        });
    }
    parse_symbol(text, currency.as_deref())
}
