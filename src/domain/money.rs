use std::fmt;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// 1 unit = 100 cents, so $12.50 = 1250 cents.
pub type Cents = i64;

/// Format cents with exactly two decimals.
/// Example: 1250 -> "12.50", -5 -> "-0.05"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Format cents with an explicit sign for ledger listings.
/// Example: 1250 -> "+12.50", -1250 -> "-12.50"
pub fn format_cents_signed(cents: Cents) -> String {
    if cents < 0 {
        format_cents(cents)
    } else {
        format!("+{}", format_cents(cents))
    }
}

/// Parse a decimal string into cents.
/// Example: "12.50" -> 1250, "12.5" -> 1250, "100" -> 10000
///
/// A leading minus is accepted so signed amounts from older exports still
/// parse; decimal digits past the second are truncated.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };
    if digits.is_empty() {
        return Err(ParseCentsError::Empty);
    }

    let (units_str, frac_str) = match digits.split_once('.') {
        Some((units, frac)) => (units, frac),
        None => (digits, ""),
    };
    if frac_str.contains('.') {
        return Err(ParseCentsError::InvalidFormat);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        parse_digits(units_str)?
    };

    let frac: i64 = match frac_str.len() {
        0 => 0,
        // A single digit like "5" means 50 cents
        1 => parse_digits(frac_str)? * 10,
        _ => {
            // Decimal digits past the second are truncated, but the whole
            // fraction must be digits; checking first also keeps the byte
            // slice below from landing inside a multi-byte character.
            if !frac_str.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseCentsError::InvalidFormat);
            }
            parse_digits(&frac_str[..2])?
        }
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(frac))
        .ok_or(ParseCentsError::Overflow)?;

    Ok(if negative { -cents } else { cents })
}

fn parse_digits(s: &str) -> Result<i64, ParseCentsError> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseCentsError::InvalidFormat);
    }
    let value: u64 = s.parse().map_err(|_| ParseCentsError::InvalidFormat)?;
    i64::try_from(value).map_err(|_| ParseCentsError::Overflow)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    Empty,
    InvalidFormat,
    Overflow,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::Empty => write!(f, "empty money value"),
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::Overflow => write!(f, "money value out of range"),
        }
    }
}

impl std::error::Error for ParseCentsError {}
