use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::CoreError;

/// Separator configuration for one statement format.
///
/// Ambiguity between `1.234` (one thousand two hundred thirty-four) and
/// `1.234` (one point two three four) cannot be resolved from a single token,
/// so separators are declared once per template and never guessed per token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLocale {
    pub decimal_separator: char,
    pub thousand_separator: char,
}

impl NumberLocale {
    pub fn new(decimal_separator: char, thousand_separator: char) -> Self {
        Self { decimal_separator, thousand_separator }
    }

    /// Parse a numeric token as it appears in statement text.
    ///
    /// Currency symbols and whitespace are dropped, a trailing sign is moved
    /// to the front (`45.000-` is a common bank convention), thousand
    /// separators are stripped, and the decimal separator becomes the radix
    /// point. Everything else is a `MalformedNumber`.
    pub fn parse(&self, token: &str) -> Result<Decimal, CoreError> {
        let mut clean: String = token
            .chars()
            .filter(|c| {
                c.is_ascii_digit()
                    || *c == '+'
                    || *c == '-'
                    || *c == self.decimal_separator
                    || *c == self.thousand_separator
            })
            .collect();

        if let Some(last) = clean.chars().last() {
            if last == '+' || last == '-' {
                clean.pop();
                clean.insert(0, last);
            }
        }

        let normalized: String = clean
            .chars()
            .filter(|c| *c != self.thousand_separator)
            .map(|c| if c == self.decimal_separator { '.' } else { c })
            .collect();

        if normalized.is_empty() {
            return Err(CoreError::MalformedNumber(token.to_string()));
        }

        Decimal::from_str(&normalized)
            .map_err(|_| CoreError::MalformedNumber(token.to_string()))
    }

    /// Format a value back into the statement's notation. Used for
    /// diagnostics and round-trip checks; not part of the wire format.
    pub fn format(&self, value: Decimal) -> String {
        let plain = value.abs().to_string();
        let (int_part, frac_part) = match plain.split_once('.') {
            Some((i, f)) => (i.to_string(), Some(f.to_string())),
            None => (plain, None),
        };

        let digits: Vec<char> = int_part.chars().collect();
        let mut grouped = String::new();
        for (i, c) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(self.thousand_separator);
            }
            grouped.push(*c);
        }

        let mut out = String::new();
        if value.is_sign_negative() {
            out.push('-');
        }
        out.push_str(&grouped);
        if let Some(frac) = frac_part {
            out.push(self.decimal_separator);
            out.push_str(&frac);
        }
        out
    }
}

impl Default for NumberLocale {
    /// Colombian statement convention: `1.234.567,89`.
    fn default() -> Self {
        Self { decimal_separator: ',', thousand_separator: '.' }
    }
}
