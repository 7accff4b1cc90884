//! Presentation of the final result.

use crate::common::Float;
use serde::{Deserialize, Serialize};

/// Separators used when writing a number for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    pub grouping_separator: Option<char>,
    pub decimal_separator: char,
}

impl NumberFormat {
    pub const MAX_FRACTION_DIGITS: usize = 2;

    pub const fn english() -> Self {
        Self {
            grouping_separator: Some(','),
            decimal_separator: '.',
        }
    }

    pub const fn german() -> Self {
        Self {
            grouping_separator: Some('.'),
            decimal_separator: ',',
        }
    }

    pub const fn french() -> Self {
        Self {
            grouping_separator: Some('\u{202f}'),
            decimal_separator: ',',
        }
    }

    pub const fn plain() -> Self {
        Self {
            grouping_separator: None,
            decimal_separator: '.',
        }
    }

    /// Looks up the format for a BCP 47 language tag such as `de-DE`, falling back to
    /// English.
    pub fn for_locale(tag: &str) -> Self {
        let language = tag.split(['-', '_']).next().unwrap_or_default();
        match language.to_ascii_lowercase().as_str() {
            "de" | "nl" | "it" | "es" | "pt" | "da" | "id" | "tr" => Self::german(),
            "fr" | "ru" | "pl" | "cs" | "sv" | "fi" | "nb" | "uk" => Self::french(),
            _ => Self::english(),
        }
    }

    /// Rounds to at most two fractional digits, dropping trailing zeros.
    pub fn format(&self, value: Float) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        if value.is_infinite() {
            return if value > 0.0 { "∞" } else { "-∞" }.to_string();
        }

        let fixed = format!("{:.*}", Self::MAX_FRACTION_DIGITS, value.abs());
        let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
        let frac_part = frac_part.trim_end_matches('0');
        let is_zero = int_part.bytes().all(|b| b == b'0') && frac_part.is_empty();

        let mut ret = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
        if value < 0.0 && !is_zero {
            ret.push('-');
        }
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                if let Some(sep) = self.grouping_separator {
                    ret.push(sep);
                }
            }
            ret.push(c);
        }
        if !frac_part.is_empty() {
            ret.push(self.decimal_separator);
            ret.push_str(frac_part);
        }
        ret
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::english()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    pub number_format: NumberFormat,
    /// Show the expression in front of its result.
    pub display_results_inline: bool,
}
