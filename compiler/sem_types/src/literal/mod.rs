//! Literal validators: which source texts denote a value of a type.

/// A literal form.
///
/// Types with no literal form of their own may borrow one through a chain
/// of single-member structs ending in a type listed here.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LiteralValidator {
    /// Optional `-`, decimal digits, no leading zeros, no `-0`. Any
    /// magnitude.
    Integer,
    /// Decimal digits, no leading zeros.
    Natural,
    /// `true` or `false`.
    Boolean,
    /// Any text.
    String,
}

impl LiteralValidator {
    pub fn validate(self, literal: &str) -> bool {
        match self {
            LiteralValidator::Integer => {
                let digits = literal.strip_prefix('-').unwrap_or(literal);
                let negative_zero = digits.len() < literal.len() && digits == "0";
                is_canonical_natural(digits) && !negative_zero
            }
            LiteralValidator::Natural => is_canonical_natural(literal),
            LiteralValidator::Boolean => literal == "true" || literal == "false",
            LiteralValidator::String => true,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LiteralValidator::Integer => "Integer",
            LiteralValidator::Natural => "Natural",
            LiteralValidator::Boolean => "Boolean",
            LiteralValidator::String => "String",
        }
    }
}

/// Non-empty ASCII digits without a leading zero, or exactly `0`.
fn is_canonical_natural(text: &str) -> bool {
    !text.is_empty()
        && text.bytes().all(|b| b.is_ascii_digit())
        && (text == "0" || !text.starts_with('0'))
}

#[cfg(test)]
mod tests;
