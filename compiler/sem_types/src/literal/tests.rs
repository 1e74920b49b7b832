use super::*;
use proptest::prelude::*;

#[test]
fn test_integer_literals() {
    for accepted in ["0", "7", "-7", "9223372036854775808", "-123456789012345678901234567890"] {
        assert!(LiteralValidator::Integer.validate(accepted), "{accepted}");
    }
    for rejected in ["", "-", "-0", "007", "+1", "1.0", "1_000", "abc"] {
        assert!(!LiteralValidator::Integer.validate(rejected), "{rejected}");
    }
}

#[test]
fn test_natural_literals() {
    assert!(LiteralValidator::Natural.validate("0"));
    assert!(LiteralValidator::Natural.validate("18446744073709551616"));
    assert!(!LiteralValidator::Natural.validate("-1"));
    assert!(!LiteralValidator::Natural.validate("01"));
}

#[test]
fn test_boolean_literals() {
    assert!(LiteralValidator::Boolean.validate("true"));
    assert!(LiteralValidator::Boolean.validate("false"));
    assert!(!LiteralValidator::Boolean.validate("True"));
}

#[test]
fn test_string_accepts_anything() {
    assert!(LiteralValidator::String.validate(""));
    assert!(LiteralValidator::String.validate("héllo \"world\""));
}

proptest! {
    #[test]
    fn integer_accepts_every_i64(value: i64) {
        prop_assert!(LiteralValidator::Integer.validate(&value.to_string()));
    }

    #[test]
    fn natural_accepts_every_u64(value: u64) {
        prop_assert!(LiteralValidator::Natural.validate(&value.to_string()));
    }

    #[test]
    fn natural_rejects_negatives(value in 1..=i64::MAX) {
        let negative = format!("-{value}");
        prop_assert!(!LiteralValidator::Natural.validate(&negative));
    }

    #[test]
    fn integer_rejects_leading_zeros(value in 0..=i64::MAX) {
        let padded = format!("0{value}");
        prop_assert!(!LiteralValidator::Integer.validate(&padded));
    }
}
