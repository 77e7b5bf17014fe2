//! Value objects and the safe-value construction guard.
//!
//! A safe value can only exist in a valid state. It has two constructors:
//! the checked one ([`SafeValue::try_new`]) validates and returns the
//! domain's own error, while the trusted one ([`SafeValue::trusted`]) is for
//! code that has already proven validity (e.g. arithmetic that cannot leave
//! the valid range, or rows read back from storage). Calling the trusted
//! constructor without asserting validity is a programming error and fails
//! with [`UnsafeValueError`] instead of producing an invalid value.

use crate::error::UnsafeValueError;

/// Marker trait for domain objects compared by value rather than identity.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Proof that a raw value was checked before construction.
///
/// Only obtainable through [`Validated::check`], so `from_validated` cannot be
/// called on an unchecked value by accident.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Validated {
    _private: (),
}

impl Validated {
    /// Issue a proof for `V` if `is_valid` holds.
    pub fn check<V: ?Sized>(is_valid: bool) -> Result<Self, UnsafeValueError> {
        if is_valid {
            Ok(Self { _private: () })
        } else {
            Err(UnsafeValueError::new(core::any::type_name::<V>()))
        }
    }
}

/// A value object whose invariant is enforced at construction.
pub trait SafeValue: ValueObject + Sized {
    /// Unchecked representation.
    type Raw;

    /// Domain error returned when validation fails.
    type Invalid;

    /// Validate `raw` and build the value.
    fn try_new(raw: Self::Raw) -> Result<Self, Self::Invalid>;

    /// Build the value from a raw input already known to be valid.
    fn from_validated(raw: Self::Raw, proof: Validated) -> Self;

    /// Trusted construction: skips validation when the caller asserts it.
    fn trusted(raw: Self::Raw, is_valid: bool) -> Result<Self, UnsafeValueError> {
        let proof = Validated::check::<Self>(is_valid)?;
        Ok(Self::from_validated(raw, proof))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Percent(u8);

    #[derive(Debug, PartialEq)]
    struct OutOfRange(u8);

    impl ValueObject for Percent {}

    impl SafeValue for Percent {
        type Raw = u8;
        type Invalid = OutOfRange;

        fn try_new(raw: u8) -> Result<Self, OutOfRange> {
            if raw <= 100 {
                Ok(Self(raw))
            } else {
                Err(OutOfRange(raw))
            }
        }

        fn from_validated(raw: u8, _proof: Validated) -> Self {
            Self(raw)
        }
    }

    #[test]
    fn checked_constructor_returns_domain_error() {
        assert_eq!(Percent::try_new(42), Ok(Percent(42)));
        assert_eq!(Percent::try_new(101), Err(OutOfRange(101)));
    }

    #[test]
    fn trusted_constructor_requires_assertion() {
        assert_eq!(Percent::trusted(50, true), Ok(Percent(50)));

        let err = Percent::trusted(50, false).unwrap_err();
        assert!(err.value_type().ends_with("Percent"));
    }

    #[test]
    fn trusted_constructor_does_not_revalidate() {
        // The caller vouches for the value; no range check happens.
        assert_eq!(Percent::trusted(200, true), Ok(Percent(200)));
    }
}
