// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unsigned integer value types.
//!
//! The wire format traffics in unsigned 8/16/32/64-bit quantities. These
//! wrappers make the unsigned contracts explicit at API boundaries:
//!
//! - `from_bits` reinterprets a same-width signed bit pattern at zero
//!   cost, the way a decoder hands off raw words;
//! - `from_i64` constructs from a signed magnitude and fails on negative
//!   or out-of-range input instead of wrapping;
//! - `add`/`sub`/`incr`/`decr` return new instances and fail explicitly
//!   on underflow below zero or overflow above the maximum.
//!
//! [`UInt64`] spans the full unsigned 64-bit range, including values above
//! `i64::MAX`, across arithmetic, comparison, and text parse/render.
//!
//! # Examples
//!
//! ```
//! use forge_types::numeric::{UInt8, UInt64};
//!
//! assert!(UInt8::from_i64(255).is_ok());
//! assert!(UInt8::from_i64(256).is_err());
//!
//! // Full unsigned range survives a text round-trip.
//! let big: UInt64 = "18446744073709551615".parse().unwrap();
//! assert_eq!(big, UInt64::MAX);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, UaError, ValidationError};

macro_rules! unsigned_wrapper {
    ($(#[$doc:meta])* $name:ident, $inner:ty, $signed:ty, $label:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            Default,
        )]
        #[serde(transparent)]
        pub struct $name($inner);

        impl $name {
            /// Smallest representable value.
            pub const MIN: $name = $name(<$inner>::MIN);

            /// Largest representable value.
            pub const MAX: $name = $name(<$inner>::MAX);

            /// Creates a new value.
            #[inline]
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Reinterprets a same-width signed bit pattern as unsigned.
            ///
            /// This is a zero-cost reinterpretation, not a conversion:
            /// negative patterns map to the upper half of the range.
            #[inline]
            pub const fn from_bits(bits: $signed) -> Self {
                Self(bits as $inner)
            }

            /// Returns the value reinterpreted as the same-width signed
            /// bit pattern.
            #[inline]
            pub const fn to_bits(self) -> $signed {
                self.0 as $signed
            }

            /// Constructs from a signed magnitude.
            ///
            /// # Errors
            ///
            /// Fails on negative input or input above
            /// [`MAX`](Self::MAX); the value is never clamped.
            pub fn from_i64(value: i64) -> Result<Self, UaError> {
                <$inner>::try_from(value)
                    .map(Self)
                    .map_err(|_| {
                        ValidationError::value_overflow($label, value.to_string()).into()
                    })
            }

            /// Returns the inner value.
            #[inline]
            pub const fn value(self) -> $inner {
                self.0
            }

            /// Adds `other`, failing on overflow.
            ///
            /// # Errors
            ///
            /// Fails if the sum exceeds [`MAX`](Self::MAX).
            pub fn add(self, other: Self) -> Result<Self, UaError> {
                self.0.checked_add(other.0).map(Self).ok_or_else(|| {
                    ValidationError::overflow($label, format!("{} + {}", self.0, other.0)).into()
                })
            }

            /// Subtracts `other`, failing on underflow.
            ///
            /// # Errors
            ///
            /// Fails if `other` is greater than `self`.
            pub fn sub(self, other: Self) -> Result<Self, UaError> {
                self.0.checked_sub(other.0).map(Self).ok_or_else(|| {
                    ValidationError::underflow($label, format!("{} - {}", self.0, other.0)).into()
                })
            }

            /// Increments by one, failing at [`MAX`](Self::MAX).
            ///
            /// # Errors
            ///
            /// Fails if the value is already at the maximum.
            pub fn incr(self) -> Result<Self, UaError> {
                self.0.checked_add(1).map(Self).ok_or_else(|| {
                    ValidationError::overflow($label, format!("{} + 1", self.0)).into()
                })
            }

            /// Decrements by one, failing at zero.
            ///
            /// # Errors
            ///
            /// Fails if the value is already zero.
            pub fn decr(self) -> Result<Self, UaError> {
                self.0.checked_sub(1).map(Self).ok_or_else(|| {
                    ValidationError::underflow($label, format!("{} - 1", self.0)).into()
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = UaError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<$inner>()
                    .map(Self)
                    .map_err(|e| ParseError::new($label, s, e.to_string()).into())
            }
        }

        impl From<$inner> for $name {
            fn from(v: $inner) -> Self {
                Self(v)
            }
        }

        impl From<$name> for $inner {
            fn from(v: $name) -> Self {
                v.0
            }
        }
    };
}

unsigned_wrapper!(
    /// Unsigned 8-bit value (wire type `Byte`).
    UInt8,
    u8,
    i8,
    "UInt8"
);

unsigned_wrapper!(
    /// Unsigned 16-bit value (wire type `UInt16`).
    UInt16,
    u16,
    i16,
    "UInt16"
);

unsigned_wrapper!(
    /// Unsigned 32-bit value (wire type `UInt32`).
    UInt32,
    u32,
    i32,
    "UInt32"
);

unsigned_wrapper!(
    /// Unsigned 64-bit value (wire type `UInt64`).
    ///
    /// Represents the entire unsigned range: values above `i64::MAX` are
    /// first-class for arithmetic, comparison, and text rendering, and
    /// only truly out-of-range operations fail.
    UInt64,
    u64,
    i64,
    "UInt64"
);

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_i64_range_checked() {
        assert_eq!(UInt8::from_i64(255).unwrap().value(), 255);
        assert!(UInt8::from_i64(256).is_err());
        assert!(UInt8::from_i64(-1).is_err());
        assert!(UInt16::from_i64(65536).is_err());
        assert_eq!(UInt32::from_i64(4_294_967_295).unwrap().value(), u32::MAX);
        assert!(UInt32::from_i64(4_294_967_296).is_err());
    }

    #[test]
    fn test_from_bits_reinterprets() {
        assert_eq!(UInt8::from_bits(-1).value(), 255);
        assert_eq!(UInt16::from_bits(-1).value(), 65535);
        assert_eq!(UInt32::from_bits(-2).value(), u32::MAX - 1);
        assert_eq!(UInt64::from_bits(-1), UInt64::MAX);
        assert_eq!(UInt64::from_bits(-1).to_bits(), -1);
    }

    #[test]
    fn test_arithmetic_fails_instead_of_wrapping() {
        let max = UInt8::MAX;
        assert!(max.add(UInt8::new(1)).is_err());
        assert!(max.incr().is_err());
        assert_eq!(max.sub(UInt8::new(1)).unwrap().value(), 254);

        let zero = UInt16::new(0);
        assert!(zero.sub(UInt16::new(1)).is_err());
        assert!(zero.decr().is_err());
        assert_eq!(zero.incr().unwrap().value(), 1);
    }

    #[test]
    fn test_uint64_full_range() {
        let above_signed_max = UInt64::new(u64::MAX - 1);
        assert!(above_signed_max.value() > i64::MAX as u64);
        assert_eq!(above_signed_max.incr().unwrap(), UInt64::MAX);
        assert!(UInt64::MAX.incr().is_err());
        assert_eq!(
            UInt64::MAX.sub(UInt64::new(1)).unwrap().value(),
            u64::MAX - 1
        );
        assert_eq!(UInt64::MAX.to_string(), "18446744073709551615");
    }

    #[test]
    fn test_text_round_trip() {
        let v = UInt8::new(255);
        let parsed: UInt8 = v.to_string().parse().unwrap();
        assert_eq!(parsed, v);

        let parsed: UInt64 = "18446744073709551615".parse().unwrap();
        assert_eq!(parsed, UInt64::MAX);
        assert!("18446744073709551616".parse::<UInt64>().is_err());
        assert!("-1".parse::<UInt8>().is_err());
        assert!("abc".parse::<UInt32>().is_err());
    }

    #[test]
    fn test_equality_and_ordering_by_value() {
        assert_eq!(UInt32::new(7), UInt32::from_i64(7).unwrap());
        assert!(UInt64::from_bits(-1) > UInt64::new(5));
    }
}
