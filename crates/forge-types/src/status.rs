// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA status codes.
//!
//! A [`StatusCode`] is a packed 32-bit result code attached to every service
//! result and data value. The bit layout is fixed by the wire format:
//!
//! ```text
//!  31 30 | 29 28 | 27 ........ 16 | 15 | 14 | 13 12 | 11 10 | 9 ........ 0
//!  sever.| resv. |    sub-code    | SC | SM | resv. | itype |  info bits
//! ```
//!
//! - **Severity** (bits 30-31): `00` Good, `01` Uncertain, `10` Bad.
//! - **Sub-code** (bits 16-27): identifies the specific condition.
//! - **SC/SM** (bits 15/14): structure-changed / semantics-changed flags.
//! - **Info type** (bits 10-11): selects the meaning of the info bits.
//! - **Info bits** (bits 0-9): limit and historian flags for data values.
//!
//! Two equality notions exist and both are needed: full 32-bit equality
//! (`==`) and condition equality ([`StatusCode::equals_condition`]) which
//! compares severity + sub-code only, ignoring the auxiliary flag bits.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Bit Masks
// =============================================================================

/// Severity field mask (bits 30-31).
const SEVERITY_MASK: u32 = 0xC000_0000;

/// Bad severity bit pattern.
const SEVERITY_BAD: u32 = 0x8000_0000;

/// Uncertain severity bit pattern.
const SEVERITY_UNCERTAIN: u32 = 0x4000_0000;

/// Good severity bit pattern.
const SEVERITY_GOOD: u32 = 0x0000_0000;

/// Sub-code field mask (bits 16-27).
const SUBCODE_MASK: u32 = 0x0FFF_0000;

/// Structure-changed flag (bit 15).
const STRUCTURE_CHANGED: u32 = 0x0000_8000;

/// Semantics-changed flag (bit 14).
const SEMANTICS_CHANGED: u32 = 0x0000_4000;

/// Info-type field mask (bits 10-11).
const INFO_TYPE_MASK: u32 = 0x0000_0C00;

/// Info-type value marking the info bits as data-value flags.
const INFO_TYPE_DATA_VALUE: u32 = 0x0000_0400;

/// Info bits mask (bits 0-9).
const INFO_BITS_MASK: u32 = 0x0000_03FF;

/// Limit field mask within the info bits (bits 8-9).
const LIMIT_MASK: u32 = 0x0000_0300;

/// Overflow flag within the info bits (bit 7).
const OVERFLOW_BIT: u32 = 0x0000_0080;

/// Historian field mask within the info bits (bits 0-4).
const HISTORIAN_MASK: u32 = 0x0000_001F;

/// Condition mask: severity + sub-code, everything a caller means by
/// "the same kind of failure".
const CONDITION_MASK: u32 = SEVERITY_MASK | SUBCODE_MASK;

// =============================================================================
// StatusCode
// =============================================================================

/// A packed 32-bit OPC UA result code.
///
/// Immutable value object. All mutators return a new instance.
///
/// # Examples
///
/// ```
/// use forge_types::status::StatusCode;
///
/// assert!(StatusCode::GOOD.is_good());
/// assert!(StatusCode::BAD_UNEXPECTED_ERROR.is_bad());
///
/// // Info bits do not affect condition equality.
/// let plain = StatusCode::GOOD;
/// let flagged = plain.with_overflow(true);
/// assert_ne!(plain, flagged);
/// assert!(plain.equals_condition(flagged));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct StatusCode(u32);

impl StatusCode {
    // =========================================================================
    // Well-Known Codes
    // =========================================================================

    /// The operation succeeded.
    pub const GOOD: StatusCode = StatusCode(0x0000_0000);

    /// An unexpected error occurred.
    pub const BAD_UNEXPECTED_ERROR: StatusCode = StatusCode(0x8001_0000);

    /// An internal error occurred as a result of a programming or
    /// configuration error.
    pub const BAD_INTERNAL_ERROR: StatusCode = StatusCode(0x8002_0000);

    /// Not enough memory to complete the operation.
    pub const BAD_OUT_OF_MEMORY: StatusCode = StatusCode(0x8003_0000);

    /// There was nothing to do because the request did not specify anything.
    pub const BAD_NOTHING_TO_DO: StatusCode = StatusCode(0x800F_0000);

    /// Encoding halted because of invalid data in the objects being serialized.
    pub const BAD_ENCODING_ERROR: StatusCode = StatusCode(0x8006_0000);

    /// Decoding halted because of invalid data in the stream.
    pub const BAD_DECODING_ERROR: StatusCode = StatusCode(0x8007_0000);

    /// The extension object cannot be processed because the type id is
    /// not recognized.
    pub const BAD_DATA_TYPE_ID_UNKNOWN: StatusCode = StatusCode(0x8011_0000);

    /// The requested operation is not supported.
    pub const BAD_NOT_SUPPORTED: StatusCode = StatusCode(0x803D_0000);

    /// The value was out of range.
    pub const BAD_OUT_OF_RANGE: StatusCode = StatusCode(0x803C_0000);

    /// The value supplied for the attribute is not of the same type as the
    /// attribute's value.
    pub const BAD_TYPE_MISMATCH: StatusCode = StatusCode(0x8074_0000);

    /// The syntax of the node id is not valid.
    pub const BAD_NODE_ID_INVALID: StatusCode = StatusCode(0x8033_0000);

    /// The value is an initial value for a variable that normally receives
    /// its value from another variable.
    pub const UNCERTAIN_INITIAL_VALUE: StatusCode = StatusCode(0x4092_0000);

    /// The value is at one of the sensor limits.
    pub const UNCERTAIN_SENSOR_NOT_ACCURATE: StatusCode = StatusCode(0x4093_0000);

    // =========================================================================
    // Construction
    // =========================================================================

    /// Creates a status code from its raw 32-bit pattern.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw 32-bit pattern.
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    // =========================================================================
    // Severity
    // =========================================================================

    /// Returns the severity classification.
    ///
    /// The reserved pattern `0b11` is classified as [`Severity::Bad`].
    #[inline]
    pub const fn severity(&self) -> Severity {
        match self.0 & SEVERITY_MASK {
            SEVERITY_GOOD => Severity::Good,
            SEVERITY_UNCERTAIN => Severity::Uncertain,
            _ => Severity::Bad,
        }
    }

    /// Returns `true` if the severity is Good.
    #[inline]
    pub const fn is_good(&self) -> bool {
        self.0 & SEVERITY_MASK == SEVERITY_GOOD
    }

    /// Returns `true` if the severity is Uncertain.
    #[inline]
    pub const fn is_uncertain(&self) -> bool {
        self.0 & SEVERITY_MASK == SEVERITY_UNCERTAIN
    }

    /// Returns `true` if the severity is Bad (including the reserved
    /// `0b11` pattern).
    #[inline]
    pub const fn is_bad(&self) -> bool {
        self.0 & SEVERITY_BAD != 0
    }

    /// Returns `true` if the severity is not Good.
    #[inline]
    pub const fn is_not_good(&self) -> bool {
        !self.is_good()
    }

    /// Returns `true` if the severity is not Bad.
    #[inline]
    pub const fn is_not_bad(&self) -> bool {
        !self.is_bad()
    }

    // =========================================================================
    // Fields
    // =========================================================================

    /// Returns the 12-bit sub-code identifying the specific condition.
    #[inline]
    pub const fn sub_code(&self) -> u16 {
        ((self.0 & SUBCODE_MASK) >> 16) as u16
    }

    /// Returns `true` if the structure-changed flag is set.
    #[inline]
    pub const fn structure_changed(&self) -> bool {
        self.0 & STRUCTURE_CHANGED != 0
    }

    /// Returns `true` if the semantics-changed flag is set.
    #[inline]
    pub const fn semantics_changed(&self) -> bool {
        self.0 & SEMANTICS_CHANGED != 0
    }

    /// Returns the info-type selector for the low 10 info bits.
    #[inline]
    pub const fn info_type(&self) -> InfoType {
        match self.0 & INFO_TYPE_MASK {
            INFO_TYPE_DATA_VALUE => InfoType::DataValue,
            _ => InfoType::NotUsed,
        }
    }

    /// Returns the raw 10 info bits.
    #[inline]
    pub const fn info_bits(&self) -> u16 {
        (self.0 & INFO_BITS_MASK) as u16
    }

    /// Returns the limit flags.
    ///
    /// Only meaningful when [`info_type`](Self::info_type) is
    /// [`InfoType::DataValue`].
    #[inline]
    pub const fn limit(&self) -> Limit {
        match (self.0 & LIMIT_MASK) >> 8 {
            1 => Limit::Low,
            2 => Limit::High,
            3 => Limit::Constant,
            _ => Limit::None,
        }
    }

    /// Returns `true` if the overflow info bit is set.
    #[inline]
    pub const fn overflow(&self) -> bool {
        self.0 & OVERFLOW_BIT != 0
    }

    /// Returns the raw historian info bits (bits 0-4).
    #[inline]
    pub const fn historian_bits(&self) -> u8 {
        (self.0 & HISTORIAN_MASK) as u8
    }

    // =========================================================================
    // Derived Codes
    // =========================================================================

    /// Returns a copy with the limit flags set and the info type marked
    /// as data-value.
    #[must_use]
    pub const fn with_limit(&self, limit: Limit) -> Self {
        let bits = (self.0 & !LIMIT_MASK) | ((limit as u32) << 8);
        Self(bits | INFO_TYPE_DATA_VALUE)
    }

    /// Returns a copy with the overflow bit set or cleared and the info
    /// type marked as data-value.
    #[must_use]
    pub const fn with_overflow(&self, overflow: bool) -> Self {
        let bits = if overflow {
            self.0 | OVERFLOW_BIT
        } else {
            self.0 & !OVERFLOW_BIT
        };
        Self(bits | INFO_TYPE_DATA_VALUE)
    }

    /// Returns a copy with the structure-changed flag set.
    #[must_use]
    pub const fn with_structure_changed(&self) -> Self {
        Self(self.0 | STRUCTURE_CHANGED)
    }

    /// Returns a copy with the semantics-changed flag set.
    #[must_use]
    pub const fn with_semantics_changed(&self) -> Self {
        Self(self.0 | SEMANTICS_CHANGED)
    }

    // =========================================================================
    // Equality
    // =========================================================================

    /// Compares severity and sub-code only, ignoring the flag and info
    /// bits.
    ///
    /// Callers use this to ask "is this the same kind of failure"
    /// regardless of auxiliary limit/overflow/historian flags; full `==`
    /// remains an exact 32-bit match.
    #[inline]
    pub const fn equals_condition(&self, other: StatusCode) -> bool {
        self.0 & CONDITION_MASK == other.0 & CONDITION_MASK
    }

    /// Compares this code's condition against a raw bit pattern.
    ///
    /// Both directions agree with [`equals_condition`](Self::equals_condition).
    #[inline]
    pub const fn is_condition(&self, bits: u32) -> bool {
        self.0 & CONDITION_MASK == bits & CONDITION_MASK
    }

    /// Returns the symbolic name for well-known codes.
    pub const fn name(&self) -> Option<&'static str> {
        match Self(self.0 & CONDITION_MASK) {
            Self::GOOD => Some("Good"),
            Self::BAD_UNEXPECTED_ERROR => Some("Bad_UnexpectedError"),
            Self::BAD_INTERNAL_ERROR => Some("Bad_InternalError"),
            Self::BAD_OUT_OF_MEMORY => Some("Bad_OutOfMemory"),
            Self::BAD_NOTHING_TO_DO => Some("Bad_NothingToDo"),
            Self::BAD_ENCODING_ERROR => Some("Bad_EncodingError"),
            Self::BAD_DECODING_ERROR => Some("Bad_DecodingError"),
            Self::BAD_DATA_TYPE_ID_UNKNOWN => Some("Bad_DataTypeIdUnknown"),
            Self::BAD_NOT_SUPPORTED => Some("Bad_NotSupported"),
            Self::BAD_OUT_OF_RANGE => Some("Bad_OutOfRange"),
            Self::BAD_TYPE_MISMATCH => Some("Bad_TypeMismatch"),
            Self::BAD_NODE_ID_INVALID => Some("Bad_NodeIdInvalid"),
            Self::UNCERTAIN_INITIAL_VALUE => Some("Uncertain_InitialValue"),
            Self::UNCERTAIN_SENSOR_NOT_ACCURATE => Some("Uncertain_SensorNotAccurate"),
            _ => None,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} (0x{:08X})", name, self.0),
            None => write!(f, "0x{:08X}", self.0),
        }
    }
}

impl From<u32> for StatusCode {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl From<StatusCode> for u32 {
    fn from(code: StatusCode) -> Self {
        code.0
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Severity classification extracted from the top two status bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The operation succeeded.
    Good,

    /// The operation partially succeeded or the value is questionable.
    Uncertain,

    /// The operation failed.
    Bad,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Good => write!(f, "Good"),
            Severity::Uncertain => write!(f, "Uncertain"),
            Severity::Bad => write!(f, "Bad"),
        }
    }
}

// =============================================================================
// InfoType
// =============================================================================

/// Selector for the meaning of the low 10 info bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoType {
    /// The info bits are not used and must be ignored.
    NotUsed,

    /// The info bits carry data-value limit/overflow/historian flags.
    DataValue,
}

// =============================================================================
// Limit
// =============================================================================

/// Limit flags for data values (bits 8-9 of the info bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Limit {
    /// The value is free to change.
    #[default]
    None = 0,

    /// The value is at the lower limit for the data source.
    Low = 1,

    /// The value is at the higher limit for the data source.
    High = 2,

    /// The value is constant and cannot change.
    Constant = 3,
}

// =============================================================================
// Tests
// =============================================================================
