// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The dynamic value container.
//!
//! A [`Variant`] holds nothing ([`Variant::Empty`]), a scalar of exactly
//! one of the 25 builtin kinds, or a rectangular N-dimensional [`Array`]
//! of one kind. The element kind is a closed tagged union: nothing
//! outside the 25 kinds is representable, and heterogeneous arrays are
//! rejected at construction.
//!
//! Two conversions are applied once, eagerly, at construction, at every
//! array rank:
//!
//! - named-integer enumerations (any [`UaEnum`] implementor) become plain
//!   `Int32` values;
//! - raw byte buffers (`Vec<u8>`) become [`ByteString`] values.
//!
//! # Examples
//!
//! ```
//! use forge_types::builtins::BuiltinTypeId;
//! use forge_types::variant::Variant;
//!
//! let v = Variant::from(vec![1i32, 2, 3]);
//! assert_eq!(v.element_kind(), Some(BuiltinTypeId::Int32));
//!
//! // A raw byte buffer converts to a byte string, not an array of Byte.
//! let bytes = Variant::from(vec![1u8, 2, 3]);
//! assert_eq!(bytes.element_kind(), Some(BuiltinTypeId::ByteString));
//! ```

use std::cmp::Ordering;
use std::fmt;

use uuid::Uuid;

use crate::builtins::BuiltinTypeId;
use crate::bytestring::ByteString;
use crate::data_value::DataValue;
use crate::datetime::DateTime;
use crate::diagnostic::DiagnosticInfo;
use crate::error::{TypeMismatchError, UaError, ValidationError};
use crate::expanded::ExpandedNodeId;
use crate::extension::ExtensionObject;
use crate::names::{LocalizedText, QualifiedName, XmlElement};
use crate::nodeid::NodeId;
use crate::status::StatusCode;

// =============================================================================
// UaEnum
// =============================================================================

/// Capability of enumeration kinds: a stable 32-bit integer
/// representation.
///
/// Implementing this is what lets a domain enumeration flow into a
/// [`Variant`] (eagerly converted to `Int32`) and back out through
/// [`Variant::to_enum`] without any runtime type introspection.
pub trait UaEnum: Sized {
    /// Returns the integer representation of this member.
    fn repr(&self) -> i32;

    /// Maps an integer back to a member; `None` when no member matches.
    fn from_repr(repr: i32) -> Option<Self>;
}

// =============================================================================
// Variant
// =============================================================================

/// A scalar or rectangular N-D array of exactly one builtin kind.
///
/// Immutable value object; [`Variant::Empty`] is the single null value
/// (the value is null iff the element kind is null).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Variant {
    /// No value, no element kind.
    #[default]
    Empty,

    /// Boolean scalar.
    Boolean(bool),

    /// Signed 8-bit scalar.
    SByte(i8),

    /// Unsigned 8-bit scalar.
    Byte(u8),

    /// Signed 16-bit scalar.
    Int16(i16),

    /// Unsigned 16-bit scalar.
    UInt16(u16),

    /// Signed 32-bit scalar.
    Int32(i32),

    /// Unsigned 32-bit scalar.
    UInt32(u32),

    /// Signed 64-bit scalar.
    Int64(i64),

    /// Unsigned 64-bit scalar.
    UInt64(u64),

    /// 32-bit float scalar.
    Float(f32),

    /// 64-bit float scalar.
    Double(f64),

    /// String scalar.
    String(String),

    /// Timestamp scalar.
    DateTime(DateTime),

    /// GUID scalar.
    Guid(Uuid),

    /// Byte sequence scalar.
    ByteString(ByteString),

    /// XML fragment scalar.
    XmlElement(XmlElement),

    /// Node identifier scalar.
    NodeId(NodeId),

    /// Expanded node identifier scalar.
    ExpandedNodeId(ExpandedNodeId),

    /// Status code scalar.
    StatusCode(StatusCode),

    /// Qualified name scalar.
    QualifiedName(QualifiedName),

    /// Localized text scalar.
    LocalizedText(LocalizedText),

    /// Polymorphic structure scalar.
    ExtensionObject(ExtensionObject),

    /// Nested timestamped value.
    DataValue(Box<DataValue>),

    /// Nested variant (legal only inside variant arrays on the wire).
    Variant(Box<Variant>),

    /// Extended diagnostics scalar.
    DiagnosticInfo(Box<DiagnosticInfo>),

    /// Rectangular N-D array of one kind.
    Array(Box<Array>),
}

impl Variant {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Builds a variant from an enumeration member.
    ///
    /// The eager enum conversion: the member is replaced by its plain
    /// 32-bit representation and the element kind becomes `Int32`.
    pub fn from_enum<E: UaEnum>(value: &E) -> Self {
        Variant::Int32(value.repr())
    }

    /// Builds a 1-D `Int32` array from enumeration members.
    ///
    /// The eager enum conversion applied at array rank.
    pub fn from_enum_array<E: UaEnum>(values: &[E]) -> Self {
        let converted = values.iter().map(|e| Variant::Int32(e.repr())).collect();
        // Same-kind scalars by construction.
        Variant::Array(Box::new(Array {
            element_type: BuiltinTypeId::Int32,
            values: converted,
            dimensions: vec![values.len() as u32],
        }))
    }

    /// Builds a 1-D array of one kind, validating homogeneity.
    ///
    /// # Errors
    ///
    /// Fails if any element is not a scalar of `element_type`.
    pub fn array(element_type: BuiltinTypeId, values: Vec<Variant>) -> Result<Self, UaError> {
        Ok(Variant::Array(Box::new(Array::new(element_type, values)?)))
    }

    /// Builds an N-D array of one kind, validating homogeneity and
    /// rectangularity.
    ///
    /// # Errors
    ///
    /// Fails if any element is not a scalar of `element_type`, or if the
    /// dimensions do not multiply out to the element count.
    pub fn multi_array(
        element_type: BuiltinTypeId,
        values: Vec<Variant>,
        dimensions: Vec<u32>,
    ) -> Result<Self, UaError> {
        Ok(Variant::Array(Box::new(Array::new_multi(
            element_type,
            values,
            dimensions,
        )?)))
    }

    /// Returns the default scalar of a kind.
    pub fn default_scalar(kind: BuiltinTypeId) -> Variant {
        match kind {
            BuiltinTypeId::Boolean => Variant::Boolean(false),
            BuiltinTypeId::SByte => Variant::SByte(0),
            BuiltinTypeId::Byte => Variant::Byte(0),
            BuiltinTypeId::Int16 => Variant::Int16(0),
            BuiltinTypeId::UInt16 => Variant::UInt16(0),
            BuiltinTypeId::Int32 => Variant::Int32(0),
            BuiltinTypeId::UInt32 => Variant::UInt32(0),
            BuiltinTypeId::Int64 => Variant::Int64(0),
            BuiltinTypeId::UInt64 => Variant::UInt64(0),
            BuiltinTypeId::Float => Variant::Float(0.0),
            BuiltinTypeId::Double => Variant::Double(0.0),
            BuiltinTypeId::String => Variant::String(String::new()),
            BuiltinTypeId::DateTime => Variant::DateTime(DateTime::NULL),
            BuiltinTypeId::Guid => Variant::Guid(Uuid::nil()),
            BuiltinTypeId::ByteString => Variant::ByteString(ByteString::EMPTY),
            BuiltinTypeId::XmlElement => Variant::XmlElement(XmlElement::default()),
            BuiltinTypeId::NodeId => Variant::NodeId(NodeId::null()),
            BuiltinTypeId::ExpandedNodeId => Variant::ExpandedNodeId(ExpandedNodeId::null()),
            BuiltinTypeId::StatusCode => Variant::StatusCode(StatusCode::GOOD),
            BuiltinTypeId::QualifiedName => Variant::QualifiedName(QualifiedName::null()),
            BuiltinTypeId::LocalizedText => Variant::LocalizedText(LocalizedText::null()),
            BuiltinTypeId::ExtensionObject => Variant::ExtensionObject(ExtensionObject::null()),
            BuiltinTypeId::DataValue => Variant::DataValue(Box::default()),
            BuiltinTypeId::Variant => Variant::Variant(Box::new(Variant::Empty)),
            BuiltinTypeId::DiagnosticInfo => Variant::DiagnosticInfo(Box::default()),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the element kind, `None` for [`Variant::Empty`].
    pub fn element_kind(&self) -> Option<BuiltinTypeId> {
        match self {
            Variant::Empty => None,
            Variant::Boolean(_) => Some(BuiltinTypeId::Boolean),
            Variant::SByte(_) => Some(BuiltinTypeId::SByte),
            Variant::Byte(_) => Some(BuiltinTypeId::Byte),
            Variant::Int16(_) => Some(BuiltinTypeId::Int16),
            Variant::UInt16(_) => Some(BuiltinTypeId::UInt16),
            Variant::Int32(_) => Some(BuiltinTypeId::Int32),
            Variant::UInt32(_) => Some(BuiltinTypeId::UInt32),
            Variant::Int64(_) => Some(BuiltinTypeId::Int64),
            Variant::UInt64(_) => Some(BuiltinTypeId::UInt64),
            Variant::Float(_) => Some(BuiltinTypeId::Float),
            Variant::Double(_) => Some(BuiltinTypeId::Double),
            Variant::String(_) => Some(BuiltinTypeId::String),
            Variant::DateTime(_) => Some(BuiltinTypeId::DateTime),
            Variant::Guid(_) => Some(BuiltinTypeId::Guid),
            Variant::ByteString(_) => Some(BuiltinTypeId::ByteString),
            Variant::XmlElement(_) => Some(BuiltinTypeId::XmlElement),
            Variant::NodeId(_) => Some(BuiltinTypeId::NodeId),
            Variant::ExpandedNodeId(_) => Some(BuiltinTypeId::ExpandedNodeId),
            Variant::StatusCode(_) => Some(BuiltinTypeId::StatusCode),
            Variant::QualifiedName(_) => Some(BuiltinTypeId::QualifiedName),
            Variant::LocalizedText(_) => Some(BuiltinTypeId::LocalizedText),
            Variant::ExtensionObject(_) => Some(BuiltinTypeId::ExtensionObject),
            Variant::DataValue(_) => Some(BuiltinTypeId::DataValue),
            Variant::Variant(_) => Some(BuiltinTypeId::Variant),
            Variant::DiagnosticInfo(_) => Some(BuiltinTypeId::DiagnosticInfo),
            Variant::Array(a) => Some(a.element_type),
        }
    }

    /// Returns the kind name, `"null"` for [`Variant::Empty`].
    pub fn type_name(&self) -> &'static str {
        self.element_kind().map_or("null", |k| k.name())
    }

    /// Returns `true` if this is the null value.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Variant::Empty)
    }

    /// Returns `true` if this is an array.
    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, Variant::Array(_))
    }

    /// Returns `true` if this is a numeric scalar.
    pub fn is_numeric(&self) -> bool {
        !self.is_array() && self.element_kind().is_some_and(|k| k.is_numeric())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the boolean value if this is a boolean scalar.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Variant::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string value if this is a string scalar.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variant::String(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the array if this is an array.
    #[inline]
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Variant::Array(a) => Some(a),
            _ => None,
        }
    }

    // =========================================================================
    // Numeric Coercions
    // =========================================================================

    /// Widens a numeric scalar to `f64`.
    ///
    /// # Errors
    ///
    /// Fails with a type error on non-numeric content.
    pub fn to_f64(&self) -> Result<f64, UaError> {
        match self {
            Variant::SByte(v) => Ok(f64::from(*v)),
            Variant::Byte(v) => Ok(f64::from(*v)),
            Variant::Int16(v) => Ok(f64::from(*v)),
            Variant::UInt16(v) => Ok(f64::from(*v)),
            Variant::Int32(v) => Ok(f64::from(*v)),
            Variant::UInt32(v) => Ok(f64::from(*v)),
            Variant::Int64(v) => Ok(*v as f64),
            Variant::UInt64(v) => Ok(*v as f64),
            Variant::Float(v) => Ok(f64::from(*v)),
            Variant::Double(v) => Ok(*v),
            _ => Err(TypeMismatchError::new("to_f64", "numeric", self.type_name()).into()),
        }
    }

    /// Narrows a numeric scalar to `f32`.
    ///
    /// # Errors
    ///
    /// Fails with a type error on non-numeric content.
    pub fn to_f32(&self) -> Result<f32, UaError> {
        self.to_f64().map(|v| v as f32).map_err(|_| {
            TypeMismatchError::new("to_f32", "numeric", self.type_name()).into()
        })
    }

    /// Converts an integer scalar to `i64`.
    ///
    /// # Errors
    ///
    /// Fails with a type error on non-integer content, or an overflow
    /// error for `UInt64` values above `i64::MAX`.
    pub fn to_i64(&self) -> Result<i64, UaError> {
        match self {
            Variant::SByte(v) => Ok(i64::from(*v)),
            Variant::Byte(v) => Ok(i64::from(*v)),
            Variant::Int16(v) => Ok(i64::from(*v)),
            Variant::UInt16(v) => Ok(i64::from(*v)),
            Variant::Int32(v) => Ok(i64::from(*v)),
            Variant::UInt32(v) => Ok(i64::from(*v)),
            Variant::Int64(v) => Ok(*v),
            Variant::UInt64(v) => i64::try_from(*v)
                .map_err(|_| ValidationError::value_overflow("Int64", v.to_string()).into()),
            _ => Err(TypeMismatchError::new("to_i64", "integer", self.type_name()).into()),
        }
    }

    /// Converts an integer scalar to `i32`.
    ///
    /// # Errors
    ///
    /// Fails with a type error on non-integer content or an overflow
    /// error when the value does not fit.
    pub fn to_i32(&self) -> Result<i32, UaError> {
        let wide = self.to_i64().map_err(|e| match e {
            UaError::TypeMismatch(_) => {
                TypeMismatchError::new("to_i32", "integer", self.type_name()).into()
            }
            other => other,
        })?;
        i32::try_from(wide)
            .map_err(|_| ValidationError::value_overflow("Int32", wide.to_string()).into())
    }

    /// Converts an integer scalar to `i16`.
    ///
    /// # Errors
    ///
    /// Fails with a type error on non-integer content or an overflow
    /// error when the value does not fit.
    pub fn to_i16(&self) -> Result<i16, UaError> {
        let wide = self.to_i64().map_err(|e| match e {
            UaError::TypeMismatch(_) => {
                TypeMismatchError::new("to_i16", "integer", self.type_name()).into()
            }
            other => other,
        })?;
        i16::try_from(wide)
            .map_err(|_| ValidationError::value_overflow("Int16", wide.to_string()).into())
    }

    /// Converts an integer scalar to `u8`.
    ///
    /// # Errors
    ///
    /// Fails with a type error on non-integer content or an overflow
    /// error when the value does not fit.
    pub fn to_u8(&self) -> Result<u8, UaError> {
        let wide = self.to_i64().map_err(|e| match e {
            UaError::TypeMismatch(_) => {
                TypeMismatchError::new("to_u8", "integer", self.type_name()).into()
            }
            other => other,
        })?;
        u8::try_from(wide)
            .map_err(|_| ValidationError::value_overflow("Byte", wide.to_string()).into())
    }

    // =========================================================================
    // Enumerations
    // =========================================================================

    /// Resolves an `Int32` scalar back to an enumeration member.
    ///
    /// Unmapped integers yield `Ok(None)`, an explicit "no match" rather
    /// than an error.
    ///
    /// # Errors
    ///
    /// Fails with a type error when the element kind is not `Int32`.
    pub fn to_enum<E: UaEnum>(&self) -> Result<Option<E>, UaError> {
        match self {
            Variant::Int32(v) => Ok(E::from_repr(*v)),
            _ => Err(TypeMismatchError::new("to_enum", "Int32", self.type_name()).into()),
        }
    }

    /// Resolves an `Int32` array back to enumeration members, element by
    /// element at every rank.
    ///
    /// Unmapped integers yield `None` at their position.
    ///
    /// # Errors
    ///
    /// Fails with a type error when this is not an `Int32` array.
    pub fn to_enum_array<E: UaEnum>(&self) -> Result<Vec<Option<E>>, UaError> {
        match self {
            Variant::Array(a) if a.element_type == BuiltinTypeId::Int32 => Ok(a
                .values
                .iter()
                .map(|v| match v {
                    Variant::Int32(i) => E::from_repr(*i),
                    _ => None,
                })
                .collect()),
            _ => {
                Err(TypeMismatchError::new("to_enum_array", "Int32 array", self.type_name())
                    .into())
            }
        }
    }

    // =========================================================================
    // Comparison
    // =========================================================================

    /// Compares two variants.
    ///
    /// Numeric kinds widen both operands to `f64`; non-numeric same-kind
    /// values use their natural ordering; a boolean compared against a
    /// number is cast to 0/1 (best-effort cross-casting). Anything else
    /// is incomparable.
    ///
    /// # Errors
    ///
    /// Fails with a type error for incomparable kinds, including arrays
    /// and null values.
    pub fn compare(&self, other: &Variant) -> Result<Ordering, UaError> {
        if self.is_numeric() && other.is_numeric() {
            return Ok(self.to_f64()?.total_cmp(&other.to_f64()?));
        }
        match (self, other) {
            (Variant::Boolean(a), Variant::Boolean(b)) => Ok(a.cmp(b)),
            // Best-effort cross-cast: a boolean is 0 or 1 against numbers.
            (Variant::Boolean(a), b) if b.is_numeric() => {
                Ok(f64::from(u8::from(*a)).total_cmp(&b.to_f64()?))
            }
            (a, Variant::Boolean(b)) if a.is_numeric() => {
                Ok(a.to_f64()?.total_cmp(&f64::from(u8::from(*b))))
            }
            (Variant::String(a), Variant::String(b)) => Ok(a.cmp(b)),
            (Variant::DateTime(a), Variant::DateTime(b)) => Ok(a.cmp(b)),
            (Variant::Guid(a), Variant::Guid(b)) => Ok(a.cmp(b)),
            (Variant::ByteString(a), Variant::ByteString(b)) => Ok(a.cmp(b)),
            (Variant::StatusCode(a), Variant::StatusCode(b)) => Ok(a.bits().cmp(&b.bits())),
            (Variant::NodeId(a), Variant::NodeId(b)) => Ok(a.cmp(b)),
            (Variant::XmlElement(a), Variant::XmlElement(b)) => Ok(a.as_str().cmp(b.as_str())),
            _ => Err(TypeMismatchError::new(
                "compare",
                self.type_name(),
                other.type_name(),
            )
            .into()),
        }
    }

    // =========================================================================
    // JSON Export
    // =========================================================================

    /// Converts this value to a JSON value.
    ///
    /// Arrays nest according to their dimensions.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Variant::Empty => serde_json::Value::Null,
            Variant::Boolean(v) => serde_json::Value::Bool(*v),
            Variant::SByte(v) => serde_json::json!(*v),
            Variant::Byte(v) => serde_json::json!(*v),
            Variant::Int16(v) => serde_json::json!(*v),
            Variant::UInt16(v) => serde_json::json!(*v),
            Variant::Int32(v) => serde_json::json!(*v),
            Variant::UInt32(v) => serde_json::json!(*v),
            Variant::Int64(v) => serde_json::json!(*v),
            Variant::UInt64(v) => serde_json::json!(*v),
            Variant::Float(v) => serde_json::json!(*v),
            Variant::Double(v) => serde_json::json!(*v),
            Variant::String(v) => serde_json::Value::String(v.clone()),
            Variant::DateTime(v) => serde_json::json!(v.to_string()),
            Variant::Guid(v) => serde_json::json!(v.to_string()),
            Variant::ByteString(v) => serde_json::json!(v.to_hex()),
            Variant::XmlElement(v) => serde_json::json!(v.as_str()),
            Variant::NodeId(v) => serde_json::json!(v.to_opc_string()),
            Variant::ExpandedNodeId(v) => serde_json::json!(v.to_opc_string()),
            Variant::StatusCode(v) => serde_json::json!(v.bits()),
            Variant::QualifiedName(v) => serde_json::json!(v.to_string()),
            Variant::LocalizedText(v) => serde_json::json!(v.to_string()),
            Variant::ExtensionObject(v) => serde_json::json!(v.type_id().to_opc_string()),
            Variant::DataValue(v) => v.to_json(),
            Variant::Variant(v) => v.to_json(),
            Variant::DiagnosticInfo(v) => serde_json::json!(v.to_string()),
            Variant::Array(a) => a.to_json(),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Empty => write!(f, "null"),
            Variant::Array(a) => write!(
                f,
                "{}[{}]",
                a.element_type,
                a.dimensions
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join("x")
            ),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

// Scalar conversions for common native types.
macro_rules! impl_from_for_variant {
    ($variant:ident, $type:ty) => {
        impl From<$type> for Variant {
            fn from(v: $type) -> Self {
                Variant::$variant(v)
            }
        }
    };
}

impl_from_for_variant!(Boolean, bool);
impl_from_for_variant!(SByte, i8);
impl_from_for_variant!(Byte, u8);
impl_from_for_variant!(Int16, i16);
impl_from_for_variant!(UInt16, u16);
impl_from_for_variant!(Int32, i32);
impl_from_for_variant!(UInt32, u32);
impl_from_for_variant!(Int64, i64);
impl_from_for_variant!(UInt64, u64);
impl_from_for_variant!(Float, f32);
impl_from_for_variant!(Double, f64);
impl_from_for_variant!(String, String);
impl_from_for_variant!(DateTime, DateTime);
impl_from_for_variant!(Guid, Uuid);
impl_from_for_variant!(ByteString, ByteString);
impl_from_for_variant!(XmlElement, XmlElement);
impl_from_for_variant!(NodeId, NodeId);
impl_from_for_variant!(ExpandedNodeId, ExpandedNodeId);
impl_from_for_variant!(StatusCode, StatusCode);
impl_from_for_variant!(QualifiedName, QualifiedName);
impl_from_for_variant!(LocalizedText, LocalizedText);
impl_from_for_variant!(ExtensionObject, ExtensionObject);

impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Variant::String(v.to_string())
    }
}

/// The eager byte-buffer conversion at rank 0: a raw buffer is a
/// [`ByteString`] value, never an array of `Byte`.
impl From<Vec<u8>> for Variant {
    fn from(v: Vec<u8>) -> Self {
        Variant::ByteString(ByteString::new(v))
    }
}

/// The eager byte-buffer conversion at rank 1: a list of raw buffers is
/// a `ByteString` array.
impl From<Vec<Vec<u8>>> for Variant {
    fn from(v: Vec<Vec<u8>>) -> Self {
        let values = v
            .into_iter()
            .map(|buf| Variant::ByteString(ByteString::new(buf)))
            .collect::<Vec<_>>();
        let len = values.len() as u32;
        Variant::Array(Box::new(Array {
            element_type: BuiltinTypeId::ByteString,
            values,
            dimensions: vec![len],
        }))
    }
}

// 1-D arrays from native element vectors.
macro_rules! impl_from_vec_for_variant {
    ($variant:ident, $kind:ident, $type:ty) => {
        impl From<Vec<$type>> for Variant {
            fn from(v: Vec<$type>) -> Self {
                let values = v.into_iter().map(Variant::$variant).collect::<Vec<_>>();
                let len = values.len() as u32;
                Variant::Array(Box::new(Array {
                    element_type: BuiltinTypeId::$kind,
                    values,
                    dimensions: vec![len],
                }))
            }
        }
    };
}

impl_from_vec_for_variant!(Boolean, Boolean, bool);
impl_from_vec_for_variant!(SByte, SByte, i8);
impl_from_vec_for_variant!(Int16, Int16, i16);
impl_from_vec_for_variant!(UInt16, UInt16, u16);
impl_from_vec_for_variant!(Int32, Int32, i32);
impl_from_vec_for_variant!(UInt32, UInt32, u32);
impl_from_vec_for_variant!(Int64, Int64, i64);
impl_from_vec_for_variant!(UInt64, UInt64, u64);
impl_from_vec_for_variant!(Float, Float, f32);
impl_from_vec_for_variant!(Double, Double, f64);
impl_from_vec_for_variant!(String, String, String);

// =============================================================================
// Array
// =============================================================================

/// A rectangular N-dimensional array of one builtin kind.
///
/// Elements are stored flattened in row-major order alongside their
/// dimensions; the element count always equals the product of the
/// dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    element_type: BuiltinTypeId,
    values: Vec<Variant>,
    dimensions: Vec<u32>,
}

impl Array {
    /// Creates a 1-D array, validating element homogeneity.
    ///
    /// # Errors
    ///
    /// Fails if any element is not a scalar of `element_type`.
    pub fn new(element_type: BuiltinTypeId, values: Vec<Variant>) -> Result<Self, UaError> {
        let len = values.len() as u32;
        Self::new_multi(element_type, values, vec![len])
    }

    /// Creates an empty 1-D array of a kind.
    pub fn empty(element_type: BuiltinTypeId) -> Self {
        Self {
            element_type,
            values: Vec::new(),
            dimensions: vec![0],
        }
    }

    /// Creates an N-D array, validating homogeneity and rectangularity.
    ///
    /// # Errors
    ///
    /// Fails if any element is not a scalar of `element_type`, or if the
    /// product of `dimensions` differs from the element count.
    pub fn new_multi(
        element_type: BuiltinTypeId,
        values: Vec<Variant>,
        dimensions: Vec<u32>,
    ) -> Result<Self, UaError> {
        let expected: usize = dimensions.iter().product::<u32>() as usize;
        if expected != values.len() {
            return Err(ValidationError::RaggedArray {
                dimensions,
                expected,
                actual: values.len(),
            }
            .into());
        }
        for value in &values {
            if value.is_array() {
                return Err(ValidationError::MixedArray {
                    expected: element_type.name(),
                    actual: "Array",
                }
                .into());
            }
            // An array of variants accepts any scalar element.
            if element_type != BuiltinTypeId::Variant {
                match value.element_kind() {
                    Some(kind) if kind == element_type => {}
                    Some(kind) => {
                        return Err(ValidationError::MixedArray {
                            expected: element_type.name(),
                            actual: kind.name(),
                        }
                        .into())
                    }
                    None => {
                        return Err(ValidationError::MixedArray {
                            expected: element_type.name(),
                            actual: "null",
                        }
                        .into())
                    }
                }
            }
        }
        Ok(Self {
            element_type,
            values,
            dimensions,
        })
    }

    /// Returns the element kind.
    #[inline]
    pub fn element_type(&self) -> BuiltinTypeId {
        self.element_type
    }

    /// Returns the flattened elements in row-major order.
    #[inline]
    pub fn values(&self) -> &[Variant] {
        &self.values
    }

    /// Returns the dimensions.
    #[inline]
    pub fn dimensions(&self) -> &[u32] {
        &self.dimensions
    }

    /// Returns the number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.dimensions.len()
    }

    /// Returns the total element count.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the array has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Converts to nested JSON arrays following the dimensions.
    pub fn to_json(&self) -> serde_json::Value {
        fn nest(values: &[Variant], dims: &[u32]) -> serde_json::Value {
            match dims {
                [] | [_] => serde_json::Value::Array(values.iter().map(Variant::to_json).collect()),
                [first, rest @ ..] => {
                    let chunk = values.len() / (*first).max(1) as usize;
                    serde_json::Value::Array(
                        values.chunks(chunk.max(1)).map(|c| nest(c, rest)).collect(),
                    )
                }
            }
        }
        if self.values.is_empty() {
            serde_json::Value::Array(Vec::new())
        } else {
            nest(&self.values, &self.dimensions)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
