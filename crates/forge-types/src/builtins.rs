// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The builtin type table.
//!
//! [`BuiltinTypeId`] enumerates the 25 builtin data types with their wire
//! ids (1..25). [`BuiltinsMap`] is the process-wide bijection between
//! wire ids, canonical datatype [`NodeId`]s, and runtime shapes; it is
//! built once behind a `OnceLock` and read-only thereafter, so
//! unsynchronized concurrent reads are safe.
//!
//! Scalar and array forms of a kind share one wire id and one canonical
//! `NodeId`, so the reverse id-to-shape lookup takes an explicit
//! [`TypeForm`]; there is no silently ambiguous direction.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::nodeid::NodeId;
use crate::variant::{Array, Variant};

// =============================================================================
// BuiltinTypeId
// =============================================================================

/// The 25 builtin data types, tagged with their wire ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BuiltinTypeId {
    /// Boolean value.
    Boolean = 1,

    /// Signed 8-bit integer.
    SByte = 2,

    /// Unsigned 8-bit integer.
    Byte = 3,

    /// Signed 16-bit integer.
    Int16 = 4,

    /// Unsigned 16-bit integer.
    UInt16 = 5,

    /// Signed 32-bit integer.
    Int32 = 6,

    /// Unsigned 32-bit integer.
    UInt32 = 7,

    /// Signed 64-bit integer.
    Int64 = 8,

    /// Unsigned 64-bit integer.
    UInt64 = 9,

    /// 32-bit IEEE 754 float.
    Float = 10,

    /// 64-bit IEEE 754 double.
    Double = 11,

    /// UTF-8 string.
    String = 12,

    /// 100-nanosecond tick timestamp.
    DateTime = 13,

    /// GUID.
    Guid = 14,

    /// Raw byte sequence.
    ByteString = 15,

    /// XML fragment.
    XmlElement = 16,

    /// Node identifier.
    NodeId = 17,

    /// Expanded node identifier.
    ExpandedNodeId = 18,

    /// Status code.
    StatusCode = 19,

    /// Qualified name.
    QualifiedName = 20,

    /// Localized text.
    LocalizedText = 21,

    /// Polymorphic structure container.
    ExtensionObject = 22,

    /// Timestamped value.
    DataValue = 23,

    /// Dynamic value container.
    Variant = 24,

    /// Extended diagnostics.
    DiagnosticInfo = 25,
}

impl BuiltinTypeId {
    /// All 25 kinds in wire-id order.
    pub const ALL: [BuiltinTypeId; 25] = [
        Self::Boolean,
        Self::SByte,
        Self::Byte,
        Self::Int16,
        Self::UInt16,
        Self::Int32,
        Self::UInt32,
        Self::Int64,
        Self::UInt64,
        Self::Float,
        Self::Double,
        Self::String,
        Self::DateTime,
        Self::Guid,
        Self::ByteString,
        Self::XmlElement,
        Self::NodeId,
        Self::ExpandedNodeId,
        Self::StatusCode,
        Self::QualifiedName,
        Self::LocalizedText,
        Self::ExtensionObject,
        Self::DataValue,
        Self::Variant,
        Self::DiagnosticInfo,
    ];

    /// Returns the wire-format numeric id (1..25).
    #[inline]
    pub const fn wire_id(&self) -> u8 {
        *self as u8
    }

    /// Looks up a kind by wire id.
    pub const fn from_wire_id(id: u8) -> Option<Self> {
        if id >= 1 && id <= 25 {
            let mut i = 0;
            while i < Self::ALL.len() {
                if Self::ALL[i] as u8 == id {
                    return Some(Self::ALL[i]);
                }
                i += 1;
            }
        }
        None
    }

    /// Returns the canonical datatype node of this kind.
    #[inline]
    pub const fn node_id(&self) -> NodeId {
        NodeId::numeric(0, *self as u32)
    }

    /// Returns the kind name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::SByte => "SByte",
            Self::Byte => "Byte",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::String => "String",
            Self::DateTime => "DateTime",
            Self::Guid => "Guid",
            Self::ByteString => "ByteString",
            Self::XmlElement => "XmlElement",
            Self::NodeId => "NodeId",
            Self::ExpandedNodeId => "ExpandedNodeId",
            Self::StatusCode => "StatusCode",
            Self::QualifiedName => "QualifiedName",
            Self::LocalizedText => "LocalizedText",
            Self::ExtensionObject => "ExtensionObject",
            Self::DataValue => "DataValue",
            Self::Variant => "Variant",
            Self::DiagnosticInfo => "DiagnosticInfo",
        }
    }

    /// Returns `true` if this is a numeric kind (integer or float).
    #[inline]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::SByte
                | Self::Byte
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
                | Self::Float
                | Self::Double
        )
    }

    /// Returns `true` if this is an integer kind.
    #[inline]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::SByte
                | Self::Byte
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
        )
    }

    /// Returns `true` if this is a floating point kind.
    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Returns the fixed wire size for fixed-size kinds, `None` for
    /// variable-length kinds.
    pub const fn fixed_wire_size(&self) -> Option<usize> {
        match self {
            Self::Boolean | Self::SByte | Self::Byte => Some(1),
            Self::Int16 | Self::UInt16 => Some(2),
            Self::Int32 | Self::UInt32 | Self::Float | Self::StatusCode => Some(4),
            Self::Int64 | Self::UInt64 | Self::Double | Self::DateTime => Some(8),
            Self::Guid => Some(16),
            _ => None,
        }
    }
}

impl fmt::Display for BuiltinTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// TypeForm
// =============================================================================

/// Scalar or array form of a builtin kind.
///
/// Scalar and array share a wire id and a canonical node, so reverse
/// lookups must say which form they want.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeForm {
    /// The scalar shape.
    Scalar,

    /// The (possibly multi-dimensional) array shape.
    Array,
}

// =============================================================================
// BuiltinsMap
// =============================================================================

/// Process-wide bijection between builtin kinds, wire ids, canonical
/// nodes, and runtime shapes.
///
/// Built once at first use, immutable afterwards.
#[derive(Debug)]
pub struct BuiltinsMap {
    by_node_id: HashMap<NodeId, BuiltinTypeId>,
}

impl BuiltinsMap {
    /// Returns the global table.
    pub fn global() -> &'static BuiltinsMap {
        static TABLE: OnceLock<BuiltinsMap> = OnceLock::new();
        TABLE.get_or_init(|| {
            let by_node_id = BuiltinTypeId::ALL
                .iter()
                .map(|kind| (kind.node_id(), *kind))
                .collect();
            debug!(kinds = BuiltinTypeId::ALL.len(), "builtin type table initialized");
            BuiltinsMap { by_node_id }
        })
    }

    /// Looks up a kind by its canonical datatype node.
    ///
    /// Exact: one node per kind, never a fallback.
    pub fn kind_of_node_id(&self, node_id: &NodeId) -> Option<BuiltinTypeId> {
        self.by_node_id.get(node_id).copied()
    }

    /// Returns the canonical datatype node of a kind.
    #[inline]
    pub fn node_id_of(&self, kind: BuiltinTypeId) -> NodeId {
        kind.node_id()
    }

    /// Returns the wire id of a kind.
    #[inline]
    pub fn wire_id_of(&self, kind: BuiltinTypeId) -> u8 {
        kind.wire_id()
    }

    /// Returns the default value shape for a wire id in the requested
    /// form.
    ///
    /// The caller must state whether it wants the scalar or the array
    /// shape; the id alone is ambiguous between the two.
    pub fn shape_of_wire_id(&self, wire_id: u8, form: TypeForm) -> Option<Variant> {
        let kind = BuiltinTypeId::from_wire_id(wire_id)?;
        Some(self.default_value(kind, form))
    }

    /// Returns the default value of a kind in the requested form.
    pub fn default_value(&self, kind: BuiltinTypeId, form: TypeForm) -> Variant {
        match form {
            TypeForm::Scalar => Variant::default_scalar(kind),
            TypeForm::Array => Variant::Array(Box::new(Array::empty(kind))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_ids_are_1_to_25() {
        for (i, kind) in BuiltinTypeId::ALL.iter().enumerate() {
            assert_eq!(kind.wire_id() as usize, i + 1);
            assert_eq!(BuiltinTypeId::from_wire_id(kind.wire_id()), Some(*kind));
        }
        assert_eq!(BuiltinTypeId::from_wire_id(0), None);
        assert_eq!(BuiltinTypeId::from_wire_id(26), None);
    }

    #[test]
    fn test_node_id_lookup_is_exact_and_total() {
        let map = BuiltinsMap::global();
        for kind in BuiltinTypeId::ALL {
            let node = map.node_id_of(kind);
            assert_eq!(map.kind_of_node_id(&node), Some(kind));
            assert_eq!(node, NodeId::numeric(0, kind.wire_id() as u32));
        }
        assert_eq!(map.kind_of_node_id(&NodeId::numeric(0, 99)), None);
        assert_eq!(map.kind_of_node_id(&NodeId::numeric(1, 6)), None);
    }

    #[test]
    fn test_reverse_shape_lookup_requires_form() {
        let map = BuiltinsMap::global();
        let scalar = map.shape_of_wire_id(6, TypeForm::Scalar).unwrap();
        let array = map.shape_of_wire_id(6, TypeForm::Array).unwrap();
        assert_eq!(scalar, Variant::Int32(0));
        assert!(matches!(array, Variant::Array(_)));
        assert_ne!(scalar, array);
        assert_eq!(map.shape_of_wire_id(0, TypeForm::Scalar), None);
    }

    #[test]
    fn test_classification() {
        assert!(BuiltinTypeId::Double.is_numeric());
        assert!(BuiltinTypeId::Double.is_float());
        assert!(!BuiltinTypeId::Double.is_integer());
        assert!(BuiltinTypeId::UInt64.is_integer());
        assert!(!BuiltinTypeId::String.is_numeric());
        assert_eq!(BuiltinTypeId::Guid.fixed_wire_size(), Some(16));
        assert_eq!(BuiltinTypeId::String.fixed_wire_size(), None);
    }
}
