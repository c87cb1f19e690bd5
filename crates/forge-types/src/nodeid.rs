// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA node identifiers.
//!
//! A [`NodeId`] uniquely identifies a node within a server's address
//! space. It consists of a namespace index and one of four identifier
//! kinds: numeric, string, GUID, or opaque (byte string).
//!
//! Each kind has a canonical null value at namespace 0 (`0`, the empty
//! string, the all-zero GUID, empty bytes); [`NodeId::is_null`]
//! recognizes all four. Ordering is by `(namespace index, kind, value)`.
//!
//! # Examples
//!
//! ```
//! use forge_types::nodeid::NodeId;
//!
//! let numeric = NodeId::numeric(2, 1001);
//! assert_eq!(numeric.to_opc_string(), "ns=2;i=1001");
//!
//! let parsed: NodeId = "ns=2;s=MyDevice.Temperature".parse().unwrap();
//! assert!(parsed.is_string());
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bytestring::ByteString;
use crate::error::{ParseError, UaError, ValidationError};

/// Maximum byte length of a string or opaque identifier payload.
pub const MAX_IDENTIFIER_LEN: usize = 4096;

// =============================================================================
// NodeId
// =============================================================================

/// A node identifier: namespace index plus one of four identifier kinds.
///
/// Immutable value object. Construction validates payload size; the
/// namespace-index range (0..65535) is carried by the `u16` field itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    /// Namespace index (0 = the base protocol namespace).
    pub namespace_index: u16,

    /// The node identifier.
    pub identifier: Identifier,
}

impl NodeId {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a numeric node id.
    #[inline]
    pub const fn numeric(namespace_index: u16, value: u32) -> Self {
        Self {
            namespace_index,
            identifier: Identifier::Numeric(value),
        }
    }

    /// Creates a string node id.
    ///
    /// # Errors
    ///
    /// Fails if the string exceeds [`MAX_IDENTIFIER_LEN`] bytes.
    pub fn string(namespace_index: u16, value: impl Into<String>) -> Result<Self, UaError> {
        let value = value.into();
        if value.len() > MAX_IDENTIFIER_LEN {
            return Err(ValidationError::oversized_identifier(
                "String",
                value.len(),
                MAX_IDENTIFIER_LEN,
            )
            .into());
        }
        Ok(Self {
            namespace_index,
            identifier: Identifier::String(value),
        })
    }

    /// Creates a GUID node id.
    #[inline]
    pub const fn guid(namespace_index: u16, value: Uuid) -> Self {
        Self {
            namespace_index,
            identifier: Identifier::Guid(value),
        }
    }

    /// Creates a GUID node id from its textual form.
    ///
    /// # Errors
    ///
    /// Fails if the string is not a valid UUID.
    pub fn guid_from_str(namespace_index: u16, value: &str) -> Result<Self, UaError> {
        let uuid = Uuid::parse_str(value)
            .map_err(|e| ParseError::new("NodeId", value, format!("invalid GUID: {}", e)))?;
        Ok(Self::guid(namespace_index, uuid))
    }

    /// Creates an opaque (byte string) node id.
    ///
    /// # Errors
    ///
    /// Fails if the payload exceeds [`MAX_IDENTIFIER_LEN`] bytes.
    pub fn opaque(namespace_index: u16, value: impl Into<ByteString>) -> Result<Self, UaError> {
        let value = value.into();
        if value.len() > MAX_IDENTIFIER_LEN {
            return Err(ValidationError::oversized_identifier(
                "Opaque",
                value.len(),
                MAX_IDENTIFIER_LEN,
            )
            .into());
        }
        Ok(Self {
            namespace_index,
            identifier: Identifier::Opaque(value),
        })
    }

    /// Creates an opaque node id from a base64-encoded payload.
    ///
    /// # Errors
    ///
    /// Fails if the string is not valid base64 or the decoded payload is
    /// oversized.
    pub fn opaque_from_base64(namespace_index: u16, value: &str) -> Result<Self, UaError> {
        let bytes = BASE64
            .decode(value)
            .map_err(|e| ParseError::new("NodeId", value, format!("invalid base64: {}", e)))?;
        Self::opaque(namespace_index, bytes)
    }

    /// Returns the null node id (ns=0, i=0).
    #[inline]
    pub const fn null() -> Self {
        Self::numeric(0, 0)
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns `true` if this is a numeric identifier.
    #[inline]
    pub const fn is_numeric(&self) -> bool {
        matches!(self.identifier, Identifier::Numeric(_))
    }

    /// Returns `true` if this is a string identifier.
    #[inline]
    pub const fn is_string(&self) -> bool {
        matches!(self.identifier, Identifier::String(_))
    }

    /// Returns `true` if this is a GUID identifier.
    #[inline]
    pub const fn is_guid(&self) -> bool {
        matches!(self.identifier, Identifier::Guid(_))
    }

    /// Returns `true` if this is an opaque identifier.
    #[inline]
    pub const fn is_opaque(&self) -> bool {
        matches!(self.identifier, Identifier::Opaque(_))
    }

    /// Returns `true` if this is in the base protocol namespace (ns=0).
    #[inline]
    pub const fn is_standard(&self) -> bool {
        self.namespace_index == 0
    }

    /// Returns `true` if this is the canonical null of any identifier
    /// kind.
    ///
    /// All four kinds have a null: numeric `0`, the empty string, the
    /// all-zero GUID, and the empty byte string, each at namespace 0.
    pub fn is_null(&self) -> bool {
        self.namespace_index == 0 && self.identifier.is_null()
    }

    /// Returns `true` if `node` is absent or the canonical null.
    #[inline]
    pub fn is_null_or_none(node: Option<&NodeId>) -> bool {
        node.map_or(true, NodeId::is_null)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the numeric value if this is a numeric identifier.
    #[inline]
    pub fn as_numeric(&self) -> Option<u32> {
        match &self.identifier {
            Identifier::Numeric(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string value if this is a string identifier.
    #[inline]
    pub fn as_string(&self) -> Option<&str> {
        match &self.identifier {
            Identifier::String(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the GUID value if this is a GUID identifier.
    #[inline]
    pub fn as_guid(&self) -> Option<&Uuid> {
        match &self.identifier {
            Identifier::Guid(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the opaque value if this is an opaque identifier.
    #[inline]
    pub fn as_opaque(&self) -> Option<&ByteString> {
        match &self.identifier {
            Identifier::Opaque(v) => Some(v),
            _ => None,
        }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Renders the canonical text form.
    ///
    /// Format: `ns=<namespace>;{i|s|g|b}=<identifier>`, with the `ns=`
    /// segment omitted for namespace 0 and opaque payloads base64
    /// encoded.
    pub fn to_opc_string(&self) -> String {
        if self.namespace_index == 0 {
            self.identifier.to_string()
        } else {
            format!("ns={};{}", self.namespace_index, self.identifier)
        }
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_opc_string())
    }
}

impl Ord for NodeId {
    /// Orders by `(namespace index, identifier kind, value)`.
    ///
    /// Values order by their kind-specific natural ordering: numeric
    /// magnitude, lexicographic text, GUID byte order, and the byte
    /// string's rendered-hex ordering.
    fn cmp(&self, other: &Self) -> Ordering {
        self.namespace_index
            .cmp(&other.namespace_index)
            .then_with(|| self.identifier.cmp(&other.identifier))
    }
}

impl PartialOrd for NodeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for NodeId {
    type Err = UaError;

    /// Parses the canonical text form.
    ///
    /// Supported inputs:
    /// - `ns=2;i=1001` (numeric)
    /// - `ns=2;s=MyNode` (string)
    /// - `ns=2;g=550e8400-e29b-41d4-a716-446655440000` (GUID)
    /// - `ns=2;b=SGVsbG8=` (opaque, base64)
    /// - `i=1001`, `s=MyNode`, ... (namespace 0)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        let (namespace_index, identifier_part) = if let Some(rest) = trimmed.strip_prefix("ns=") {
            let (ns_str, id_part) = rest.split_once(';').ok_or_else(|| {
                ParseError::new("NodeId", s, "missing identifier after namespace")
            })?;
            let ns: u16 = ns_str.parse().map_err(|_| {
                ParseError::new(
                    "NodeId",
                    s,
                    format!("invalid namespace index {:?} (expected 0..65535)", ns_str),
                )
            })?;
            (ns, id_part)
        } else {
            (0, trimmed)
        };

        let identifier = Identifier::parse_for(s, identifier_part)?;
        match identifier {
            Identifier::String(v) => Self::string(namespace_index, v),
            Identifier::Opaque(v) => Self::opaque(namespace_index, v),
            id => Ok(Self {
                namespace_index,
                identifier: id,
            }),
        }
    }
}

// =============================================================================
// Identifier
// =============================================================================

/// The four node identifier kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Identifier {
    /// Numeric identifier (most efficient, used for standard nodes).
    Numeric(u32),

    /// String identifier (human-readable, used for custom nodes).
    String(String),

    /// GUID identifier (globally unique).
    Guid(Uuid),

    /// Opaque identifier (application-specific bytes).
    Opaque(ByteString),
}

impl Identifier {
    /// Returns the kind prefix letter of the canonical text form.
    pub const fn type_prefix(&self) -> char {
        match self {
            Self::Numeric(_) => 'i',
            Self::String(_) => 's',
            Self::Guid(_) => 'g',
            Self::Opaque(_) => 'b',
        }
    }

    /// Returns the kind name.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Numeric(_) => "Numeric",
            Self::String(_) => "String",
            Self::Guid(_) => "Guid",
            Self::Opaque(_) => "Opaque",
        }
    }

    /// Returns `true` if this is the kind-specific null value.
    pub fn is_null(&self) -> bool {
        match self {
            Self::Numeric(v) => *v == 0,
            Self::String(v) => v.is_empty(),
            Self::Guid(v) => v.is_nil(),
            Self::Opaque(v) => v.is_empty(),
        }
    }

    /// Rank used by the `(namespace, kind, value)` ordering.
    const fn kind_rank(&self) -> u8 {
        match self {
            Self::Numeric(_) => 0,
            Self::String(_) => 1,
            Self::Guid(_) => 2,
            Self::Opaque(_) => 3,
        }
    }

    fn parse_for(full_input: &str, part: &str) -> Result<Self, UaError> {
        if let Some(id) = part.strip_prefix("i=") {
            let value: u32 = id.parse().map_err(|_| {
                ParseError::new(
                    "NodeId",
                    full_input,
                    format!("invalid numeric identifier {:?}", id),
                )
            })?;
            Ok(Self::Numeric(value))
        } else if let Some(id) = part.strip_prefix("s=") {
            Ok(Self::String(id.to_string()))
        } else if let Some(id) = part.strip_prefix("g=") {
            let uuid = Uuid::parse_str(id).map_err(|e| {
                ParseError::new("NodeId", full_input, format!("invalid GUID: {}", e))
            })?;
            Ok(Self::Guid(uuid))
        } else if let Some(id) = part.strip_prefix("b=") {
            let bytes = BASE64.decode(id).map_err(|e| {
                ParseError::new("NodeId", full_input, format!("invalid base64: {}", e))
            })?;
            Ok(Self::Opaque(ByteString::new(bytes)))
        } else {
            Err(ParseError::new(
                "NodeId",
                full_input,
                "unknown identifier kind, expected i=, s=, g= or b=",
            )
            .into())
        }
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Numeric(a), Self::Numeric(b)) => a.cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            (Self::Guid(a), Self::Guid(b)) => a.cmp(b),
            (Self::Opaque(a), Self::Opaque(b)) => a.cmp(b),
            (a, b) => a.kind_rank().cmp(&b.kind_rank()),
        }
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "i={}", v),
            Self::String(v) => write!(f, "s={}", v),
            Self::Guid(v) => write!(f, "g={}", v),
            Self::Opaque(v) => write!(f, "b={}", BASE64.encode(v.as_slice())),
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
    fn test_round_trip_all_kinds() {
        let ids = [
            NodeId::numeric(0, 84),
            NodeId::numeric(2, 1001),
            NodeId::string(2, "MyDevice.Temperature").unwrap(),
            NodeId::guid(3, Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap()),
            NodeId::opaque(4, vec![1u8, 2, 3, 255]).unwrap(),
        ];
        for id in &ids {
            let rendered = id.to_opc_string();
            let parsed: NodeId = rendered.parse().unwrap();
            assert_eq!(&parsed, id, "round-trip failed for {}", rendered);
        }
    }

    #[test]
    fn test_ns_segment_omitted_for_namespace_zero() {
        assert_eq!(NodeId::numeric(0, 84).to_opc_string(), "i=84");
        assert_eq!(NodeId::numeric(2, 84).to_opc_string(), "ns=2;i=84");
        assert_eq!(
            NodeId::opaque(0, vec![72u8, 105]).unwrap().to_opc_string(),
            "b=SGk="
        );
    }

    #[test]
    fn test_null_canon_per_kind() {
        assert!(NodeId::null().is_null());
        assert!(NodeId::numeric(0, 0).is_null());
        assert!(NodeId::string(0, "").unwrap().is_null());
        assert!(NodeId::guid(0, Uuid::nil()).is_null());
        assert!(NodeId::opaque(0, Vec::new()).unwrap().is_null());

        // Non-zero namespace is never null.
        assert!(!NodeId::numeric(1, 0).is_null());
        assert!(!NodeId::string(2, "").unwrap().is_null());

        assert!(NodeId::is_null_or_none(None));
        assert!(NodeId::is_null_or_none(Some(&NodeId::null())));
        assert!(!NodeId::is_null_or_none(Some(&NodeId::numeric(2, 1))));
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let long = "x".repeat(MAX_IDENTIFIER_LEN + 1);
        assert!(NodeId::string(1, long).is_err());
        assert!(NodeId::string(1, "x".repeat(MAX_IDENTIFIER_LEN)).is_ok());

        let blob = vec![0u8; MAX_IDENTIFIER_LEN + 1];
        assert!(NodeId::opaque(1, blob).is_err());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("ns=2".parse::<NodeId>().is_err());
        assert!("ns=70000;i=1".parse::<NodeId>().is_err());
        assert!("ns=2;x=1".parse::<NodeId>().is_err());
        assert!("ns=2;i=abc".parse::<NodeId>().is_err());
        assert!("ns=2;g=not-a-guid".parse::<NodeId>().is_err());
        assert!("ns=2;b=!!!".parse::<NodeId>().is_err());

        let err = "ns=2;x=1".parse::<NodeId>().unwrap_err();
        assert!(err.to_string().contains("ns=2;x=1"));
    }

    #[test]
    fn test_ordering_key() {
        // Namespace dominates.
        assert!(NodeId::numeric(1, 999) < NodeId::numeric(2, 1));
        // Kind rank within a namespace: numeric < string < guid < opaque.
        assert!(NodeId::numeric(1, u32::MAX) < NodeId::string(1, "a").unwrap());
        assert!(NodeId::string(1, "zzz").unwrap() < NodeId::guid(1, Uuid::nil()));
        assert!(NodeId::guid(1, Uuid::max()) < NodeId::opaque(1, vec![0u8]).unwrap());
        // Value ordering within a kind.
        assert!(NodeId::numeric(1, 5) < NodeId::numeric(1, 6));
        assert!(NodeId::string(1, "abc").unwrap() < NodeId::string(1, "abd").unwrap());
    }

    #[test]
    fn test_accessors() {
        let id = NodeId::string(2, "Tank.Level").unwrap();
        assert_eq!(id.as_string(), Some("Tank.Level"));
        assert_eq!(id.as_numeric(), None);
        assert_eq!(id.identifier.kind_name(), "String");
        assert_eq!(id.identifier.type_prefix(), 's');
    }
}
