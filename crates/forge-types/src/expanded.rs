// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Expanded node identifiers for cross-server references.
//!
//! An [`ExpandedNodeId`] wraps a [`NodeId`] with an optional explicit
//! namespace URI and a server index. When the URI is present and
//! non-empty, identity is carried by the URI and the embedded namespace
//! index is ignored; a server index of 0 means the local server.
//!
//! The canonical text form prefixes the node id with optional `svr=` and
//! `nsu=` segments, the URI percent-encoded:
//! `svr=1;nsu=http%3A%2F%2Facme.com%2FPLC;s=Tank.Level`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, UaError};
use crate::nodeid::{Identifier, NodeId};

/// The reserved base protocol namespace URI (namespace index 0).
pub const BASE_NAMESPACE_URI: &str = "http://opcfoundation.org/UA/";


// =============================================================================
// ExpandedNodeId
// =============================================================================

/// A [`NodeId`] extended with an optional namespace URI and server index.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct ExpandedNodeId {
    /// The wrapped node id.
    pub node_id: NodeId,

    /// Explicit namespace URI; overrides the namespace index when
    /// present and non-empty.
    pub namespace_uri: Option<String>,

    /// Server index; 0 means the local server.
    pub server_index: u32,
}

/// Namespace identity of an expanded node id after normalization.
///
/// A present URI equal to [`BASE_NAMESPACE_URI`] normalizes to index 0,
/// so the two spellings of the base namespace compare and hash alike.
#[derive(PartialEq, Eq, Hash)]
enum NamespaceKey<'a> {
    Index(u16),
    Uri(&'a str),
}

impl ExpandedNodeId {
    /// Creates a local expanded node id with no explicit URI.
    #[inline]
    pub const fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            namespace_uri: None,
            server_index: 0,
        }
    }

    /// Returns the null expanded node id.
    #[inline]
    pub const fn null() -> Self {
        Self::new(NodeId::null())
    }

    /// Returns a copy with the given namespace URI.
    #[must_use]
    pub fn with_namespace_uri(mut self, uri: impl Into<String>) -> Self {
        self.namespace_uri = Some(uri.into());
        self
    }

    /// Returns a copy with the given server index.
    #[must_use]
    pub fn with_server_index(mut self, server_index: u32) -> Self {
        self.server_index = server_index;
        self
    }

    /// Returns `true` if this refers to the local server.
    #[inline]
    pub const fn is_local(&self) -> bool {
        self.server_index == 0
    }

    /// Returns `true` if this is the canonical null: local, no explicit
    /// URI, and a null node id.
    pub fn is_null(&self) -> bool {
        self.is_local()
            && matches!(self.namespace_key(), NamespaceKey::Index(0))
            && self.node_id.identifier.is_null()
    }

    /// Returns `true` if this expanded id denotes the same node as a
    /// plain [`NodeId`].
    ///
    /// Holds only when this id is local, its URI is absent or the base
    /// protocol namespace, and kind/namespace/value match. Symmetric
    /// with the `PartialEq<NodeId>` impls in both directions.
    pub fn equals_node_id(&self, other: &NodeId) -> bool {
        self.is_local()
            && self.namespace_key() == NamespaceKey::Index(other.namespace_index)
            && self.node_id.identifier == other.identifier
    }

    /// Resolves the explicit URI (if any) against a namespace table,
    /// yielding a plain index-based [`NodeId`].
    ///
    /// # Errors
    ///
    /// Fails if the URI is not present in the table.
    pub fn resolve(&self, table: &crate::namespace::NamespaceTable) -> Result<NodeId, UaError> {
        match self.namespace_key() {
            NamespaceKey::Index(index) => Ok(NodeId {
                namespace_index: index,
                identifier: self.node_id.identifier.clone(),
            }),
            NamespaceKey::Uri(uri) => {
                let index = table.index_of(uri).ok_or_else(|| {
                    ParseError::new("ExpandedNodeId", uri, "namespace URI not in table")
                })?;
                Ok(NodeId {
                    namespace_index: index,
                    identifier: self.node_id.identifier.clone(),
                })
            }
        }
    }

    fn namespace_key(&self) -> NamespaceKey<'_> {
        match self.namespace_uri.as_deref() {
            Some(uri) if !uri.is_empty() => {
                if uri == BASE_NAMESPACE_URI {
                    NamespaceKey::Index(0)
                } else {
                    NamespaceKey::Uri(uri)
                }
            }
            _ => NamespaceKey::Index(self.node_id.namespace_index),
        }
    }

    /// Renders the canonical text form.
    pub fn to_opc_string(&self) -> String {
        let mut out = String::new();
        if self.server_index != 0 {
            out.push_str(&format!("svr={};", self.server_index));
        }
        match self.namespace_uri.as_deref() {
            Some(uri) if !uri.is_empty() => {
                out.push_str("nsu=");
                out.push_str(&utf8_percent_encode(uri, NON_ALPHANUMERIC).to_string());
                out.push(';');
                out.push_str(&self.node_id.identifier.to_string());
            }
            _ => out.push_str(&self.node_id.to_opc_string()),
        }
        out
    }
}

impl PartialEq for ExpandedNodeId {
    /// Identity: server index, normalized namespace (URI overrides
    /// index), and identifier value.
    fn eq(&self, other: &Self) -> bool {
        self.server_index == other.server_index
            && self.namespace_key() == other.namespace_key()
            && self.node_id.identifier == other.node_id.identifier
    }
}

impl Hash for ExpandedNodeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.server_index.hash(state);
        self.namespace_key().hash(state);
        self.node_id.identifier.hash(state);
    }
}

impl PartialEq<NodeId> for ExpandedNodeId {
    fn eq(&self, other: &NodeId) -> bool {
        self.equals_node_id(other)
    }
}

impl PartialEq<ExpandedNodeId> for NodeId {
    fn eq(&self, other: &ExpandedNodeId) -> bool {
        other.equals_node_id(self)
    }
}

impl Default for ExpandedNodeId {
    fn default() -> Self {
        Self::null()
    }
}

impl From<NodeId> for ExpandedNodeId {
    fn from(node_id: NodeId) -> Self {
        Self::new(node_id)
    }
}

impl fmt::Display for ExpandedNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_opc_string())
    }
}

impl FromStr for ExpandedNodeId {
    type Err = UaError;

    /// Parses the canonical text form, accepting optional `svr=` and
    /// `nsu=` prefixes ahead of any plain node id form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s.trim();
        let mut server_index = 0u32;
        let mut namespace_uri = None;

        if let Some(tail) = rest.strip_prefix("svr=") {
            let (svr_str, tail) = tail
                .split_once(';')
                .ok_or_else(|| ParseError::new("ExpandedNodeId", s, "missing ';' after svr="))?;
            server_index = svr_str.parse().map_err(|_| {
                ParseError::new(
                    "ExpandedNodeId",
                    s,
                    format!("invalid server index {:?}", svr_str),
                )
            })?;
            rest = tail;
        }

        if let Some(tail) = rest.strip_prefix("nsu=") {
            let (uri_str, tail) = tail
                .split_once(';')
                .ok_or_else(|| ParseError::new("ExpandedNodeId", s, "missing ';' after nsu="))?;
            let uri = percent_decode_str(uri_str)
                .decode_utf8()
                .map_err(|_| {
                    ParseError::new("ExpandedNodeId", s, "namespace URI is not valid UTF-8")
                })?
                .into_owned();
            namespace_uri = Some(uri);
            rest = tail;
        }

        let node_id: NodeId = rest.parse()?;
        Ok(Self {
            node_id,
            namespace_uri,
            server_index,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn custom_uri() -> String {
        "http://acme.example/PLC;v2".to_string()
    }

    #[test]
    fn test_round_trip_uri_and_server_combinations() {
        let plain = ExpandedNodeId::new(NodeId::numeric(2, 1001));
        let with_svr = plain.clone().with_server_index(3);
        let with_uri = ExpandedNodeId::new(NodeId::numeric(0, 1001)).with_namespace_uri(custom_uri());
        let with_both = with_uri.clone().with_server_index(7);

        for id in [&plain, &with_svr, &with_uri, &with_both] {
            let rendered = id.to_opc_string();
            let parsed: ExpandedNodeId = rendered.parse().unwrap();
            assert_eq!(&parsed, id, "round-trip failed for {}", rendered);
        }
    }

    #[test]
    fn test_text_forms() {
        let id = ExpandedNodeId::new(NodeId::string(0, "Tank").unwrap())
            .with_namespace_uri("http://a/b;c")
            .with_server_index(1);
        let rendered = id.to_opc_string();
        assert!(rendered.starts_with("svr=1;nsu=http%3A%2F%2Fa%2Fb%3Bc;"), "{}", rendered);
        assert!(rendered.ends_with("s=Tank"));

        let local = ExpandedNodeId::new(NodeId::numeric(2, 5));
        assert_eq!(local.to_opc_string(), "ns=2;i=5");
    }

    #[test]
    fn test_uri_overrides_namespace_index() {
        let a = ExpandedNodeId::new(NodeId::numeric(5, 42)).with_namespace_uri(custom_uri());
        let b = ExpandedNodeId::new(NodeId::numeric(9, 42)).with_namespace_uri(custom_uri());
        assert_eq!(a, b);

        let c = ExpandedNodeId::new(NodeId::numeric(5, 42));
        assert_ne!(a, c);
    }

    #[test]
    fn test_base_uri_normalizes_to_index_zero() {
        let spelled = ExpandedNodeId::new(NodeId::numeric(0, 84)).with_namespace_uri(BASE_NAMESPACE_URI);
        let plain = ExpandedNodeId::new(NodeId::numeric(0, 84));
        assert_eq!(spelled, plain);
        assert!(spelled.equals_node_id(&NodeId::numeric(0, 84)));
    }

    #[test]
    fn test_node_id_equality_both_directions() {
        let node = NodeId::numeric(2, 1001);
        let local = ExpandedNodeId::new(node.clone());
        assert_eq!(local, node);
        assert_eq!(node, local);

        let remote = local.clone().with_server_index(1);
        assert!(remote != node);
        assert!(node != remote);

        let foreign = local.with_namespace_uri(custom_uri());
        assert!(foreign != node);
        assert!(node != foreign);
    }

    #[test]
    fn test_null() {
        assert!(ExpandedNodeId::null().is_null());
        assert!(!ExpandedNodeId::new(NodeId::numeric(0, 1)).is_null());
        assert!(!ExpandedNodeId::null().with_server_index(1).is_null());
    }

    #[test]
    fn test_resolve_against_table() {
        use crate::namespace::NamespaceTable;

        let mut table = NamespaceTable::new();
        let index = table.add_or_get(&custom_uri());

        let id = ExpandedNodeId::new(NodeId::numeric(0, 7)).with_namespace_uri(custom_uri());
        let resolved = id.resolve(&table).unwrap();
        assert_eq!(resolved, NodeId::numeric(index, 7));

        let unknown = ExpandedNodeId::new(NodeId::numeric(0, 7)).with_namespace_uri("http://nope/");
        assert!(unknown.resolve(&table).is_err());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("svr=1".parse::<ExpandedNodeId>().is_err());
        assert!("svr=x;i=1".parse::<ExpandedNodeId>().is_err());
        assert!("nsu=http%3A%2F%2Fa".parse::<ExpandedNodeId>().is_err());
        assert!("svr=1;nsu=http%3A%2F%2Fa;x=1".parse::<ExpandedNodeId>().is_err());
    }
}
