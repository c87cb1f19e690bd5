// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Polymorphic structure container.
//!
//! An [`ExtensionObject`] carries a structured value of a type this layer
//! does not know, tagged with the [`ExpandedNodeId`] of its declared
//! type. The payload is in exactly one of three states: a raw XML
//! fragment, a raw binary body, or an already-decoded value behind the
//! [`UaStructure`] trait. Structural decoding is deferred until a
//! [`TypeRegistry`] is available; an unregistered type identifier is a
//! decode error, never a silent pass-through.
//!
//! Equality and hashing operate on the still-encoded representation plus
//! the type identifier: two payloads that are semantically equal but
//! differently encoded are not guaranteed equal. The hash is computed
//! once behind a `OnceLock` (compute-once, then lock-free reads).

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::bytestring::ByteString;
use crate::encoding::{ReadCursor, WriteCursor};
use crate::error::{EncodingError, UaError};
use crate::expanded::ExpandedNodeId;
use crate::names::XmlElement;
use crate::namespace::NamespaceTable;

// =============================================================================
// UaStructure
// =============================================================================

/// A decoded structured value.
///
/// Implemented by every shape the serializer registry can produce. The
/// trait is object-safe; decoded payloads travel as `Arc<dyn UaStructure>`.
pub trait UaStructure: fmt::Debug + Send + Sync {
    /// Returns the binary-encoding type identifier of this structure.
    fn type_id(&self) -> ExpandedNodeId;

    /// Returns the exact binary body length in bytes.
    fn byte_length(&self) -> usize;

    /// Encodes the binary body.
    ///
    /// # Errors
    ///
    /// Fails if the cursor runs out of space.
    fn encode_body(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError>;

    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// Encodes a structure's binary body into a fresh buffer.
fn encode_structure_body(value: &dyn UaStructure) -> Result<Vec<u8>, UaError> {
    let mut buffer = vec![0u8; value.byte_length()];
    let mut cursor = WriteCursor::new(&mut buffer);
    value.encode_body(&mut cursor)?;
    Ok(buffer)
}

// =============================================================================
// Registry Traits
// =============================================================================

/// A decodable shape resolved from a [`TypeRegistry`].
pub trait DecodableType: Send + Sync {
    /// Constructs the default (empty) instance of the shape.
    fn new_default(&self) -> Arc<dyn UaStructure>;

    /// Decodes the binary body of the shape.
    ///
    /// # Errors
    ///
    /// Fails on malformed body content.
    fn decode_binary(&self, cursor: &mut ReadCursor<'_>) -> Result<Arc<dyn UaStructure>, UaError>;

    /// Decodes an XML body of the shape.
    ///
    /// XML decoding is unsupported unless a shape opts in.
    ///
    /// # Errors
    ///
    /// The default implementation fails with an unsupported-encoding
    /// error.
    fn decode_xml(&self, _xml: &XmlElement) -> Result<Arc<dyn UaStructure>, UaError> {
        Err(EncodingError::unsupported_encoding("xml", "registry shape").into())
    }
}

/// Maps type identifiers to decodable shapes.
///
/// Supplied by the serializer registry outside this crate; this layer
/// only consumes it.
pub trait TypeRegistry: Send + Sync {
    /// Resolves a type identifier to its shape, `None` when unregistered.
    fn resolve(&self, type_id: &ExpandedNodeId) -> Option<&dyn DecodableType>;
}

// =============================================================================
// ExtensionObject
// =============================================================================

/// Target encoding for building an [`ExtensionObject`] from a decoded
/// structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetEncoding {
    /// The binary wire encoding.
    Binary,

    /// The XML encoding. Frequently unsupported; encoding fails with a
    /// clear error rather than attempting partial output.
    Xml,
}

/// The payload state of an [`ExtensionObject`].
#[derive(Debug, Clone)]
pub enum ExtensionBody {
    /// No payload.
    None,

    /// Raw binary body, not yet decoded.
    Binary(ByteString),

    /// Raw XML body, not yet decoded.
    Xml(XmlElement),

    /// Already-decoded structured value.
    Decoded(Arc<dyn UaStructure>),
}

/// A structured value stored encoded (binary or XML) or decoded,
/// resolved through a type registry.
#[derive(Debug, Clone)]
pub struct ExtensionObject {
    type_id: ExpandedNodeId,
    body: ExtensionBody,
    cached_hash: OnceLock<u64>,
}

impl ExtensionObject {
    /// Creates an extension object of a known type with no payload.
    pub fn new(type_id: ExpandedNodeId) -> Self {
        Self {
            type_id,
            body: ExtensionBody::None,
            cached_hash: OnceLock::new(),
        }
    }

    /// Returns the null extension object: null type id, no body.
    pub fn null() -> Self {
        Self::new(ExpandedNodeId::null())
    }

    /// Creates an extension object from a raw binary body.
    pub fn from_binary(type_id: ExpandedNodeId, body: ByteString) -> Self {
        Self {
            type_id,
            body: ExtensionBody::Binary(body),
            cached_hash: OnceLock::new(),
        }
    }

    /// Creates an extension object from a raw XML body.
    pub fn from_xml(type_id: ExpandedNodeId, body: XmlElement) -> Self {
        Self {
            type_id,
            body: ExtensionBody::Xml(body),
            cached_hash: OnceLock::new(),
        }
    }

    /// Wraps an already-decoded structure without re-encoding it.
    pub fn from_decoded(value: Arc<dyn UaStructure>) -> Self {
        Self {
            type_id: UaStructure::type_id(value.as_ref()),
            body: ExtensionBody::Decoded(value),
            cached_hash: OnceLock::new(),
        }
    }

    /// Builds an extension object by encoding a structure into the
    /// selected target encoding.
    ///
    /// # Errors
    ///
    /// Fails with an unsupported-encoding error for
    /// [`TargetEncoding::Xml`], or with an encode error if the
    /// structure cannot serialize itself.
    pub fn encode_from(
        value: &dyn UaStructure,
        encoding: TargetEncoding,
    ) -> Result<Self, UaError> {
        match encoding {
            TargetEncoding::Binary => {
                let body = encode_structure_body(value)?;
                Ok(Self::from_binary(value.type_id(), ByteString::new(body)))
            }
            TargetEncoding::Xml => Err(EncodingError::unsupported_encoding(
                "xml",
                value.type_id().to_opc_string(),
            )
            .into()),
        }
    }

    /// Returns the declared type identifier.
    #[inline]
    pub fn type_id(&self) -> &ExpandedNodeId {
        &self.type_id
    }

    /// Returns the payload state.
    #[inline]
    pub fn body(&self) -> &ExtensionBody {
        &self.body
    }

    /// Returns `true` if the payload has already been decoded.
    #[inline]
    pub fn is_decoded(&self) -> bool {
        matches!(self.body, ExtensionBody::Decoded(_))
    }

    /// Returns `true` if there is no payload.
    #[inline]
    pub fn is_empty_body(&self) -> bool {
        matches!(self.body, ExtensionBody::None)
    }

    /// Decodes the payload through a type registry.
    ///
    /// - An absent payload yields the registry shape's default instance.
    /// - A binary or XML payload is decoded field-by-field by the shape.
    /// - An already-decoded payload is returned as-is.
    ///
    /// When the type identifier carries a namespace URI and a namespace
    /// table is supplied, an index-resolved identifier is tried against
    /// the registry as well.
    ///
    /// # Errors
    ///
    /// Fails with an unknown-type error when the registry has no entry,
    /// and with the shape's decode error on malformed bodies.
    pub fn decode(
        &self,
        registry: &dyn TypeRegistry,
        namespaces: Option<&NamespaceTable>,
    ) -> Result<Arc<dyn UaStructure>, UaError> {
        if let ExtensionBody::Decoded(value) = &self.body {
            return Ok(Arc::clone(value));
        }

        let shape = self.resolve_shape(registry, namespaces).ok_or_else(|| {
            debug!(type_id = %self.type_id, "extension object type not registered");
            EncodingError::unknown_type(&self.type_id)
        })?;

        match &self.body {
            ExtensionBody::None => Ok(shape.new_default()),
            ExtensionBody::Binary(bytes) => {
                let mut cursor = ReadCursor::new(bytes.as_slice());
                shape.decode_binary(&mut cursor)
            }
            ExtensionBody::Xml(xml) => shape.decode_xml(xml),
            ExtensionBody::Decoded(value) => Ok(Arc::clone(value)),
        }
    }

    fn resolve_shape<'r>(
        &self,
        registry: &'r dyn TypeRegistry,
        namespaces: Option<&NamespaceTable>,
    ) -> Option<&'r dyn DecodableType> {
        if let Some(shape) = registry.resolve(&self.type_id) {
            return Some(shape);
        }
        let table = namespaces?;
        let resolved = self.type_id.resolve(table).ok()?;
        registry.resolve(&ExpandedNodeId::new(resolved))
    }

    /// Returns the encoded body bytes used for identity, if any.
    ///
    /// Binary bodies return their bytes directly; decoded bodies are
    /// re-encoded on the fly. XML and absent bodies return `None`.
    fn identity_bytes(&self) -> Option<Vec<u8>> {
        match &self.body {
            ExtensionBody::Binary(bytes) => Some(bytes.to_vec()),
            ExtensionBody::Decoded(value) => encode_structure_body(value.as_ref()).ok(),
            _ => None,
        }
    }

    /// Computes (once) and returns the memoized identity hash.
    fn identity_hash(&self) -> u64 {
        *self.cached_hash.get_or_init(|| {
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            self.type_id.hash(&mut hasher);
            match &self.body {
                ExtensionBody::None => 0u8.hash(&mut hasher),
                ExtensionBody::Binary(_) | ExtensionBody::Decoded(_) => {
                    1u8.hash(&mut hasher);
                    self.identity_bytes().hash(&mut hasher);
                }
                ExtensionBody::Xml(xml) => {
                    2u8.hash(&mut hasher);
                    xml.as_str().hash(&mut hasher);
                }
            }
            hasher.finish()
        })
    }
}

impl PartialEq for ExtensionObject {
    /// Identity over the type id plus the still-encoded representation.
    ///
    /// A decoded body compares by its re-encoded binary form, so a
    /// decoded value and its own binary encoding are equal; semantically
    /// equal but differently encoded payloads are not.
    fn eq(&self, other: &Self) -> bool {
        if self.type_id != other.type_id {
            return false;
        }
        match (&self.body, &other.body) {
            (ExtensionBody::None, ExtensionBody::None) => true,
            (ExtensionBody::Xml(a), ExtensionBody::Xml(b)) => a == b,
            (
                ExtensionBody::Binary(_) | ExtensionBody::Decoded(_),
                ExtensionBody::Binary(_) | ExtensionBody::Decoded(_),
            ) => match (self.identity_bytes(), other.identity_bytes()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
            _ => false,
        }
    }
}

impl Eq for ExtensionObject {}

impl Hash for ExtensionObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity_hash().hash(state);
    }
}

impl Default for ExtensionObject {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Display for ExtensionObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.body {
            ExtensionBody::None => "empty",
            ExtensionBody::Binary(_) => "binary",
            ExtensionBody::Xml(_) => "xml",
            ExtensionBody::Decoded(_) => "decoded",
        };
        write!(f, "ExtensionObject({}, {})", self.type_id, state)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodeid::NodeId;

    /// Minimal structure used across the tests: a pair of 32-bit words.
    #[derive(Debug, PartialEq)]
    struct Pair {
        a: i32,
        b: i32,
    }

    impl Pair {
        const TYPE: u32 = 9001;
    }

    impl UaStructure for Pair {
        fn type_id(&self) -> ExpandedNodeId {
            ExpandedNodeId::new(NodeId::numeric(2, Pair::TYPE))
        }

        fn byte_length(&self) -> usize {
            8
        }

        fn encode_body(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError> {
            cursor.write_i32(self.a)?;
            cursor.write_i32(self.b)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct PairType;

    impl DecodableType for PairType {
        fn new_default(&self) -> Arc<dyn UaStructure> {
            Arc::new(Pair { a: 0, b: 0 })
        }

        fn decode_binary(
            &self,
            cursor: &mut ReadCursor<'_>,
        ) -> Result<Arc<dyn UaStructure>, UaError> {
            let a = cursor.read_i32()?;
            let b = cursor.read_i32()?;
            Ok(Arc::new(Pair { a, b }))
        }
    }

    struct PairRegistry;

    impl TypeRegistry for PairRegistry {
        fn resolve(&self, type_id: &ExpandedNodeId) -> Option<&dyn DecodableType> {
            if *type_id == ExpandedNodeId::new(NodeId::numeric(2, Pair::TYPE)) {
                Some(&PairType)
            } else {
                None
            }
        }
    }

    fn downcast_pair(value: &Arc<dyn UaStructure>) -> &Pair {
        value.as_any().downcast_ref::<Pair>().unwrap()
    }

    #[test]
    fn test_registry_miss_is_decode_error() {
        let obj = ExtensionObject::from_binary(
            ExpandedNodeId::new(NodeId::numeric(2, 4242)),
            ByteString::from_slice(&[0; 8]),
        );
        let err = obj.decode(&PairRegistry, None).unwrap_err();
        assert!(matches!(
            err,
            UaError::Encoding(EncodingError::UnknownType { .. })
        ));
    }

    #[test]
    fn test_binary_body_decodes_through_registry() {
        let pair = Pair { a: 7, b: -3 };
        let obj = ExtensionObject::encode_from(&pair, TargetEncoding::Binary).unwrap();
        assert!(!obj.is_decoded());

        let decoded = obj.decode(&PairRegistry, None).unwrap();
        assert_eq!(downcast_pair(&decoded), &pair);
    }

    #[test]
    fn test_absent_body_yields_default_instance() {
        let obj = ExtensionObject {
            type_id: ExpandedNodeId::new(NodeId::numeric(2, Pair::TYPE)),
            body: ExtensionBody::None,
            cached_hash: OnceLock::new(),
        };
        let decoded = obj.decode(&PairRegistry, None).unwrap();
        assert_eq!(downcast_pair(&decoded), &Pair { a: 0, b: 0 });
    }

    #[test]
    fn test_xml_decode_unsupported_by_default() {
        let obj = ExtensionObject::from_xml(
            ExpandedNodeId::new(NodeId::numeric(2, Pair::TYPE)),
            XmlElement::new("<Pair/>"),
        );
        let err = obj.decode(&PairRegistry, None).unwrap_err();
        assert!(matches!(
            err,
            UaError::Encoding(EncodingError::UnsupportedEncoding { .. })
        ));
    }

    #[test]
    fn test_xml_target_encoding_fails_clearly() {
        let pair = Pair { a: 1, b: 2 };
        let err = ExtensionObject::encode_from(&pair, TargetEncoding::Xml).unwrap_err();
        assert!(err.to_string().contains("unsupported xml encoding"));
    }

    #[test]
    fn test_equality_on_encoded_representation() {
        let pair = Pair { a: 7, b: -3 };
        let encoded = ExtensionObject::encode_from(&pair, TargetEncoding::Binary).unwrap();
        let decoded_form = ExtensionObject::from_decoded(Arc::new(Pair { a: 7, b: -3 }));

        // A decoded body and its binary encoding are the same identity.
        assert_eq!(encoded, decoded_form);

        let other = ExtensionObject::encode_from(&Pair { a: 7, b: 4 }, TargetEncoding::Binary)
            .unwrap();
        assert_ne!(encoded, other);

        // Same bytes under a different type id are distinct.
        let retagged = ExtensionObject::from_binary(
            ExpandedNodeId::new(NodeId::numeric(2, 4242)),
            match encoded.body() {
                ExtensionBody::Binary(b) => b.clone(),
                _ => unreachable!(),
            },
        );
        assert_ne!(encoded, retagged);
    }

    #[test]
    fn test_hash_is_memoized_and_consistent() {
        use std::collections::hash_map::DefaultHasher;

        let pair = Pair { a: 7, b: -3 };
        let encoded = ExtensionObject::encode_from(&pair, TargetEncoding::Binary).unwrap();
        let decoded_form = ExtensionObject::from_decoded(Arc::new(Pair { a: 7, b: -3 }));

        let hash_of = |obj: &ExtensionObject| {
            let mut h = DefaultHasher::new();
            obj.hash(&mut h);
            h.finish()
        };

        // Equal objects hash equal, and repeated hashing is stable.
        assert_eq!(hash_of(&encoded), hash_of(&decoded_form));
        assert_eq!(hash_of(&encoded), hash_of(&encoded));
    }

    #[test]
    fn test_decode_resolves_uri_through_namespace_table() {
        let mut table = NamespaceTable::new();
        let uri = "http://acme.example/types";
        let index = table.add_or_get(uri);
        assert_eq!(index, 1);

        // Register under the index form, present the URI form.
        struct IndexRegistry;
        impl TypeRegistry for IndexRegistry {
            fn resolve(&self, type_id: &ExpandedNodeId) -> Option<&dyn DecodableType> {
                if *type_id == ExpandedNodeId::new(NodeId::numeric(1, Pair::TYPE)) {
                    Some(&PairType)
                } else {
                    None
                }
            }
        }

        let obj = ExtensionObject::from_binary(
            ExpandedNodeId::new(NodeId::numeric(0, Pair::TYPE)).with_namespace_uri(uri),
            ByteString::from_slice(&[1, 0, 0, 0, 2, 0, 0, 0]),
        );
        assert!(obj.decode(&IndexRegistry, None).is_err());
        let decoded = obj.decode(&IndexRegistry, Some(&table)).unwrap();
        assert_eq!(downcast_pair(&decoded), &Pair { a: 1, b: 2 });
    }
}
