// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # forge-types
//!
//! Foundational value/type layer of the FORGE OPC UA protocol stack.
//!
//! Every protocol message a server or client exchanges is composed from
//! the 25 builtin data types defined here, together with the identity,
//! comparison, and (de)serialization contracts those types must obey:
//!
//! - **Identifiers**: [`NodeId`] (four identifier kinds) and
//!   [`ExpandedNodeId`] (namespace-URI and server-index indirection)
//! - **Values**: unsigned wrappers, [`ByteString`], [`DateTime`],
//!   [`QualifiedName`], [`LocalizedText`], [`XmlElement`]
//! - **Results**: [`StatusCode`] (packed 32-bit result) and
//!   [`DiagnosticInfo`] with its explicit [`StringTable`]
//! - **Containers**: [`Variant`] (scalar or rectangular N-D array of one
//!   kind), [`ExtensionObject`] (encoded-or-decoded structures), and
//!   [`DataValue`] (value + quality + timestamps)
//! - **Registry**: [`BuiltinTypeId`] / [`BuiltinsMap`], the bijection
//!   between wire ids, canonical nodes, and runtime shapes
//! - **Codec**: per-type binary primitives ([`encoding::UaEncodable`])
//!   with exact byte-length calculation and cursor-based encode/decode
//!
//! All types are immutable value objects; none requires synchronization
//! for reads. No operation here blocks, performs I/O, or suspends.
//! Sessions, transport framing, and security belong to the surrounding
//! stack, which consumes this crate.
//!
//! ## Example
//!
//! ```
//! use forge_types::prelude::*;
//!
//! let node: NodeId = "ns=2;s=Tank.Level".parse().unwrap();
//! let value = DataValue::new(Variant::from(25.5f64))
//!     .with_source_timestamp(DateTime::now());
//!
//! let bytes = forge_types::encoding::encode_to_vec(&value).unwrap();
//! let back: DataValue = forge_types::encoding::decode_from_slice(&bytes).unwrap();
//! assert_eq!(back, value);
//! # let _ = node;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Core Modules
// =============================================================================

pub mod error;
pub mod numeric;
pub mod bytestring;
pub mod datetime;

// =============================================================================
// Identifier Modules
// =============================================================================

pub mod nodeid;
pub mod expanded;
pub mod namespace;

// =============================================================================
// Value Modules
// =============================================================================

pub mod names;
pub mod status;
pub mod diagnostic;
pub mod builtins;
pub mod variant;
pub mod extension;
pub mod data_value;

// =============================================================================
// Codec
// =============================================================================

pub mod encoding;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use builtins::{BuiltinTypeId, BuiltinsMap, TypeForm};
pub use bytestring::ByteString;
pub use data_value::DataValue;
pub use datetime::{DateTime, DateTimeFormat, SecondsPrecision};
pub use diagnostic::{DiagnosticInfo, StringTable};
pub use error::{UaError, UaResult};
pub use expanded::ExpandedNodeId;
pub use extension::{ExtensionBody, ExtensionObject, TargetEncoding, TypeRegistry, UaStructure};
pub use names::{LocalizedText, QualifiedName, XmlElement};
pub use namespace::{NamespaceTable, ServerTable};
pub use nodeid::{Identifier, NodeId};
pub use numeric::{UInt16, UInt32, UInt64, UInt8};
pub use status::{Severity, StatusCode};
pub use variant::{Array, UaEnum, Variant};

/// Convenience prelude importing the types every consumer touches.
pub mod prelude {
    pub use crate::builtins::{BuiltinTypeId, BuiltinsMap, TypeForm};
    pub use crate::bytestring::ByteString;
    pub use crate::data_value::DataValue;
    pub use crate::datetime::{DateTime, DateTimeFormat};
    pub use crate::diagnostic::{DiagnosticInfo, StringTable};
    pub use crate::encoding::UaEncodable;
    pub use crate::error::{UaError, UaResult};
    pub use crate::expanded::ExpandedNodeId;
    pub use crate::extension::{ExtensionObject, TargetEncoding, TypeRegistry, UaStructure};
    pub use crate::names::{LocalizedText, QualifiedName, XmlElement};
    pub use crate::namespace::{NamespaceTable, ServerTable};
    pub use crate::nodeid::NodeId;
    pub use crate::numeric::{UInt16, UInt32, UInt64, UInt8};
    pub use crate::status::StatusCode;
    pub use crate::variant::{UaEnum, Variant};
}
