// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Type Contract Tests
//!
//! Cross-module checks of the identity, null, conversion, and isolation
//! contracts the builtin types promise to the rest of the stack.
//!
//! # Running
//!
//! ```bash
//! cargo test -p forge-types --test type_contracts
//! ```

use forge_types::prelude::*;
use forge_types::variant::Variant;
use uuid::Uuid;

// =============================================================================
// Identifier Contracts
// =============================================================================

#[test]
fn test_text_round_trip_every_identifier_kind() {
    let guid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
    let node_ids = [
        NodeId::numeric(0, 0),
        NodeId::numeric(7, 42),
        NodeId::string(1, "Plant/Area 3;Pump").unwrap(),
        NodeId::guid(2, guid),
        NodeId::opaque(3, vec![0u8, 255, 128]).unwrap(),
    ];
    for id in &node_ids {
        let reparsed: NodeId = id.to_opc_string().parse().unwrap();
        assert_eq!(&reparsed, id);
    }

    for server_index in [0u32, 5] {
        for uri in [None, Some("http://acme.example/ns;1")] {
            let mut expanded = ExpandedNodeId::new(NodeId::numeric(4, 77));
            if let Some(uri) = uri {
                expanded = expanded.with_namespace_uri(uri);
            }
            let expanded = expanded.with_server_index(server_index);
            let reparsed: ExpandedNodeId = expanded.to_opc_string().parse().unwrap();
            assert_eq!(reparsed, expanded);
        }
    }
}

#[test]
fn test_null_canon_is_recognized_for_all_kinds() {
    assert!(NodeId::numeric(0, 0).is_null());
    assert!(NodeId::string(0, "").unwrap().is_null());
    assert!(NodeId::guid(0, Uuid::nil()).is_null());
    assert!(NodeId::opaque(0, Vec::new()).unwrap().is_null());
    assert!(NodeId::is_null_or_none(None));

    // Null references compare equal to canonical null.
    assert_eq!(NodeId::null(), NodeId::default());
    assert!(ExpandedNodeId::null().is_null());
}

// =============================================================================
// Variant Contracts
// =============================================================================

#[test]
fn test_variant_homogeneity_and_shape() {
    // Ragged: 5 elements cannot be 2x3.
    let five: Vec<Variant> = (0..5).map(Variant::Int32).collect();
    assert!(Variant::multi_array(BuiltinTypeId::Int32, five, vec![2, 3]).is_err());

    // Mixed kinds fail.
    assert!(Variant::array(
        BuiltinTypeId::Int32,
        vec![Variant::Int32(1), Variant::Double(2.0)],
    )
    .is_err());

    // Rank 0 (scalar), 1, and 2 all construct and preserve shape.
    let scalar = Variant::from(9i32);
    assert!(!scalar.is_array());

    let vector = Variant::from(vec![1i32, 2, 3]);
    assert_eq!(vector.as_array().unwrap().rank(), 1);

    let six: Vec<Variant> = (0..6).map(Variant::Int32).collect();
    let matrix = Variant::multi_array(BuiltinTypeId::Int32, six, vec![3, 2]).unwrap();
    assert_eq!(matrix.as_array().unwrap().dimensions(), &[3, 2]);
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ValveCommand {
    Close,
    Open,
}

impl UaEnum for ValveCommand {
    fn repr(&self) -> i32 {
        match self {
            ValveCommand::Close => 0,
            ValveCommand::Open => 1,
        }
    }

    fn from_repr(repr: i32) -> Option<Self> {
        match repr {
            0 => Some(ValveCommand::Close),
            1 => Some(ValveCommand::Open),
            _ => None,
        }
    }
}

#[test]
fn test_variant_enum_and_byte_buffer_conversions() {
    // An enumeration member equal to integer 0 stores as Int32 0.
    let closed = Variant::from_enum(&ValveCommand::Close);
    assert_eq!(closed.element_kind(), Some(BuiltinTypeId::Int32));
    assert_eq!(closed, Variant::Int32(0));

    // A raw byte buffer equals the directly constructed byte string.
    let from_buffer = Variant::from(vec![1u8, 2, 3]);
    let direct = Variant::ByteString(ByteString::from_slice(&[1, 2, 3]));
    assert_eq!(from_buffer.element_kind(), Some(BuiltinTypeId::ByteString));
    assert_eq!(from_buffer, direct);
}

// =============================================================================
// StatusCode Contracts
// =============================================================================

#[test]
fn test_status_code_mask_properties() {
    assert!(StatusCode::from_bits(0x8000_0000).is_bad());
    assert!(!StatusCode::from_bits(0x8000_0000).is_good());
    assert!(StatusCode::from_bits(0x0000_0000).is_good());

    // Codes differing only in the low 10 info bits: unequal under full
    // equality, equal under condition equality.
    let base = StatusCode::from_bits(0x8074_0000);
    let flagged = StatusCode::from_bits(0x8074_0281);
    assert_ne!(base, flagged);
    assert!(base.equals_condition(flagged));
}

// =============================================================================
// Numeric & ByteString Contracts
// =============================================================================

#[test]
fn test_unsigned_construction_and_text_round_trip() {
    assert!(UInt8::from_i64(256).is_err());
    let max = UInt8::from_i64(255).unwrap();
    let reparsed: UInt8 = max.to_string().parse().unwrap();
    assert_eq!(reparsed, max);
}

#[test]
fn test_bytestring_copy_isolation() {
    let mut source = vec![1u8, 2, 3];
    let stored = ByteString::from_slice(&source);

    source[0] = 9;
    assert_eq!(stored.as_slice(), &[1, 2, 3]);

    let mut returned = stored.to_vec();
    returned[0] = 9;
    assert_eq!(stored.as_slice(), &[1, 2, 3]);
}

// =============================================================================
// Cross-Type Identity
// =============================================================================

#[test]
fn test_node_id_expanded_equality_agrees_in_both_directions() {
    let node = NodeId::string(2, "Mixer").unwrap();
    let local = ExpandedNodeId::new(node.clone());
    let remote = local.clone().with_server_index(9);

    assert!(local == node && node == local);
    assert!(remote != node && node != remote);
}

#[test]
fn test_builtins_map_is_shared_and_consistent() {
    let map = BuiltinsMap::global();
    // Same table on repeated access.
    assert!(std::ptr::eq(map, BuiltinsMap::global()));

    for kind in BuiltinTypeId::ALL {
        assert_eq!(map.kind_of_node_id(&map.node_id_of(kind)), Some(kind));
    }
}
