// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Codec Integration Tests
//!
//! These tests stand in for the generic wire codec that consumes this
//! crate: a mock codec walks a message's declared field list and calls
//! the per-type primitives (`byte_length`, `encode`, `decode`) exactly
//! the way the real one does, and a mock type registry backs the
//! `ExtensionObject` decode path.
//!
//! # Running
//!
//! ```bash
//! cargo test -p forge-types --test codec_integration
//! ```

use std::any::Any;
use std::sync::Arc;

use forge_types::encoding::{ReadCursor, UaEncodable, WriteCursor};
use forge_types::extension::DecodableType;
use forge_types::prelude::*;
use forge_types::variant::Variant;

// =============================================================================
// Mock Codec
// =============================================================================

/// A stand-in for the generic message codec: encodes a field list into
/// one buffer pre-sized from the exact byte lengths, then decodes it
/// back field by field.
struct MockCodec;

impl MockCodec {
    fn encode_message<T: UaEncodable>(fields: &[T]) -> Result<Vec<u8>, UaError> {
        let total: usize = fields.iter().map(UaEncodable::byte_length).sum();
        let mut buffer = vec![0u8; total];
        let mut cursor = WriteCursor::new(&mut buffer);
        for field in fields {
            field.encode(&mut cursor)?;
        }
        assert_eq!(cursor.offset(), total, "pre-sized length must be exact");
        Ok(buffer)
    }

    fn decode_message<T: UaEncodable>(data: &[u8], count: usize) -> Result<Vec<T>, UaError> {
        let mut cursor = ReadCursor::new(data);
        let mut fields = Vec::with_capacity(count);
        for _ in 0..count {
            fields.push(T::decode(&mut cursor)?);
        }
        assert_eq!(cursor.remaining(), 0, "message must consume fully");
        Ok(fields)
    }
}

// =============================================================================
// Mock Structure & Registry
// =============================================================================

/// A server-status structure as the registry would model it.
#[derive(Debug, PartialEq)]
struct ServerStatus {
    state: i32,
    uptime_seconds: u32,
}

impl ServerStatus {
    const TYPE_NODE: u32 = 8801;

    fn type_node_id() -> ExpandedNodeId {
        ExpandedNodeId::new(NodeId::numeric(3, Self::TYPE_NODE))
    }
}

impl UaStructure for ServerStatus {
    fn type_id(&self) -> ExpandedNodeId {
        Self::type_node_id()
    }

    fn byte_length(&self) -> usize {
        8
    }

    fn encode_body(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError> {
        cursor.write_i32(self.state)?;
        cursor.write_u32(self.uptime_seconds)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct ServerStatusType;

impl DecodableType for ServerStatusType {
    fn new_default(&self) -> Arc<dyn UaStructure> {
        Arc::new(ServerStatus {
            state: 0,
            uptime_seconds: 0,
        })
    }

    fn decode_binary(&self, cursor: &mut ReadCursor<'_>) -> Result<Arc<dyn UaStructure>, UaError> {
        let state = cursor.read_i32()?;
        let uptime_seconds = cursor.read_u32()?;
        Ok(Arc::new(ServerStatus {
            state,
            uptime_seconds,
        }))
    }
}

/// Registry knowing exactly one type.
struct MockRegistry;

impl TypeRegistry for MockRegistry {
    fn resolve(&self, type_id: &ExpandedNodeId) -> Option<&dyn DecodableType> {
        if *type_id == ServerStatus::type_node_id() {
            Some(&ServerStatusType)
        } else {
            None
        }
    }
}

// =============================================================================
// End-to-End
// =============================================================================

#[test]
fn test_matrix_data_value_end_to_end() {
    let values: Vec<Variant> = [1i32, 2, 3, 4].iter().copied().map(Variant::Int32).collect();
    let matrix = Variant::multi_array(BuiltinTypeId::Int32, values, vec![2, 2]).unwrap();
    let timestamp = DateTime::parse("2025-06-01T08:30:00Z").unwrap();

    let original = DataValue::new(matrix)
        .with_status(StatusCode::GOOD)
        .with_source_timestamp(timestamp);

    let wire = MockCodec::encode_message(std::slice::from_ref(&original)).unwrap();
    let decoded: Vec<DataValue> = MockCodec::decode_message(&wire, 1).unwrap();

    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0], original);

    let back = decoded[0].value.as_ref().unwrap().as_array().unwrap();
    assert_eq!(back.dimensions(), &[2, 2]);
    assert_eq!(back.values()[3], Variant::Int32(4));
    assert_eq!(decoded[0].status(), StatusCode::GOOD);
    assert_eq!(decoded[0].source_timestamp, Some(timestamp));
}

#[test]
fn test_multi_field_message_walk() {
    let fields = vec![
        Variant::from("conveyor-7"),
        Variant::NodeId(NodeId::string(2, "Line.Speed").unwrap()),
        Variant::from(vec![0.5f64, 0.75, 1.0]),
        Variant::StatusCode(StatusCode::GOOD.with_overflow(true)),
    ];

    let wire = MockCodec::encode_message(&fields).unwrap();
    let decoded: Vec<Variant> = MockCodec::decode_message(&wire, fields.len()).unwrap();
    assert_eq!(decoded, fields);
}

#[test]
fn test_extension_object_through_registry() {
    let status = ServerStatus {
        state: 1,
        uptime_seconds: 86_400,
    };

    // Encode side: structure -> extension object -> wire.
    let obj = ExtensionObject::encode_from(&status, TargetEncoding::Binary).unwrap();
    let wire = MockCodec::encode_message(std::slice::from_ref(&obj)).unwrap();

    // Decode side: wire -> extension object (still encoded) -> registry.
    let decoded_objs: Vec<ExtensionObject> = MockCodec::decode_message(&wire, 1).unwrap();
    let decoded = decoded_objs[0].decode(&MockRegistry, None).unwrap();
    let concrete = decoded.as_any().downcast_ref::<ServerStatus>().unwrap();
    assert_eq!(concrete, &status);
}

#[test]
fn test_registry_miss_is_an_error_not_a_null() {
    let stranger = ExtensionObject::from_binary(
        ExpandedNodeId::new(NodeId::numeric(3, 4040)),
        ByteString::from_slice(&[0u8; 8]),
    );
    let wire = MockCodec::encode_message(std::slice::from_ref(&stranger)).unwrap();
    let decoded: Vec<ExtensionObject> = MockCodec::decode_message(&wire, 1).unwrap();

    let err = decoded[0].decode(&MockRegistry, None).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_DATA_TYPE_ID_UNKNOWN);
}

#[test]
fn test_variant_wrapped_extension_object() {
    let status = ServerStatus {
        state: 2,
        uptime_seconds: 30,
    };
    let variant = Variant::ExtensionObject(
        ExtensionObject::encode_from(&status, TargetEncoding::Binary).unwrap(),
    );

    let wire = MockCodec::encode_message(std::slice::from_ref(&variant)).unwrap();
    let decoded: Vec<Variant> = MockCodec::decode_message(&wire, 1).unwrap();
    assert_eq!(decoded[0], variant);

    let Variant::ExtensionObject(obj) = &decoded[0] else {
        panic!("expected extension object variant");
    };
    let resolved = obj.decode(&MockRegistry, None).unwrap();
    assert_eq!(
        resolved.as_any().downcast_ref::<ServerStatus>().unwrap(),
        &status
    );
}

#[test]
fn test_diagnostic_chain_with_shared_string_table() {
    let mut table = StringTable::new();
    let info = DiagnosticInfo::new()
        .with_symbolic_id(&mut table, "Bad_SensorFailure")
        .with_namespace_uri(&mut table, "http://acme.example/errors")
        .with_additional_info("thermocouple 4 open circuit")
        .with_inner(
            DiagnosticInfo::new()
                .with_symbolic_id(&mut table, "Bad_SensorFailure")
                .with_inner_status_code(StatusCode::BAD_INTERNAL_ERROR),
        );

    // Repeated strings reuse their table index on the encode path.
    assert_eq!(info.symbolic_id, Some(0));
    assert_eq!(
        info.inner_diagnostic_info.as_ref().unwrap().symbolic_id,
        Some(0)
    );
    assert_eq!(table.len(), 2);

    let wire = MockCodec::encode_message(std::slice::from_ref(&info)).unwrap();
    let decoded: Vec<DiagnosticInfo> = MockCodec::decode_message(&wire, 1).unwrap();
    assert_eq!(decoded[0], info);

    // Decode side resolves through the received parallel array.
    let received = StringTable::from_strings(table.as_slice().to_vec());
    assert_eq!(
        decoded[0].symbolic_id_str(&received),
        Some("Bad_SensorFailure")
    );
}
