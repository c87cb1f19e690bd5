// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! [`UaEncodable`] implementations for the builtin types.
//!
//! Layout notes beyond the obvious fixed-width little-endian primitives:
//!
//! - Strings and byte sequences are `Int32` length prefixed; `-1` marks
//!   the null value on the wire and decodes to the empty value here.
//! - Node ids use the compact two-byte/four-byte forms when the
//!   namespace and numeric value fit, the full form otherwise.
//! - Optional fields of localized text, data values, and diagnostics are
//!   governed by a leading mask byte.
//! - A variant's encoding byte carries the wire type id in its low six
//!   bits, `0x80` for arrays and `0x40` for explicit dimensions.

use uuid::Uuid;

use crate::builtins::BuiltinTypeId;
use crate::bytestring::ByteString;
use crate::data_value::DataValue;
use crate::datetime::DateTime;
use crate::diagnostic::{DiagnosticInfo, MAX_NESTING_DEPTH};
use crate::error::{EncodingError, UaError};
use crate::expanded::ExpandedNodeId;
use crate::extension::{ExtensionBody, ExtensionObject};
use crate::names::{LocalizedText, QualifiedName, XmlElement};
use crate::nodeid::{Identifier, NodeId};
use crate::numeric::{UInt16, UInt32, UInt64, UInt8};
use crate::status::StatusCode;
use crate::variant::{Array, Variant};

use super::{ReadCursor, UaEncodable, WriteCursor};

// Node-id encoding discriminants.
const NODE_ID_TWO_BYTE: u8 = 0x00;
const NODE_ID_FOUR_BYTE: u8 = 0x01;
const NODE_ID_NUMERIC: u8 = 0x02;
const NODE_ID_STRING: u8 = 0x03;
const NODE_ID_GUID: u8 = 0x04;
const NODE_ID_OPAQUE: u8 = 0x05;

// Expanded node-id flag bits on the node-id encoding byte.
const FLAG_NAMESPACE_URI: u8 = 0x80;
const FLAG_SERVER_INDEX: u8 = 0x40;

// Extension-object body discriminants.
const BODY_NONE: u8 = 0x00;
const BODY_BINARY: u8 = 0x01;
const BODY_XML: u8 = 0x02;

// Variant encoding-byte flags.
const VARIANT_ARRAY: u8 = 0x80;
const VARIANT_DIMENSIONS: u8 = 0x40;

// =============================================================================
// Primitives
// =============================================================================

macro_rules! impl_encodable_primitive {
    ($type:ty, $size:expr, $write:ident, $read:ident) => {
        impl UaEncodable for $type {
            fn byte_length(&self) -> usize {
                $size
            }

            fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError> {
                cursor.$write(*self)
            }

            fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self, UaError> {
                cursor.$read()
            }
        }
    };
}

impl_encodable_primitive!(i8, 1, write_i8, read_i8);
impl_encodable_primitive!(u8, 1, write_u8, read_u8);
impl_encodable_primitive!(i16, 2, write_i16, read_i16);
impl_encodable_primitive!(u16, 2, write_u16, read_u16);
impl_encodable_primitive!(i32, 4, write_i32, read_i32);
impl_encodable_primitive!(u32, 4, write_u32, read_u32);
impl_encodable_primitive!(i64, 8, write_i64, read_i64);
impl_encodable_primitive!(u64, 8, write_u64, read_u64);
impl_encodable_primitive!(f32, 4, write_f32, read_f32);
impl_encodable_primitive!(f64, 8, write_f64, read_f64);

impl UaEncodable for bool {
    fn byte_length(&self) -> usize {
        1
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError> {
        cursor.write_u8(u8::from(*self))
    }

    fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self, UaError> {
        // Any non-zero byte is true on the wire.
        Ok(cursor.read_u8()? != 0)
    }
}

macro_rules! impl_encodable_wrapper {
    ($type:ty, $inner:ty) => {
        impl UaEncodable for $type {
            fn byte_length(&self) -> usize {
                self.value().byte_length()
            }

            fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError> {
                self.value().encode(cursor)
            }

            fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self, UaError> {
                <$inner>::decode(cursor).map(Self::new)
            }
        }
    };
}

impl_encodable_wrapper!(UInt8, u8);
impl_encodable_wrapper!(UInt16, u16);
impl_encodable_wrapper!(UInt32, u32);
impl_encodable_wrapper!(UInt64, u64);

// =============================================================================
// Length-Prefixed Values
// =============================================================================

fn string_byte_length(s: &str) -> usize {
    4 + s.len()
}

fn opt_string_byte_length(s: Option<&str>) -> usize {
    4 + s.map_or(0, str::len)
}

fn write_string(cursor: &mut WriteCursor<'_>, s: &str) -> Result<(), UaError> {
    cursor.write_i32(s.len() as i32)?;
    cursor.write_bytes(s.as_bytes())
}

fn write_opt_string(cursor: &mut WriteCursor<'_>, s: Option<&str>) -> Result<(), UaError> {
    match s {
        Some(s) => write_string(cursor, s),
        None => cursor.write_i32(-1),
    }
}

fn read_length(cursor: &mut ReadCursor<'_>) -> Result<Option<usize>, UaError> {
    let offset = cursor.offset();
    let length = cursor.read_i32()?;
    if length == -1 {
        return Ok(None);
    }
    if length < 0 {
        return Err(EncodingError::InvalidLength {
            length: i64::from(length),
            offset,
        }
        .into());
    }
    let length = length as usize;
    if length > cursor.remaining() {
        return Err(EncodingError::InvalidLength {
            length: length as i64,
            offset,
        }
        .into());
    }
    Ok(Some(length))
}

fn read_string(cursor: &mut ReadCursor<'_>, what: &'static str) -> Result<String, UaError> {
    Ok(read_opt_string(cursor, what)?.unwrap_or_default())
}

fn read_opt_string(
    cursor: &mut ReadCursor<'_>,
    what: &'static str,
) -> Result<Option<String>, UaError> {
    let Some(length) = read_length(cursor)? else {
        return Ok(None);
    };
    let offset = cursor.offset();
    let bytes = cursor.read_bytes(length)?;
    std::str::from_utf8(bytes)
        .map(|s| Some(s.to_string()))
        .map_err(|_| EncodingError::InvalidUtf8 { what, offset }.into())
}

impl UaEncodable for String {
    fn byte_length(&self) -> usize {
        string_byte_length(self)
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError> {
        write_string(cursor, self)
    }

    fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self, UaError> {
        read_string(cursor, "String")
    }
}

impl UaEncodable for ByteString {
    fn byte_length(&self) -> usize {
        4 + self.len()
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError> {
        cursor.write_i32(self.len() as i32)?;
        cursor.write_bytes(self.as_slice())
    }

    fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self, UaError> {
        match read_length(cursor)? {
            None => Ok(ByteString::EMPTY),
            Some(length) => Ok(ByteString::from_slice(cursor.read_bytes(length)?)),
        }
    }
}

impl UaEncodable for XmlElement {
    fn byte_length(&self) -> usize {
        string_byte_length(self.as_str())
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError> {
        write_string(cursor, self.as_str())
    }

    fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self, UaError> {
        read_string(cursor, "XmlElement").map(XmlElement::new)
    }
}

// =============================================================================
// Fixed Compound Values
// =============================================================================

impl UaEncodable for Uuid {
    fn byte_length(&self) -> usize {
        16
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError> {
        let (d1, d2, d3, d4) = self.as_fields();
        cursor.write_u32(d1)?;
        cursor.write_u16(d2)?;
        cursor.write_u16(d3)?;
        cursor.write_bytes(d4)
    }

    fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self, UaError> {
        let d1 = cursor.read_u32()?;
        let d2 = cursor.read_u16()?;
        let d3 = cursor.read_u16()?;
        let mut d4 = [0u8; 8];
        d4.copy_from_slice(cursor.read_bytes(8)?);
        Ok(Uuid::from_fields(d1, d2, d3, &d4))
    }
}

impl UaEncodable for DateTime {
    fn byte_length(&self) -> usize {
        8
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError> {
        cursor.write_i64(self.ticks())
    }

    fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self, UaError> {
        cursor.read_i64().map(DateTime::from_ticks)
    }
}

impl UaEncodable for StatusCode {
    fn byte_length(&self) -> usize {
        4
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError> {
        cursor.write_u32(self.bits())
    }

    fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self, UaError> {
        cursor.read_u32().map(StatusCode::from_bits)
    }
}

// =============================================================================
// Node Identifiers
// =============================================================================

fn encode_node_id_with_flags(
    node: &NodeId,
    flags: u8,
    cursor: &mut WriteCursor<'_>,
) -> Result<(), UaError> {
    let ns = node.namespace_index;
    match &node.identifier {
        Identifier::Numeric(v) if ns == 0 && *v <= 0xFF => {
            cursor.write_u8(NODE_ID_TWO_BYTE | flags)?;
            cursor.write_u8(*v as u8)
        }
        Identifier::Numeric(v) if ns <= 0xFF && *v <= 0xFFFF => {
            cursor.write_u8(NODE_ID_FOUR_BYTE | flags)?;
            cursor.write_u8(ns as u8)?;
            cursor.write_u16(*v as u16)
        }
        Identifier::Numeric(v) => {
            cursor.write_u8(NODE_ID_NUMERIC | flags)?;
            cursor.write_u16(ns)?;
            cursor.write_u32(*v)
        }
        Identifier::String(s) => {
            cursor.write_u8(NODE_ID_STRING | flags)?;
            cursor.write_u16(ns)?;
            write_string(cursor, s)
        }
        Identifier::Guid(g) => {
            cursor.write_u8(NODE_ID_GUID | flags)?;
            cursor.write_u16(ns)?;
            g.encode(cursor)
        }
        Identifier::Opaque(b) => {
            cursor.write_u8(NODE_ID_OPAQUE | flags)?;
            cursor.write_u16(ns)?;
            b.encode(cursor)
        }
    }
}

fn node_id_body_length(node: &NodeId) -> usize {
    match &node.identifier {
        Identifier::Numeric(v) if node.namespace_index == 0 && *v <= 0xFF => 2,
        Identifier::Numeric(v) if node.namespace_index <= 0xFF && *v <= 0xFFFF => 4,
        Identifier::Numeric(_) => 7,
        Identifier::String(s) => 3 + string_byte_length(s),
        Identifier::Guid(_) => 3 + 16,
        Identifier::Opaque(b) => 3 + 4 + b.len(),
    }
}

fn decode_node_id_body(cursor: &mut ReadCursor<'_>, encoding: u8) -> Result<NodeId, UaError> {
    let offset = cursor.offset();
    match encoding & 0x3F {
        NODE_ID_TWO_BYTE => Ok(NodeId::numeric(0, u32::from(cursor.read_u8()?))),
        NODE_ID_FOUR_BYTE => {
            let ns = u16::from(cursor.read_u8()?);
            let id = u32::from(cursor.read_u16()?);
            Ok(NodeId::numeric(ns, id))
        }
        NODE_ID_NUMERIC => {
            let ns = cursor.read_u16()?;
            let id = cursor.read_u32()?;
            Ok(NodeId::numeric(ns, id))
        }
        NODE_ID_STRING => {
            let ns = cursor.read_u16()?;
            let value = read_string(cursor, "NodeId")?;
            NodeId::string(ns, value)
        }
        NODE_ID_GUID => {
            let ns = cursor.read_u16()?;
            let value = Uuid::decode(cursor)?;
            Ok(NodeId::guid(ns, value))
        }
        NODE_ID_OPAQUE => {
            let ns = cursor.read_u16()?;
            let value = ByteString::decode(cursor)?;
            NodeId::opaque(ns, value)
        }
        other => Err(EncodingError::InvalidEncodingByte {
            what: "NodeId",
            byte: other,
            offset,
        }
        .into()),
    }
}

impl UaEncodable for NodeId {
    fn byte_length(&self) -> usize {
        node_id_body_length(self)
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError> {
        encode_node_id_with_flags(self, 0, cursor)
    }

    fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self, UaError> {
        let offset = cursor.offset();
        let encoding = cursor.read_u8()?;
        if encoding & (FLAG_NAMESPACE_URI | FLAG_SERVER_INDEX) != 0 {
            return Err(EncodingError::InvalidEncodingByte {
                what: "NodeId",
                byte: encoding,
                offset,
            }
            .into());
        }
        decode_node_id_body(cursor, encoding)
    }
}

impl UaEncodable for ExpandedNodeId {
    fn byte_length(&self) -> usize {
        let mut n = node_id_body_length(&self.node_id);
        if let Some(uri) = self.namespace_uri.as_deref() {
            if !uri.is_empty() {
                n += string_byte_length(uri);
            }
        }
        if self.server_index != 0 {
            n += 4;
        }
        n
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError> {
        let uri = self.namespace_uri.as_deref().filter(|u| !u.is_empty());
        let mut flags = 0;
        if uri.is_some() {
            flags |= FLAG_NAMESPACE_URI;
        }
        if self.server_index != 0 {
            flags |= FLAG_SERVER_INDEX;
        }
        encode_node_id_with_flags(&self.node_id, flags, cursor)?;
        if let Some(uri) = uri {
            write_string(cursor, uri)?;
        }
        if self.server_index != 0 {
            cursor.write_u32(self.server_index)?;
        }
        Ok(())
    }

    fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self, UaError> {
        let encoding = cursor.read_u8()?;
        let node_id = decode_node_id_body(cursor, encoding)?;
        let namespace_uri = if encoding & FLAG_NAMESPACE_URI != 0 {
            Some(read_string(cursor, "ExpandedNodeId")?)
        } else {
            None
        };
        let server_index = if encoding & FLAG_SERVER_INDEX != 0 {
            cursor.read_u32()?
        } else {
            0
        };
        Ok(ExpandedNodeId {
            node_id,
            namespace_uri,
            server_index,
        })
    }
}

// =============================================================================
// Name Types
// =============================================================================

impl UaEncodable for QualifiedName {
    fn byte_length(&self) -> usize {
        2 + opt_string_byte_length(self.name.as_deref())
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError> {
        cursor.write_u16(self.namespace_index)?;
        write_opt_string(cursor, self.name.as_deref())
    }

    fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self, UaError> {
        let namespace_index = cursor.read_u16()?;
        let name = read_opt_string(cursor, "QualifiedName")?;
        Ok(QualifiedName {
            namespace_index,
            name,
        })
    }
}

impl UaEncodable for LocalizedText {
    fn byte_length(&self) -> usize {
        let mut n = 1;
        if let Some(locale) = &self.locale {
            n += string_byte_length(locale);
        }
        if let Some(text) = &self.text {
            n += string_byte_length(text);
        }
        n
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError> {
        let mut mask = 0u8;
        if self.locale.is_some() {
            mask |= 0x01;
        }
        if self.text.is_some() {
            mask |= 0x02;
        }
        cursor.write_u8(mask)?;
        if let Some(locale) = &self.locale {
            write_string(cursor, locale)?;
        }
        if let Some(text) = &self.text {
            write_string(cursor, text)?;
        }
        Ok(())
    }

    fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self, UaError> {
        let mask = cursor.read_u8()?;
        let locale = if mask & 0x01 != 0 {
            Some(read_string(cursor, "LocalizedText")?)
        } else {
            None
        };
        let text = if mask & 0x02 != 0 {
            Some(read_string(cursor, "LocalizedText")?)
        } else {
            None
        };
        Ok(LocalizedText { locale, text })
    }
}

// =============================================================================
// DiagnosticInfo
// =============================================================================

fn diagnostic_byte_length(info: &DiagnosticInfo) -> usize {
    let mut n = 1;
    if info.symbolic_id.is_some() {
        n += 4;
    }
    if info.namespace_uri.is_some() {
        n += 4;
    }
    if info.locale.is_some() {
        n += 4;
    }
    if info.localized_text.is_some() {
        n += 4;
    }
    if let Some(text) = &info.additional_info {
        n += string_byte_length(text);
    }
    if info.inner_status_code.is_some() {
        n += 4;
    }
    if let Some(inner) = &info.inner_diagnostic_info {
        n += diagnostic_byte_length(inner);
    }
    n
}

fn decode_diagnostic(
    cursor: &mut ReadCursor<'_>,
    depth: usize,
) -> Result<DiagnosticInfo, UaError> {
    if depth >= MAX_NESTING_DEPTH {
        return Err(EncodingError::DepthExceeded {
            what: "DiagnosticInfo",
            limit: MAX_NESTING_DEPTH,
        }
        .into());
    }
    let mask = cursor.read_u8()?;
    let mut info = DiagnosticInfo::new();
    if mask & 0x01 != 0 {
        info.symbolic_id = Some(cursor.read_i32()?);
    }
    if mask & 0x02 != 0 {
        info.namespace_uri = Some(cursor.read_i32()?);
    }
    if mask & 0x04 != 0 {
        info.locale = Some(cursor.read_i32()?);
    }
    if mask & 0x08 != 0 {
        info.localized_text = Some(cursor.read_i32()?);
    }
    if mask & 0x10 != 0 {
        info.additional_info = Some(read_string(cursor, "DiagnosticInfo")?);
    }
    if mask & 0x20 != 0 {
        info.inner_status_code = Some(StatusCode::decode(cursor)?);
    }
    if mask & 0x40 != 0 {
        info.inner_diagnostic_info = Some(Box::new(decode_diagnostic(cursor, depth + 1)?));
    }
    Ok(info)
}

impl UaEncodable for DiagnosticInfo {
    fn byte_length(&self) -> usize {
        diagnostic_byte_length(self)
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError> {
        let mut mask = 0u8;
        if self.symbolic_id.is_some() {
            mask |= 0x01;
        }
        if self.namespace_uri.is_some() {
            mask |= 0x02;
        }
        if self.locale.is_some() {
            mask |= 0x04;
        }
        if self.localized_text.is_some() {
            mask |= 0x08;
        }
        if self.additional_info.is_some() {
            mask |= 0x10;
        }
        if self.inner_status_code.is_some() {
            mask |= 0x20;
        }
        if self.inner_diagnostic_info.is_some() {
            mask |= 0x40;
        }
        cursor.write_u8(mask)?;
        if let Some(v) = self.symbolic_id {
            cursor.write_i32(v)?;
        }
        if let Some(v) = self.namespace_uri {
            cursor.write_i32(v)?;
        }
        if let Some(v) = self.locale {
            cursor.write_i32(v)?;
        }
        if let Some(v) = self.localized_text {
            cursor.write_i32(v)?;
        }
        if let Some(v) = &self.additional_info {
            write_string(cursor, v)?;
        }
        if let Some(v) = self.inner_status_code {
            v.encode(cursor)?;
        }
        if let Some(v) = &self.inner_diagnostic_info {
            v.encode(cursor)?;
        }
        Ok(())
    }

    fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self, UaError> {
        decode_diagnostic(cursor, 0)
    }
}

// =============================================================================
// ExtensionObject
// =============================================================================

impl UaEncodable for ExtensionObject {
    fn byte_length(&self) -> usize {
        let mut n = node_id_body_length(&self.type_id().node_id) + 1;
        match self.body() {
            ExtensionBody::None => {}
            ExtensionBody::Binary(bytes) => n += 4 + bytes.len(),
            ExtensionBody::Xml(xml) => n += string_byte_length(xml.as_str()),
            ExtensionBody::Decoded(value) => n += 4 + value.byte_length(),
        }
        n
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError> {
        self.type_id().node_id.encode(cursor)?;
        match self.body() {
            ExtensionBody::None => cursor.write_u8(BODY_NONE),
            ExtensionBody::Binary(bytes) => {
                cursor.write_u8(BODY_BINARY)?;
                bytes.encode(cursor)
            }
            ExtensionBody::Xml(xml) => {
                cursor.write_u8(BODY_XML)?;
                xml.encode(cursor)
            }
            ExtensionBody::Decoded(value) => {
                // A decoded payload goes out in its binary form.
                cursor.write_u8(BODY_BINARY)?;
                cursor.write_i32(value.byte_length() as i32)?;
                value.encode_body(cursor)
            }
        }
    }

    fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self, UaError> {
        let node_id = NodeId::decode(cursor)?;
        let type_id = ExpandedNodeId::new(node_id);
        let offset = cursor.offset();
        match cursor.read_u8()? {
            BODY_NONE => Ok(ExtensionObject::new(type_id)),
            BODY_BINARY => {
                let body = ByteString::decode(cursor)?;
                Ok(ExtensionObject::from_binary(type_id, body))
            }
            BODY_XML => {
                let xml = XmlElement::decode(cursor)?;
                Ok(ExtensionObject::from_xml(type_id, xml))
            }
            byte => Err(EncodingError::InvalidEncodingByte {
                what: "ExtensionObject",
                byte,
                offset,
            }
            .into()),
        }
    }
}

// =============================================================================
// DataValue
// =============================================================================

impl UaEncodable for DataValue {
    fn byte_length(&self) -> usize {
        let mut n = 1;
        if let Some(value) = &self.value {
            n += value.byte_length();
        }
        if self.status.is_some() {
            n += 4;
        }
        if self.source_timestamp.is_some() {
            n += 8;
        }
        if self.source_picoseconds.is_some() {
            n += 2;
        }
        if self.server_timestamp.is_some() {
            n += 8;
        }
        if self.server_picoseconds.is_some() {
            n += 2;
        }
        n
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError> {
        let mut mask = 0u8;
        if self.value.is_some() {
            mask |= 0x01;
        }
        if self.status.is_some() {
            mask |= 0x02;
        }
        if self.source_timestamp.is_some() {
            mask |= 0x04;
        }
        if self.server_timestamp.is_some() {
            mask |= 0x08;
        }
        if self.source_picoseconds.is_some() {
            mask |= 0x10;
        }
        if self.server_picoseconds.is_some() {
            mask |= 0x20;
        }
        cursor.write_u8(mask)?;
        if let Some(value) = &self.value {
            value.encode(cursor)?;
        }
        if let Some(status) = self.status {
            status.encode(cursor)?;
        }
        if let Some(ts) = self.source_timestamp {
            ts.encode(cursor)?;
        }
        if let Some(picos) = self.source_picoseconds {
            cursor.write_u16(picos)?;
        }
        if let Some(ts) = self.server_timestamp {
            ts.encode(cursor)?;
        }
        if let Some(picos) = self.server_picoseconds {
            cursor.write_u16(picos)?;
        }
        Ok(())
    }

    fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self, UaError> {
        let mask = cursor.read_u8()?;
        let mut dv = DataValue::default();
        if mask & 0x01 != 0 {
            dv.value = Some(Variant::decode(cursor)?);
        }
        if mask & 0x02 != 0 {
            dv.status = Some(StatusCode::decode(cursor)?);
        }
        if mask & 0x04 != 0 {
            dv.source_timestamp = Some(DateTime::decode(cursor)?);
        }
        if mask & 0x10 != 0 {
            dv.source_picoseconds = Some(cursor.read_u16()?);
        }
        if mask & 0x08 != 0 {
            dv.server_timestamp = Some(DateTime::decode(cursor)?);
        }
        if mask & 0x20 != 0 {
            dv.server_picoseconds = Some(cursor.read_u16()?);
        }
        Ok(dv)
    }
}

// =============================================================================
// Variant
// =============================================================================

fn scalar_body_length(value: &Variant) -> usize {
    match value {
        Variant::Empty => 0,
        Variant::Boolean(_) | Variant::SByte(_) | Variant::Byte(_) => 1,
        Variant::Int16(_) | Variant::UInt16(_) => 2,
        Variant::Int32(_) | Variant::UInt32(_) | Variant::Float(_) | Variant::StatusCode(_) => 4,
        Variant::Int64(_) | Variant::UInt64(_) | Variant::Double(_) | Variant::DateTime(_) => 8,
        Variant::Guid(_) => 16,
        Variant::String(s) => string_byte_length(s),
        Variant::ByteString(b) => 4 + b.len(),
        Variant::XmlElement(x) => string_byte_length(x.as_str()),
        Variant::NodeId(n) => node_id_body_length(n),
        Variant::ExpandedNodeId(n) => n.byte_length(),
        Variant::QualifiedName(q) => q.byte_length(),
        Variant::LocalizedText(t) => t.byte_length(),
        Variant::ExtensionObject(e) => e.byte_length(),
        Variant::DataValue(d) => d.byte_length(),
        Variant::Variant(v) => v.byte_length(),
        Variant::DiagnosticInfo(d) => d.byte_length(),
        Variant::Array(_) => 0,
    }
}

fn encode_scalar_body(value: &Variant, cursor: &mut WriteCursor<'_>) -> Result<(), UaError> {
    match value {
        Variant::Empty | Variant::Array(_) => Ok(()),
        Variant::Boolean(v) => v.encode(cursor),
        Variant::SByte(v) => v.encode(cursor),
        Variant::Byte(v) => v.encode(cursor),
        Variant::Int16(v) => v.encode(cursor),
        Variant::UInt16(v) => v.encode(cursor),
        Variant::Int32(v) => v.encode(cursor),
        Variant::UInt32(v) => v.encode(cursor),
        Variant::Int64(v) => v.encode(cursor),
        Variant::UInt64(v) => v.encode(cursor),
        Variant::Float(v) => v.encode(cursor),
        Variant::Double(v) => v.encode(cursor),
        Variant::String(v) => v.encode(cursor),
        Variant::DateTime(v) => v.encode(cursor),
        Variant::Guid(v) => v.encode(cursor),
        Variant::ByteString(v) => v.encode(cursor),
        Variant::XmlElement(v) => v.encode(cursor),
        Variant::NodeId(v) => v.encode(cursor),
        Variant::ExpandedNodeId(v) => v.encode(cursor),
        Variant::StatusCode(v) => v.encode(cursor),
        Variant::QualifiedName(v) => v.encode(cursor),
        Variant::LocalizedText(v) => v.encode(cursor),
        Variant::ExtensionObject(v) => v.encode(cursor),
        Variant::DataValue(v) => v.encode(cursor),
        Variant::Variant(v) => v.encode(cursor),
        Variant::DiagnosticInfo(v) => v.encode(cursor),
    }
}

fn decode_scalar_body(
    kind: BuiltinTypeId,
    cursor: &mut ReadCursor<'_>,
) -> Result<Variant, UaError> {
    Ok(match kind {
        BuiltinTypeId::Boolean => Variant::Boolean(bool::decode(cursor)?),
        BuiltinTypeId::SByte => Variant::SByte(i8::decode(cursor)?),
        BuiltinTypeId::Byte => Variant::Byte(u8::decode(cursor)?),
        BuiltinTypeId::Int16 => Variant::Int16(i16::decode(cursor)?),
        BuiltinTypeId::UInt16 => Variant::UInt16(u16::decode(cursor)?),
        BuiltinTypeId::Int32 => Variant::Int32(i32::decode(cursor)?),
        BuiltinTypeId::UInt32 => Variant::UInt32(u32::decode(cursor)?),
        BuiltinTypeId::Int64 => Variant::Int64(i64::decode(cursor)?),
        BuiltinTypeId::UInt64 => Variant::UInt64(u64::decode(cursor)?),
        BuiltinTypeId::Float => Variant::Float(f32::decode(cursor)?),
        BuiltinTypeId::Double => Variant::Double(f64::decode(cursor)?),
        BuiltinTypeId::String => Variant::String(String::decode(cursor)?),
        BuiltinTypeId::DateTime => Variant::DateTime(DateTime::decode(cursor)?),
        BuiltinTypeId::Guid => Variant::Guid(Uuid::decode(cursor)?),
        BuiltinTypeId::ByteString => Variant::ByteString(ByteString::decode(cursor)?),
        BuiltinTypeId::XmlElement => Variant::XmlElement(XmlElement::decode(cursor)?),
        BuiltinTypeId::NodeId => Variant::NodeId(NodeId::decode(cursor)?),
        BuiltinTypeId::ExpandedNodeId => Variant::ExpandedNodeId(ExpandedNodeId::decode(cursor)?),
        BuiltinTypeId::StatusCode => Variant::StatusCode(StatusCode::decode(cursor)?),
        BuiltinTypeId::QualifiedName => Variant::QualifiedName(QualifiedName::decode(cursor)?),
        BuiltinTypeId::LocalizedText => Variant::LocalizedText(LocalizedText::decode(cursor)?),
        BuiltinTypeId::ExtensionObject => {
            Variant::ExtensionObject(<ExtensionObject as UaEncodable>::decode(cursor)?)
        }
        BuiltinTypeId::DataValue => Variant::DataValue(Box::new(DataValue::decode(cursor)?)),
        BuiltinTypeId::Variant => {
            // Array-valued nested variants stay wrapped so array elements
            // remain scalars; scalar nested variants collapse (the wire
            // does not distinguish them).
            let inner = Variant::decode(cursor)?;
            if inner.is_array() {
                Variant::Variant(Box::new(inner))
            } else {
                inner
            }
        }
        BuiltinTypeId::DiagnosticInfo => {
            Variant::DiagnosticInfo(Box::new(DiagnosticInfo::decode(cursor)?))
        }
    })
}

impl UaEncodable for Variant {
    fn byte_length(&self) -> usize {
        match self {
            Variant::Empty => 1,
            Variant::Array(array) => {
                let mut n = 1 + 4;
                for value in array.values() {
                    n += if array.element_type() == BuiltinTypeId::Variant {
                        value.byte_length()
                    } else {
                        scalar_body_length(value)
                    };
                }
                if array.rank() > 1 {
                    n += 4 + 4 * array.rank();
                }
                n
            }
            scalar => 1 + scalar_body_length(scalar),
        }
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError> {
        match self {
            Variant::Empty => cursor.write_u8(0),
            Variant::Array(array) => {
                let mut encoding = array.element_type().wire_id() | VARIANT_ARRAY;
                if array.rank() > 1 {
                    encoding |= VARIANT_DIMENSIONS;
                }
                cursor.write_u8(encoding)?;
                cursor.write_i32(array.len() as i32)?;
                for value in array.values() {
                    if array.element_type() == BuiltinTypeId::Variant {
                        value.encode(cursor)?;
                    } else {
                        encode_scalar_body(value, cursor)?;
                    }
                }
                if array.rank() > 1 {
                    cursor.write_i32(array.rank() as i32)?;
                    for dim in array.dimensions() {
                        cursor.write_i32(*dim as i32)?;
                    }
                }
                Ok(())
            }
            scalar => {
                // element_kind is Some for every non-empty variant.
                let kind = scalar.element_kind().unwrap_or(BuiltinTypeId::Variant);
                cursor.write_u8(kind.wire_id())?;
                encode_scalar_body(scalar, cursor)
            }
        }
    }

    fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self, UaError> {
        cursor.descend("Variant")?;
        let result = decode_variant_inner(cursor);
        cursor.ascend();
        result
    }
}

fn decode_variant_inner(cursor: &mut ReadCursor<'_>) -> Result<Variant, UaError> {
    let offset = cursor.offset();
    let encoding = cursor.read_u8()?;
    if encoding == 0 {
        return Ok(Variant::Empty);
    }
    let kind = BuiltinTypeId::from_wire_id(encoding & 0x3F).ok_or_else(|| {
        UaError::from(EncodingError::InvalidEncodingByte {
            what: "Variant",
            byte: encoding,
            offset,
        })
    })?;

    if encoding & VARIANT_ARRAY == 0 {
        return decode_scalar_body(kind, cursor);
    }

    let length_offset = cursor.offset();
    let length = cursor.read_i32()?;
    if length < 0 || length as usize > cursor.remaining() {
        return Err(EncodingError::InvalidLength {
            length: i64::from(length),
            offset: length_offset,
        }
        .into());
    }
    let mut values = Vec::with_capacity(length as usize);
    for _ in 0..length {
        let value = if kind == BuiltinTypeId::Variant {
            let inner = Variant::decode(cursor)?;
            if inner.is_array() {
                Variant::Variant(Box::new(inner))
            } else {
                inner
            }
        } else {
            decode_scalar_body(kind, cursor)?
        };
        values.push(value);
    }

    if encoding & VARIANT_DIMENSIONS != 0 {
        let rank_offset = cursor.offset();
        let rank = cursor.read_i32()?;
        if rank <= 0 || rank as usize > cursor.remaining() / 4 + 1 {
            return Err(EncodingError::InvalidLength {
                length: i64::from(rank),
                offset: rank_offset,
            }
            .into());
        }
        let mut dimensions = Vec::with_capacity(rank as usize);
        for _ in 0..rank {
            let dim_offset = cursor.offset();
            let dim = cursor.read_i32()?;
            if dim < 0 {
                return Err(EncodingError::InvalidLength {
                    length: i64::from(dim),
                    offset: dim_offset,
                }
                .into());
            }
            dimensions.push(dim as u32);
        }
        Ok(Variant::Array(Box::new(Array::new_multi(
            kind, values, dimensions,
        )?)))
    } else {
        Ok(Variant::Array(Box::new(Array::new(kind, values)?)))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{decode_from_slice, encode_to_vec};

    fn round_trip<T: UaEncodable + PartialEq + std::fmt::Debug>(value: &T) {
        let bytes = encode_to_vec(value).unwrap();
        assert_eq!(bytes.len(), value.byte_length(), "byte_length mismatch");
        let back: T = decode_from_slice(&bytes).unwrap();
        assert_eq!(&back, value);
    }

    #[test]
    fn test_primitive_round_trips() {
        round_trip(&true);
        round_trip(&(-5i8));
        round_trip(&0xFEu8);
        round_trip(&(-12345i16));
        round_trip(&54321u16);
        round_trip(&(-7i32));
        round_trip(&0xDEAD_BEEFu32);
        round_trip(&i64::MIN);
        round_trip(&u64::MAX);
        round_trip(&1.5f32);
        round_trip(&-2.25f64);
        round_trip(&UInt64::from_bits(-1));
    }

    #[test]
    fn test_string_and_bytestring() {
        round_trip(&"hello".to_string());
        round_trip(&String::new());
        round_trip(&ByteString::from_slice(&[1, 2, 3]));
        round_trip(&ByteString::EMPTY);
        round_trip(&XmlElement::new("<a>1</a>"));

        // Null marker decodes to the empty value.
        let null_marker = (-1i32).to_le_bytes();
        let s: String = decode_from_slice(&null_marker).unwrap();
        assert_eq!(s, "");
        let b: ByteString = decode_from_slice(&null_marker).unwrap();
        assert!(b.is_null());
    }

    #[test]
    fn test_invalid_length_prefixes() {
        let bytes = (-2i32).to_le_bytes();
        assert!(decode_from_slice::<String>(&bytes).is_err());

        // Length larger than the remaining buffer.
        let mut bytes = Vec::from(100i32.to_le_bytes());
        bytes.extend_from_slice(&[0; 4]);
        assert!(decode_from_slice::<String>(&bytes).is_err());
    }

    #[test]
    fn test_invalid_utf8_is_reported() {
        let mut bytes = Vec::from(2i32.to_le_bytes());
        bytes.extend_from_slice(&[0xFF, 0xFE]);
        let err = decode_from_slice::<String>(&bytes).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_guid_layout_and_round_trip() {
        let guid = Uuid::parse_str("72962b91-fa75-4ae6-8d28-b404dc7daf63").unwrap();
        round_trip(&guid);
        let bytes = encode_to_vec(&guid).unwrap();
        assert_eq!(bytes.len(), 16);
        // First field little-endian.
        assert_eq!(&bytes[..4], &[0x91, 0x2B, 0x96, 0x72]);
    }

    #[test]
    fn test_node_id_compact_forms() {
        // Two-byte form.
        let id = NodeId::numeric(0, 84);
        assert_eq!(id.byte_length(), 2);
        let bytes = encode_to_vec(&id).unwrap();
        assert_eq!(bytes, vec![0x00, 84]);
        round_trip(&id);

        // Four-byte form.
        let id = NodeId::numeric(5, 1025);
        assert_eq!(id.byte_length(), 4);
        let bytes = encode_to_vec(&id).unwrap();
        assert_eq!(bytes[0], 0x01);
        round_trip(&id);

        // Full numeric form.
        let id = NodeId::numeric(300, 70000);
        assert_eq!(id.byte_length(), 7);
        round_trip(&id);

        round_trip(&NodeId::string(2, "Tank.Level").unwrap());
        round_trip(&NodeId::guid(2, Uuid::from_u128(7)));
        round_trip(&NodeId::opaque(2, vec![9u8, 8, 7]).unwrap());
    }

    #[test]
    fn test_node_id_rejects_flag_bits() {
        let bytes = [0x80u8, 84];
        assert!(decode_from_slice::<NodeId>(&bytes).is_err());
        let bytes = [0x06u8, 0, 0];
        assert!(decode_from_slice::<NodeId>(&bytes).is_err());
    }

    #[test]
    fn test_expanded_node_id_round_trips() {
        round_trip(&ExpandedNodeId::new(NodeId::numeric(2, 1001)));
        round_trip(&ExpandedNodeId::new(NodeId::numeric(2, 1001)).with_server_index(4));
        round_trip(
            &ExpandedNodeId::new(NodeId::string(0, "Pump").unwrap())
                .with_namespace_uri("http://acme.example/PLC"),
        );
        round_trip(
            &ExpandedNodeId::new(NodeId::numeric(0, 9))
                .with_namespace_uri("http://acme.example/PLC")
                .with_server_index(2),
        );
    }

    #[test]
    fn test_qualified_name_and_localized_text() {
        round_trip(&QualifiedName::new(2, "Level"));
        round_trip(&QualifiedName::null());
        round_trip(&LocalizedText::with_locale("en-US", "Tank level").unwrap());
        round_trip(&LocalizedText::null());
        // The no-locale sentinel survives the wire.
        round_trip(&LocalizedText::no_locale("raw"));
    }

    #[test]
    fn test_diagnostic_info_round_trip() {
        let info = DiagnosticInfo {
            symbolic_id: Some(3),
            namespace_uri: Some(0),
            locale: None,
            localized_text: Some(1),
            additional_info: Some("sensor misread".into()),
            inner_status_code: Some(StatusCode::BAD_INTERNAL_ERROR),
            inner_diagnostic_info: Some(Box::new(DiagnosticInfo {
                symbolic_id: Some(9),
                ..Default::default()
            })),
        };
        round_trip(&info);
    }

    #[test]
    fn test_diagnostic_info_depth_bound() {
        // A chain of mask bytes each demanding another inner diagnostic.
        let bytes = vec![0x40u8; MAX_NESTING_DEPTH + 2];
        let err = decode_from_slice::<DiagnosticInfo>(&bytes).unwrap_err();
        assert!(matches!(
            err,
            UaError::Encoding(EncodingError::DepthExceeded { .. })
        ));
    }

    #[test]
    fn test_extension_object_round_trips() {
        let obj = ExtensionObject::from_binary(
            ExpandedNodeId::new(NodeId::numeric(3, 999)),
            ByteString::from_slice(&[1, 2, 3, 4]),
        );
        round_trip(&obj);

        let xml = ExtensionObject::from_xml(
            ExpandedNodeId::new(NodeId::numeric(3, 999)),
            XmlElement::new("<X/>"),
        );
        round_trip(&xml);

        let empty = ExtensionObject::new(ExpandedNodeId::new(NodeId::numeric(3, 999)));
        round_trip(&empty);
    }

    #[test]
    fn test_extension_object_rejects_unknown_body_byte() {
        let mut bytes = encode_to_vec(&NodeId::numeric(0, 1)).unwrap();
        bytes.push(0x03);
        assert!(decode_from_slice::<ExtensionObject>(&bytes).is_err());
    }

    #[test]
    fn test_variant_scalar_round_trips() {
        round_trip(&Variant::Empty);
        round_trip(&Variant::Boolean(true));
        round_trip(&Variant::Byte(7));
        round_trip(&Variant::Int32(-5));
        round_trip(&Variant::UInt64(u64::MAX));
        round_trip(&Variant::Double(3.25));
        round_trip(&Variant::String("hello".into()));
        round_trip(&Variant::Guid(Uuid::from_u128(42)));
        round_trip(&Variant::ByteString(ByteString::from_slice(&[1, 2])));
        round_trip(&Variant::NodeId(NodeId::numeric(2, 1001)));
        round_trip(&Variant::StatusCode(StatusCode::BAD_OUT_OF_RANGE));
        round_trip(&Variant::LocalizedText(
            LocalizedText::with_locale("en", "x").unwrap(),
        ));
        round_trip(&Variant::DataValue(Box::new(
            DataValue::new(Variant::Int32(1)).with_status(StatusCode::GOOD),
        )));
    }

    #[test]
    fn test_variant_array_round_trips() {
        round_trip(&Variant::from(vec![1i32, 2, 3]));
        round_trip(&Variant::from(vec!["a".to_string(), "b".to_string()]));
        round_trip(&Variant::from(vec![vec![1u8, 2], vec![3u8]]));

        // Array of variants with mixed scalar kinds.
        let mixed = Variant::array(
            BuiltinTypeId::Variant,
            vec![Variant::Int32(1), Variant::String("x".into())],
        )
        .unwrap();
        round_trip(&mixed);
    }

    #[test]
    fn test_variant_matrix_round_trip() {
        let values: Vec<Variant> = (1..=6).map(Variant::Int32).collect();
        let matrix = Variant::multi_array(BuiltinTypeId::Int32, values, vec![2, 3]).unwrap();
        let bytes = encode_to_vec(&matrix).unwrap();
        // Encoding byte carries both the array and the dimensions flags.
        assert_eq!(bytes[0], 6 | VARIANT_ARRAY | VARIANT_DIMENSIONS);
        let back: Variant = decode_from_slice(&bytes).unwrap();
        assert_eq!(back, matrix);
        assert_eq!(back.as_array().unwrap().dimensions(), &[2, 3]);
    }

    #[test]
    fn test_variant_rejects_bad_input() {
        // Unknown wire id.
        assert!(decode_from_slice::<Variant>(&[26u8]).is_err());
        // Negative array length.
        let mut bytes = vec![6 | VARIANT_ARRAY];
        bytes.extend_from_slice(&(-2i32).to_le_bytes());
        assert!(decode_from_slice::<Variant>(&bytes).is_err());
        // Array length exceeding the buffer.
        let mut bytes = vec![6 | VARIANT_ARRAY];
        bytes.extend_from_slice(&1000i32.to_le_bytes());
        assert!(decode_from_slice::<Variant>(&bytes).is_err());
    }

    #[test]
    fn test_variant_dimension_mismatch_is_rejected() {
        let values: Vec<Variant> = (1..=4).map(Variant::Int32).collect();
        let matrix = Variant::multi_array(BuiltinTypeId::Int32, values, vec![2, 2]).unwrap();
        let mut bytes = encode_to_vec(&matrix).unwrap();
        // Corrupt the first dimension: 2 -> 3.
        let dims_start = bytes.len() - 8;
        bytes[dims_start..dims_start + 4].copy_from_slice(&3i32.to_le_bytes());
        assert!(decode_from_slice::<Variant>(&bytes).is_err());
    }

    #[test]
    fn test_nested_variant_depth_bound() {
        // Each 24-byte opens another nested variant.
        let bytes = vec![24u8; crate::encoding::MAX_DECODE_DEPTH + 2];
        let err = decode_from_slice::<Variant>(&bytes).unwrap_err();
        assert!(matches!(
            err,
            UaError::Encoding(EncodingError::DepthExceeded { .. })
        ));
    }

    #[test]
    fn test_data_value_round_trip() {
        let ts = DateTime::parse("2025-06-01T12:00:00Z").unwrap();
        let dv = DataValue::new(Variant::from(vec![1i32, 2]))
            .with_status(StatusCode::GOOD.with_overflow(true))
            .with_source_timestamp(ts)
            .with_server_timestamp(ts);
        round_trip(&dv);

        let sparse = DataValue {
            source_picoseconds: Some(250),
            ..Default::default()
        };
        round_trip(&sparse);
    }
}
