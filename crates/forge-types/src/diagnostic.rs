// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Extended diagnostic information.
//!
//! A [`DiagnosticInfo`] carries optional integer indices into a string
//! table (symbolic id, namespace URI, localized text, locale), free-text
//! additional info, an inner [`StatusCode`], and a recursive inner
//! diagnostic. The string table is an explicit, owned [`StringTable`]
//! passed alongside the indices: encode sites grow it through
//! [`StringTable::add_or_get`], decode sites wrap the received parallel
//! array with [`StringTable::from_strings`].
//!
//! Each level of nesting is a fresh object, so no structural cycles can
//! exist; decode-time recursion depth is still attacker-influenced and
//! is bounded by [`MAX_NESTING_DEPTH`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::status::StatusCode;

/// Defensive bound on decoded diagnostic nesting.
pub const MAX_NESTING_DEPTH: usize = 10;

// =============================================================================
// DiagnosticInfo
// =============================================================================

/// Optional extended diagnostics for a service result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DiagnosticInfo {
    /// String-table index of the symbolic error id.
    pub symbolic_id: Option<i32>,

    /// String-table index of the namespace URI the symbolic id belongs to.
    pub namespace_uri: Option<i32>,

    /// String-table index of the locale of the localized text.
    pub locale: Option<i32>,

    /// String-table index of the localized error text.
    pub localized_text: Option<i32>,

    /// Free-text vendor diagnostic.
    pub additional_info: Option<String>,

    /// Status code of the inner operation.
    pub inner_status_code: Option<StatusCode>,

    /// Diagnostics of the inner operation.
    pub inner_diagnostic_info: Option<Box<DiagnosticInfo>>,
}

impl DiagnosticInfo {
    /// Creates an empty diagnostic.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if every field is absent.
    pub fn is_empty(&self) -> bool {
        self.symbolic_id.is_none()
            && self.namespace_uri.is_none()
            && self.locale.is_none()
            && self.localized_text.is_none()
            && self.additional_info.is_none()
            && self.inner_status_code.is_none()
            && self.inner_diagnostic_info.is_none()
    }

    /// Returns a copy with the symbolic id taken from the table.
    #[must_use]
    pub fn with_symbolic_id(mut self, table: &mut StringTable, symbol: &str) -> Self {
        self.symbolic_id = Some(table.add_or_get(symbol));
        self
    }

    /// Returns a copy with the namespace URI taken from the table.
    #[must_use]
    pub fn with_namespace_uri(mut self, table: &mut StringTable, uri: &str) -> Self {
        self.namespace_uri = Some(table.add_or_get(uri));
        self
    }

    /// Returns a copy with the localized text taken from the table.
    #[must_use]
    pub fn with_localized_text(mut self, table: &mut StringTable, text: &str) -> Self {
        self.localized_text = Some(table.add_or_get(text));
        self
    }

    /// Returns a copy with the locale taken from the table.
    #[must_use]
    pub fn with_locale(mut self, table: &mut StringTable, locale: &str) -> Self {
        self.locale = Some(table.add_or_get(locale));
        self
    }

    /// Returns a copy with free-text additional info.
    #[must_use]
    pub fn with_additional_info(mut self, info: impl Into<String>) -> Self {
        self.additional_info = Some(info.into());
        self
    }

    /// Returns a copy with an inner status code.
    #[must_use]
    pub fn with_inner_status_code(mut self, code: StatusCode) -> Self {
        self.inner_status_code = Some(code);
        self
    }

    /// Returns a copy with an inner diagnostic.
    #[must_use]
    pub fn with_inner(mut self, inner: DiagnosticInfo) -> Self {
        self.inner_diagnostic_info = Some(Box::new(inner));
        self
    }

    /// Resolves the symbolic id against the table.
    pub fn symbolic_id_str<'a>(&self, table: &'a StringTable) -> Option<&'a str> {
        self.symbolic_id.and_then(|i| table.get(i))
    }

    /// Resolves the namespace URI against the table.
    pub fn namespace_uri_str<'a>(&self, table: &'a StringTable) -> Option<&'a str> {
        self.namespace_uri.and_then(|i| table.get(i))
    }

    /// Resolves the localized text against the table.
    pub fn localized_text_str<'a>(&self, table: &'a StringTable) -> Option<&'a str> {
        self.localized_text.and_then(|i| table.get(i))
    }

    /// Resolves the locale against the table.
    pub fn locale_str<'a>(&self, table: &'a StringTable) -> Option<&'a str> {
        self.locale.and_then(|i| table.get(i))
    }

    /// Returns the nesting depth (1 for a diagnostic with no inner).
    pub fn depth(&self) -> usize {
        1 + self
            .inner_diagnostic_info
            .as_deref()
            .map_or(0, DiagnosticInfo::depth)
    }

    fn fmt_at_depth(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "diagnostic")?;
        if depth > 0 {
            write!(f, "[inner #{}]", depth)?;
        }
        write!(f, " {{")?;
        let mut sep = " ";
        let mut field = |f: &mut fmt::Formatter<'_>, name: &str, value: String| {
            let r = write!(f, "{}{}: {}", sep, name, value);
            sep = ", ";
            r
        };
        if let Some(v) = self.symbolic_id {
            field(f, "symbolic_id", v.to_string())?;
        }
        if let Some(v) = self.namespace_uri {
            field(f, "namespace_uri", v.to_string())?;
        }
        if let Some(v) = self.locale {
            field(f, "locale", v.to_string())?;
        }
        if let Some(v) = self.localized_text {
            field(f, "localized_text", v.to_string())?;
        }
        if let Some(v) = &self.additional_info {
            field(f, "additional_info", format!("{:?}", v))?;
        }
        if let Some(v) = self.inner_status_code {
            field(f, "inner_status", v.to_string())?;
        }
        write!(f, " }}")?;
        if let Some(inner) = &self.inner_diagnostic_info {
            write!(f, " -> ")?;
            inner.fmt_at_depth(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for DiagnosticInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_at_depth(f, 0)
    }
}

// =============================================================================
// StringTable
// =============================================================================

/// An owned, growable string table addressed by `i32` index.
///
/// Encode sites share one table across all diagnostics of a response and
/// call [`add_or_get`](Self::add_or_get); decode sites receive the table
/// as a parallel string array. Index `-1` conventionally means "absent"
/// and never resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StringTable {
    strings: Vec<String>,
}

impl StringTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a decoded parallel string array.
    pub fn from_strings(strings: Vec<String>) -> Self {
        Self { strings }
    }

    /// Returns the index of `value`, appending it if absent.
    ///
    /// A repeated string always reuses its existing index.
    pub fn add_or_get(&mut self, value: &str) -> i32 {
        if let Some(index) = self.strings.iter().position(|s| s == value) {
            return index as i32;
        }
        self.strings.push(value.to_string());
        (self.strings.len() - 1) as i32
    }

    /// Returns the string at `index`; negative indices never resolve.
    pub fn get(&self, index: i32) -> Option<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.strings.get(i))
            .map(String::as_str)
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Returns `true` if the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Returns the entries as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[String] {
        &self.strings
    }
}

// =============================================================================
// Tests
// =============================================================================
