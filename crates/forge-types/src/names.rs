// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Browse names, localized text, and XML fragments.
//!
//! [`QualifiedName`] is a `(namespace index, name)` pair used for browse
//! names; `(0, empty)` is the canonical null. [`LocalizedText`] pairs a
//! text with an optional locale identifier validated against a
//! constrained `language[-REGION]` subset; an empty locale is the
//! explicit "no locale" sentinel, distinct from an absent one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{UaError, ValidationError};

// =============================================================================
// QualifiedName
// =============================================================================

/// A namespace-qualified browse name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct QualifiedName {
    /// Namespace index of the name.
    pub namespace_index: u16,

    /// The name; `None` and the empty string are both null.
    pub name: Option<String>,
}

impl QualifiedName {
    /// Creates a qualified name.
    pub fn new(namespace_index: u16, name: impl Into<String>) -> Self {
        Self {
            namespace_index,
            name: Some(name.into()),
        }
    }

    /// Returns the null qualified name (`(0, null)`).
    #[inline]
    pub const fn null() -> Self {
        Self {
            namespace_index: 0,
            name: None,
        }
    }

    /// Returns `true` if this is the canonical null: namespace 0 with an
    /// absent or empty name.
    pub fn is_null(&self) -> bool {
        self.namespace_index == 0 && self.name.as_deref().map_or(true, str::is_empty)
    }

    /// Returns the name as a string slice, empty when null.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

impl fmt::Display for QualifiedName {
    /// Renders as `<index>:<name>`, bare name for namespace 0.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace_index == 0 {
            write!(f, "{}", self.name())
        } else {
            write!(f, "{}:{}", self.namespace_index, self.name())
        }
    }
}

impl From<&str> for QualifiedName {
    fn from(name: &str) -> Self {
        Self::new(0, name)
    }
}

// =============================================================================
// LocalizedText
// =============================================================================

/// Human-readable text with an optional locale.
///
/// The locale distinguishes three states: absent (`None`), the explicit
/// "no locale" sentinel (empty string), and a validated
/// `language[-REGION]` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct LocalizedText {
    /// Locale identifier; see the type docs for the three states.
    pub locale: Option<String>,

    /// The text content.
    pub text: Option<String>,
}

impl LocalizedText {
    /// Creates a text with no locale information.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            locale: None,
            text: Some(text.into()),
        }
    }

    /// Creates a text with a validated locale.
    ///
    /// # Errors
    ///
    /// Fails if `locale` is non-empty and does not match the
    /// `language[-REGION]` subset (2-3 lowercase letters, optionally a
    /// dash and 2 uppercase letters).
    pub fn with_locale(locale: impl Into<String>, text: impl Into<String>) -> Result<Self, UaError> {
        let locale = locale.into();
        validate_locale(&locale)?;
        Ok(Self {
            locale: Some(locale),
            text: Some(text.into()),
        })
    }

    /// Creates a text carrying the explicit "no locale" sentinel.
    pub fn no_locale(text: impl Into<String>) -> Self {
        Self {
            locale: Some(String::new()),
            text: Some(text.into()),
        }
    }

    /// Returns the null localized text.
    #[inline]
    pub const fn null() -> Self {
        Self {
            locale: None,
            text: None,
        }
    }

    /// Returns `true` if both locale and text are absent.
    pub fn is_null(&self) -> bool {
        self.locale.is_none() && self.text.is_none()
    }

    /// Returns the text as a string slice, empty when absent.
    #[inline]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Returns `true` if the explicit "no locale" sentinel is set.
    pub fn has_no_locale_sentinel(&self) -> bool {
        self.locale.as_deref() == Some("")
    }
}

impl fmt::Display for LocalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.locale.as_deref() {
            Some(locale) if !locale.is_empty() => write!(f, "[{}] {}", locale, self.text()),
            _ => write!(f, "{}", self.text()),
        }
    }
}

impl From<&str> for LocalizedText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Validates the constrained `language[-REGION]` locale subset.
///
/// The empty string is the "no locale" sentinel and passes.
fn validate_locale(locale: &str) -> Result<(), UaError> {
    if locale.is_empty() {
        return Ok(());
    }
    let (language, region) = match locale.split_once('-') {
        Some((l, r)) => (l, Some(r)),
        None => (locale, None),
    };
    if !(2..=3).contains(&language.len())
        || !language.bytes().all(|b| b.is_ascii_lowercase())
    {
        return Err(ValidationError::invalid_locale(
            locale,
            "language must be 2-3 lowercase letters",
        )
        .into());
    }
    if let Some(region) = region {
        if region.len() != 2 || !region.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(ValidationError::invalid_locale(
                locale,
                "region must be 2 uppercase letters",
            )
            .into());
        }
    }
    Ok(())
}

// =============================================================================
// XmlElement
// =============================================================================

/// An XML fragment carried opaquely.
///
/// The type layer stores and transports XML bodies without parsing them;
/// interpretation belongs to the serializer registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct XmlElement(String);

impl XmlElement {
    /// Creates an XML fragment.
    pub fn new(xml: impl Into<String>) -> Self {
        Self(xml.into())
    }

    /// Returns the fragment text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the fragment length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the fragment is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for XmlElement {
    fn from(xml: &str) -> Self {
        Self::new(xml)
    }
}

// =============================================================================
// Tests
// =============================================================================
