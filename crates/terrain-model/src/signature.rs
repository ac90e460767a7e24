//! Canonical function signatures
//!
//! Grammar (exact, no extra whitespace):
//!
//! ```text
//! signature  := identifier "(" [ identifier ( ", " identifier )* ] ")"
//! identifier := [A-Za-z_][A-Za-z0-9_]*
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Parameter separator of the canonical form
const PARAM_SEPARATOR: &str = ", ";

/// A public top-level function reduced to its name and bare parameter names
///
/// Equality, ordering and hashing all go through the canonical string, so two
/// signatures are the same iff they render identically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature {
    name: String,
    params: Vec<String>,
    canonical: String,
}

impl Signature {
    /// Build a signature from a name and ordered parameter names
    ///
    /// # Errors
    /// Returns [`SignatureError::InvalidIdentifier`] if the name or any
    /// parameter is not a letter/underscore-led ASCII identifier.
    pub fn new<N, I, P>(name: N, params: I) -> Result<Self, SignatureError>
    where
        N: Into<String>,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(SignatureError::InvalidIdentifier(name));
        }

        let params: Vec<String> = params.into_iter().map(Into::into).collect();
        if let Some(bad) = params.iter().find(|p| !is_identifier(p)) {
            return Err(SignatureError::InvalidIdentifier(bad.clone()));
        }

        let canonical = format!("{}({})", name, params.join(PARAM_SEPARATOR));
        Ok(Self {
            name,
            params,
            canonical,
        })
    }

    /// Parse text that must already be in canonical form
    ///
    /// # Errors
    /// Returns [`SignatureError::Malformed`] for anything the grammar rejects,
    /// including non-canonical spacing such as `f(a,b)`.
    pub fn parse(text: &str) -> Result<Self, SignatureError> {
        let malformed = || SignatureError::Malformed(text.to_string());

        let open = text.find('(').ok_or_else(malformed)?;
        let inner = text[open + 1..].strip_suffix(')').ok_or_else(malformed)?;
        let name = &text[..open];

        let params: Vec<&str> = if inner.is_empty() {
            Vec::new()
        } else {
            inner.split(PARAM_SEPARATOR).collect()
        };

        if !is_identifier(name) || !params.iter().all(|p| is_identifier(p)) {
            return Err(malformed());
        }

        Self::new(name, params)
    }

    /// Function name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered bare parameter names
    #[inline]
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Canonical text form, e.g. `calculate_tax(amount, country, rate)`
    #[inline]
    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

/// Check canonical text against the grammar without building a [`Signature`]
#[inline]
#[must_use]
pub fn is_canonical(text: &str) -> bool {
    Signature::parse(text).is_ok()
}

/// Letter/underscore-led ASCII alphanumeric identifier
#[must_use]
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Signature {}

impl Hash for Signature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for Signature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Signature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Signature {
    type Error = SignatureError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Signature> for String {
    fn from(value: Signature) -> Self {
        value.canonical
    }
}

/// Signature construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// Name or parameter is not a valid identifier
    #[error("invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// Text does not match the canonical grammar
    #[error("malformed signature: '{0}'")]
    Malformed(String),
}
