//! Tenant identifier.
//!
//! Tenants are merchants. Their identifiers are issued by the surrounding
//! platform, so they are opaque strings rather than UUIDs we generate.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`TenantId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TenantIdError {
    /// The input string is empty or whitespace.
    #[error("tenant id cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("tenant id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// Identifier that scopes every row belonging to one merchant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(transparent))]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    /// Maximum accepted length.
    pub const MAX_LENGTH: usize = 128;

    /// Parse a tenant id, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or too long.
    pub fn parse(s: &str) -> Result<Self, TenantIdError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TenantIdError::Empty);
        }
        if trimmed.len() > Self::MAX_LENGTH {
            return Err(TenantIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TenantId {
    type Error = TenantIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TenantId> for String {
    fn from(id: TenantId) -> Self {
        id.0
    }
}

impl std::str::FromStr for TenantId {
    type Err = TenantIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        assert_eq!(TenantId::parse("  merchant-1 ").unwrap().as_str(), "merchant-1");
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(TenantId::parse("   "), Err(TenantIdError::Empty));
    }

    #[test]
    fn test_parse_rejects_long() {
        let long = "x".repeat(TenantId::MAX_LENGTH + 1);
        assert!(matches!(
            TenantId::parse(&long),
            Err(TenantIdError::TooLong { .. })
        ));
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<TenantId>("\"\"").is_err());
        let id: TenantId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(id.as_str(), "abc");
    }
}
