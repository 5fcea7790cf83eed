//! Identifier types used across the risk engine.
//!
//! The broker keys priced instruments by FIGI and links options to their
//! underlyings by position UID. Keeping the two as distinct types prevents a
//! position UID from ever being looked up in a FIGI-keyed table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Financial Instrument Global Identifier of a share, ETF, bond or future.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Figi(pub String);

impl Figi {
    /// Create a new FIGI.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Figi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Figi {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Broker position UID. Options are keyed by it, and an option's underlying
/// is referenced through it.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionUid(pub String);

impl PositionUid {
    /// Create a new position UID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for PositionUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PositionUid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Brokerage account identifier.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    /// Create a new account ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identity of a normalized position.
///
/// Shares and futures are identified by FIGI, options by their position UID.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum InstrumentKey {
    /// Priced instrument keyed by FIGI
    Figi(Figi),
    /// Option keyed by position UID
    PositionUid(PositionUid),
}

impl InstrumentKey {
    /// Returns the FIGI if this key refers to a priced instrument.
    pub fn figi(&self) -> Option<&Figi> {
        match self {
            InstrumentKey::Figi(figi) => Some(figi),
            InstrumentKey::PositionUid(_) => None,
        }
    }
}

impl fmt::Display for InstrumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentKey::Figi(figi) => write!(f, "{}", figi),
            InstrumentKey::PositionUid(uid) => write!(f, "{}", uid),
        }
    }
}
