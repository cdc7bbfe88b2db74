//! # Domain Identity Newtypes
//!
//! Newtype wrappers for every identifier in the studio stack. Each identifier
//! is a distinct type — you cannot pass a [`StudentId`] where a [`CycleId`]
//! is expected, and a raw `Uuid` satisfies neither.
//!
//! All identifiers are random v4 UUIDs, always valid by construction. `Ord`
//! is derived so identifiers can key ordered maps, which keeps ledger
//! serialization stable across runs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StudentId(Uuid);

impl StudentId {
    /// Create a new random student identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a student identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for StudentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "student:{}", self.0)
    }
}

impl std::str::FromStr for StudentId {
    type Err = uuid::Error;

    /// Parse from a bare UUID string or the prefixed `Display` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("student:").unwrap_or(s);
        Ok(Self(Uuid::parse_str(raw)?))
    }
}

/// A unique identifier for a class group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClassGroupId(Uuid);

impl ClassGroupId {
    /// Create a new random class-group identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a class-group identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ClassGroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClassGroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "class:{}", self.0)
    }
}

impl std::str::FromStr for ClassGroupId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("class:").unwrap_or(s);
        Ok(Self(Uuid::parse_str(raw)?))
    }
}

/// A unique identifier for a prepaid attendance cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CycleId(Uuid);

impl CycleId {
    /// Create a new random cycle identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a cycle identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CycleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cycle:{}", self.0)
    }
}

impl std::str::FromStr for CycleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("cycle:").unwrap_or(s);
        Ok(Self(Uuid::parse_str(raw)?))
    }
}

/// A unique identifier for an attendance row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttendanceId(Uuid);

impl AttendanceId {
    /// Create a new random attendance identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an attendance identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AttendanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AttendanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "attendance:{}", self.0)
    }
}

impl std::str::FromStr for AttendanceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("attendance:").unwrap_or(s);
        Ok(Self(Uuid::parse_str(raw)?))
    }
}

/// A unique identifier for a tuition payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PaymentId(Uuid);

impl PaymentId {
    /// Create a new random payment identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a payment identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "payment:{}", self.0)
    }
}

impl std::str::FromStr for PaymentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("payment:").unwrap_or(s);
        Ok(Self(Uuid::parse_str(raw)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn display_carries_prefix() {
        assert!(StudentId::new().to_string().starts_with("student:"));
        assert!(CycleId::new().to_string().starts_with("cycle:"));
        assert!(PaymentId::new().to_string().starts_with("payment:"));
    }

    #[test]
    fn parse_accepts_both_forms() {
        let id = PaymentId::new();
        let bare = id.as_uuid().to_string();
        let prefixed = id.to_string();
        assert_eq!(PaymentId::from_str(&bare).unwrap(), id);
        assert_eq!(PaymentId::from_str(&prefixed).unwrap(), id);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(AttendanceId::from_str("not-a-uuid").is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let id = ClassGroupId::new();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: ClassGroupId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn ids_are_distinct() {
        assert_ne!(StudentId::new(), StudentId::new());
    }
}
