use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a subject: the aggregate or projection key an event stream belongs to.
///
/// Wraps a string to keep subject keys from being mixed up with projection
/// names and other free-form strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

/// Error returned when a subject identifier is empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("subject id must not be empty")]
pub struct SubjectIdError;

impl SubjectId {
    /// Creates a subject id, rejecting the empty string.
    pub fn parse(value: impl Into<String>) -> Result<Self, SubjectIdError> {
        let value = value.into();
        if value.is_empty() {
            return Err(SubjectIdError);
        }
        Ok(Self(value))
    }

    /// True for an id built through `From` from an empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the subject id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unchecked conversion for literals; use [`SubjectId::parse`] for input.
impl From<&str> for SubjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for SubjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Position of an event within its subject's stream.
///
/// Sequence numbers are strictly increasing per subject. A subject with no
/// events and no snapshot sits at [`SequenceNumber::BASELINE`], so its first
/// event is sequenced at `BASELINE + 1`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SequenceNumber(u64);

impl SequenceNumber {
    /// Sequence assumed for a subject that has neither events nor a snapshot.
    pub const BASELINE: Self = Self(1);

    /// Creates a sequence number from a raw value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the next sequence number.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Number of positions between `earlier` and `self`, zero if `earlier` is ahead.
    pub fn distance_from(&self, earlier: SequenceNumber) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Returns the raw sequence value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SequenceNumber {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<SequenceNumber> for u64 {
    fn from(sequence: SequenceNumber) -> Self {
        sequence.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_id_rejects_empty() {
        assert_eq!(SubjectId::parse(""), Err(SubjectIdError));
        assert_eq!(SubjectId::parse("1").unwrap().as_str(), "1");
        assert!(SubjectId::from("").is_empty());
    }

    #[test]
    fn subject_id_serializes_as_plain_string() {
        let id = SubjectId::from("product-7");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"product-7\"");
    }

    #[test]
    fn sequence_ordering_and_next() {
        let first = SequenceNumber::BASELINE.next();
        assert_eq!(first, SequenceNumber::new(2));
        assert!(SequenceNumber::BASELINE < first);
    }

    #[test]
    fn distance_saturates_at_zero() {
        let five = SequenceNumber::new(5);
        let nine = SequenceNumber::new(9);
        assert_eq!(nine.distance_from(five), 4);
        assert_eq!(five.distance_from(nine), 0);
    }
}
