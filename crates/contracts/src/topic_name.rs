//! TopicName - Cheap-to-clone topic identifier
//!
//! Uses Arc<str> internally for O(1) clone operations.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Topic identifier with cheap cloning.
///
/// Topic names are case-sensitive and unversioned. They are created once per
/// inbound message or route entry and then cloned into logs, metrics and
/// outcomes, so the backing storage is shared.
///
/// # Examples
/// ```
/// use contracts::TopicName;
///
/// let topic: TopicName = "LoginRequest".into();
/// let again = topic.clone();
/// assert_eq!(topic, again);
/// assert_eq!(topic.as_str(), "LoginRequest");
/// assert_ne!(topic, "loginrequest");
/// ```
#[derive(Clone, Default)]
pub struct TopicName(Arc<str>);

impl TopicName {
    /// Create a new TopicName from a string slice.
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for TopicName {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for TopicName {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TopicName {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TopicName {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for TopicName {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Display for TopicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TopicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TopicName({:?})", self.0)
    }
}

impl PartialEq for TopicName {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for TopicName {}

impl PartialEq<str> for TopicName {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for TopicName {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl PartialEq<String> for TopicName {
    #[inline]
    fn eq(&self, other: &String) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialOrd for TopicName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TopicName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

// Hash must match str hash so `HashMap<TopicName, _>` can be queried with &str
impl Hash for TopicName {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl Serialize for TopicName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TopicName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_clone_shares_storage() {
        let a: TopicName = "SeatRequest".into();
        let b = a.clone();
        assert_eq!(a.as_str().as_ptr(), b.as_str().as_ptr());
    }

    #[test]
    fn test_case_sensitive() {
        let topic: TopicName = "LoginRequest".into();
        assert_eq!(topic, "LoginRequest");
        assert_ne!(topic, "loginRequest");
        assert_ne!(topic, TopicName::from("LOGINREQUEST"));
    }

    #[test]
    fn test_hashmap_lookup_by_str() {
        let mut map: HashMap<TopicName, u8> = HashMap::new();
        map.insert("PaymentRequest".into(), 1);
        assert_eq!(map.get("PaymentRequest"), Some(&1));
        assert_eq!(map.get("PaymentResponse"), None);
    }

    #[test]
    fn test_serde_transparent() {
        let topic: TopicName = "MovieListRequest".into();
        let json = serde_json::to_string(&topic).unwrap();
        assert_eq!(json, "\"MovieListRequest\"");
        let parsed: TopicName = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, topic);
    }
}
