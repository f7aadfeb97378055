//! Structured cache keys.
//!
//! A key is an ordered list of parts such as `["stories","top",20]`.
//! Invalidation matches by prefix, so `["stories"]` covers every story list.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One segment of a [`QueryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyPart {
    Int(i64),
    Text(String),
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        KeyPart::Text(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        KeyPart::Text(value)
    }
}

impl From<i64> for KeyPart {
    fn from(value: i64) -> Self {
        KeyPart::Int(value)
    }
}

impl From<i32> for KeyPart {
    fn from(value: i32) -> Self {
        KeyPart::Int(value.into())
    }
}

impl From<u32> for KeyPart {
    fn from(value: u32) -> Self {
        KeyPart::Int(value.into())
    }
}

impl From<u64> for KeyPart {
    fn from(value: u64) -> Self {
        KeyPart::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<usize> for KeyPart {
    fn from(value: usize) -> Self {
        KeyPart::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

/// Identity of a cached query: operation name plus parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    pub fn new(parts: Vec<KeyPart>) -> Self {
        Self(parts)
    }

    /// Append a part, builder style.
    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `self` equals the leading parts of `other`.
    ///
    /// The empty key is a prefix of every key.
    pub fn is_prefix_of(&self, other: &QueryKey) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, part) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            match part {
                KeyPart::Int(n) => write!(f, "{n}")?,
                KeyPart::Text(s) => write!(f, "{s:?}")?,
            }
        }
        f.write_str("]")
    }
}

/// Build a [`QueryKey`] from a list of parts.
///
/// ```
/// use pulse_core::query_key;
///
/// let key = query_key!["stories", "top", 20];
/// assert_eq!(key.to_string(), r#"["stories","top",20]"#);
/// ```
#[macro_export]
macro_rules! query_key {
    ($($part:expr),* $(,)?) => {
        $crate::cache::QueryKey::new(vec![$($crate::cache::KeyPart::from($part)),*])
    };
}
