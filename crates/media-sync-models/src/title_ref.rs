use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical cross-catalog identifier of one title (`tt` followed by at least seven digits).
///
/// Both catalogs expose the same external identifier, but not always in the same
/// shape: exports carry bare ids, the destination API sometimes wraps them in
/// slashes, and users paste full title URLs. Everything funnels through
/// [`TitleRef::parse`] so that comparison is plain string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TitleRef(String);

const PREFIX: &str = "tt";
const MIN_DIGITS: usize = 7;

impl TitleRef {
    pub fn parse(raw: &str) -> Result<Self> {
        let without_query = raw.trim().split(['?', '#']).next().unwrap_or_default();
        let candidate = without_query
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        let digits = candidate
            .strip_prefix(PREFIX)
            .ok_or_else(|| SyncError::InvalidIdentifier(raw.to_string()))?;

        if digits.len() < MIN_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SyncError::InvalidIdentifier(raw.to_string()));
        }

        Ok(Self(format!("{}{}", PREFIX, digits)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TitleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TitleRef {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TitleRef {
    type Error = SyncError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<TitleRef> for String {
    fn from(value: TitleRef) -> Self {
        value.0
    }
}

/// Anything keyed by a [`TitleRef`] for diffing and deduplication
pub trait HasTitleRef {
    fn title_ref(&self) -> &TitleRef;
}

impl HasTitleRef for TitleRef {
    fn title_ref(&self) -> &TitleRef {
        self
    }
}
