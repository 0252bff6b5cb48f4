use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of title a watchlist or rating entry refers to.
///
/// Both catalogs split their lists by kind, so every fetch and every
/// write batch is scoped to exactly one of these.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Show,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Show => "show",
        }
    }

    /// Plural form used as the batch key and URL segment by the destination API
    pub fn plural(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movies",
            MediaKind::Show => "shows",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" | "movies" => Ok(MediaKind::Movie),
            "show" | "shows" => Ok(MediaKind::Show),
            other => Err(format!("Invalid media kind: {}. Use 'movie' or 'show'", other)),
        }
    }
}
