use crate::title_ref::{HasTitleRef, TitleRef};
use serde::{Deserialize, Serialize};

/// Membership of one title in a watchlist; set semantics only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct WatchlistEntry {
    pub id: TitleRef,
}

impl WatchlistEntry {
    pub fn new(id: TitleRef) -> Self {
        Self { id }
    }
}

impl HasTitleRef for WatchlistEntry {
    fn title_ref(&self) -> &TitleRef {
        &self.id
    }
}
