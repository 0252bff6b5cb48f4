use crate::title_ref::{HasTitleRef, TitleRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct HistoryEntry {
    pub id: TitleRef,
    pub watched_at: DateTime<Utc>,
}

impl HasTitleRef for HistoryEntry {
    fn title_ref(&self) -> &TitleRef {
        &self.id
    }
}
