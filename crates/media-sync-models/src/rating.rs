use crate::title_ref::{HasTitleRef, TitleRef};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 10;

/// One rating for one title. Equality covers the whole entry, so a changed
/// score or a changed rating date both count as a difference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RatingEntry {
    pub id: TitleRef,
    pub rating: u8,
    pub rated_at: NaiveDate,
}

impl RatingEntry {
    /// Returns `None` when `rating` is outside 1-10
    pub fn new(id: TitleRef, rating: u8, rated_at: NaiveDate) -> Option<Self> {
        (MIN_RATING..=MAX_RATING)
            .contains(&rating)
            .then_some(Self { id, rating, rated_at })
    }
}

impl HasTitleRef for RatingEntry {
    fn title_ref(&self) -> &TitleRef {
        &self.id
    }
}
