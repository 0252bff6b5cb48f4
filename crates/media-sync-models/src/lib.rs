pub mod error;
pub mod media;
pub mod rating;
pub mod snapshot;
pub mod title_ref;
pub mod watch_history;
pub mod watchlist;

pub use error::{Result, SyncError};
pub use media::MediaKind;
pub use rating::RatingEntry;
pub use snapshot::Snapshot;
pub use title_ref::{HasTitleRef, TitleRef};
pub use watch_history::HistoryEntry;
pub use watchlist::WatchlistEntry;
