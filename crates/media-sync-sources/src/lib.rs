pub mod http;
pub mod imdb;
pub mod throttle;
pub mod traits;
pub mod trakt;

pub use http::{CallKind, HttpClient, HttpResponse};
pub use imdb::ImdbClient;
pub use throttle::Throttle;
pub use traits::{DestinationCatalog, SourceCatalog, WriteOutcome};
pub use trakt::{PageSettings, TraktClient};
