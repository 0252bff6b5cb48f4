pub mod config;
pub mod paths;

pub use config::{Config, FileConfig, HttpConfig, ImdbConfig, Secret, TraktConfig};
pub use paths::{PathManager, CONFIG_PATH_ENV};
