use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

/// Failure taxonomy shared by every crate in the workspace.
///
/// Per-item "not found" answers from the destination are deliberately absent:
/// they are reported through `WriteOutcome::not_found` and never abort a run.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Missing or invalid credential, identifier or setting
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Raw value does not look like an external title identifier
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Source returned nothing where a diff was requested
    #[error("Source fetch for {stage} returned no entries; refusing to diff against an empty source")]
    EmptySourceFetch { stage: String },

    /// Network, authentication or parse failure while reading
    #[error("Fetch failed ({context}): {message}")]
    FetchFailure { context: String, message: String },

    /// Non-success response or transport failure on a destination write
    #[error("Write failed ({context}): {message}")]
    WriteFailure { context: String, message: String },

    /// First failure of a sync run, tagged with the stage it aborted
    #[error("Stage {stage} failed: {source}")]
    StageFailed {
        stage: String,
        #[source]
        source: Box<SyncError>,
    },
}

impl SyncError {
    pub fn fetch(context: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::FetchFailure {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn write(context: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::WriteFailure {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn empty_source(stage: impl Into<String>) -> Self {
        SyncError::EmptySourceFetch { stage: stage.into() }
    }

    pub fn in_stage(self, stage: impl Into<String>) -> Self {
        SyncError::StageFailed {
            stage: stage.into(),
            source: Box::new(self),
        }
    }

    /// The underlying failure, looking through stage tags
    pub fn root(&self) -> &SyncError {
        match self {
            SyncError::StageFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_tag_keeps_root_cause() {
        let error = SyncError::empty_source("ratings-movie").in_stage("ratings-movie");
        assert_eq!(
            error.to_string(),
            "Stage ratings-movie failed: Source fetch for ratings-movie returned no entries; refusing to diff against an empty source"
        );
        assert!(matches!(error.root(), SyncError::EmptySourceFetch { .. }));
    }
}
