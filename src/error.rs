//! Error taxonomy for the analysis pipeline.
//!
//! Only [`AnalysisError`] ever reaches a caller. Translation problems are
//! absorbed by the translator and carried inside its outcome instead.

use thiserror::Error;

/// Failure while pulling comments from the remote source.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("comment source unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("comment source rejected the request ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("comment source returned an unreadable payload: {0}")]
    Payload(String),
}

/// Why a translation fell back to the untranslated text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    #[error("translation request failed: {0}")]
    Network(String),

    #[error("translation service answered {0}")]
    Status(u16),

    #[error("translation response malformed: {0}")]
    Malformed(String),

    #[error("translation response missing `translatedText`")]
    MissingField,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("polarity scorer produced a non-finite score ({score}) for {text:?}")]
pub struct ScoreError {
    pub score: f64,
    pub text: String,
}

/// Terminal failure of one analysis run.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid YouTube URL")]
    InvalidUrl(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to fetch comments: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to score comment: {0}")]
    Scoring(#[from] ScoreError),
}

impl AnalysisError {
    /// Client-side errors are the caller's fault; everything else is ours.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::InvalidUrl(_) | AnalysisError::InvalidRequest(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(AnalysisError::InvalidUrl("https://example.com".into()).is_client_error());
        assert!(AnalysisError::InvalidRequest("page must be >= 1".into()).is_client_error());

        let fetch = AnalysisError::from(FetchError::Status {
            status: 403,
            message: "quotaExceeded".into(),
        });
        assert!(!fetch.is_client_error());
        assert!(fetch.to_string().contains("403"));
    }
}
