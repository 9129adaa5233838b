//! Error types shared by the question sources and the session controller.

use thiserror::Error;

/// Failure to obtain the question list for a new session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    #[error("question request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("question request failed with status {0}")]
    Status(reqwest::StatusCode),
    #[error("question response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("dictionary is malformed: {0}")]
    Dictionary(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Message shown to the player when a session could not be started.
    pub fn user_notice(&self) -> &'static str {
        "問題データの取得に失敗しました。再読み込みしてください。"
    }
}
