use thiserror::Error;

/// Failure classes for Kubernetes API access. Classification is structural,
/// based on the API response, never on matching error text.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("kubernetes request failed: {0}")]
    Transport(String),

    #[error("failed to decode kubernetes response: {0}")]
    Decode(String),
}

impl PlatformError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PlatformError::NotFound(_))
    }
}

impl From<kube::Error> for PlatformError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(resp) if resp.code == 404 => {
                PlatformError::NotFound(resp.message)
            }
            kube::Error::SerdeError(e) => PlatformError::Decode(e.to_string()),
            other => PlatformError::Transport(other.to_string()),
        }
    }
}
