/// Convenience result type used across the crate.
pub type CardResult<T> = Result<T, CardError>;

/// Error taxonomy shared by every pipeline stage.
///
/// Display strings carry internal detail and are meant for local logs only. Text that leaves the
/// process goes through [`crate::Notice`] instead.
#[derive(thiserror::Error, Debug)]
pub enum CardError {
    /// Missing or invalid configuration (credentials, paths, dates).
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level failure: timeout, DNS, refused connection.
    #[error("network error: {0}")]
    Network(String),

    /// The remote answered with a non-success status.
    #[error("http status {status}: {context}")]
    HttpStatus {
        /// HTTP status code returned by the remote.
        status: u16,
        /// What was being requested.
        context: String,
    },

    /// Body was not JSON, or lacked a required field.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A required file asset (template image) does not exist.
    #[error("asset missing: {path}")]
    AssetMissing {
        /// Path that was looked up.
        path: String,
    },

    /// Layout, drawing or encoding failed.
    #[error("render error: {0}")]
    Render(String),

    /// Media upload returned no usable media id.
    #[error("upload error: {0}")]
    Upload(String),

    /// Invalid caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CardError {
    /// Build a [`CardError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`CardError::Network`] value.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Build a [`CardError::HttpStatus`] value.
    pub fn http_status(status: u16, context: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            context: context.into(),
        }
    }

    /// Build a [`CardError::MalformedResponse`] value.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Build a [`CardError::AssetMissing`] value.
    pub fn asset_missing(path: impl Into<String>) -> Self {
        Self::AssetMissing { path: path.into() }
    }

    /// Build a [`CardError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CardError::Upload`] value.
    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    /// Build a [`CardError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// `true` for failures the directory stage degrades to an empty result.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::HttpStatus { .. } | Self::MalformedResponse(_)
        )
    }

    /// Map a `reqwest` failure onto the taxonomy.
    pub(crate) fn from_reqwest(context: &str, err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::malformed(format!("{context}: {err}"));
        }
        if let Some(status) = err.status() {
            return Self::http_status(status.as_u16(), context);
        }
        Self::network(format!("{context}: {err}"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
