use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    /// Configuration error: the name matches no known algorithm family.
    #[error("unknown layout algorithm `{0}`")]
    UnknownAlgorithm(String),

    /// A reserved algorithm name that has no implementation.
    #[error("layout algorithm `{0}` is not implemented yet")]
    NotImplemented(String),

    #[error("invalid value for parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("parameters for {params} do not apply to algorithm `{algorithm}`")]
    ParameterMismatch {
        algorithm: String,
        params: &'static str,
    },

    #[error("algorithm `{0}` requires a feature matrix")]
    MissingFeatureMatrix(String),

    #[error("unsupported layout dimension {0} (expected 2 or 3)")]
    InvalidDimension(usize),
}

impl LayoutError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
