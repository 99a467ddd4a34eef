pub type PostweaveResult<T> = Result<T, PostweaveError>;

#[derive(thiserror::Error, Debug)]
pub enum PostweaveError {
    #[error("invalid geometry: {0}")]
    Geometry(String),

    #[error("unknown template '{0}'")]
    UnknownTemplate(String),

    #[error("unknown layout '{0}'")]
    UnknownLayout(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PostweaveError {
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}
