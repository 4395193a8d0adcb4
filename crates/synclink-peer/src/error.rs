/// Errors that can occur while building or driving a link.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Codec/registry error (missing codec for a scheduled index, etc.).
    #[error("codec error: {0}")]
    Codec(#[from] synclink_frame::CodecError),

    /// Invalid schedule configuration.
    #[error("config error: {0}")]
    Config(#[from] synclink_sched::ConfigError),
}

pub type Result<T> = std::result::Result<T, LinkError>;
