use std::fmt;

use synclink_peer::LinkError;

pub const SUCCESS: i32 = 0;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn link_error(context: &str, err: LinkError) -> CliError {
    let code = match err {
        LinkError::Codec(_) => DATA_INVALID,
        LinkError::Config(_) => USAGE,
    };
    CliError::new(code, format!("{context}: {err}"))
}
