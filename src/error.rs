//! Error types for the teclient update encoder

/// Errors that can occur while encoding an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Buffer strategy could not satisfy a space reservation
    Allocation,
    /// Key-value type whose wire support is compiled out
    InvalidKeyValueType,
    /// Truncated or overlong varint (decode helpers only)
    Truncated,
}

impl Error {
    /// Returns a human-readable description of the error
    pub const fn description(&self) -> &'static str {
        match self {
            Error::Allocation => "buffer strategy could not reserve space",
            Error::InvalidKeyValueType => "key-value type not supported by this build",
            Error::Truncated => "truncated or overlong varint",
        }
    }
}

#[cfg(feature = "std")]
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias for teclient operations
pub type Result<T> = core::result::Result<T, Error>;
