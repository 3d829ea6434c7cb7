//! Error types for the host dispatch layer.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the host dispatch layer.
///
/// The kernel itself performs no validation; everything here comes from the
/// host side (adapter discovery, device setup, buffer transfers, config).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Adapter discovery or device setup failed.
    #[error("GPU error: {0}")]
    Gpu(String),

    /// A kernel configuration failed validation, or a dispatch was given
    /// slices shorter than the work group.
    #[error("config error: {0}")]
    Config(String),

    /// Reading a buffer back from the GPU failed.
    #[error("buffer read error: {0}")]
    BufferRead(String),

    /// Data did not fit in the destination buffer.
    #[error("buffer write error: {0}")]
    BufferWrite(String),
}

impl Error {
    /// Construct a [`Error::Gpu`]
    pub fn gpu<S: Into<String>>(msg: S) -> Self {
        Error::Gpu(msg.into())
    }

    /// Construct a [`Error::Config`]
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Construct a [`Error::BufferRead`]
    pub fn buffer_read<S: Into<String>>(msg: S) -> Self {
        Error::BufferRead(msg.into())
    }

    /// Construct a [`Error::BufferWrite`]
    pub fn buffer_write<S: Into<String>>(msg: S) -> Self {
        Error::BufferWrite(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::gpu("no adapter");
        assert_eq!(err.to_string(), "GPU error: no adapter");

        let err = Error::config("slots must differ");
        assert_eq!(err.to_string(), "config error: slots must differ");
    }
}
