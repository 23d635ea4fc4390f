//! Platform error types

use thiserror::Error;

/// Platform-related errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Platform not supported on this OS
    #[error("Platform not supported: {0}")]
    Unsupported(String),

    /// A call into the host runtime (JNI, system service) failed
    #[error("Host call failed: {0}")]
    Jni(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let unsupported = PlatformError::Unsupported("android only".to_string());
        assert_eq!(unsupported.to_string(), "Platform not supported: android only");

        let jni = PlatformError::Jni("java exception".to_string());
        assert_eq!(jni.to_string(), "Host call failed: java exception");
    }
}
