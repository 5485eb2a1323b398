//! Object store providers.

#[cfg(feature = "local")]
pub mod local;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

use dbox_core::error::AppError;
use dbox_core::result::AppResult;

/// Reject keys that could escape the bucket or that no backend accepts.
pub(crate) fn validate_key(key: &str) -> AppResult<()> {
    if key.is_empty() {
        return Err(AppError::validation("Object key cannot be empty"));
    }
    if key.starts_with('/') || key.contains('\\') || key.contains('\0') {
        return Err(AppError::validation(format!("Invalid object key: {key}")));
    }
    if key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..") {
        return Err(AppError::validation(format!("Invalid object key: {key}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("a.txt").is_ok());
        assert!(validate_key("nested/dir/a.txt").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("../escape").is_err());
        assert!(validate_key("a//b").is_err());
    }
}
