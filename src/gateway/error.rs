//! Remote store errors.

use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

use crate::sync::Section;

const NAMESPACE_NOT_FOUND: i32 = 26;
const WRITE_CONFLICT: i32 = 112;
const DUPLICATE_KEY: i32 = 11000;

/// Failure talking to the remote configuration store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Network or server failure. Callers keep whatever they had cached.
    #[error("configuration store unavailable: {0}")]
    StoreUnavailable(String),

    /// The section has never been provisioned.
    #[error("{0} section not provisioned")]
    NotFound(Section),

    /// A concurrent upsert collided with this one.
    #[error("write conflict: {0}")]
    WriteConflict(String),
}

impl GatewayError {
    /// Classify a driver error for `section`.
    pub fn from_mongo(section: Section, err: mongodb::error::Error) -> Self {
        Self::from_code(section, server_code(&err), err.to_string())
    }

    fn from_code(section: Section, code: Option<i32>, message: String) -> Self {
        match code {
            Some(NAMESPACE_NOT_FOUND) => Self::NotFound(section),
            Some(WRITE_CONFLICT) | Some(DUPLICATE_KEY) => Self::WriteConflict(message),
            _ => Self::StoreUnavailable(message),
        }
    }
}

fn server_code(err: &mongodb::error::Error) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Command(command_error) => Some(command_error.code),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => Some(write_error.code),
        ErrorKind::Write(WriteFailure::WriteConcernError(concern_error)) => {
            Some(concern_error.code)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_are_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = mongodb::error::Error::from(io);

        assert!(matches!(
            GatewayError::from_mongo(Section::Site, err),
            GatewayError::StoreUnavailable(_)
        ));
    }

    #[test]
    fn test_server_codes_are_classified() {
        let classify = |code| GatewayError::from_code(Section::Menu, code, "server said no".to_string());

        assert_eq!(classify(Some(26)), GatewayError::NotFound(Section::Menu));
        assert_eq!(
            classify(Some(112)),
            GatewayError::WriteConflict("server said no".to_string())
        );
        assert_eq!(
            classify(Some(11000)),
            GatewayError::WriteConflict("server said no".to_string())
        );
        assert_eq!(
            classify(Some(13)),
            GatewayError::StoreUnavailable("server said no".to_string())
        );
        assert_eq!(
            classify(None),
            GatewayError::StoreUnavailable("server said no".to_string())
        );
    }
}
