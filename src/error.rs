// SPDX-License-Identifier: Apache-2.0

use std::{
    array::TryFromSliceError,
    convert::From,
    error,
    fmt::Display,
    io,
};

use x509_cert::der;

/// Classification of a failed operation.
///
/// Callers decide whether a failure is worth retrying based on this code:
/// [`ErrorCode::InvalidArgument`] and [`ErrorCode::Unauthenticated`] never are.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorCode {
    /// A malformed policy or configuration object, a missing mandatory
    /// field, an unrecognized format tag, or a structurally incomplete
    /// identity or match spec.
    InvalidArgument,

    /// A cryptographic or codec operation failed for reasons that are not
    /// expressible as a caller mistake.
    Internal,

    /// A verification or matching policy check was evaluated and failed.
    Unauthenticated,

    /// A structurally valid but unsupported algorithm was encountered.
    Unimplemented,

    /// Reserved for the hardware-interface boundary.
    OutOfRange,

    /// Reserved for the hardware-interface boundary.
    Aborted,

    /// Reserved for the hardware-interface boundary.
    PermissionDenied,
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::Internal => "INTERNAL",
            ErrorCode::Unauthenticated => "UNAUTHENTICATED",
            ErrorCode::Unimplemented => "UNIMPLEMENTED",
            ErrorCode::OutOfRange => "OUT_OF_RANGE",
            ErrorCode::Aborted => "ABORTED",
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
        };
        write!(f, "{name}")
    }
}

/// The error type returned by every fallible operation in this crate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    code: ErrorCode,
    message: String,
}

impl Error {
    /// Create an error with an explicit code.
    pub fn new<S: Into<String>>(code: ErrorCode, message: S) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for [`ErrorCode::InvalidArgument`].
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    /// Shorthand for [`ErrorCode::Internal`].
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Shorthand for [`ErrorCode::Unauthenticated`].
    pub fn unauthenticated<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorCode::Unauthenticated, message)
    }

    /// Shorthand for [`ErrorCode::Unimplemented`].
    pub fn unimplemented<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorCode::Unimplemented, message)
    }

    /// The error classification.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// The human readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl error::Error for Error {}

impl From<der::Error> for Error {
    fn from(value: der::Error) -> Self {
        Self::internal(format!("ASN.1 codec failure: {value}"))
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Self::internal(format!("I/O failure: {value}"))
    }
}

impl From<bincode::Error> for Error {
    fn from(value: bincode::Error) -> Self {
        Self::internal(format!("serialization failure: {value}"))
    }
}

impl From<ArrayError> for Error {
    fn from(value: ArrayError) -> Self {
        Self::invalid_argument(value.to_string())
    }
}

/// A specialized `Result` for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors which may be encountered when building fixed-size arrays.
#[derive(Debug)]
pub enum ArrayError {
    /// Error when converting from a slice.
    SliceError(TryFromSliceError),

    /// Error when converting from a vector, with the offending length.
    VectorError(String),
}

impl std::fmt::Display for ArrayError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ArrayError::SliceError(error) => {
                write!(f, "Error when handling slice: {error}")
            }
            ArrayError::VectorError(error) => {
                write!(f, "Error when handling vector: {error}")
            }
        }
    }
}

impl std::error::Error for ArrayError {}

impl std::convert::From<TryFromSliceError> for ArrayError {
    fn from(value: TryFromSliceError) -> Self {
        Self::SliceError(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_code() {
        let err = Error::unauthenticated("issuer is not a CA");
        assert_eq!(err.code(), ErrorCode::Unauthenticated);
        assert_eq!(err.to_string(), "UNAUTHENTICATED: issuer is not a CA");
    }

    #[test]
    fn test_der_error_maps_to_internal() {
        let der_err: der::Error = der::ErrorKind::Failed.into();
        assert_eq!(Error::from(der_err).code(), ErrorCode::Internal);
    }

    #[test]
    fn test_array_error_maps_to_invalid_argument() {
        let err: Error = ArrayError::VectorError("Vector is the wrong size".to_string()).into();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        assert!(err.message().contains("wrong size"));
    }
}
