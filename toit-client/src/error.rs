use std::string::FromUtf8Error;

use tonic::{codegen::http::uri::InvalidUri, metadata::errors::InvalidMetadataValue};

/// Errors that can occur while logging in and listing devices.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Establishing the HTTP/2 connection to the API failed
    #[error(transparent)]
    Connection(tonic::transport::Error),
    /// A gRPC call failed; the status is passed through as returned
    #[error(transparent)]
    Call(#[from] tonic::Status),
    /// The call completed but carried no response message
    #[error("Empty response was returned from {0}")]
    MissingResponse(&'static str),
    /// Login succeeded without handing out an access token
    #[error("login returned an empty access token")]
    EmptyToken,
    #[error("access token is not valid UTF-8")]
    InvalidToken(#[source] FromUtf8Error),
    /// The access token cannot be carried in an ASCII metadata value
    #[error("access token cannot be sent as authorization metadata")]
    InvalidMetadata(#[source] InvalidMetadataValue),
    #[error("invalid API url '{url}'")]
    InvalidUri {
        url: String,
        #[source]
        source: InvalidUri,
    },
    #[error("failed to write device list")]
    Output(#[from] std::io::Error),
    #[error("interrupted")]
    Interrupted,
}
