// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Classified errors produced while serving a JSON request.
//!
//! Every failure in the request pipeline is wrapped into an `Error` at the exact point where it
//! happens and handed back to the orchestrator.  The `ErrorKind` tells the error callback which
//! stage failed so that it can pick an HTTP status without having to inspect the cause.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// Type-erased failure reason carried by an `Error`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Stage of the request pipeline that failed.
///
/// Variants are listed in the order in which the pipeline can hit them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum ErrorKind {
    /// Unclassified error.  Never produced by this crate; available for test doubles.
    Unknown,

    /// The request does not declare a JSON content type.
    NotJsonRequest,

    /// The request body could not be read from the transport.
    ReadRequestBody,

    /// The request body exceeds the configured maximum size.
    TooLargeRequestBody,

    /// The request body is not valid JSON for the expected type.
    UnmarshalRequestBody,

    /// The user handler returned an error.
    HandlerError,

    /// The handler's response could not be encoded as JSON.
    MarshalResponse,

    /// The response body could not be written.  The status and headers were already sent.
    WriteResponseBody,
}

impl ErrorKind {
    /// Returns the name of this kind as used in serialized errors.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Unknown => "Unknown",
            ErrorKind::NotJsonRequest => "NotJsonRequest",
            ErrorKind::ReadRequestBody => "ReadRequestBody",
            ErrorKind::TooLargeRequestBody => "TooLargeRequestBody",
            ErrorKind::UnmarshalRequestBody => "UnmarshalRequestBody",
            ErrorKind::HandlerError => "HandlerError",
            ErrorKind::MarshalResponse => "MarshalResponse",
            ErrorKind::WriteResponseBody => "WriteResponseBody",
        }
    }

    /// Returns true if the user handler failed, as opposed to the request plumbing.
    pub fn is_handler_error(self) -> bool {
        self == ErrorKind::HandlerError
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A failure reason tagged with the pipeline stage that produced it.
#[derive(Debug, thiserror::Error)]
#[error("{kind} {cause}")]
pub struct Error {
    /// The original error.
    #[source]
    cause: BoxError,

    /// Classification of `cause`.
    kind: ErrorKind,
}

impl Error {
    /// Wraps `cause` as an error of the given `kind`.
    pub fn new<E: Into<BoxError>>(cause: E, kind: ErrorKind) -> Self {
        Self { cause: cause.into(), kind }
    }

    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the original error.
    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.cause.as_ref()
    }

    /// Consumes this error and returns the original error.
    pub fn into_cause(self) -> BoxError {
        self.cause
    }
}

impl Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Error", 2)?;
        state.serialize_field("err", &self.cause.to_string())?;
        state.serialize_field("kind", &self.kind)?;
        state.end()
    }
}

/// Result type for this crate.
pub type JsonResult<T> = Result<T, Error>;
