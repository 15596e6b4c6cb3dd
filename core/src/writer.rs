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

//! Writing of JSON responses.
//!
//! Responses are written through a `ResponseSink`, which models a response that is committed
//! piecemeal: headers first, then the status, then the body.  Once the status has been written,
//! the headers are frozen and later changes to them are not sent.

use crate::error::{Error, ErrorKind, JsonResult};
use axum::body::Body;
use axum::response::Response;
use bytes::BytesMut;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, StatusCode};
use log::warn;
use serde::Serialize;
use std::io;

/// Destination of an HTTP response.
pub trait ResponseSink: Send {
    /// Returns the headers that will be sent when the status is written.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Commits the response `status` and the current headers.
    fn write_status(&mut self, status: StatusCode);

    /// Appends `data` to the response body, committing a 200 status first if none was written.
    fn write_body(&mut self, data: &[u8]) -> io::Result<()>;
}

/// A `ResponseSink` that accumulates the response in memory.
///
/// Writing the body never fails, so a response serialized into this sink is delivered as a whole
/// or not at all.
#[derive(Debug, Default)]
pub struct BufferedResponse {
    /// Headers to send, which can still change until the status is written.
    pending_headers: HeaderMap,

    /// Status and headers, once committed.
    committed: Option<(StatusCode, HeaderMap)>,

    /// Body written so far.
    body: BytesMut,
}

impl BufferedResponse {
    /// Creates a new empty response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the committed status, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.committed.as_ref().map(|(status, _)| *status)
    }

    /// Returns the headers that have been committed or will be committed.
    pub fn headers(&self) -> &HeaderMap {
        match &self.committed {
            Some((_, headers)) => headers,
            None => &self.pending_headers,
        }
    }

    /// Returns the body written so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Converts the accumulated data into a response, defaulting to an empty 200 OK.
    pub fn into_response(self) -> Response {
        let (status, headers) = self.committed.unwrap_or((StatusCode::OK, self.pending_headers));
        let mut response = Response::new(Body::from(self.body.freeze()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

impl ResponseSink for BufferedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.pending_headers
    }

    fn write_status(&mut self, status: StatusCode) {
        match &self.committed {
            Some((committed, _)) => {
                warn!("Ignoring superfluous status {}; already sent {}", status, committed)
            }
            None => self.committed = Some((status, self.pending_headers.clone())),
        }
    }

    fn write_body(&mut self, data: &[u8]) -> io::Result<()> {
        if self.committed.is_none() {
            self.write_status(StatusCode::OK);
        }
        self.body.extend_from_slice(data);
        Ok(())
    }
}

/// Computes the value of the `Content-Type` header for a JSON response in `charset`.
fn content_type(charset: &str) -> String {
    if charset.is_empty() {
        mime::APPLICATION_JSON.to_string()
    } else {
        format!("{}; charset={}", mime::APPLICATION_JSON, charset)
    }
}

/// Writes `value` as JSON into `sink` with the given `status` and `charset`.
///
/// Nothing is written if `value` cannot be serialized or if `charset` is not a valid header
/// value.  If writing the body fails, the status and headers have already been committed.
pub fn write_body<U: Serialize + ?Sized>(
    sink: &mut dyn ResponseSink,
    value: &U,
    status: StatusCode,
    charset: &str,
) -> JsonResult<()> {
    let body = serde_json::to_vec(value).map_err(|e| Error::new(e, ErrorKind::MarshalResponse))?;
    let content_type = HeaderValue::try_from(content_type(charset))
        .map_err(|e| Error::new(e, ErrorKind::MarshalResponse))?;

    sink.headers_mut().insert(CONTENT_TYPE, content_type);
    sink.write_status(status);
    sink.write_body(&body).map_err(|e| Error::new(e, ErrorKind::WriteResponseBody))
}
