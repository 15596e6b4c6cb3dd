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

//! Reading of JSON request bodies.

use crate::error::{Error, ErrorKind, JsonResult};
use axum::body::Body;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use http::Request;
use serde::de::DeserializeOwned;

/// Error raised when a request body exceeds the configured size limit.
#[derive(Debug, thiserror::Error)]
#[error("request body too large: limit is {0} bytes")]
pub(crate) struct TooLargeError(usize);

/// Drains `body` into memory, failing once more than `limit` bytes arrive.
///
/// Returns the bytes collected so far even on failure.  If the limit triggered, these are the
/// first `limit` bytes of the body.
async fn collect_body(body: Body, limit: Option<usize>) -> (Bytes, JsonResult<()>) {
    let mut stream = body.into_data_stream();
    let mut buffer = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => return (buffer.freeze(), Err(Error::new(e, ErrorKind::ReadRequestBody))),
        };

        if let Some(limit) = limit {
            let room = limit - buffer.len();
            if chunk.len() > room {
                buffer.extend_from_slice(&chunk[..room]);
                let err = Error::new(TooLargeError(limit), ErrorKind::TooLargeRequestBody);
                return (buffer.freeze(), Err(err));
            }
        }
        buffer.extend_from_slice(&chunk);
    }
    (buffer.freeze(), Ok(()))
}

/// Reads the body of `req` and parses it as a JSON `T`.
///
/// A non-negative `max_body_bytes` limits the size of the body; a negative value means unlimited.
///
/// The bytes read from the transport are put back into `req` before returning, whether the read
/// succeeded or not, so that later consumers can read the body again.  When the read stops early,
/// the replayed body only contains the prefix that was consumed.
pub async fn read_body<T: DeserializeOwned>(
    req: &mut Request<Body>,
    max_body_bytes: i64,
) -> JsonResult<T> {
    let limit = usize::try_from(max_body_bytes).ok();
    let body = std::mem::replace(req.body_mut(), Body::empty());
    let (bytes, result) = collect_body(body, limit).await;
    *req.body_mut() = Body::from(bytes.clone());
    result?;

    serde_json::from_slice(&bytes).map_err(|e| Error::new(e, ErrorKind::UnmarshalRequestBody))
}
