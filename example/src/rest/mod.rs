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

//! Entry point to the REST server.

use crate::driver::Driver;
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Request, StatusCode};
use jsonhandler_core::error::{Error, ErrorKind};
use jsonhandler_core::handler::ErrorHandler;
use jsonhandler_core::settings::Settings;
use jsonhandler_core::writer::ResponseSink;
use log::{info, warn};
use serde::Serialize;

mod counter_post;
#[cfg(test)]
mod testutils;

/// Representation of the details of an error response.
#[derive(Serialize)]
struct ErrorResponse {
    /// The original request body, as far as it could be read.
    body: String,

    /// The error that caused the request to fail.
    err: Error,
}

/// Computes the HTTP status code to report for an error of the given `kind`.
fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotJsonRequest | ErrorKind::UnmarshalRequestBody | ErrorKind::HandlerError => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error handler that reports failures as JSON documents echoing the original request body.
pub(crate) struct ErrorReporter;

#[async_trait]
impl ErrorHandler for ErrorReporter {
    async fn on_error(&self, sink: &mut dyn ResponseSink, req: Request<Body>, err: Error) {
        info!("{} {} failed: {}", req.method(), req.uri(), err);

        let status = status_for(err.kind());
        // Bodies that reached the parser were already bounded by the maximum request size.
        let body = match axum::body::to_bytes(req.into_body(), usize::MAX).await {
            Ok(body) => String::from_utf8_lossy(&body).into_owned(),
            Err(e) => {
                warn!("Cannot echo request body in error response: {}", e);
                String::new()
            }
        };

        let response = match serde_json::to_vec(&ErrorResponse { body, err }) {
            Ok(response) => response,
            Err(e) => {
                warn!("Cannot serialize error response: {}", e);
                sink.write_status(StatusCode::INTERNAL_SERVER_ERROR);
                return;
            }
        };
        sink.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        sink.write_status(status);
        if let Err(e) = sink.write_body(&response) {
            warn!("Failed to write error response: {}", e);
        }
    }
}

/// Creates the router for the application.
pub(crate) fn app(driver: Driver, settings: Settings) -> Router {
    use axum::routing::post_service;
    Router::new().route("/api/v1/counter", post_service(counter_post::handler(driver, settings)))
}
