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

//! Adapter to serve typed business functions as JSON-over-HTTP endpoints.
//!
//! A `JsonHandler` wraps a `Handler` that maps a request of type `T` to a response of type `U`.
//! For every HTTP request, the adapter checks that the request declares a JSON content type,
//! reads the body subject to a size limit, parses it as `T`, calls the handler, and writes the
//! handler's `U` back as JSON with the configured status code and charset.
//!
//! Every failure along the way becomes an `Error` tagged with an `ErrorKind` that identifies the
//! failing stage.  Errors are never turned into responses by this crate: they are handed to an
//! `ErrorHandler` supplied by the caller, which decides what the client sees.
//!
//! ```rust,no_run
//! use axum::Router;
//! use axum::body::Body;
//! use http::{Request, StatusCode};
//! use jsonhandler_core::error::{BoxError, Error};
//! use jsonhandler_core::handler::{Context, JsonHandler};
//! use jsonhandler_core::settings::with_success_status_code;
//! use jsonhandler_core::writer::ResponseSink;
//!
//! async fn echo(_ctx: Context, message: String) -> Result<String, BoxError> {
//!     Ok(message)
//! }
//!
//! fn on_error(sink: &mut dyn ResponseSink, _req: Request<Body>, err: Error) {
//!     sink.write_status(StatusCode::BAD_REQUEST);
//!     let _ = sink.write_body(err.to_string().as_bytes());
//! }
//!
//! let opts = [with_success_status_code(StatusCode::OK)];
//! let echo = JsonHandler::<_, String, String>::new(echo, opts);
//! let app: Router = Router::new().route_service("/echo", echo.prepare(on_error));
//! ```

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

pub mod env;
pub mod error;
pub mod handler;
pub mod reader;
pub mod settings;
#[cfg(any(test, feature = "testutils"))]
pub mod testutils;
pub mod writer;
