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

//! Adapter from typed business functions to JSON-over-HTTP request handlers.
//!
//! Serving a request goes through these stages, stopping at the first one that fails:
//!
//! 1.  Check that the request declares a JSON content type.
//! 1.  Read the body, subject to the configured size limit, and parse it as the request type.
//! 1.  Invoke the user handler.
//! 1.  Serialize the handler's response and write it with the configured status and charset.
//!
//! `JsonHandler::serve` runs these stages and returns the classified error of the failing stage
//! without responding.  `JsonHandler::prepare` binds an `ErrorHandler` to produce the final
//! request handler, which is a `tower::Service` that can be mounted on an `axum::Router`.

use crate::error::{BoxError, Error, ErrorKind, JsonResult};
use crate::reader::read_body;
use crate::settings::{SettingOption, Settings};
use crate::writer::{BufferedResponse, ResponseSink, write_body};
use async_trait::async_trait;
use axum::body::Body;
use axum::response::Response;
use derivative::Derivative;
use futures::future::BoxFuture;
use http::header::CONTENT_TYPE;
use http::{Extensions, HeaderMap, Method, Request, Uri, Version};
use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use tower::Service;

/// Error raised when a request does not declare a JSON content type.
#[derive(Debug, thiserror::Error)]
#[error("not json")]
struct NotJsonError;

/// Returns true if the first `Content-Type` in `headers` mentions the JSON media type.
fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains(mime::APPLICATION_JSON.as_ref()))
}

/// Metadata of the request being served, as seen by the user handler.
///
/// Cancellation is inherited from the transport: if the client goes away, the future returned by
/// the handler is dropped.
#[derive(Clone, Debug)]
pub struct Context {
    /// The request method.
    method: Method,

    /// The request URI.
    uri: Uri,

    /// The request HTTP version.
    version: Version,

    /// The request headers.
    headers: HeaderMap,

    /// Extensions attached to the request by the transport or by outer layers.
    extensions: Extensions,
}

impl Context {
    /// Captures the metadata of `req`.
    fn from_request<B>(req: &Request<B>) -> Self {
        Self {
            method: req.method().clone(),
            uri: req.uri().clone(),
            version: req.version(),
            headers: req.headers().clone(),
            extensions: req.extensions().clone(),
        }
    }

    /// Returns the request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the request HTTP version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the request extensions.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }
}

/// Business function that responds to a request of type `T` with a response of type `U`.
///
/// Any `async` function or closure taking a `Context` and a `T` and returning a `Result<U, E>`
/// implements this trait.
#[async_trait]
pub trait Handler<T, U>: Send + Sync {
    /// Error returned by the handler, reported as `ErrorKind::HandlerError`.
    type Error: Into<BoxError>;

    /// Handles `request`.
    async fn handle(&self, ctx: Context, request: T) -> Result<U, Self::Error>;
}

#[async_trait]
impl<F, Fut, T, U, E> Handler<T, U> for F
where
    F: Fn(Context, T) -> Fut + Send + Sync,
    Fut: Future<Output = Result<U, E>> + Send + 'static,
    T: Send + 'static,
    U: Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    type Error = E;

    async fn handle(&self, ctx: Context, request: T) -> Result<U, E> {
        self(ctx, request).await
    }
}

/// Receiver of the errors raised while serving a request.
///
/// The handler is called at most once per request and is responsible for writing the error
/// response into `sink`.  The body of `req` has already been consumed if the failure happened
/// after the content type check; in that case, `req` carries a replayable copy of whatever was
/// read from the transport.
///
/// Any function with the signature of `on_error` implements this trait.
#[async_trait]
pub trait ErrorHandler: Send + Sync {
    /// Handles `err`, raised while serving `req`.
    async fn on_error(&self, sink: &mut dyn ResponseSink, req: Request<Body>, err: Error);
}

#[async_trait]
impl<F> ErrorHandler for F
where
    F: Fn(&mut dyn ResponseSink, Request<Body>, Error) + Send + Sync,
{
    async fn on_error(&self, sink: &mut dyn ResponseSink, req: Request<Body>, err: Error) {
        self(sink, req, err)
    }
}

/// Serves JSON requests of type `T` by calling a `Handler` that produces responses of type `U`.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct JsonHandler<H, T, U> {
    /// The business logic.
    #[derivative(Debug = "ignore")]
    handler: H,

    /// Immutable configuration of this handler.
    settings: Settings,

    /// Marker for the request and response types.
    #[derivative(Debug = "ignore")]
    _types: PhantomData<fn(T) -> U>,
}

impl<H, T, U> JsonHandler<H, T, U>
where
    H: Handler<T, U>,
    T: DeserializeOwned + Send + 'static,
    U: Serialize + Send + 'static,
{
    /// Creates a handler for `handler` with the default settings modified by `opts`.
    ///
    /// See the `with_*` functions in the `settings` module for the available options.  By default,
    /// successful responses use a 200 OK status, request bodies are unlimited in size, and the
    /// response content type carries no charset.
    pub fn new<I: IntoIterator<Item = SettingOption>>(handler: H, opts: I) -> Self {
        Self::with_settings(handler, Settings::default().apply(opts))
    }

    /// Creates a handler for `handler` with preconfigured `settings`.
    pub fn with_settings(handler: H, settings: Settings) -> Self {
        Self { handler, settings, _types: PhantomData }
    }

    /// Returns the settings of this handler.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Serves `req`, writing a successful response into `sink`.
    ///
    /// On failure, returns the classified error and leaves the response to the caller.  Nothing
    /// is written into `sink` unless the failure is `ErrorKind::WriteResponseBody`, in which case
    /// the status and headers were already committed.
    pub async fn serve(
        &self,
        sink: &mut dyn ResponseSink,
        req: &mut Request<Body>,
    ) -> JsonResult<()> {
        if !has_json_content_type(req.headers()) {
            return Err(Error::new(NotJsonError, ErrorKind::NotJsonRequest));
        }

        let ctx = Context::from_request(req);
        let request = read_body::<T>(req, *self.settings.max_request_body_bytes().get()).await?;

        let response = self
            .handler
            .handle(ctx, request)
            .await
            .map_err(|e| Error::new(e, ErrorKind::HandlerError))?;

        write_body(
            sink,
            &response,
            *self.settings.success_status_code().get(),
            self.settings.response_content_charset().get(),
        )
    }

    /// Turns this into a request handler that reports errors to `on_error`.
    pub fn prepare<E: ErrorHandler + 'static>(self, on_error: E) -> PreparedHandler<H, T, U> {
        PreparedHandler { inner: Arc::from(self), on_error: Some(Arc::from(on_error)) }
    }

    /// Turns this into a request handler that discards errors.
    ///
    /// Failed requests get whatever the failing stage left in the response, which usually is an
    /// empty 200 OK.
    pub fn prepare_without_error_handler(self) -> PreparedHandler<H, T, U> {
        PreparedHandler { inner: Arc::from(self), on_error: None }
    }
}

/// A `JsonHandler` bound to its `ErrorHandler`, ready to serve requests.
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct PreparedHandler<H, T, U> {
    /// The pipeline that serves requests.
    inner: Arc<JsonHandler<H, T, U>>,

    /// Receiver of the pipeline errors, if any.
    #[derivative(Debug = "ignore")]
    on_error: Option<Arc<dyn ErrorHandler>>,
}

impl<H, T, U> PreparedHandler<H, T, U>
where
    H: Handler<T, U>,
    T: DeserializeOwned + Send + 'static,
    U: Serialize + Send + 'static,
{
    /// Serves `req` and returns the response to send to the client.
    pub async fn handle_request(&self, mut req: Request<Body>) -> Response {
        let mut sink = BufferedResponse::new();
        if let Err(err) = self.inner.serve(&mut sink, &mut req).await {
            match &self.on_error {
                Some(on_error) => on_error.on_error(&mut sink, req, err).await,
                None => debug!("Discarding error for {} {}: {}", req.method(), req.uri(), err),
            }
        }
        sink.into_response()
    }
}

impl<H, T, U> Service<Request<Body>> for PreparedHandler<H, T, U>
where
    H: Handler<T, U> + 'static,
    T: DeserializeOwned + Send + 'static,
    U: Serialize + Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move { Ok(handler.handle_request(req).await) })
    }
}
