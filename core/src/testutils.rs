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

//! Test utilities to exercise JSON handlers mounted on a router.

use axum::Router;
use axum::body::Body;
use axum::response::Response;
use http::header::CONTENT_TYPE;
use http::{HeaderName, HeaderValue, Method, Request, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tower::util::ServiceExt;

/// Maximum body size for testing purposes.
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Builder for a single request to the API server.
#[must_use]
pub struct OneShotBuilder {
    /// The router for the app being tested.
    app: Router,

    /// Builder for the request that will be sent to the app.
    builder: http::request::Builder,
}

impl OneShotBuilder {
    /// Creates a new request against a given `method`/`uri` pair served by an `app` router.
    pub fn new<U: AsRef<str>>(app: Router, (method, uri): (Method, U)) -> Self {
        let _can_fail = env_logger::builder().is_test(true).try_init();

        let builder = Request::builder().method(method).uri(uri.as_ref());
        Self { app, builder }
    }

    /// Sets the header `name` to `value` in the outgoing request.
    pub fn with_header<K, V>(mut self, name: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Finishes building the request and sends it.
    async fn send(self, body: Body) -> ResponseChecker {
        let request = self.builder.body(body).unwrap();
        ResponseChecker::from(self.app.oneshot(request).await.unwrap())
    }

    /// Finishes building the request and sends it with an empty payload.
    pub async fn send_empty(self) -> ResponseChecker {
        self.send(Body::empty()).await
    }

    /// Finishes building the request and sends it with a text payload.
    pub async fn send_text<T: Into<String>>(mut self, text: T) -> ResponseChecker {
        self.builder = self.builder.header(CONTENT_TYPE, mime::TEXT_PLAIN.as_ref());
        self.send(Body::from(text.into())).await
    }

    /// Finishes building the request and sends it with a JSON payload.
    pub async fn send_json<T: Serialize>(self, request: T) -> ResponseChecker {
        self.send_raw_json(serde_json::to_string(&request).unwrap()).await
    }

    /// Finishes building the request and sends `text` as is, declaring it to be JSON.
    pub async fn send_raw_json<T: Into<String>>(mut self, text: T) -> ResponseChecker {
        self.builder = self.builder.header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
        self.send(Body::from(text.into())).await
    }
}

/// Validator for the outcome of a request sent by a `OneShotBuilder`.
#[must_use]
pub struct ResponseChecker {
    /// Actual response that we received from the app.
    response: Response,

    /// Expected HTTP status code in the response above.
    exp_status: StatusCode,

    /// Expected content type in the response above, if it has to be checked.
    exp_content_type: Option<String>,
}

impl From<Response> for ResponseChecker {
    fn from(response: Response) -> Self {
        Self { response, exp_status: StatusCode::OK, exp_content_type: None }
    }
}

impl ResponseChecker {
    /// Sets the expected exit HTTP status to `status`.
    pub fn expect_status(mut self, status: StatusCode) -> Self {
        self.exp_status = status;
        self
    }

    /// Sets the expected `Content-Type` header to `content_type`.
    pub fn expect_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.exp_content_type = Some(content_type.into());
        self
    }

    /// Performs common validation operations on the response.
    pub fn verify(&self) {
        assert_eq!(self.exp_status, self.response.status());
        if let Some(exp_content_type) = &self.exp_content_type {
            let content_type = self.response.headers().get(CONTENT_TYPE);
            assert_eq!(
                Some(exp_content_type.as_str()),
                content_type.map(|v| v.to_str().unwrap()),
                "Unexpected content type"
            );
        }
    }

    /// Finishes checking the response and returns the body of the response as UTF-8.
    pub async fn take_body_as_text(self) -> String {
        self.verify();

        let body = axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    /// Finishes checking the response and expects it to contain an empty body.
    pub async fn expect_empty(self) {
        let body = self.take_body_as_text().await;
        assert!(body.is_empty(), "Body not empty; got {}", body);
    }

    /// Finishes checking the response and expects it to contain a valid JSON object of
    /// type `T`.
    pub async fn expect_json<T: DeserializeOwned>(self) -> T {
        let body = self.take_body_as_text().await;
        match serde_json::from_str::<T>(&body) {
            Ok(value) => value,
            Err(e) => panic!("Invalid JSON response due to {}; content was {}", e, body),
        }
    }

    /// Finishes checking the response and expects its body to match `exp_re`.
    pub async fn expect_text(self, exp_re: &str) {
        assert!(!exp_re.is_empty(), "Use expect_empty to validate empty responses");

        let body = self.take_body_as_text().await;
        let re = regex::Regex::new(exp_re).unwrap();
        assert!(re.is_match(&body), "Body content '{}' does not match re '{}'", body, exp_re);
    }

    /// Finishes checking the response and returns the response itself for out of band
    /// validation of properties not supported by the `ResponseChecker`.
    pub fn take_response(self) -> Response {
        self.verify();

        self.response
    }
}
