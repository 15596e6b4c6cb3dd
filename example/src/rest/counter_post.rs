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

//! API to read or modify the counter.

use crate::driver::{Driver, DriverError};
use crate::model::{CounterMutateRequest, CounterMutateResponse};
use crate::rest::ErrorReporter;
use async_trait::async_trait;
use jsonhandler_core::handler::{Context, Handler, JsonHandler, PreparedHandler};
use jsonhandler_core::settings::Settings;

/// API handler.
pub(crate) struct CounterHandler {
    /// The counter to operate on.
    driver: Driver,
}

#[async_trait]
impl Handler<CounterMutateRequest, CounterMutateResponse> for CounterHandler {
    type Error = DriverError;

    async fn handle(
        &self,
        _ctx: Context,
        request: CounterMutateRequest,
    ) -> Result<CounterMutateResponse, DriverError> {
        let value = self.driver.mutate(&request.op, request.value)?;
        Ok(CounterMutateResponse { value })
    }
}

/// Creates the request handler for this API.
pub(crate) fn handler(
    driver: Driver,
    settings: Settings,
) -> PreparedHandler<CounterHandler, CounterMutateRequest, CounterMutateResponse> {
    JsonHandler::with_settings(CounterHandler { driver }, settings).prepare(ErrorReporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use http::{Method, StatusCode};
    use jsonhandler_core::settings::{
        with_max_request_body_bytes, with_response_content_charset, with_success_status_code,
    };
    use jsonhandler_core::testutils::*;
    use serde_json::json;

    fn route() -> (Method, &'static str) {
        (Method::POST, "/api/v1/counter")
    }

    fn request(op: &str, value: i64) -> CounterMutateRequest {
        CounterMutateRequest { op: op.to_owned(), value }
    }

    #[tokio::test]
    async fn test_delta() {
        let context = TestContext::setup(Settings::default());
        context.driver().fix(10);

        let response = OneShotBuilder::new(context.app(), route())
            .send_json(request("delta", 5))
            .await
            .expect_content_type("application/json")
            .expect_json::<CounterMutateResponse>()
            .await;
        assert_eq!(CounterMutateResponse { value: 15 }, response);
        assert_eq!(15, context.driver().get());
    }

    #[tokio::test]
    async fn test_fix_and_get() {
        let context = TestContext::setup(Settings::default());

        let response = OneShotBuilder::new(context.app(), route())
            .send_json(request("fix", 42))
            .await
            .expect_json::<CounterMutateResponse>()
            .await;
        assert_eq!(CounterMutateResponse { value: 42 }, response);

        let response = OneShotBuilder::new(context.app(), route())
            .send_raw_json(r#"{"op":"get"}"#)
            .await
            .expect_json::<CounterMutateResponse>()
            .await;
        assert_eq!(CounterMutateResponse { value: 42 }, response);
    }

    #[tokio::test]
    async fn test_custom_settings() {
        let settings = Settings::default().apply([
            with_success_status_code(StatusCode::ACCEPTED),
            with_response_content_charset("utf-8"),
        ]);
        let context = TestContext::setup(settings);

        let response = OneShotBuilder::new(context.app(), route())
            .send_json(request("delta", 1))
            .await
            .expect_status(StatusCode::ACCEPTED)
            .expect_content_type("application/json; charset=utf-8")
            .expect_json::<CounterMutateResponse>()
            .await;
        assert_eq!(CounterMutateResponse { value: 1 }, response);
    }

    #[tokio::test]
    async fn test_unknown_operation() {
        let context = TestContext::setup(Settings::default());
        context.driver().fix(3);

        let response = OneShotBuilder::new(context.app(), route())
            .send_raw_json(r#"{"op":"reset","value":0}"#)
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_content_type("application/json")
            .expect_json::<serde_json::Value>()
            .await;
        assert_eq!(
            json!({
                "body": r#"{"op":"reset","value":0}"#,
                "err": {"err": "unknown operation: reset", "kind": "HandlerError"},
            }),
            response
        );
        assert_eq!(3, context.driver().get());
    }

    #[tokio::test]
    async fn test_payload_must_be_json() {
        let context = TestContext::setup(Settings::default());

        let response = OneShotBuilder::new(context.app(), route())
            .send_text(r#"{"op":"delta","value":1}"#)
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_json::<serde_json::Value>()
            .await;
        assert_eq!(
            json!({
                "body": r#"{"op":"delta","value":1}"#,
                "err": {"err": "not json", "kind": "NotJsonRequest"},
            }),
            response
        );

        OneShotBuilder::new(context.app(), route())
            .send_raw_json("this is not json")
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_text(r#""kind":"UnmarshalRequestBody""#)
            .await;

        assert_eq!(0, context.driver().get());
    }

    #[tokio::test]
    async fn test_invalid_payload_is_echoed_in_full() {
        let context = TestContext::setup(Settings::default());
        let body = format!("not json {}", "x".repeat(5000));

        let response = OneShotBuilder::new(context.app(), route())
            .send_raw_json(body.clone())
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_json::<serde_json::Value>()
            .await;
        assert_eq!(json!(body), response["body"]);
        assert_eq!(json!("UnmarshalRequestBody"), response["err"]["kind"]);
    }

    #[tokio::test]
    async fn test_payload_too_large() {
        let settings = Settings::default().apply([with_max_request_body_bytes(8)]);
        let context = TestContext::setup(settings);

        let response = OneShotBuilder::new(context.app(), route())
            .send_json(request("delta", 1))
            .await
            .expect_status(StatusCode::INTERNAL_SERVER_ERROR)
            .expect_json::<serde_json::Value>()
            .await;
        assert_eq!(json!(r#"{"op":"d"#), response["body"]);
        assert_eq!(json!("TooLargeRequestBody"), response["err"]["kind"]);
        assert_eq!(0, context.driver().get());
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let context = TestContext::setup(Settings::default());

        OneShotBuilder::new(context.app(), (Method::GET, "/api/v1/counter"))
            .send_empty()
            .await
            .expect_status(StatusCode::METHOD_NOT_ALLOWED)
            .expect_empty()
            .await;
    }
}
