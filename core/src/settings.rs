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

//! Configuration of a JSON handler.
//!
//! Settings are assembled in two steps.  First, a `SettingsBuilder` fixes the default value of
//! every option.  Then, zero or more `SettingOption`s override individual options via `apply`.
//! Once a `JsonHandler` takes ownership of the `Settings`, they cannot change anymore.
//!
//! Every option remembers whether it was explicitly set, so reading an option that was never
//! overridden always yields its default instead of a zero value.

use crate::env::get_optional_var;
use http::StatusCode;

/// A single configuration option with a default and an optional override.
#[derive(Clone, Debug, PartialEq)]
pub struct Setting<T> {
    /// Value to use when the option is not overridden.
    default: T,

    /// Explicitly configured value, if any.
    value: Option<T>,
}

impl<T> Setting<T> {
    /// Creates an option that is not overridden and that yields `default`.
    fn new(default: T) -> Self {
        Self { default, value: None }
    }

    /// Overrides the option with `value`.
    fn set(&mut self, value: T) {
        self.value = Some(value);
    }

    /// Returns the effective value of the option.
    pub fn get(&self) -> &T {
        self.value.as_ref().unwrap_or(&self.default)
    }

    /// Returns the default value of the option, even if it was overridden.
    pub fn default(&self) -> &T {
        &self.default
    }

    /// Returns true if the option was explicitly set.
    pub fn is_modified(&self) -> bool {
        self.value.is_some()
    }
}

/// Configuration of a `JsonHandler`.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// HTTP status code of successful responses.
    success_status_code: Setting<StatusCode>,

    /// Maximum number of bytes to accept in a request body.  Negative means unlimited.
    max_request_body_bytes: Setting<i64>,

    /// Charset to advertise in the response content type.  Empty means unspecified.
    response_content_charset: Setting<String>,
}

impl Default for Settings {
    fn default() -> Self {
        SettingsBuilder::default().build()
    }
}

impl Settings {
    /// Returns a builder to configure the defaults of a new `Settings` object.
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Initializes settings from environment variables whose name is prefixed with `prefix`.
    ///
    /// This will use variables such as `<prefix>_SUCCESS_STATUS_CODE`,
    /// `<prefix>_MAX_REQUEST_BODY_BYTES` and `<prefix>_RESPONSE_CONTENT_CHARSET`.  Missing
    /// variables leave the corresponding option at its default.
    pub fn from_env(prefix: &str) -> Result<Settings, String> {
        let mut opts = vec![];
        if let Some(code) = get_optional_var::<StatusCode>(prefix, "SUCCESS_STATUS_CODE")? {
            opts.push(with_success_status_code(code));
        }
        if let Some(max) = get_optional_var::<i64>(prefix, "MAX_REQUEST_BODY_BYTES")? {
            opts.push(with_max_request_body_bytes(max));
        }
        if let Some(charset) = get_optional_var::<String>(prefix, "RESPONSE_CONTENT_CHARSET")? {
            opts.push(with_response_content_charset(charset));
        }
        Ok(Settings::default().apply(opts))
    }

    /// Applies all `opts` in order and returns the updated settings.
    pub fn apply<I: IntoIterator<Item = SettingOption>>(mut self, opts: I) -> Self {
        for opt in opts {
            opt(&mut self);
        }
        self
    }

    /// Returns the status code option for successful responses.
    pub fn success_status_code(&self) -> &Setting<StatusCode> {
        &self.success_status_code
    }

    /// Returns the maximum request body size option.
    pub fn max_request_body_bytes(&self) -> &Setting<i64> {
        &self.max_request_body_bytes
    }

    /// Returns the response charset option.
    pub fn response_content_charset(&self) -> &Setting<String> {
        &self.response_content_charset
    }
}

/// Builder for the defaults of a `Settings` object.
#[must_use]
pub struct SettingsBuilder {
    /// Default for `Settings::success_status_code`.
    success_status_code: StatusCode,

    /// Default for `Settings::max_request_body_bytes`.
    max_request_body_bytes: i64,

    /// Default for `Settings::response_content_charset`.
    response_content_charset: String,
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self {
            success_status_code: StatusCode::OK,
            max_request_body_bytes: -1,
            response_content_charset: String::new(),
        }
    }
}

impl SettingsBuilder {
    /// Sets the default status code of successful responses.
    pub fn success_status_code(mut self, code: StatusCode) -> Self {
        self.success_status_code = code;
        self
    }

    /// Sets the default maximum request body size.  Negative means unlimited.
    pub fn max_request_body_bytes(mut self, max: i64) -> Self {
        self.max_request_body_bytes = max;
        self
    }

    /// Sets the default response charset.  Empty means unspecified.
    pub fn response_content_charset<S: Into<String>>(mut self, charset: S) -> Self {
        self.response_content_charset = charset.into();
        self
    }

    /// Creates the settings with none of the options overridden.
    pub fn build(self) -> Settings {
        Settings {
            success_status_code: Setting::new(self.success_status_code),
            max_request_body_bytes: Setting::new(self.max_request_body_bytes),
            response_content_charset: Setting::new(self.response_content_charset),
        }
    }
}

/// A named override of one option, to be passed to `Settings::apply`.
pub type SettingOption = Box<dyn FnOnce(&mut Settings) + Send + Sync>;

/// Overrides the status code of successful responses.  Defaults to 200 OK.
pub fn with_success_status_code(code: StatusCode) -> SettingOption {
    Box::new(move |s| s.success_status_code.set(code))
}

/// Limits the size of request bodies to `max` bytes.  Defaults to unlimited.
pub fn with_max_request_body_bytes(max: i64) -> SettingOption {
    Box::new(move |s| s.max_request_body_bytes.set(max))
}

/// Sets the charset of the response content type.  Defaults to unspecified.
pub fn with_response_content_charset<S: Into<String>>(charset: S) -> SettingOption {
    let charset = charset.into();
    Box::new(move |s| s.response_content_charset.set(charset))
}
