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

//! Test utilities for the REST API.

use crate::driver::Driver;
use crate::rest::app;
use axum::Router;
use jsonhandler_core::settings::Settings;

pub(crate) struct TestContext {
    driver: Driver,
    app: Router,
}

impl TestContext {
    pub(crate) fn setup(settings: Settings) -> Self {
        let driver = Driver::default();
        let app = app(driver.clone(), settings);
        Self { driver, app }
    }

    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    pub(crate) fn driver(&self) -> &Driver {
        &self.driver
    }
}
