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

//! High-level data types.

use serde::{Deserialize, Serialize};

/// Request to read or modify the counter.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Serialize))]
pub(crate) struct CounterMutateRequest {
    /// Name of the operation to apply: `delta`, `fix` or `get`.
    pub(crate) op: String,

    /// Argument to the operation.  Ignored by `get`.
    #[serde(default)]
    pub(crate) value: i64,
}

/// Value of the counter after applying an operation.
#[derive(Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize, PartialEq))]
pub(crate) struct CounterMutateResponse {
    /// Current value of the counter.
    pub(crate) value: i64,
}
