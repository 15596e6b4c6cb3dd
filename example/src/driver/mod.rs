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

//! Business logic for the service.

use std::sync::{Arc, PoisonError, RwLock};

/// Business logic errors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub(crate) enum DriverError {
    /// Indicates that the requested operation does not exist.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
}

/// Result type for this module.
pub(crate) type DriverResult<T> = Result<T, DriverError>;

/// Business logic.
///
/// All clones of a driver share the same counter.
#[derive(Clone, Default)]
pub(crate) struct Driver {
    /// The counter, guarded for concurrent access by simultaneous requests.
    counter: Arc<RwLock<i64>>,
}

impl Driver {
    /// Returns the current value of the counter.
    pub(crate) fn get(&self) -> i64 {
        *self.counter.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds `n` to the counter and returns the new value.
    pub(crate) fn delta(&self, n: i64) -> i64 {
        let mut counter = self.counter.write().unwrap_or_else(PoisonError::into_inner);
        *counter = counter.wrapping_add(n);
        *counter
    }

    /// Sets the counter to `n` and returns the new value.
    pub(crate) fn fix(&self, n: i64) -> i64 {
        let mut counter = self.counter.write().unwrap_or_else(PoisonError::into_inner);
        *counter = n;
        *counter
    }

    /// Applies the operation named `op` with argument `value` and returns the new counter value.
    pub(crate) fn mutate(&self, op: &str, value: i64) -> DriverResult<i64> {
        match op {
            "delta" => Ok(self.delta(value)),
            "fix" => Ok(self.fix(value)),
            "get" => Ok(self.get()),
            _ => Err(DriverError::UnknownOperation(op.to_owned())),
        }
    }
}
