/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! An injectable clock, so expiry/refresh logic can be driven by a
//! manual clock in tests instead of the real wall clock.

use sdk_types::date_time::DateTime;
use std::sync::{Arc, Mutex};

pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime;
}

#[derive(Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime {
        DateTime::now()
    }
}

/// A manually advanced clock for tests.
#[derive(Clone, Default)]
pub struct TestTimeSource(Arc<Mutex<DateTime>>);

impl TestTimeSource {
    pub fn new(start: DateTime) -> Self {
        TestTimeSource(Arc::new(Mutex::new(start)))
    }

    pub fn advance(&self, by: std::time::Duration) {
        let mut guard = self.0.lock().unwrap();
        *guard = guard.checked_add(by).expect("test clock overflow");
    }
}

impl TimeSource for TestTimeSource {
    fn now(&self) -> DateTime {
        *self.0.lock().unwrap()
    }
}
