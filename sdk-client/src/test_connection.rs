/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! A record/replay [`HttpConnector`] backed by a preloaded list of
//! request/response pairs, so higher layers (client, credential
//! providers) can assert exact request traffic without a live network.

use crate::connector::{ConnectorFuture, HttpConnector};
use sdk_http::body::SdkBody;
use std::ops::Deref;
use std::sync::{Arc, Mutex};

type ConnectVec = Vec<(http::Request<SdkBody>, http::Response<SdkBody>)>;

/// One recorded call: what the test expected to see dispatched, and
/// what was actually dispatched.
pub struct ValidateRequest {
    pub expected: http::Request<SdkBody>,
    pub actual: http::Request<SdkBody>,
}

/// Responds to calls with a preloaded series of responses, in order,
/// and records every request it saw for later examination. Panics (via
/// the returned error) once the preloaded responses are exhausted.
#[derive(Clone)]
pub struct TestConnection {
    data: Arc<Mutex<ConnectVec>>,
    requests: Arc<Mutex<Vec<ValidateRequest>>>,
}

impl TestConnection {
    pub fn new(mut data: ConnectVec) -> Self {
        data.reverse();
        TestConnection { data: Arc::new(Mutex::new(data)), requests: Default::default() }
    }

    pub fn requests(&self) -> impl Deref<Target = Vec<ValidateRequest>> + '_ {
        self.requests.lock().unwrap()
    }
}

impl HttpConnector for TestConnection {
    fn call(&self, actual: http::Request<SdkBody>) -> ConnectorFuture {
        let next = self.data.lock().unwrap().pop();
        let result = match next {
            Some((expected, response)) => {
                self.requests.lock().unwrap().push(ValidateRequest { actual, expected });
                Ok(response)
            }
            None => Err("TestConnection: no more preloaded responses".into()),
        };
        Box::pin(async move { result })
    }
}
