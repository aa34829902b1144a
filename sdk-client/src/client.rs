/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The execute pipeline: resolve credentials, run the middleware chain,
//! dispatch through the connector, parse the response, and drive the
//! retry policy across attempts.

use crate::connector::{HttpConnector, Standard};
use bytes::Bytes;
use operation::{Metadata, MiddlewareChain, Operation};
use sdk_endpoint::resolver::ResolveAwsEndpoint;
use sdk_http::operation::Request;
use sdk_http::response::ParseHttpResponse;
use sdk_http::result::{SdkError, SdkSuccess};
use sdk_http::SdkBody;
use sdk_sig_auth::signer::OperationSigningConfig;
use sdk_types::region::Region;
use sdk_types::ProvideCredentials;
use std::error::Error as StdError;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower::retry::Policy;
use tracing::Level;

/// Client-wide configuration applied to every request before the
/// middleware chain runs: where to send it, how to sign it, and what
/// credentials to sign it with.
pub struct Config {
    pub region: Region,
    pub credentials_provider: Arc<dyn ProvideCredentials>,
    pub endpoint_resolver: Arc<dyn ResolveAwsEndpoint>,
    pub signing_config: OperationSigningConfig,
    pub user_agent: operation::AwsUserAgent,
    /// Level at which each dispatch attempt logs its start (request ID,
    /// service, operation). Defaults to `DEBUG`.
    pub request_log_level: Level,
    /// Level at which a failed attempt logs its error. Defaults to
    /// `WARN`. Each failure logs exactly once, here.
    pub error_log_level: Level,
}

impl Config {
    pub fn new(
        region: Region,
        credentials_provider: Arc<dyn ProvideCredentials>,
        endpoint_resolver: Arc<dyn ResolveAwsEndpoint>,
        signing_config: OperationSigningConfig,
        user_agent: operation::AwsUserAgent,
    ) -> Self {
        Config {
            region,
            credentials_provider,
            endpoint_resolver,
            signing_config,
            user_agent,
            request_log_level: Level::DEBUG,
            error_log_level: Level::WARN,
        }
    }
}

/// Emits one tracing event at a level chosen at runtime, since
/// `tracing`'s `event!`/`debug!`/`warn!` macros otherwise need the level
/// fixed at the call site.
macro_rules! log_at {
    ($level:expr, $($arg:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($arg)*),
            Level::WARN => tracing::warn!($($arg)*),
            Level::INFO => tracing::info!($($arg)*),
            Level::DEBUG => tracing::debug!($($arg)*),
            Level::TRACE => tracing::trace!($($arg)*),
        }
    };
}

/// A client bound to a transport `C` (defaults to [`Standard`], a hyper
/// client). Dispatches [`Operation`]s through the endpoint/user-agent/
/// signing middleware chain, retrying per the operation's own policy.
pub struct Client<C = Standard> {
    connector: C,
    middleware: MiddlewareChain,
    config: Config,
    shut_down: Arc<AtomicBool>,
}

impl<C> fmt::Debug for Client<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").field("region", &self.config.region).finish_non_exhaustive()
    }
}

impl Client<Standard> {
    pub fn new(config: Config) -> Self {
        Client::with_connector(Standard::https(), config)
    }
}

impl<C: HttpConnector> Client<C> {
    pub fn with_connector(connector: C, config: Config) -> Self {
        Client { connector, middleware: MiddlewareChain::new(), config, shut_down: Arc::new(AtomicBool::new(false)) }
    }

    pub fn with_middleware(mut self, middleware: MiddlewareChain) -> Self {
        self.middleware = middleware;
        self
    }

    /// Marks the client as shut down. Idempotent: calling this more than
    /// once, or concurrently, is a no-op after the first call. Once shut
    /// down, [`Client::call`] refuses to dispatch further requests.
    pub fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Runs one operation to completion, including retries, per its own
    /// [`tower::retry::Policy`].
    pub async fn call<H, O, E, Retry>(&self, operation: Operation<H, Retry>) -> Result<O, SdkError<E>>
    where
        H: ParseHttpResponse<Output = Result<O, E>>,
        Retry: Policy<Request, SdkSuccess<O>, SdkError<E>>,
        E: fmt::Display,
    {
        let (mut request, handler, mut policy, metadata) = operation.into_parts();
        self.prepare(&mut request);

        loop {
            let replay = request.try_clone();
            let result = self.dispatch_once(request, &handler, metadata).await;

            let Some(replay_request) = replay else {
                return finish(result);
            };

            match policy.retry(&replay_request, result.as_ref()) {
                Some(next) => {
                    policy = next.await;
                    request = replay_request;
                }
                None => return finish(result),
            }
        }
    }

    /// Stamps client-wide configuration (region, endpoint resolver,
    /// signing config, user agent) onto the request's property bag. Does
    /// not resolve credentials yet — that happens per dispatch attempt
    /// in [`Client::dispatch_once`], since a long retry loop could
    /// outlive a short-lived credential.
    fn prepare(&self, request: &mut Request) {
        request.properties_mut().insert(self.config.region.clone());
        request.properties_mut().insert(self.config.endpoint_resolver.clone());
        request.properties_mut().insert(self.config.signing_config.clone());
        request.properties_mut().insert(self.config.user_agent.clone());
    }

    async fn dispatch_once<H, O, E>(
        &self,
        mut request: Request,
        handler: &H,
        metadata: Metadata,
    ) -> Result<SdkSuccess<O>, SdkError<E>>
    where
        H: ParseHttpResponse<Output = Result<O, E>>,
        E: fmt::Display,
    {
        if self.is_shut_down() {
            return Err(SdkError::ConstructionFailure(Box::new(ClientShutDown)));
        }

        let request_id = format!("{:016x}", fastrand::u64(..));
        log_at!(self.config.request_log_level, service = metadata.service, operation = metadata.operation, %request_id, "starting attempt");

        let credentials = self
            .config
            .credentials_provider
            .provide_credentials()
            .await
            .map_err(|e| SdkError::SigningFailure(Box::new(e)))?;
        request.properties_mut().insert(credentials);

        let request = self.middleware.apply(request).map_err(|err| {
            if matches!(&err, operation::MiddlewareError::Signing(_)) {
                SdkError::SigningFailure(Box::new(err))
            } else {
                SdkError::ConstructionFailure(Box::new(err))
            }
        })?;

        tracing::debug!(uri = %request.http().uri(), method = %request.http().method(), %request_id, "dispatching request");
        let (http_request, _properties) = request.into_parts();
        let response = self.connector.call(http_request).await.map_err(SdkError::DispatchFailure)?;

        let result = self.load_response::<H, O, E>(response, handler);
        if let Err(err) = &result {
            log_at!(self.config.error_log_level, %request_id, %err, "operation attempt failed");
        }
        result
    }

    fn load_response<H, O, E>(&self, mut response: http::Response<SdkBody>, handler: &H) -> Result<SdkSuccess<O>, SdkError<E>>
    where
        H: ParseHttpResponse<Output = Result<O, E>>,
    {
        if let Some(output) = handler.parse_unloaded(&mut response) {
            return finish_output(output, response);
        }

        let (parts, body) = response.into_parts();
        let bytes: Bytes = match body.bytes() {
            Some(bytes) => Bytes::copy_from_slice(bytes),
            None => {
                let raw = http::Response::from_parts(parts, SdkBody::empty());
                return Err(SdkError::ResponseError { raw, source: Box::new(UnbufferedStreamingBody) });
            }
        };
        let response = http::Response::from_parts(parts, SdkBody::from(bytes));
        let output = handler.parse_loaded(&response);
        finish_output(output, response)
    }
}

fn finish_output<O, E>(output: Result<O, E>, raw: http::Response<SdkBody>) -> Result<SdkSuccess<O>, SdkError<E>> {
    match output {
        Ok(parsed) => Ok(SdkSuccess { raw, parsed }),
        Err(err) => Err(SdkError::ServiceError { raw, err }),
    }
}

fn finish<O, E>(result: Result<SdkSuccess<O>, SdkError<E>>) -> Result<O, SdkError<E>> {
    result.map(|success| success.parsed)
}

#[derive(Debug)]
struct ClientShutDown;

impl fmt::Display for ClientShutDown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client has been shut down and will not dispatch further requests")
    }
}

impl StdError for ClientShutDown {}

#[derive(Debug)]
struct UnbufferedStreamingBody;

impl fmt::Display for UnbufferedStreamingBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "response body is streaming and the handler did not consume it via parse_unloaded")
    }
}

impl StdError for UnbufferedStreamingBody {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::ConnectorFuture;
    use operation::{DefaultResponseClassifier, RetryConfig, StandardRetryStrategy};
    use sdk_endpoint::resolver::{EndpointResolver, Partition, Variant};
    use sdk_types::retry::{ErrorKind, ProvideErrorKind};
    use sdk_types::Credentials;
    use std::sync::Mutex;

    /// An unmodeled error the default classifier can still act on via
    /// HTTP status alone (`error_kind`/`code` both `None`).
    #[derive(Debug)]
    struct CannedError(String);

    impl fmt::Display for CannedError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl StdError for CannedError {}

    impl ProvideErrorKind for CannedError {
        fn error_kind(&self) -> Option<ErrorKind> {
            None
        }

        fn code(&self) -> Option<&str> {
            None
        }
    }

    #[derive(Clone)]
    struct CannedHandler;

    impl ParseHttpResponse for CannedHandler {
        type Output = Result<String, CannedError>;

        fn parse_loaded(&self, response: &http::Response<SdkBody>) -> Self::Output {
            if response.status().is_success() {
                Ok(String::from_utf8(response.body().bytes().unwrap_or(&[]).to_vec()).unwrap())
            } else {
                Err(CannedError(format!("status {}", response.status())))
            }
        }
    }

    struct CannedConnector {
        responses: Mutex<Vec<http::Response<SdkBody>>>,
    }

    impl HttpConnector for CannedConnector {
        fn call(&self, _request: http::Request<SdkBody>) -> ConnectorFuture {
            let response = self.responses.lock().unwrap().pop().expect("no canned response left");
            Box::pin(async move { Ok(response) })
        }
    }

    fn config() -> Config {
        let partition = Partition { id: "aws", region_regex: "^us-\\w+-\\d+$", dns_suffix: "amazonaws.com", default_signing_service: "" };
        Config::new(
            Region::from_static("us-east-1"),
            Arc::new(Credentials::from_keys("akid", "secret", None)),
            Arc::new(EndpointResolver::new("example", vec![partition])),
            OperationSigningConfig::default(),
            operation::AwsUserAgent::new("example", "2020-01-01"),
        )
    }

    fn operation(request_uri: &str) -> Operation<CannedHandler, StandardRetryStrategy<DefaultResponseClassifier>> {
        let request = Request::new(http::Request::builder().uri(request_uri).body(SdkBody::empty()).unwrap());
        Operation::standard(request, CannedHandler, Metadata::new("example", "GetThing"), RetryConfig::default())
    }

    #[tokio::test]
    async fn successful_call_returns_parsed_output() {
        let connector = CannedConnector {
            responses: Mutex::new(vec![http::Response::builder().status(200).body(SdkBody::from("hello")).unwrap()]),
        };
        let client = Client::with_connector(connector, config());
        let output = client.call(operation("/widgets")).await.unwrap();
        assert_eq!(output, "hello");
    }

    #[tokio::test(start_paused = true)]
    async fn server_error_retries_then_succeeds() {
        let connector = CannedConnector {
            responses: Mutex::new(vec![
                http::Response::builder().status(200).body(SdkBody::from("ok")).unwrap(),
                http::Response::builder().status(500).body(SdkBody::from("boom")).unwrap(),
            ]),
        };
        let client = Client::with_connector(connector, config());
        let output = client.call(operation("/widgets")).await.unwrap();
        assert_eq!(output, "ok");
    }

    #[tokio::test]
    async fn shut_down_client_refuses_new_calls() {
        let connector = CannedConnector { responses: Mutex::new(vec![]) };
        let client = Client::with_connector(connector, config());
        client.shutdown();
        let err = client.call(operation("/widgets")).await.unwrap_err();
        assert!(matches!(err, SdkError::ConstructionFailure(_)));
    }
}
