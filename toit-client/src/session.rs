//! One run of the client: log in, then list devices with the token.

use std::io::Write;

use toit_shared::model::Device;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    auth::{self, Credentials},
    devices,
    error::Error,
    server::Connector,
};

/// Logs in and lists devices. The device call is only made once a usable token exists.
pub async fn fetch_devices<C>(connector: &C, credentials: Credentials) -> Result<Vec<Device>, Error>
where
    C: Connector + ?Sized,
{
    let mut auth_client = connector.auth_client().await?;
    let token = auth::login(&mut auth_client, credentials).await?;
    drop(auth_client);

    let mut device_client = connector.device_client(&token).await?;
    devices::list_devices(&mut device_client).await
}

/// Prints the name of every device to `out` and returns how many were printed.
///
/// Nothing is written unless both calls succeed.
pub async fn run<C, W>(connector: &C, credentials: Credentials, out: &mut W) -> Result<usize, Error>
where
    C: Connector + ?Sized,
    W: Write + ?Sized,
{
    let devices = fetch_devices(connector, credentials).await?;
    devices::write_names(out, &devices)?;
    Ok(devices.len())
}

/// Like [`run`], but gives up with [`Error::Interrupted`] once `shutdown` is cancelled.
pub async fn run_until_cancelled<C, W>(
    connector: &C,
    credentials: Credentials,
    out: &mut W,
    shutdown: &CancellationToken,
) -> Result<usize, Error>
where
    C: Connector + ?Sized,
    W: Write + ?Sized,
{
    tokio::select! {
        biased;
        _ = shutdown.cancelled() => {
            debug!("Shutdown requested");
            Err(Error::Interrupted)
        }
        result = run(connector, credentials, out) => result,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use toit_shared::api::{AuthResponse, ListDevicesRequest, ListDevicesResponse, LoginRequest};
    use tonic::{Code, Status, service::Interceptor};

    use super::*;
    use crate::{
        auth::{AccessToken, BearerInterceptor},
        server::{AuthService, DeviceService},
    };

    #[derive(Clone)]
    enum Outcome<T> {
        Reply(T),
        Empty,
        Fail(Code),
    }

    impl<T: Clone> Outcome<T> {
        fn resolve(&self) -> Result<Option<T>, Status> {
            match self {
                Outcome::Reply(value) => Ok(Some(value.clone())),
                Outcome::Empty => Ok(None),
                Outcome::Fail(code) => Err(Status::new(*code, "remote failure")),
            }
        }
    }

    /// Everything the fake API saw, in order.
    type Log = Arc<Mutex<Vec<String>>>;

    struct FakeAuth {
        outcome: Outcome<AuthResponse>,
        log: Log,
    }

    #[async_trait]
    impl AuthService for FakeAuth {
        async fn login(&mut self, request: LoginRequest) -> Result<Option<AuthResponse>, Status> {
            self.log.lock().unwrap().push(format!(
                "login {}:{}",
                request.username, request.password
            ));
            self.outcome.resolve()
        }
    }

    /// Runs each call through the bearer interceptor, the way the intercepted channel does.
    struct FakeDevices {
        interceptor: BearerInterceptor,
        outcome: Outcome<ListDevicesResponse>,
        log: Log,
    }

    #[async_trait]
    impl DeviceService for FakeDevices {
        async fn list_devices(
            &mut self,
            _request: ListDevicesRequest,
        ) -> Result<Option<ListDevicesResponse>, Status> {
            let request = self.interceptor.call(tonic::Request::new(()))?;
            let authorization = request
                .metadata()
                .get("authorization")
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();
            self.log
                .lock()
                .unwrap()
                .push(format!("list_devices authorization={authorization}"));
            self.outcome.resolve()
        }
    }

    struct FakeConnector {
        login: Outcome<AuthResponse>,
        list: Outcome<ListDevicesResponse>,
        log: Log,
    }

    impl FakeConnector {
        fn new(login: Outcome<AuthResponse>, list: Outcome<ListDevicesResponse>) -> Self {
            Self {
                login,
                list,
                log: Log::default(),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Connector for FakeConnector {
        type Auth = FakeAuth;
        type Devices = FakeDevices;

        async fn auth_client(&self) -> Result<FakeAuth, Error> {
            self.log.lock().unwrap().push("connect auth".to_string());
            Ok(FakeAuth {
                outcome: self.login.clone(),
                log: self.log.clone(),
            })
        }

        async fn device_client(&self, token: &AccessToken) -> Result<FakeDevices, Error> {
            self.log.lock().unwrap().push("connect devices".to_string());
            Ok(FakeDevices {
                interceptor: BearerInterceptor::new(token)?,
                outcome: self.list.clone(),
                log: self.log.clone(),
            })
        }
    }

    fn token(s: &str) -> Outcome<AuthResponse> {
        Outcome::Reply(AuthResponse {
            access_token: s.as_bytes().to_vec(),
        })
    }

    fn devices(names: &[&str]) -> Outcome<ListDevicesResponse> {
        Outcome::Reply(ListDevicesResponse {
            devices: names.iter().map(|name| Device::named(*name)).collect(),
        })
    }

    #[tokio::test]
    async fn test_run_prints_devices_listed_with_bearer_token() {
        let connector = FakeConnector::new(token("tok123"), devices(&["dev-a", "dev-b"]));
        let mut out = Vec::new();

        let count = run(&connector, Credentials::new("alice", "secret"), &mut out)
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "dev-a\ndev-b\n");
        assert_eq!(
            connector.calls(),
            [
                "connect auth",
                "login alice:secret",
                "connect devices",
                "list_devices authorization=Bearer tok123",
            ]
        );
    }

    #[tokio::test]
    async fn test_run_keeps_order_and_duplicates() {
        let connector = FakeConnector::new(token("t"), devices(&["C", "A", "B", "A"]));
        let mut out = Vec::new();

        run(&connector, Credentials::new("alice", "secret"), &mut out)
            .await
            .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "C\nA\nB\nA\n");
    }

    #[tokio::test]
    async fn test_run_with_no_devices_prints_nothing() {
        let connector = FakeConnector::new(token("t"), devices(&[]));
        let mut out = Vec::new();

        let count = run(&connector, Credentials::new("alice", "secret"), &mut out)
            .await
            .unwrap();

        assert_eq!(count, 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_missing_login_response_skips_listing() {
        let connector = FakeConnector::new(Outcome::Empty, devices(&["dev-a"]));
        let mut out = Vec::new();

        let err = run(&connector, Credentials::new("alice", "secret"), &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingResponse("login")));
        assert!(out.is_empty());
        assert_eq!(connector.calls(), ["connect auth", "login alice:secret"]);
    }

    #[tokio::test]
    async fn test_login_failure_skips_listing() {
        let connector = FakeConnector::new(Outcome::Fail(Code::Unauthenticated), devices(&["dev-a"]));
        let mut out = Vec::new();

        let err = run(&connector, Credentials::new("alice", "wrong"), &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Call(ref status) if status.code() == Code::Unauthenticated));
        assert!(out.is_empty());
        assert!(!connector.calls().iter().any(|call| call.contains("devices")));
    }

    #[tokio::test]
    async fn test_empty_token_skips_listing() {
        let connector = FakeConnector::new(token(""), devices(&["dev-a"]));
        let mut out = Vec::new();

        let err = run(&connector, Credentials::new("alice", "secret"), &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::EmptyToken));
        assert_eq!(connector.calls(), ["connect auth", "login alice:secret"]);
    }

    #[tokio::test]
    async fn test_missing_list_response_prints_nothing() {
        let connector = FakeConnector::new(token("tok123"), Outcome::Empty);
        let mut out = Vec::new();

        let err = run(&connector, Credentials::new("alice", "secret"), &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingResponse("list devices")));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_list_failure_prints_nothing() {
        let connector = FakeConnector::new(token("tok123"), Outcome::Fail(Code::Unavailable));
        let mut out = Vec::new();

        let err = run(&connector, Credentials::new("alice", "secret"), &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Call(ref status) if status.code() == Code::Unavailable));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_run_makes_no_calls() {
        let connector = FakeConnector::new(token("tok123"), devices(&["dev-a"]));
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let mut out = Vec::new();

        let err = run_until_cancelled(
            &connector,
            Credentials::new("alice", "secret"),
            &mut out,
            &shutdown,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Interrupted));
        assert!(connector.calls().is_empty());
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_uncancelled_run_completes() {
        let connector = FakeConnector::new(token("tok123"), devices(&["dev-a"]));
        let shutdown = CancellationToken::new();
        let mut out = Vec::new();

        let count = run_until_cancelled(
            &connector,
            Credentials::new("alice", "secret"),
            &mut out,
            &shutdown,
        )
        .await
        .unwrap();

        assert_eq!(count, 1);
        assert_eq!(String::from_utf8(out).unwrap(), "dev-a\n");
    }
}
