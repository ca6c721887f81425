use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use toit_shared::api::{
    AuthResponse, ListDevicesRequest, ListDevicesResponse, LoginRequest, auth_client::AuthClient,
    device_service_client::DeviceServiceClient,
};
use tonic::{
    service::interceptor::InterceptedService,
    transport::{Channel, ClientTlsConfig, Endpoint, Uri},
};
use tracing::debug;

use crate::{
    auth::{AccessToken, BearerInterceptor},
    error::Error,
};

/// The `toit.api.Auth` calls used by this client.
///
/// `Ok(None)` means the call completed without a response message.
#[async_trait]
pub trait AuthService: Send {
    async fn login(&mut self, request: LoginRequest) -> Result<Option<AuthResponse>, tonic::Status>;
}

/// The `toit.api.DeviceService` calls used by this client.
#[async_trait]
pub trait DeviceService: Send {
    async fn list_devices(
        &mut self,
        request: ListDevicesRequest,
    ) -> Result<Option<ListDevicesResponse>, tonic::Status>;
}

/// Opens the channels for the two steps of a run. The device channel is only
/// built from a token obtained by logging in.
#[async_trait]
pub trait Connector: Sync {
    type Auth: AuthService;
    type Devices: DeviceService;

    async fn auth_client(&self) -> Result<Self::Auth, Error>;

    async fn device_client(&self, token: &AccessToken) -> Result<Self::Devices, Error>;
}

#[async_trait]
impl AuthService for AuthClient<Channel> {
    async fn login(&mut self, request: LoginRequest) -> Result<Option<AuthResponse>, tonic::Status> {
        let response = AuthClient::login(self, request).await?;
        Ok(Some(response.into_inner()))
    }
}

#[async_trait]
impl DeviceService for DeviceServiceClient<InterceptedService<Channel, BearerInterceptor>> {
    async fn list_devices(
        &mut self,
        request: ListDevicesRequest,
    ) -> Result<Option<ListDevicesResponse>, tonic::Status> {
        let response = DeviceServiceClient::list_devices(self, request).await?;
        Ok(Some(response.into_inner()))
    }
}

/// Connects to the API over TLS. Each step gets its own connection.
#[derive(Clone, Debug)]
pub struct GrpcConnector {
    endpoint: Endpoint,
}

impl GrpcConnector {
    /// `timeout` bounds connecting and each call; without one both wait for the transport to give up.
    pub fn new(api_url: &str, timeout: Option<Duration>) -> Result<Self, Error> {
        let uri = Uri::from_str(api_url).map_err(|source| Error::InvalidUri {
            url: api_url.to_string(),
            source,
        })?;
        let use_tls = uri.scheme_str() == Some("https");

        let mut endpoint = Endpoint::from(uri);
        if use_tls {
            endpoint = endpoint
                .tls_config(ClientTlsConfig::new().with_webpki_roots())
                .map_err(Error::Connection)?;
        }
        if let Some(timeout) = timeout {
            endpoint = endpoint.connect_timeout(timeout).timeout(timeout);
        }

        Ok(GrpcConnector { endpoint })
    }

    pub fn uri(&self) -> &Uri {
        self.endpoint.uri()
    }

    async fn connect(&self) -> Result<Channel, Error> {
        debug!(uri = %self.endpoint.uri(), "Connecting");
        self.endpoint.connect().await.map_err(Error::Connection)
    }
}

#[async_trait]
impl Connector for GrpcConnector {
    type Auth = AuthClient<Channel>;
    type Devices = DeviceServiceClient<InterceptedService<Channel, BearerInterceptor>>;

    async fn auth_client(&self) -> Result<Self::Auth, Error> {
        let channel = self.connect().await?;
        Ok(AuthClient::new(channel))
    }

    async fn device_client(&self, token: &AccessToken) -> Result<Self::Devices, Error> {
        let interceptor = BearerInterceptor::new(token)?;
        let channel = self.connect().await?;
        Ok(DeviceServiceClient::with_interceptor(channel, interceptor))
    }
}
