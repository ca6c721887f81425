mod interceptor;

pub use interceptor::BearerInterceptor;

use toit_shared::api::LoginRequest;
use tracing::{debug, info};

use crate::{error::Error, server::AuthService};

/// Username and password as given on the command line. Not validated locally.
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Access token handed out by a successful login. Only lives in memory for one run.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Decodes the raw `access_token` payload of a login response.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Error> {
        if bytes.is_empty() {
            return Err(Error::EmptyToken);
        }
        String::from_utf8(bytes)
            .map(AccessToken)
            .map_err(Error::InvalidToken)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Exchanges credentials for an access token with a single `Login` call.
pub async fn login<S>(client: &mut S, credentials: Credentials) -> Result<AccessToken, Error>
where
    S: AuthService + ?Sized,
{
    let Credentials { username, password } = credentials;
    debug!(%username, "Logging in");

    let response = client
        .login(LoginRequest { username, password })
        .await?
        .ok_or(Error::MissingResponse("login"))?;

    let token = AccessToken::from_bytes(response.access_token)?;
    info!("Logged in");
    Ok(token)
}
