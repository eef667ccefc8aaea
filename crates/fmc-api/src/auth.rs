// Token lifecycle state
//
// The controller issues an opaque access token from a basic-auth exchange
// (or an external token manager hands one over). Tokens are valid for a fixed
// window after issuance; `Session` tracks that window and decides when the
// next call must refresh first.

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::header::HeaderMap;
use secrecy::SecretString;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Header carrying the session token, both in the exchange response and on
/// every authenticated request.
pub const ACCESS_TOKEN_HEADER: &str = "X-auth-access-token";

/// Header carrying the caller's domain identifier in the exchange response.
pub const DOMAIN_UUID_HEADER: &str = "domain_uuid";

/// Key under which an exported grant records its issuance time (epoch secs).
pub const ISSUED_AT_KEY: &str = "authTokenTimestamp";

/// Tokens older than this are refreshed before use. 30 minutes is the
/// longest a token lives without the refresh-token flow.
pub const DEFAULT_TOKEN_MAX_AGE: Duration = Duration::from_secs(30 * 60);

/// Basic-auth credentials for the token exchange.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

// ── TokenGrant ──────────────────────────────────────────────────────

/// A freshly minted token, however it was obtained.
///
/// The basic-auth exchange, the external token manager, and a manually
/// supplied token all produce this shape, and all are installed into the
/// session through the same path.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: SecretString,
    pub domain_uuid: Option<String>,
    /// When the issuer minted the token. `None` means "now".
    pub issued_at: Option<DateTime<Utc>>,
}

impl TokenGrant {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            domain_uuid: None,
            issued_at: None,
        }
    }

    pub fn with_domain(mut self, domain_uuid: impl Into<String>) -> Self {
        self.domain_uuid = Some(domain_uuid.into());
        self
    }

    pub fn with_issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = Some(issued_at);
        self
    }

    /// Parse an exported grant: a JSON object keyed like the exchange's
    /// response headers, optionally with an `authTokenTimestamp`.
    ///
    /// Keys match case-insensitively since header maps are dumped with
    /// whatever casing the exporter used.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, Error> {
        let map = value.as_object().ok_or_else(|| Error::Authentication {
            message: "token grant must be a JSON object".into(),
        })?;

        let lookup = |key: &str| {
            map.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        };

        let access_token = lookup(ACCESS_TOKEN_HEADER)
            .and_then(serde_json::Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Authentication {
                message: format!("token grant has no {ACCESS_TOKEN_HEADER}"),
            })?;

        let domain_uuid = lookup(DOMAIN_UUID_HEADER)
            .and_then(serde_json::Value::as_str)
            .map(String::from);

        let issued_at = lookup(ISSUED_AT_KEY)
            .and_then(serde_json::Value::as_f64)
            .and_then(epoch_secs_to_datetime);

        Ok(Self {
            access_token: SecretString::from(access_token.to_owned()),
            domain_uuid,
            issued_at,
        })
    }

    /// Extract a grant from the token exchange's response headers.
    pub(crate) fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let token = headers
            .get(ACCESS_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|t| !t.is_empty())?;
        let domain_uuid = headers
            .get(DOMAIN_UUID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        Some(Self {
            access_token: SecretString::from(token.to_owned()),
            domain_uuid,
            issued_at: None,
        })
    }
}

impl FromStr for TokenGrant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: serde_json::Value =
            serde_json::from_str(s).map_err(|e| Error::Deserialization {
                message: format!("token grant is not valid JSON: {e}"),
                body: String::new(),
            })?;
        Self::from_json(&value)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn epoch_secs_to_datetime(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp(secs.trunc() as i64, 0)
}

// ── AuthToken / Session ─────────────────────────────────────────────

/// The token currently installed in a session.
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub access_token: SecretString,
    pub domain_uuid: Option<String>,
    pub issued_at: DateTime<Utc>,
}

/// Mutable authentication state for one controller connection.
///
/// Invariant: the token is usable only while
/// `now - issued_at <= max_age`. No token at all is treated as stale.
#[derive(Debug)]
pub struct Session {
    credentials: Option<Credentials>,
    token: Option<AuthToken>,
    max_age: Duration,
}

impl Session {
    pub fn new(credentials: Option<Credentials>, max_age: Duration) -> Self {
        Self {
            credentials,
            token: None,
            max_age,
        }
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Time since the current token was issued, if there is one.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.token.as_ref().map(|t| now - t.issued_at)
    }

    /// Whether a call at `now` must refresh before using the token.
    ///
    /// Strictly greater than `max_age`: a token exactly at its limit is
    /// still used.
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        let Some(elapsed) = self.elapsed_at(now) else {
            return true;
        };
        let max_ms = i64::try_from(self.max_age.as_millis()).unwrap_or(i64::MAX);
        elapsed.num_milliseconds() > max_ms
    }

    /// Install a grant, stamping it with `now` when the issuer didn't.
    pub fn install(&mut self, grant: TokenGrant, now: DateTime<Utc>) -> &AuthToken {
        let issued_at = grant.issued_at.unwrap_or(now);
        debug!(%issued_at, "installing access token");
        self.token.insert(AuthToken {
            access_token: grant.access_token,
            domain_uuid: grant.domain_uuid,
            issued_at,
        })
    }
}

// ── Token manager collaborator ──────────────────────────────────────

/// An external service that mints tokens on demand.
///
/// Whatever it returns is consumed exactly like a manually supplied token.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn invoke(&self, endpoint: &str) -> Result<TokenGrant, Error>;
}

/// Token manager reached over HTTP: `GET {endpoint}` returns a JSON grant
/// in the [`TokenGrant::from_json`] format.
pub struct HttpTokenManager {
    http: reqwest::Client,
}

impl HttpTokenManager {
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
        })
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl TokenSource for HttpTokenManager {
    async fn invoke(&self, endpoint: &str) -> Result<TokenGrant, Error> {
        debug!(endpoint, "invoking token manager");

        let resp = self.http.get(endpoint).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(Error::TokenManager {
                message: format!("HTTP {status}: {body}"),
            });
        }

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| Error::TokenManager {
                message: format!("invalid grant JSON: {e}"),
            })?;

        TokenGrant::from_json(&value).map_err(|e| Error::TokenManager {
            message: e.to_string(),
        })
    }
}

// ── TokenGuard ──────────────────────────────────────────────────────

struct ManagedSource {
    source: Arc<dyn TokenSource>,
    endpoint: String,
}

/// Serializes the check-and-refresh step in front of every authenticated
/// call.
///
/// The session lock is held across the refresh, so concurrent callers that
/// find a stale token wait for one refresh instead of each starting their own.
pub struct TokenGuard {
    session: Mutex<Session>,
    manager: Option<ManagedSource>,
}

impl TokenGuard {
    pub fn new(session: Session) -> Self {
        Self {
            session: Mutex::new(session),
            manager: None,
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.session.get_mut().max_age = max_age;
        self
    }

    /// Route refreshes through an external token manager instead of the
    /// basic-auth exchange.
    pub fn with_token_manager(
        mut self,
        source: Arc<dyn TokenSource>,
        endpoint: impl Into<String>,
    ) -> Self {
        self.manager = Some(ManagedSource {
            source,
            endpoint: endpoint.into(),
        });
        self
    }

    /// Return a usable token, refreshing first when the current one is stale.
    ///
    /// `exchange` performs the basic-auth exchange; it is only called when
    /// no token manager is configured and the session holds credentials.
    /// A failed refresh fails the call and leaves the session untouched.
    pub async fn token<F, Fut>(&self, exchange: F) -> Result<AuthToken, Error>
    where
        F: FnOnce(Credentials) -> Fut + Send,
        Fut: Future<Output = Result<TokenGrant, Error>> + Send,
    {
        let mut session = self.session.lock().await;
        let now = Utc::now();

        if let Some(token) = session.token().filter(|_| !session.is_stale_at(now)) {
            return Ok(token.clone());
        }

        debug!(
            elapsed_secs = ?session.elapsed_at(now).map(|d| d.num_seconds()),
            max_age_secs = session.max_age().as_secs(),
            "access token stale, refreshing"
        );

        self.refresh_locked(&mut session, exchange).await
    }

    /// Mint a new token regardless of the current one's age.
    pub async fn refresh<F, Fut>(&self, exchange: F) -> Result<AuthToken, Error>
    where
        F: FnOnce(Credentials) -> Fut + Send,
        Fut: Future<Output = Result<TokenGrant, Error>> + Send,
    {
        let mut session = self.session.lock().await;
        self.refresh_locked(&mut session, exchange).await
    }

    async fn refresh_locked<F, Fut>(
        &self,
        session: &mut Session,
        exchange: F,
    ) -> Result<AuthToken, Error>
    where
        F: FnOnce(Credentials) -> Fut + Send,
        Fut: Future<Output = Result<TokenGrant, Error>> + Send,
    {
        let grant = if let Some(manager) = &self.manager {
            manager.source.invoke(&manager.endpoint).await?
        } else if let Some(credentials) = session.credentials().cloned() {
            exchange(credentials).await?
        } else {
            return Err(Error::Authentication {
                message: "no credentials or token manager to obtain a token".into(),
            });
        };

        Ok(session.install(grant, Utc::now()).clone())
    }

    /// Install a grant obtained out of band.
    pub async fn install(&self, grant: TokenGrant) -> AuthToken {
        self.session.lock().await.install(grant, Utc::now()).clone()
    }

    /// Snapshot of the installed token without any freshness check.
    pub async fn peek(&self) -> Option<AuthToken> {
        self.session.lock().await.token().cloned()
    }
}
