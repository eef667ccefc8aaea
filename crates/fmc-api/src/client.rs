// FMC REST client
//
// Wraps `reqwest::Client` with domain-scoped URL construction, the token
// guard, and per-verb status classification. Endpoint modules (objects,
// devices, interfaces, routes, deployment, policies) are implemented as
// inherent methods in separate files so this module stays focused on
// transport mechanics.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use strum::{Display, EnumString};
use tracing::debug;
use url::Url;

use crate::auth::{
    ACCESS_TOKEN_HEADER, AuthToken, Credentials, DEFAULT_TOKEN_MAX_AGE, Session, TokenGuard,
    TokenSource,
};
use crate::error::Error;
use crate::transport::TransportConfig;

/// Identifier of the controller's built-in global domain.
pub const GLOBAL_DOMAIN: &str = "e276abec-e0f2-11e3-8169-6d9ed49b625f";

const CONFIG_API: &str = "api/fmc_config/v1";
const PLATFORM_API: &str = "api/fmc_platform/v1";

/// Page size for most collection listings. Lookups never page past it.
pub const DEFAULT_LIST_LIMIT: u32 = 10_000;

/// Smaller page size the controller enforces for device groups and
/// security zones.
pub const REDUCED_LIST_LIMIT: u32 = 9_000;

/// HTTP verbs the client issues, each with its own accepted status range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    /// Whether the controller's answer counts as success for this verb.
    ///
    /// Reads and deletes accept `200..=300`, creates accept only
    /// `201..=202`, and full-representation updates accept only `200`.
    pub fn accepts(self, status: u16) -> bool {
        match self {
            Self::Get | Self::Delete => (200..=300).contains(&status),
            Self::Post => (201..=202).contains(&status),
            Self::Put => status == 200,
        }
    }

    fn method(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Retry policy for the reachability probe. Fixed delay, no backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbePolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// Raw HTTP client for the management center's REST API.
///
/// Every authenticated call funnels through [`TokenGuard`] before it is
/// sent, so callers never see a stale token. Responses are decoded into the
/// caller's type after the status has been checked against the verb's
/// accepted range.
pub struct FmcClient {
    http: reqwest::Client,
    base_url: Url,
    domain: String,
    guard: TokenGuard,
    probe: ProbePolicy,
}

impl FmcClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the controller root (e.g. `https://fmc.example.net`).
    /// Without credentials the client can only use injected tokens or a
    /// token manager.
    pub fn new(
        base_url: Url,
        credentials: Option<Credentials>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, credentials))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        credentials: Option<Credentials>,
    ) -> Self {
        Self {
            http,
            base_url,
            domain: GLOBAL_DOMAIN.to_owned(),
            guard: TokenGuard::new(Session::new(credentials, DEFAULT_TOKEN_MAX_AGE)),
            probe: ProbePolicy::default(),
        }
    }

    /// Scope configuration calls to a domain other than the global one.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_token_max_age(mut self, max_age: Duration) -> Self {
        self.guard = self.guard.with_max_age(max_age);
        self
    }

    /// Mint tokens through an external token manager instead of the
    /// basic-auth exchange.
    pub fn with_token_manager(
        mut self,
        source: Arc<dyn TokenSource>,
        endpoint: impl Into<String>,
    ) -> Self {
        self.guard = self.guard.with_token_manager(source, endpoint);
        self
    }

    pub fn with_probe_policy(mut self, probe: ProbePolicy) -> Self {
        self.probe = probe;
        self
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The domain configuration calls are scoped to.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn probe_policy(&self) -> ProbePolicy {
        self.probe
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn guard(&self) -> &TokenGuard {
        &self.guard
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn join(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// `{base}/api/fmc_platform/v1/auth/generatetoken`
    pub(crate) fn auth_url(&self) -> Result<Url, Error> {
        self.join(&format!("{PLATFORM_API}/auth/generatetoken"))
    }

    /// Domain-scoped configuration URL:
    /// `{base}/api/fmc_config/v1/domain/{domain}/{path}`
    pub fn config_url(&self, path: &str) -> Result<Url, Error> {
        self.join(&format!("{CONFIG_API}/domain/{}/{path}", self.domain))
    }

    /// Configuration URL scoped to an explicit domain rather than the
    /// client's own.
    pub(crate) fn config_url_in(&self, domain: &str, path: &str) -> Result<Url, Error> {
        self.join(&format!("{CONFIG_API}/domain/{domain}/{path}"))
    }

    /// Domain-scoped platform URL:
    /// `{base}/api/fmc_platform/v1/domain/{domain}/{path}`
    pub fn platform_url(&self, path: &str) -> Result<Url, Error> {
        self.join(&format!("{PLATFORM_API}/domain/{}/{path}", self.domain))
    }

    /// Collection listing URL with the fixed first page: `?offset=0&limit=N`.
    pub(crate) fn list_url(&self, path: &str, limit: u32) -> Result<Url, Error> {
        let mut url = self.config_url(path)?;
        url.query_pairs_mut()
            .append_pair("offset", "0")
            .append_pair("limit", &limit.to_string());
        Ok(url)
    }

    // ── Token guard ──────────────────────────────────────────────────

    /// Return a usable token, refreshing first if the current one has
    /// outlived its max age.
    pub async fn current_token(&self) -> Result<AuthToken, Error> {
        self.guard
            .token(|credentials| self.exchange(credentials))
            .await
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET and decode the body. Accepts `200..=300`.
    pub async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        self.send(Verb::Get, url, None::<&()>).await
    }

    /// Send a POST with a JSON body. Accepts only `201..=202`.
    pub async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        self.send(Verb::Post, url, Some(body)).await
    }

    /// Send a PUT with the full representation. Accepts only `200`.
    pub async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        self.send(Verb::Put, url, Some(body)).await
    }

    /// Send a DELETE. Accepts `200..=300`.
    pub async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        self.send(Verb::Delete, url, None::<&()>).await
    }

    async fn send<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        verb: Verb,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, Error> {
        let token = self.current_token().await?;

        debug!("{verb} {url}");

        let mut builder = self
            .http
            .request(verb.method(), url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCESS_TOKEN_HEADER, token_header(&token)?);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        parse_response(verb, resp).await
    }
}

/// The token as a header value, marked sensitive so it never shows up in
/// debug output.
pub(crate) fn token_header(token: &AuthToken) -> Result<HeaderValue, Error> {
    let mut value = HeaderValue::from_str(token.access_token.expose_secret()).map_err(|_| {
        Error::Authentication {
            message: "access token contains characters not allowed in a header".into(),
        }
    })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Check the status against the verb's accepted range, then decode.
///
/// Rejections carry the controller's body text so the operator can see the
/// diagnostic. An empty body decodes as JSON `null`.
async fn parse_response<T: DeserializeOwned>(
    verb: Verb,
    resp: reqwest::Response,
) -> Result<T, Error> {
    let status = resp.status().as_u16();
    let body = resp.text().await?;

    debug!(%verb, status, bytes = body.len(), "controller responded");

    if !verb.accepts(status) {
        return Err(Error::Api {
            method: verb.to_string(),
            status,
            body,
        });
    }

    decode_body(&body)
}

pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    let result = if body.trim().is_empty() {
        serde_json::from_value(serde_json::Value::Null)
    } else {
        serde_json::from_str(body)
    };

    result.map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> FmcClient {
        FmcClient::with_client(
            reqwest::Client::new(),
            Url::parse("https://fmc.example.net/").unwrap(),
            None,
        )
    }

    #[test]
    fn post_accepts_only_created_and_accepted() {
        assert!(Verb::Post.accepts(201));
        assert!(Verb::Post.accepts(202));
        assert!(!Verb::Post.accepts(200));
        assert!(!Verb::Post.accepts(203));
    }

    #[test]
    fn put_accepts_only_ok() {
        assert!(Verb::Put.accepts(200));
        assert!(!Verb::Put.accepts(201));
        assert!(!Verb::Put.accepts(204));
    }

    #[test]
    fn get_and_delete_accept_up_to_300() {
        for verb in [Verb::Get, Verb::Delete] {
            assert!(verb.accepts(200));
            assert!(verb.accepts(204));
            assert!(verb.accepts(300));
            assert!(!verb.accepts(301));
            assert!(!verb.accepts(199));
            assert!(!verb.accepts(404));
        }
    }

    #[test]
    fn verb_displays_uppercase() {
        assert_eq!(Verb::Delete.to_string(), "DELETE");
        assert_eq!("PUT".parse::<Verb>().unwrap(), Verb::Put);
    }

    #[test]
    fn urls_are_domain_scoped() {
        let client = client();
        assert_eq!(
            client.config_url("object/hosts").unwrap().as_str(),
            "https://fmc.example.net/api/fmc_config/v1/domain/e276abec-e0f2-11e3-8169-6d9ed49b625f/object/hosts"
        );
        assert_eq!(
            client.platform_url("audit/auditrecords").unwrap().as_str(),
            "https://fmc.example.net/api/fmc_platform/v1/domain/e276abec-e0f2-11e3-8169-6d9ed49b625f/audit/auditrecords"
        );
        assert_eq!(
            client.auth_url().unwrap().as_str(),
            "https://fmc.example.net/api/fmc_platform/v1/auth/generatetoken"
        );
    }

    #[test]
    fn list_url_carries_first_page() {
        let client = client().with_domain("dom-2");
        let url = client
            .list_url("devicegroups/devicegrouprecords", REDUCED_LIST_LIMIT)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://fmc.example.net/api/fmc_config/v1/domain/dom-2/devicegroups/devicegrouprecords?offset=0&limit=9000"
        );
    }

    #[test]
    fn empty_body_decodes_as_null() {
        let value: serde_json::Value = decode_body("").unwrap();
        assert!(value.is_null());
        let unit: () = decode_body("  ").unwrap();
        assert_eq!(unit, ());
    }

    #[test]
    fn malformed_body_keeps_raw_text() {
        let err = decode_body::<serde_json::Value>("<html>oops</html>").unwrap_err();
        match err {
            Error::Deserialization { body, .. } => assert_eq!(body, "<html>oops</html>"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
