// Token acquisition
//
// The basic-auth exchange, out-of-band token injection, and the
// reachability probe that validates an injected token.

use reqwest::header::CONTENT_TYPE;
use secrecy::ExposeSecret;
use tracing::{debug, info, warn};

use crate::auth::{ACCESS_TOKEN_HEADER, AuthToken, Credentials, TokenGrant};
use crate::client::{FmcClient, token_header};
use crate::error::Error;

impl FmcClient {
    /// Exchange credentials for a token.
    ///
    /// `POST /api/fmc_platform/v1/auth/generatetoken` with HTTP Basic. The
    /// token and domain come back in response headers, not the body.
    pub(crate) async fn exchange(&self, credentials: Credentials) -> Result<TokenGrant, Error> {
        let url = self.auth_url()?;
        debug!("requesting token from {}", url);

        let resp = self
            .http()
            .post(url)
            .basic_auth(
                &credentials.username,
                Some(credentials.password.expose_secret()),
            )
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("token exchange failed (HTTP {status}): {body}"),
            });
        }

        TokenGrant::from_headers(resp.headers()).ok_or_else(|| Error::Authentication {
            message: "token exchange returned no access token".into(),
        })
    }

    /// Mint a fresh token now, whatever the age of the current one.
    ///
    /// Uses the token manager when one is configured, else the basic-auth
    /// exchange.
    pub async fn generate_token(&self) -> Result<AuthToken, Error> {
        let token = self
            .guard()
            .refresh(|credentials| self.exchange(credentials))
            .await?;
        info!("obtained access token");
        Ok(token)
    }

    /// Install a token obtained elsewhere (an exported grant or a token
    /// manager response) without contacting the controller.
    pub async fn inject_token(&self, grant: TokenGrant) -> AuthToken {
        debug!("injecting externally supplied token");
        self.guard().install(grant).await
    }

    /// Check that the installed token is accepted by the controller.
    ///
    /// Sends the token as-is to the audit records endpoint, without running
    /// the refresh guard, retrying per the client's [`ProbePolicy`]. Transport
    /// failures count as failed attempts. Returns `false` when no token is
    /// installed or every attempt is rejected.
    ///
    /// [`ProbePolicy`]: crate::client::ProbePolicy
    pub async fn verify_token(&self) -> Result<bool, Error> {
        let Some(token) = self.guard().peek().await else {
            return Ok(false);
        };
        let url = self.platform_url("audit/auditrecords")?;
        let header = token_header(&token)?;
        let policy = self.probe_policy();

        for attempt in 1..=policy.attempts {
            let outcome = self
                .http()
                .get(url.clone())
                .header(CONTENT_TYPE, "application/json")
                .header(ACCESS_TOKEN_HEADER, header.clone())
                .send()
                .await;

            match outcome {
                Ok(resp) if (200..=202).contains(&resp.status().as_u16()) => {
                    debug!(attempt, "token verified");
                    return Ok(true);
                }
                Ok(resp) => {
                    debug!(attempt, status = resp.status().as_u16(), "token probe rejected");
                }
                Err(e) => {
                    warn!(attempt, error = %e, "token probe failed");
                }
            }

            if attempt < policy.attempts {
                tokio::time::sleep(policy.delay).await;
            }
        }

        debug!(attempts = policy.attempts, "token probe exhausted");
        Ok(false)
    }
}
