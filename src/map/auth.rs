use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::config::ImageryConfig;
use crate::error::AuthError;

/// Tokens are refreshed this long before the endpoint says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);
/// Assumed lifetime when the endpoint gives none, and the cap on what it gives.
const DEFAULT_LIFETIME: Duration = Duration::from_secs(3600);
const MAX_LIFETIME: Duration = Duration::from_secs(24 * 3600);

// ---------------------------------------------------------------------------
// TokenProvider – source of bearer tokens for the imagery overlay
// ---------------------------------------------------------------------------

pub trait TokenProvider {
    fn access_token(&mut self) -> Result<String, AuthError>;
}

/// A fixed token.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[cfg(test)]
impl TokenProvider for StaticToken {
    fn access_token(&mut self) -> Result<String, AuthError> {
        Ok(self.0.clone())
    }
}

// ---------------------------------------------------------------------------
// OAuth2 client-credentials client
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Blocking client-credentials exchange against the configured endpoint.
/// The token is reused until shortly before it expires.
pub struct OAuthClient {
    token_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    http: reqwest::blocking::Client,
    cached: Option<CachedToken>,
}

impl OAuthClient {
    pub fn new(config: &ImageryConfig) -> Self {
        Self {
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            http: reqwest::blocking::Client::new(),
            cached: None,
        }
    }

    fn credentials(&self) -> Result<(&str, &str), AuthError> {
        let id = self
            .client_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::MissingCredentials("client_id"))?;
        let secret = self
            .client_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::MissingCredentials("client_secret"))?;
        Ok((id, secret))
    }

    fn request_token(&self) -> Result<CachedToken, AuthError> {
        let (id, secret) = self.credentials()?;
        log::info!("Requesting imagery token from {}", self.token_url);

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", id),
                ("client_secret", secret),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body: TokenResponse = response.json()?;
        let value = body.access_token.ok_or(AuthError::NoToken)?;
        Ok(CachedToken {
            value,
            expires_at: expiry(Instant::now(), body.expires_in),
        })
    }
}

/// When a token issued at `now` should be refreshed.
fn expiry(now: Instant, expires_in: Option<u64>) -> Instant {
    let lifetime = expires_in
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_LIFETIME)
        .min(MAX_LIFETIME)
        .saturating_sub(EXPIRY_MARGIN);
    now.checked_add(lifetime).unwrap_or(now)
}

impl TokenProvider for OAuthClient {
    fn access_token(&mut self) -> Result<String, AuthError> {
        if let Some(cached) = &self.cached {
            if Instant::now() < cached.expires_at {
                return Ok(cached.value.clone());
            }
        }
        let token = self.request_token()?;
        let value = token.value.clone();
        self.cached = Some(token);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_fail_before_any_request() {
        let mut client = OAuthClient::new(&ImageryConfig::default());
        assert!(matches!(
            client.access_token(),
            Err(AuthError::MissingCredentials("client_id"))
        ));

        let config = ImageryConfig {
            client_id: Some("id".into()),
            client_secret: Some(String::new()),
            ..ImageryConfig::default()
        };
        let mut client = OAuthClient::new(&config);
        assert!(matches!(
            client.access_token(),
            Err(AuthError::MissingCredentials("client_secret"))
        ));
    }

    #[test]
    fn token_lifetime_is_bounded() {
        let now = Instant::now();
        assert_eq!(expiry(now, Some(u64::MAX)), now + MAX_LIFETIME - EXPIRY_MARGIN);
        assert_eq!(expiry(now, None), now + DEFAULT_LIFETIME - EXPIRY_MARGIN);
        assert_eq!(expiry(now, Some(30)), now);
    }

    #[test]
    fn unexpired_token_is_reused() {
        let mut client = OAuthClient::new(&ImageryConfig::default());
        client.cached = Some(CachedToken {
            value: "cached".into(),
            expires_at: Instant::now() + Duration::from_secs(600),
        });
        assert_eq!(client.access_token().unwrap(), "cached");
    }
}
