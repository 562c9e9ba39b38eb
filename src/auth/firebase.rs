use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{
    Algorithm, DecodingKey, Validation, decode, decode_header,
    jwk::{Jwk, JwkSet},
};
use tokio::sync::RwLock;

use super::{AuthError, IdentityVerifier, SubjectClaims, UserId};

const JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Minimum time between two fetches of the signing keys.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

struct KeyCache {
    keys: JwkSet,
    fetched_at: Option<Instant>,
}

impl KeyCache {
    fn refresh_due(&self, min_interval: Duration) -> bool {
        self.fetched_at
            .is_none_or(|fetched_at| fetched_at.elapsed() >= min_interval)
    }
}

/// Verifies Firebase Authentication ID tokens (RS256, Google-managed keys).
pub struct FirebaseVerifier {
    project_id: String,
    jwks_url: String,
    client: reqwest::Client,
    min_refresh_interval: Duration,
    cache: RwLock<KeyCache>,
}

impl FirebaseVerifier {
    pub fn new(project_id: String, key_fetch_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(key_fetch_timeout)
            .build()?;

        Ok(Self {
            project_id,
            jwks_url: JWKS_URL.to_string(),
            client,
            min_refresh_interval: MIN_REFRESH_INTERVAL,
            cache: RwLock::new(KeyCache {
                keys: JwkSet { keys: Vec::new() },
                fetched_at: None,
            }),
        })
    }

    #[cfg(test)]
    fn with_key_source(mut self, jwks_url: String, min_refresh_interval: Duration) -> Self {
        self.jwks_url = jwks_url;
        self.min_refresh_interval = min_refresh_interval;
        self
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[format!("https://securetoken.google.com/{}", self.project_id)]);
        validation
    }

    async fn fetch_keys(&self) -> Result<JwkSet, reqwest::Error> {
        self.client
            .get(&self.jwks_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    async fn decoding_key(&self, kid: &str) -> Result<Option<DecodingKey>, AuthError> {
        if let Some(jwk) = self.cache.read().await.keys.find(kid) {
            return to_decoding_key(jwk).map(Some);
        }

        // Google rotates keys, so an unknown kid may mean a stale set. Refresh at
        // most once per interval; the write lock lets a single request fetch
        // while the others wait and re-check.
        let mut cache = self.cache.write().await;

        if cache.keys.find(kid).is_none() && cache.refresh_due(self.min_refresh_interval) {
            cache.fetched_at = Some(Instant::now());

            let fresh = self.fetch_keys().await.map_err(|e| {
                tracing::error!("failed to fetch token signing keys: {}", e);
                AuthError::InvalidToken(format!("signing keys unavailable: {e}"))
            })?;

            tracing::info!("Fetched {} token signing keys", fresh.keys.len());
            cache.keys = fresh;
        }

        cache.keys.find(kid).map(to_decoding_key).transpose()
    }
}

fn to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    DecodingKey::from_jwk(jwk).map_err(|e| AuthError::InvalidToken(e.to_string()))
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AuthError::InvalidToken(format!(
                "unexpected signing algorithm {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("token has no key id".to_string()))?;

        let key = self
            .decoding_key(&kid)
            .await?
            .ok_or_else(|| AuthError::InvalidToken(format!("unknown signing key {kid}")))?;

        decode::<SubjectClaims>(token, &key, &self.validation())
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?
            .claims
            .into_user_id()
    }
}
