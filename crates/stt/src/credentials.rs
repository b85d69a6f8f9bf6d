//! Provider credential acquisition
//!
//! Turns the configured credential source into an OAuth access token.
//! Service account keys are exchanged with a signed JWT assertion,
//! `gcloud` user credentials with their refresh token.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use murmur_config::CredentialsConfig;
use reqwest::Client;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, pkcs8::DecodePrivateKey};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::{Result, SttError};

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for signed assertions
const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// Credential document as found in `GOOGLE_APPLICATION_CREDENTIALS`
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum CredentialFile {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUser),
}

#[derive(Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: SecretString,
    #[serde(default)]
    token_uri: Option<String>,
}

#[derive(Deserialize)]
struct AuthorizedUser {
    client_id: String,
    client_secret: SecretString,
    refresh_token: SecretString,
    #[serde(default)]
    token_uri: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: SecretString,
}

#[derive(serde::Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

/// Obtain an access token for the configured credential source
pub(crate) async fn access_token(client: &Client, source: &CredentialsConfig) -> Result<SecretString> {
    let document = load_document(source).await?;

    let credentials: CredentialFile = serde_json::from_str(document.expose_secret())
        .map_err(|e| SttError::Credential(format!("malformed credential JSON: {e}")))?;

    match credentials {
        CredentialFile::ServiceAccount(key) => {
            let token_uri = key.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI);
            let assertion = sign_assertion(&key, token_uri, unix_now()?)?;

            tracing::debug!(client_email = %key.client_email, "exchanging service account assertion");

            exchange(
                client,
                token_uri,
                &[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())],
            )
            .await
        }
        CredentialFile::AuthorizedUser(user) => {
            let token_uri = user.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI);

            tracing::debug!("exchanging user refresh token");

            exchange(
                client,
                token_uri,
                &[
                    ("grant_type", "refresh_token"),
                    ("client_id", user.client_id.as_str()),
                    ("client_secret", user.client_secret.expose_secret()),
                    ("refresh_token", user.refresh_token.expose_secret()),
                ],
            )
            .await
        }
    }
}

/// Read the credential JSON from a file (`local`) or take it as configured
async fn load_document(source: &CredentialsConfig) -> Result<SecretString> {
    match source {
        CredentialsConfig::Local { path: Some(path) } => tokio::fs::read_to_string(path)
            .await
            .map(SecretString::from)
            .map_err(|e| SttError::Credential(format!("failed to read credential file {}: {e}", path.display()))),
        CredentialsConfig::Local { path: None } => Err(SttError::Credential(
            "no credential path configured".to_string(),
        )),
        CredentialsConfig::ServiceAccountJson { json: Some(json) } => Ok(json.clone()),
        CredentialsConfig::ServiceAccountJson { json: None } => Err(SttError::Credential(
            "no credential JSON configured".to_string(),
        )),
    }
}

/// Build an RS256-signed JWT assertion for the token endpoint
fn sign_assertion(key: &ServiceAccountKey, token_uri: &str, now: u64) -> Result<String> {
    let private_key = RsaPrivateKey::from_pkcs8_pem(key.private_key.expose_secret())
        .map_err(|e| SttError::Credential(format!("invalid service account private key: {e}")))?;

    let header = serde_json::json!({ "alg": "RS256", "typ": "JWT" });
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: CLOUD_PLATFORM_SCOPE,
        aud: token_uri,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };

    let signing_input = format!("{}.{}", encode_segment(&header)?, encode_segment(&claims)?);
    let digest = Sha256::digest(signing_input.as_bytes());

    let signature = private_key
        .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
        .map_err(|e| SttError::Credential(format!("failed to sign assertion: {e}")))?;

    Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
}

fn encode_segment<T: serde::Serialize>(value: &T) -> Result<String> {
    let bytes = serde_json::to_vec(value).map_err(|e| SttError::Credential(format!("failed to encode assertion: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

async fn exchange(client: &Client, token_uri: &str, form: &[(&str, &str)]) -> Result<SecretString> {
    let response = client
        .post(token_uri)
        .form(form)
        .send()
        .await
        .map_err(|e| SttError::Credential(format!("token request to {token_uri} failed: {e}")))?;

    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        return Err(SttError::Credential(format!("token exchange rejected ({status}): {body}")));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| SttError::Credential(format!("malformed token response: {e}")))?;

    Ok(token.access_token)
}

fn unix_now() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .map_err(|e| SttError::Credential(format!("system clock is before the Unix epoch: {e}")))
}
