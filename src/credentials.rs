//! The `exaApi` credential descriptor.
//!
//! Declares the single secret the Exa node needs (an API key), how the
//! host's HTTP layer should inject it into outbound requests, and the fixed
//! request the host issues for its "test credential" feature. The host owns
//! storage and resolution; this module only describes the contract.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::client::DEFAULT_BASE_URL;
use crate::error::{Error, Result};

/// Credential type name the node references.
pub const CREDENTIAL_NAME: &str = "exaApi";

/// Secure container for the API key that zeroizes on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// The resolved `exaApi` credential: one required API key.
#[derive(Debug, Clone)]
pub struct ExaApiCredential {
    api_key: SecretKey,
}

impl ExaApiCredential {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretKey::new(api_key),
        }
    }

    /// The raw key, for constructing a client or injecting a header.
    pub fn api_key(&self) -> &str {
        self.api_key.expose()
    }

    /// Issue the credential test request and report whether the key is
    /// accepted. The host's credential-test UI does the same thing with its
    /// own HTTP layer; this helper makes the crate verifiable standalone.
    pub async fn verify(&self, http: &reqwest::Client) -> Result<bool> {
        let test = test_request();
        let url = format!("{}{}", test.base_url, test.path);
        debug!(url = %url, "issuing credential test request");

        let response = http
            .post(&url)
            .header("Authorization", self.api_key())
            .json(&test.body)
            .send()
            .await?;

        Ok(response.status().is_success())
    }
}

/// Mask a credential value for display.
pub fn mask_value(value: &str) -> String {
    if value.len() <= 4 {
        "*".repeat(value.len())
    } else {
        format!("{}...{}", &value[..2], &value[value.len() - 2..])
    }
}

/// A single declarative credential property for the host's form renderer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialProperty {
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub secret: bool,
    pub required: bool,
    pub default: Value,
    pub description: String,
}

/// Generic HTTP injection rule: headers attached to every outbound request
/// made under this credential. Values use the host's expression syntax.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthInjection {
    #[serde(rename = "type")]
    pub kind: String,
    pub headers: Value,
}

/// The fixed request the host issues to validate a stored key.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialTestRequest {
    pub method: String,
    #[serde(rename = "baseURL")]
    pub base_url: String,
    pub path: String,
    pub body: Value,
}

/// Full credential descriptor consumed by the host.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDescriptor {
    pub name: String,
    pub display_name: String,
    pub documentation_url: String,
    pub properties: Vec<CredentialProperty>,
    pub authenticate: AuthInjection,
    pub test: CredentialTestRequest,
}

/// Build the `exaApi` credential descriptor.
pub fn descriptor() -> CredentialDescriptor {
    CredentialDescriptor {
        name: CREDENTIAL_NAME.to_string(),
        display_name: "Exa API".to_string(),
        documentation_url: "https://docs.exa.ai/".to_string(),
        properties: vec![CredentialProperty {
            name: "apiKey".to_string(),
            display_name: "API Key".to_string(),
            kind: "string".to_string(),
            secret: true,
            required: true,
            default: Value::String(String::new()),
            description: "The API key for Exa".to_string(),
        }],
        authenticate: AuthInjection {
            kind: "generic".to_string(),
            headers: json!({
                "Authorization": "={{$credentials.apiKey}}",
            }),
        },
        test: test_request(),
    }
}

/// The credential test request: a minimal search that succeeds only with a
/// valid key, authenticated through the same `Authorization` injection the
/// descriptor declares for normal requests.
pub fn test_request() -> CredentialTestRequest {
    CredentialTestRequest {
        method: "POST".to_string(),
        base_url: DEFAULT_BASE_URL.to_string(),
        path: "/search".to_string(),
        body: json!({
            "query": "test query",
            "numResults": 1,
        }),
    }
}

/// Resolve the `exaApi` credential from a host-supplied credential map.
pub fn resolve(credentials: &std::collections::HashMap<String, String>) -> Result<ExaApiCredential> {
    credentials
        .get(CREDENTIAL_NAME)
        .map(|key| ExaApiCredential::new(key.clone()))
        .ok_or_else(|| {
            Error::Credential(format!(
                "Credential '{}' not found. Configure an Exa API key for this node.",
                CREDENTIAL_NAME
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_value() {
        assert_eq!(mask_value("ab"), "**");
        assert_eq!(mask_value("abcd"), "****");
        assert_eq!(mask_value("abcde"), "ab...de");
        assert_eq!(mask_value("secret123"), "se...23");
    }

    #[test]
    fn test_secret_key_debug_is_redacted() {
        let cred = ExaApiCredential::new("sk-live-abcdef");
        let rendered = format!("{:?}", cred);
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("sk-live-abcdef"));
    }

    #[test]
    fn test_descriptor_shape() {
        let desc = descriptor();
        assert_eq!(desc.name, "exaApi");
        assert_eq!(desc.properties.len(), 1);

        let prop = &desc.properties[0];
        assert_eq!(prop.name, "apiKey");
        assert!(prop.secret);
        assert!(prop.required);

        assert_eq!(
            desc.authenticate.headers["Authorization"],
            "={{$credentials.apiKey}}"
        );
    }

    #[test]
    fn test_credential_test_request_shape() {
        let test = test_request();
        assert_eq!(test.method, "POST");
        assert_eq!(test.base_url, "https://api.exa.ai");
        assert_eq!(test.path, "/search");
        assert_eq!(test.body["query"], "test query");
        assert_eq!(test.body["numResults"], 1);
    }

    #[test]
    fn test_resolve_missing_credential() {
        let creds = std::collections::HashMap::new();
        let err = resolve(&creds).unwrap_err();
        assert_eq!(err.code(), "CREDENTIAL_ERROR");
    }

    #[test]
    fn test_resolve_present_credential() {
        let mut creds = std::collections::HashMap::new();
        creds.insert("exaApi".to_string(), "my-key".to_string());
        let cred = resolve(&creds).unwrap();
        assert_eq!(cred.api_key(), "my-key");
    }
}
