use super::{PublishError, Sink};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::distr::Alphanumeric;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha1::Sha1;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";

const POST_TIMEOUT: Duration = Duration::from_secs(20);

/// RFC 3986 unreserved characters stay as they are, everything else is
/// percent-encoded.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// OAuth 1.0a user-context credentials.
///
/// Debug output is redacted; the values are only exposed while signing.
pub struct TwitterCredentials {
    pub consumer_key: SecretString,
    pub consumer_secret: SecretString,
    pub access_token: SecretString,
    pub access_secret: SecretString,
}

impl std::fmt::Debug for TwitterCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterCredentials")
            .field("consumer_key", &"[REDACTED]")
            .field("consumer_secret", &"[REDACTED]")
            .field("access_token", &"[REDACTED]")
            .field("access_secret", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize)]
struct CreatePost<'a> {
    text: &'a str,
}

/// Posts messages through the X/Twitter v2 `POST /2/tweets` endpoint.
#[derive(Debug)]
pub struct TwitterSink {
    client: reqwest::Client,
    endpoint: String,
    credentials: TwitterCredentials,
}

impl TwitterSink {
    pub fn new(client: reqwest::Client, api_base: &str, credentials: TwitterCredentials) -> Self {
        Self {
            client,
            endpoint: format!("{}/2/tweets", api_base.trim_end_matches('/')),
            credentials,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Sink for TwitterSink {
    fn name(&self) -> &'static str {
        "twitter"
    }

    async fn deliver(&self, message: &str) -> Result<(), PublishError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let authorization = authorization_header(
            "POST",
            &self.endpoint,
            &[],
            &self.credentials,
            &timestamp,
            &nonce(),
        )?;

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(POST_TIMEOUT)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .json(&CreatePost { text: message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Api {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(message = %message.replace('\n', " "), "Published to twitter");
        Ok(())
    }
}

fn encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

/// 32 random alphanumeric characters, fresh for every request.
fn nonce() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// HMAC-SHA1 signature over the OAuth 1.0a signature base string.
///
/// `params` holds request parameters that take part in signing (query
/// string and form body); a JSON body does not.
fn signature(
    method: &str,
    url: &str,
    params: &[(&str, &str)],
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String, PublishError> {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let base = format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(url),
        encode(&param_string)
    );
    let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));

    let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
        .map_err(|e| PublishError::Signing(e.to_string()))?;
    mac.update(base.as_bytes());

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn authorization_header(
    method: &str,
    url: &str,
    extra: &[(&str, &str)],
    credentials: &TwitterCredentials,
    timestamp: &str,
    nonce: &str,
) -> Result<String, PublishError> {
    let oauth = [
        ("oauth_consumer_key", credentials.consumer_key.expose_secret()),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp),
        ("oauth_token", credentials.access_token.expose_secret()),
        ("oauth_version", "1.0"),
    ];

    let mut params: Vec<(&str, &str)> = oauth.to_vec();
    params.extend_from_slice(extra);

    let signature = signature(
        method,
        url,
        &params,
        credentials.consumer_secret.expose_secret(),
        credentials.access_secret.expose_secret(),
    )?;

    let fields = oauth
        .iter()
        .map(|(k, v)| (*k, *v))
        .chain(std::iter::once(("oauth_signature", signature.as_str())))
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!("OAuth {}", fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    fn credentials() -> TwitterCredentials {
        TwitterCredentials {
            consumer_key: secret("xvz1evFS4wEEPTGEFPHBog"),
            consumer_secret: secret("kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw"),
            access_token: secret("370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb"),
            access_secret: secret("LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE"),
        }
    }

    #[test]
    fn test_signature_matches_reference_example() {
        // Worked example from the OAuth 1.0a "creating a signature" guide
        let header = authorization_header(
            "post",
            "https://api.twitter.com/1.1/statuses/update.json",
            &[
                ("include_entities", "true"),
                ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
            ],
            &credentials(),
            "1318622958",
            "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
        )
        .unwrap();

        assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
        assert!(
            header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""),
            "{header}"
        );
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
    }

    #[test]
    fn test_encode_unreserved() {
        assert_eq!(encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(encode("a-b.c_d~e"), "a-b.c_d~e");
        assert_eq!(encode("☃"), "%E2%98%83");
    }

    #[test]
    fn test_nonce_unique() {
        let a = nonce();
        let b = nonce();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let debug_output = format!("{:?}", credentials());
        assert!(!debug_output.contains("xvz1evFS4wEEPTGEFPHBog"));
        assert!(debug_output.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_deliver_posts_signed_json() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .and(header_exists("authorization"))
            .and(body_json(serde_json::json!({ "text": "t1 - l1" })))
            .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"data":{"id":"1"}}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let sink = TwitterSink::new(reqwest::Client::new(), &mock_server.uri(), credentials());
        sink.deliver("t1 - l1").await.unwrap();
    }

    #[tokio::test]
    async fn test_deliver_api_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&mock_server)
            .await;

        let sink = TwitterSink::new(reqwest::Client::new(), &mock_server.uri(), credentials());
        match sink.deliver("hello").await {
            Err(PublishError::Api { status: 401, body }) => assert_eq!(body, "Unauthorized"),
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        let sink = TwitterSink::new(
            reqwest::Client::new(),
            "https://api.example.com/",
            credentials(),
        );
        assert_eq!(sink.endpoint(), "https://api.example.com/2/tweets");
    }
}
