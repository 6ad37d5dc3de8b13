use reqwest::header::{self, HeaderValue, InvalidHeaderValue};
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::{ApiError, ClientError};

/// Only A records are managed.
pub(crate) const RECORD_TYPE: &str = "A";

pub(crate) struct GoDaddyAPI<'t> {
    pub(crate) base_url: &'t str,
    pub(crate) domain: &'t str,
    pub(crate) host: &'t str,
    pub(crate) record_type: &'t str,
}

impl<'t> GoDaddyAPI<'t> {
    pub(crate) fn url(&self) -> String {
        format!(
            "{}/v1/domains/{}/records/{}/{}",
            self.base_url, self.domain, self.record_type, self.host
        )
    }
}

/// One entry of the record set sent with PUT.
#[derive(Serialize, Debug)]
pub struct RecordPayload<'t> {
    pub data: &'t str,
    pub ttl: u32,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

pub(crate) fn authorization_value(key: &str, secret: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut value = HeaderValue::from_str(&format!("sso-key {}:{}", key, secret))?;
    value.set_sensitive(true);
    Ok(value)
}

pub(crate) fn api_client(key: &str, secret: &str, timeout: Duration) -> Result<Client, ClientError> {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::AUTHORIZATION, authorization_value(key, secret)?);
    let accept_value = HeaderValue::from_static("application/json");
    headers.insert(header::ACCEPT, accept_value);
    ClientBuilder::new()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(ClientError::RegistrarUnreachable)
}

fn api_error(status: StatusCode, body: String) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(),
        StatusCode::FORBIDDEN => ApiError::Forbidden {
            message: serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .map(|err| err.message)
                .filter(|message| !message.is_empty())
                .unwrap_or(body),
        },
        StatusCode::NOT_FOUND => ApiError::NotFound(),
        _ => ApiError::Unknown(status, body),
    }
}

/// Replaces the record set with a single entry pointing at `ip`.
///
/// Exactly one request is sent. Anything other than a 2xx answer is an error.
pub(crate) async fn update_dns(
    client: &Client,
    api: &GoDaddyAPI<'_>,
    ip: &str,
    ttl: u32,
) -> Result<(), ClientError> {
    let url = api.url();
    debug!(%url, "Sending record update");
    let payload = [RecordPayload { data: ip, ttl }];
    let response = client
        .put(url)
        .json(&payload)
        .send()
        .await
        .map_err(ClientError::RegistrarUnreachable)?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(ClientError::RegistrarBadResponse)?;
    debug!(
        domain = api.domain,
        host = api.host,
        %status,
        body = body.trim(),
        "Registrar responded"
    );

    if status.is_success() {
        Ok(())
    } else {
        Err(api_error(status, body).into())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::MockServer;
    use regex::Regex;
    use serde_json::json;

    use super::{api_client, authorization_value, update_dns, GoDaddyAPI, RECORD_TYPE};
    use crate::{ApiError, ClientError};

    fn api(base_url: &str) -> GoDaddyAPI<'_> {
        GoDaddyAPI {
            base_url,
            domain: "example.com",
            host: "home",
            record_type: RECORD_TYPE,
        }
    }

    #[test]
    fn url() {
        assert_eq!(
            api("https://api.godaddy.com").url(),
            "https://api.godaddy.com/v1/domains/example.com/records/A/home"
        );
    }

    #[test]
    fn authorization_format() {
        let shape = Regex::new(r"^sso-key [^:]*:[^:]*$").unwrap();
        for (key, secret) in [("gk", "gs"), ("", ""), ("key", ""), ("", "secret")] {
            let value = authorization_value(key, secret).expect("Failed to build header");
            assert!(value.is_sensitive());
            let text = value.to_str().unwrap();
            assert!(shape.is_match(text), "bad header: {}", text);
            assert_eq!(text, format!("sso-key {}:{}", key, secret));
        }
    }

    #[test]
    fn unprintable_credentials() {
        let err = api_client("line\nbreak", "s", Duration::from_secs(1))
            .expect_err("Client should not build");
        assert!(matches!(err, ClientError::InvalidHeader(_)));
        assert!(err.to_string().starts_with("Could not connect to the registrar"));
    }

    #[tokio::test]
    async fn sends_put_with_headers() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("PUT")
                    .path("/v1/domains/example.com/records/A/home")
                    .header("Accept", "application/json")
                    .header("Authorization", "sso-key gk:gs")
                    .json_body(json!([{ "data": "5.6.7.8", "ttl": 600 }]));
                then.status(200);
            })
            .await;

        let client = api_client("gk", "gs", Duration::from_secs(5)).expect("Failed to build client");
        let base_url = server.base_url();
        update_dns(&client, &api(&base_url), "5.6.7.8", 600)
            .await
            .expect("Update failed");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_credentials_still_send_headers() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("PUT")
                    .header("Accept", "application/json")
                    .header("Authorization", "sso-key :");
                then.status(200);
            })
            .await;

        let client = api_client("", "", Duration::from_secs(5)).expect("Failed to build client");
        let base_url = server.base_url();
        update_dns(&client, &api(&base_url), "5.6.7.8", 600)
            .await
            .expect("Update failed");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("PUT");
                then.status(401)
                    .body(r#"{"code":"UNABLE_TO_AUTHENTICATE","message":"Unable to authenticate"}"#);
            })
            .await;

        let client = api_client("gk", "gs", Duration::from_secs(5)).expect("Failed to build client");
        let base_url = server.base_url();
        let err = update_dns(&client, &api(&base_url), "5.6.7.8", 600)
            .await
            .expect_err("Update should have failed");

        assert!(matches!(err, ClientError::Api(ApiError::Unauthorized())));
    }

    #[tokio::test]
    async fn forbidden_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("PUT");
                then.status(403)
                    .body(r#"{"code":"ACCESS_DENIED","message":"Authenticated user is not allowed access"}"#);
            })
            .await;

        let client = api_client("gk", "gs", Duration::from_secs(5)).expect("Failed to build client");
        let base_url = server.base_url();
        let err = update_dns(&client, &api(&base_url), "5.6.7.8", 600)
            .await
            .expect_err("Update should have failed");

        match err {
            ClientError::Api(ApiError::Forbidden { message }) => {
                assert_eq!(message, "Authenticated user is not allowed access")
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn server_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("PUT");
                then.status(500).body("boom");
            })
            .await;

        let client = api_client("gk", "gs", Duration::from_secs(5)).expect("Failed to build client");
        let base_url = server.base_url();
        let err = update_dns(&client, &api(&base_url), "5.6.7.8", 600)
            .await
            .expect_err("Update should have failed");

        match err {
            ClientError::Api(ApiError::Unknown(status, body)) => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn unreachable() {
        let client = api_client("gk", "gs", Duration::from_secs(5)).expect("Failed to build client");
        let err = update_dns(&client, &api("http://127.0.0.1:1"), "5.6.7.8", 600)
            .await
            .expect_err("Update should have failed");

        assert!(matches!(err, ClientError::RegistrarUnreachable(_)));
    }
}
