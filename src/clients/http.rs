use std::time::Duration;
use rquest::{Client, RequestBuilder};
use rquest_util::Emulation;
use http::header::{ACCEPT, AUTHORIZATION};
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use crate::config::NaverConfig;
use crate::error::{Error, Result};
use tracing::{debug, error, warn};

/// Error code the API gateway puts in the body when it throttles a caller.
const RATE_LIMIT_CODE: &str = "GW.RATE_LIMIT";

pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(settings: &NaverConfig, emulation: Emulation) -> Result<Self> {
        debug!(
            emulation = ?emulation,
            timeout_secs = settings.timeout_secs,
            "Creating client with emulation"
        );

        let client = Client::builder()
            .emulation(emulation)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self { client })
    }

    /// Form-encoded POST, JSON response.
    pub async fn post_form<T: Serialize + ?Sized>(&self, url: &str, form: &T) -> Result<Value> {
        let request = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .form(form);

        self.send(url, request).await
    }

    /// Bearer-authenticated GET with query parameters, JSON response.
    pub async fn get_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        bearer_token: &str,
        query: &T,
    ) -> Result<Value> {
        let request = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {bearer_token}"))
            .query(query);

        self.send(url, request).await
    }

    async fn send(&self, url: &str, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!(
            status = status.as_u16(),
            url = url,
            body_len = body.len(),
            "Response received"
        );

        classify_response(status, &body)?;

        match serde_json::from_slice::<Value>(&body) {
            Ok(json) => Ok(json),
            Err(e) => {
                warn!(
                    error = %e,
                    url = url,
                    "Response body is not JSON, treating as empty"
                );
                Ok(Value::Null)
            }
        }
    }
}

/// Maps a raw response onto the error taxonomy: throttling is retriable, any other
/// status of 400 or above is a fetch failure carrying the body text. Successful
/// bodies are never inspected; they carry free text such as option strings.
pub fn classify_response(status: StatusCode, body: &[u8]) -> Result<()> {
    if !status.is_client_error() && !status.is_server_error() {
        return Ok(());
    }

    let text = String::from_utf8_lossy(body);

    if status == StatusCode::TOO_MANY_REQUESTS || text.contains(RATE_LIMIT_CODE) {
        debug!(status = status.as_u16(), "Rate limit exceeded");
        return Err(Error::RateLimit { status: status.as_u16() });
    }

    error!(
        status = status.as_u16(),
        body = %text,
        "Request failed"
    );
    Err(Error::Fetch {
        status: status.as_u16(),
        message: text.into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_many_requests_is_rate_limit() {
        let err = classify_response(StatusCode::TOO_MANY_REQUESTS, b"").unwrap_err();
        assert!(err.is_rate_limit());
    }

    #[test]
    fn gateway_code_in_body_is_rate_limit() {
        let body = br#"{"code":"GW.RATE_LIMIT","message":"slow down"}"#;
        let err = classify_response(StatusCode::FORBIDDEN, body).unwrap_err();
        assert!(matches!(err, Error::RateLimit { status: 403 }));
    }

    #[test]
    fn server_error_is_fetch_error_with_body() {
        let err = classify_response(StatusCode::INTERNAL_SERVER_ERROR, b"oops").unwrap_err();
        match err {
            Error::Fetch { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "oops");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn success_passes() {
        assert!(classify_response(StatusCode::OK, b"{}").is_ok());
    }

    #[test]
    fn gateway_code_inside_successful_body_is_not_rate_limit() {
        let body = br#"{"data":{"contents":[{"productOrder":{"productOption":"memo: GW.RATE_LIMIT"}}]}}"#;
        assert!(classify_response(StatusCode::OK, body).is_ok());
    }
}
