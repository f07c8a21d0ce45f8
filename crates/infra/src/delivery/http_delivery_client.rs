use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use domain::{
    repositories::delivery_client::DeliveryClient,
    value_objects::delivery::{DeliveryRequest, DeliveryResponse},
};

#[derive(Debug, Serialize)]
struct SendMessageBody<'a> {
    id: u64,
    phone: i64,
    text: &'a str,
}

/// Delivery client for the external messaging API.
///
/// Each message is posted to `{base_url}/{attempt_id}` with a bearer token.
pub struct HttpDeliveryClient {
    http: reqwest::Client,
    base_url: Url,
    api_token: String,
}

impl HttpDeliveryClient {
    pub fn new(base_url: Url, api_token: String) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            base_url,
            api_token,
        })
    }

    fn endpoint(&self, attempt_id: u64) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{attempt_id}"))?)
    }
}

#[async_trait]
impl DeliveryClient for HttpDeliveryClient {
    async fn send(&self, request: DeliveryRequest) -> Result<DeliveryResponse> {
        let endpoint = self.endpoint(request.attempt_id)?;
        let body = SendMessageBody {
            id: request.attempt_id,
            phone: request.phone,
            text: &request.text,
        };

        let resp = self
            .http
            .post(endpoint)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_token))
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await
            .map_err(sanitize_transport_error)?;

        let status_code = resp.status().as_u16();
        let body = resp.text().await.map_err(|err| {
            warn!(
                attempt_id = request.attempt_id,
                status_code, "http_delivery_client: response body could not be read"
            );
            sanitize_transport_error(err)
        })?;

        debug!(
            attempt_id = request.attempt_id,
            status_code, "http_delivery_client: delivery api answered"
        );

        Ok(DeliveryResponse { status_code, body })
    }
}

// reqwest errors carry the full request URL; keep it out of logs and the ledger path.
fn sanitize_transport_error(err: reqwest::Error) -> anyhow::Error {
    if err.is_timeout() {
        anyhow!("delivery request timed out")
    } else if err.is_connect() {
        anyhow!("could not connect to the delivery api")
    } else {
        anyhow!("delivery request failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client(base_url: &str) -> HttpDeliveryClient {
        HttpDeliveryClient::new(Url::parse(base_url).unwrap(), "token".to_string()).unwrap()
    }

    #[test]
    fn endpoint_appends_the_attempt_id() {
        let client = client("https://sms-gateway.example.com/v1/send");

        assert_eq!(
            client.endpoint(7).unwrap().as_str(),
            "https://sms-gateway.example.com/v1/send/7"
        );
    }

    #[test]
    fn endpoint_tolerates_a_trailing_slash() {
        let client = client("https://sms-gateway.example.com/v1/send/");

        assert_eq!(
            client.endpoint(0).unwrap().as_str(),
            "https://sms-gateway.example.com/v1/send/0"
        );
    }

    #[test]
    fn body_uses_the_wire_field_names() {
        let body = SendMessageBody {
            id: 3,
            phone: 79270000001,
            text: "Hello, World!",
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"id": 3, "phone": 79270000001_i64, "text": "Hello, World!"})
        );
    }

    #[tokio::test]
    async fn unreachable_api_is_reported_without_the_url() {
        // Port 9 (discard) on loopback is closed on test hosts.
        let client = client("http://127.0.0.1:9/v1/send");
        let err = client
            .send(DeliveryRequest {
                attempt_id: 0,
                phone: 79270000000,
                text: "Hello".to_string(),
                timeout: Duration::from_secs(2),
            })
            .await
            .unwrap_err();

        assert!(!err.to_string().contains("127.0.0.1"));
    }

    #[tokio::test]
    async fn truncated_response_body_is_a_failure() {
        use tokio::{
            io::{AsyncReadExt, AsyncWriteExt},
            net::TcpListener,
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nshort")
                .await
                .unwrap();
        });

        let client = client(&format!("http://{addr}/v1/send"));
        let err = client
            .send(DeliveryRequest {
                attempt_id: 0,
                phone: 79270000000,
                text: "Hello".to_string(),
                timeout: Duration::from_secs(2),
            })
            .await
            .unwrap_err();

        assert!(!err.to_string().contains("127.0.0.1"));
    }

    #[tokio::test]
    #[ignore = "calls the external mailing api"]
    async fn sends_through_the_real_api() {
        dotenvy::dotenv().ok();
        let base_url = std::env::var("MAILING_API_URL").expect("MAILING_API_URL must be set");
        let token = std::env::var("MAILING_API_TOKEN").expect("MAILING_API_TOKEN must be set");
        let client = HttpDeliveryClient::new(Url::parse(&base_url).unwrap(), token).unwrap();

        let response = client
            .send(DeliveryRequest {
                attempt_id: 1,
                phone: 79270000000,
                text: "Hello, World!".to_string(),
                timeout: Duration::from_secs(20),
            })
            .await
            .unwrap();

        assert!(response.is_success(), "status {}", response.status_code);
    }
}
