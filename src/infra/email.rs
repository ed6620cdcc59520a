//! HTTP e-mail sender: posts the message as JSON to a delivery endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::application::email::{EmailError, EmailMessage, EmailOutcome, EmailSender};
use crate::application::retry::RetryPolicy;

use super::error::InfraError;

const TARGET: &str = "clientbooks::infra::email";

/// Body returned by the delivery endpoint. Anything unparsable on a 2xx counts as sent.
#[derive(Debug, Deserialize)]
struct DeliveryResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

fn default_success() -> bool {
    true
}

#[derive(Clone, Debug)]
pub struct HttpEmailSender {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl HttpEmailSender {
    pub fn new(
        endpoint: Url,
        api_key: Option<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(concat!("clientbooks/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|err| InfraError::HttpClient(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            retry,
        })
    }

    async fn post_once(&self, message: &EmailMessage) -> Result<EmailOutcome, EmailError> {
        let mut request = self.client.post(self.endpoint.clone()).json(message);
        if let Some(key) = self.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| EmailError::Transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| EmailError::Transport(err.to_string()))?;

        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(EmailError::Transport(format!(
                "status {status} body {}",
                String::from_utf8_lossy(&body)
            )));
        }
        if !status.is_success() {
            return Err(EmailError::Rejected(format!(
                "status {status} body {}",
                String::from_utf8_lossy(&body)
            )));
        }

        match serde_json::from_slice::<DeliveryResponse>(&body) {
            Ok(DeliveryResponse { success: true, .. }) => Ok(EmailOutcome::sent()),
            Ok(DeliveryResponse { error, .. }) => Ok(EmailOutcome::failed(
                error.unwrap_or_else(|| "delivery refused".to_string()),
            )),
            Err(err) => {
                debug!(target: TARGET, error = %err, "unparsable delivery response, assuming sent");
                Ok(EmailOutcome::sent())
            }
        }
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<EmailOutcome, EmailError> {
        self.retry
            .run(
                "email.send",
                || self.post_once(message),
                |err: &EmailError| matches!(err, EmailError::Transport(_)),
            )
            .await
            .inspect_err(|err| {
                warn!(
                    target: TARGET,
                    recipients = message.to.len(),
                    error = %err,
                    "e-mail delivery failed"
                );
            })
    }
}

/// Used when no delivery endpoint is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledEmailSender;

#[async_trait]
impl EmailSender for DisabledEmailSender {
    async fn send(&self, _message: &EmailMessage) -> Result<EmailOutcome, EmailError> {
        Err(EmailError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{Json, Router, extract::State, http::StatusCode as AxumStatus, routing::post};
    use serde_json::{Value, json};

    use super::*;

    async fn spawn(
        responses: Vec<(u16, Value)>,
    ) -> (Url, Arc<AtomicUsize>, tokio::task::JoinHandle<()>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let state = (Arc::new(responses), calls.clone());
        let app = Router::new()
            .route(
                "/send",
                post(
                    |State((responses, calls)): State<(Arc<Vec<(u16, Value)>>, Arc<AtomicUsize>)>,
                     Json(_body): Json<Value>| async move {
                        let index = calls.fetch_add(1, Ordering::SeqCst);
                        let (status, body) =
                            responses[index.min(responses.len() - 1)].clone();
                        (AxumStatus::from_u16(status).unwrap(), Json(body))
                    },
                ),
            )
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let url = Url::parse(&format!("http://{addr}/send")).unwrap();
        (url, calls, handle)
    }

    fn sender(endpoint: Url) -> HttpEmailSender {
        HttpEmailSender::new(
            endpoint,
            Some("secret".into()),
            Duration::from_secs(5),
            RetryPolicy {
                max_retries: 2,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
            },
        )
        .unwrap()
    }

    fn message() -> EmailMessage {
        EmailMessage {
            to: vec!["financeiro@acme.com".into()],
            cc: Vec::new(),
            subject: "Faturamento".into(),
            html: "<p>ok</p>".into(),
            attachments: Vec::new(),
        }
    }

    #[tokio::test]
    async fn server_errors_are_retried() {
        let (url, calls, handle) = spawn(vec![
            (503, json!({"error": "busy"})),
            (200, json!({"success": true})),
        ])
        .await;

        let outcome = sender(url).send(&message()).await.unwrap();
        assert!(outcome.success);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        handle.abort();
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let (url, calls, handle) = spawn(vec![(400, json!({"error": "bad address"}))]).await;

        let err = sender(url).send(&message()).await.unwrap_err();
        assert!(matches!(err, EmailError::Rejected(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        handle.abort();
    }

    #[tokio::test]
    async fn provider_refusal_is_an_outcome() {
        let (url, _calls, handle) =
            spawn(vec![(200, json!({"success": false, "error": "quota"}))]).await;

        let outcome = sender(url).send(&message()).await.unwrap();
        assert_eq!(outcome, EmailOutcome::failed("quota"));
        handle.abort();
    }

    #[tokio::test]
    async fn disabled_sender_reports_not_configured() {
        let err = DisabledEmailSender.send(&message()).await.unwrap_err();
        assert_eq!(err, EmailError::NotConfigured);
    }
}
