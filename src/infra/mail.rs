//! Mail transport adapter: a JSON POST to the configured delivery endpoint.
//!
//! The endpoint is whatever mail service the deployment fronts (an email API,
//! an edge function with a send binding). Its contract here is minimal: a
//! 2xx status means the message was accepted.

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::application::submission::{EmailMessage, MailError, MailTransport};
use crate::config::MailSettings;

use super::error::InfraError;

pub struct HttpMailTransport {
    client: reqwest::Client,
    endpoint: Option<Url>,
}

impl HttpMailTransport {
    pub fn new(mail: &MailSettings) -> Result<Self, InfraError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("vetrina/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| InfraError::http(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: mail.endpoint.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
struct DeliveryRequest<'a> {
    from: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<&'a str>,
    subject: &'a str,
    text: &'a str,
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let endpoint = self.endpoint.as_ref().ok_or(MailError::NotConfigured)?;

        let response = self
            .client
            .post(endpoint.clone())
            .json(&DeliveryRequest {
                from: &message.from,
                to: message.to.as_deref(),
                subject: &message.subject,
                text: &message.text,
            })
            .send()
            .await
            .map_err(|err| MailError::Delivery(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(MailError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(())
    }
}
