//! Submission wiring: origin and page-key gates, `mailto:` draft URLs, and
//! dispatch through the mail transport seam.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use metrics::histogram;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::config::{MailSettings, RelaySettings, Settings};
use crate::domain::submission::EmailDraft;

/// A fully assembled outbound message. `to` left empty defers to the delivery
/// endpoint's configured destination.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub from: String,
    pub to: Option<String>,
    pub subject: String,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail delivery endpoint is not configured")]
    NotConfigured,
    #[error("mail delivery request failed: {0}")]
    Delivery(String),
    #[error("mail delivery endpoint returned status {status}: {detail}")]
    Status { status: u16, detail: String },
}

/// Outbound email seam; the production adapter lives in `infra`.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

pub struct SubmissionService {
    transport: Arc<dyn MailTransport>,
    mail: MailSettings,
    relay: RelaySettings,
    public_origin: String,
    contact_email: Option<String>,
}

impl SubmissionService {
    pub fn new(transport: Arc<dyn MailTransport>, settings: &Settings) -> Self {
        Self {
            transport,
            mail: settings.mail.clone(),
            relay: settings.relay.clone(),
            public_origin: settings.site.public_origin(),
            contact_email: settings.site.contact_email.clone(),
        }
    }

    /// A missing `Origin` header passes; a present one must match the
    /// configured public origin.
    pub fn origin_allowed(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(origin) => origin == self.public_origin,
        }
    }

    pub fn page_allowed(&self, page_key: &str) -> bool {
        self.relay.allows(page_key)
    }

    /// Hand the draft to the mail transport with the configured envelope.
    pub async fn dispatch(&self, draft: EmailDraft) -> Result<(), MailError> {
        let message = EmailMessage {
            from: self.mail.from.clone(),
            to: self.mail.to.clone(),
            subject: draft.subject,
            text: draft.body,
        };

        let started = Instant::now();
        let result = self.transport.send(&message).await;
        histogram!("vetrina_mail_send_ms").record(started.elapsed().as_millis() as f64);

        match &result {
            Ok(()) => info!(
                target = "vetrina::mail",
                subject = %message.subject,
                "message dispatched"
            ),
            Err(err) => warn!(
                target = "vetrina::mail",
                subject = %message.subject,
                error = %err,
                "message dispatch failed"
            ),
        }

        result
    }

    /// Compose a `mailto:` draft URL for the configured contact address.
    ///
    /// Returns `None` when no contact address is configured.
    pub fn mailto_url(&self, draft: &EmailDraft) -> Option<String> {
        let address = self.contact_email.as_deref()?;
        let mut url = Url::parse(&format!("mailto:{address}")).ok()?;
        url.query_pairs_mut()
            .append_pair("subject", &draft.subject)
            .append_pair("body", &draft.body);

        // Form-urlencoding turns spaces into `+`, which mail clients do not
        // decode inside mailto bodies. Literal `+` is already `%2B` here, so
        // rewriting the query is safe.
        let serialized = url.to_string();
        match serialized.find('?') {
            Some(index) => Some(format!(
                "{}{}",
                &serialized[..index],
                serialized[index..].replace('+', "%20")
            )),
            None => Some(serialized),
        }
    }
}
