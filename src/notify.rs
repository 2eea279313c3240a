// src/notify.rs
//! Flagged-content scan plus best-effort SMTP alert dispatch. Alerts never
//! retry and never propagate errors into the ingestion loop.

use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::AsyncSmtpTransport;
use lettre::{AsyncTransport, Tokio1Executor};
use tracing::{info, warn};

use crate::config::AppConfig;

/// Fixed keyword set; first substring hit wins. Intentionally crude.
pub const FLAGGED_KEYWORDS: [&str; 6] = ["hate", "abuse", "kill", "rape", "attack", "terror"];

pub fn contains_flagged_content(text: &str) -> bool {
    let lower = text.to_lowercase();
    FLAGGED_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

pub struct EmailAlerter {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailAlerter {
    /// `None` unless the config carries SMTP host, user, password and a
    /// recipient, all well-formed; the collector then runs with alerts
    /// disabled.
    pub fn from_config(cfg: &AppConfig) -> Option<Self> {
        let host = cfg.smtp_host.as_deref()?;
        let user = cfg.smtp_user.clone()?;
        let pass = cfg.smtp_pass.clone()?;
        let to_addr = cfg.alert_email.as_deref()?;

        let creds = Credentials::new(user.clone(), pass);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .ok()?
            .port(cfg.smtp_port)
            .credentials(creds)
            .build();

        let from = user.parse().ok()?;
        let to = to_addr.parse().ok()?;
        Some(Self { mailer, from, to })
    }

    /// Best-effort send; `false` on any failure, logged, never raised.
    pub async fn send_alert(&self, subject: &str, body: &str) -> bool {
        let msg = match Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body.to_string())
        {
            Ok(m) => m,
            Err(e) => {
                warn!(error = ?e, "failed to build alert email");
                return false;
            }
        };

        match self.mailer.send(msg).await {
            Ok(_) => {
                info!(subject, "alert email sent");
                true
            }
            Err(e) => {
                warn!(error = ?e, "failed to send alert email");
                false
            }
        }
    }
}
