//! E-mail notification after a report.
//!
//! Delivery is best effort: a failed notification is logged and never fails
//! the report that triggered it.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::explain::summary_lines;
use crate::report::Report;

pub const ENDPOINT_VAR: &str = "STOC_MAIL_ENDPOINT";
pub const TOKEN_VAR: &str = "STOC_MAIL_TOKEN";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("missing credentials: set {var}")]
    MissingCredentials { var: &'static str },

    #[error("mail relay unreachable: {0}")]
    Http(String),

    #[error("mail relay rejected the message (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// Subject and body summarising a finished report.
    pub fn for_report(report: &Report, to: impl Into<String>) -> Self {
        let mut body = format!(
            "{} on {} from {} to {}\n\nOverall Score: {:.4}\n",
            report.ticker,
            report.request.exchange.name,
            report.request.start,
            report.request.end,
            report.score.overall
        );
        for line in summary_lines(&report.score) {
            body.push_str(&line);
            body.push('\n');
        }
        if report.is_synthetic() {
            body.push_str("\nNote: computed from synthetic data.\n");
        }
        Self {
            to: to.into(),
            subject: format!("STOC report: {}", report.ticker),
            body,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;
    fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Posts `{from, to, subject, text}` as JSON to an HTTP mail relay.
pub struct EmailRelayNotifier {
    endpoint: String,
    token: String,
    from: String,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl EmailRelayNotifier {
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        from: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| NotifyError::Http(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into(),
            token: token.into(),
            from: from.into(),
            client,
        })
    }

    /// Relay endpoint and token from `STOC_MAIL_ENDPOINT` / `STOC_MAIL_TOKEN`.
    pub fn from_env(from: impl Into<String>) -> Result<Self, NotifyError> {
        let var = |name: &'static str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or(NotifyError::MissingCredentials { var: name })
        };
        Self::new(var(ENDPOINT_VAR)?, var(TOKEN_VAR)?, from)
    }
}

impl Notifier for EmailRelayNotifier {
    fn name(&self) -> &str {
        "email_relay"
    }

    fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let payload = RelayPayload {
            from: &self.from,
            to: &notification.to,
            subject: &notification.subject,
            text: &notification.body,
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .map_err(|e| NotifyError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        info!(to = %notification.to, subject = %notification.subject, "notification sent");
        Ok(())
    }
}

/// Writes the notification to the log instead of sending it.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            to = %notification.to,
            subject = %notification.subject,
            body = %notification.body,
            "notification (not sent)"
        );
        Ok(())
    }
}

/// Send and swallow the error. Returns whether delivery succeeded.
pub fn notify_best_effort(notifier: &dyn Notifier, notification: &Notification) -> bool {
    match notifier.send(notification) {
        Ok(()) => true,
        Err(e) => {
            warn!(notifier = notifier.name(), to = %notification.to, error = %e, "notification failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{build_report, ReportContext, ReportRequest};
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use stoc_core::domain::Exchange;

    struct Failing;

    impl Notifier for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn send(&self, _: &Notification) -> Result<(), NotifyError> {
            Err(NotifyError::Rejected {
                status: 500,
                body: "boom".into(),
            })
        }
    }

    #[derive(Default)]
    struct Recording(Mutex<Vec<Notification>>);

    impl Notifier for Recording {
        fn name(&self) -> &str {
            "recording"
        }
        fn send(&self, n: &Notification) -> Result<(), NotifyError> {
            self.0.lock().unwrap().push(n.clone());
            Ok(())
        }
    }

    fn note() -> Notification {
        Notification {
            to: "me@example.com".into(),
            subject: "s".into(),
            body: "b".into(),
        }
    }

    #[test]
    fn failure_is_swallowed() {
        assert!(!notify_best_effort(&Failing, &note()));
    }

    #[test]
    fn log_notifier_always_succeeds() {
        assert!(notify_best_effort(&LogNotifier, &note()));
    }

    #[test]
    fn recording_notifier_receives_message() {
        let rec = Recording::default();
        assert!(notify_best_effort(&rec, &note()));
        assert_eq!(rec.0.lock().unwrap().as_slice(), &[note()]);
    }

    #[test]
    fn report_notification_summarises_scores() {
        let ctx = ReportContext {
            offline: true,
            synthetic: true,
            ..ReportContext::new(None, None)
        };
        let d = |m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap();
        let request = ReportRequest::new("MSFT", Exchange::find("NASDAQ").unwrap(), d(1), d(4));
        let report = build_report(&ctx, &request).unwrap();

        let n = Notification::for_report(&report, "me@example.com");
        assert_eq!(n.subject, "STOC report: MSFT");
        assert!(n.body.contains("Overall Score:"));
        assert!(n.body.contains("Assessment Score:"));
        assert!(n.body.contains("synthetic"));
    }

    #[test]
    fn missing_credentials_error_names_the_variable() {
        let err = NotifyError::MissingCredentials { var: ENDPOINT_VAR };
        assert_eq!(err.to_string(), "missing credentials: set STOC_MAIL_ENDPOINT");
    }
}
