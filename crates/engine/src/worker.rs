//! Single-recipient dispatch.

use std::sync::Arc;

use blastline_common::ports::MessageProvider;
use blastline_common::types::{DispatchOutcome, FailureClass, NormalizedRecipient, OutboundMessage};

/// Placeholder replaced with the recipient's display name.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Personalize a template for one recipient. An absent template yields an
/// empty body (media-only message).
pub fn personalize(template: Option<&str>, display_name: &str) -> String {
    template
        .map(|t| t.replace(NAME_PLACEHOLDER, display_name))
        .unwrap_or_default()
}

/// Sends one personalized message per recipient through the injected provider.
///
/// Cloning is cheap enough to hand one copy to every dispatch task.
#[derive(Clone)]
pub struct DispatchWorker {
    provider: Arc<dyn MessageProvider>,
    sender: String,
    template: Option<String>,
    media_url: Option<String>,
}

impl DispatchWorker {
    pub fn new(
        provider: Arc<dyn MessageProvider>,
        sender: impl Into<String>,
        template: Option<String>,
        media_url: Option<String>,
    ) -> Self {
        Self {
            provider,
            sender: sender.into(),
            template,
            media_url,
        }
    }

    /// Build the provider message for a recipient.
    pub fn compose(&self, recipient: &NormalizedRecipient) -> OutboundMessage {
        OutboundMessage {
            from: self.sender.clone(),
            to: recipient.canonical_phone.clone(),
            body: personalize(self.template.as_deref(), &recipient.display_name),
            media_url: self.media_url.clone(),
        }
    }

    /// Send to one recipient. Provider failures become a `Failed` outcome and
    /// are never retried.
    pub async fn send(&self, recipient: &NormalizedRecipient) -> DispatchOutcome {
        let message = self.compose(recipient);

        match self.provider.send(&message).await {
            Ok(receipt) => {
                tracing::info!(
                    name = %recipient.display_name,
                    to = %recipient.canonical_phone,
                    message_id = %receipt.id,
                    provider_status = %receipt.status,
                    "Message sent"
                );
                DispatchOutcome::sent(recipient, receipt)
            }
            Err(err) => {
                match err.class {
                    FailureClass::Recipient => tracing::warn!(
                        name = %recipient.display_name,
                        to = %recipient.canonical_phone,
                        code = ?err.code,
                        error = %err,
                        "Message failed"
                    ),
                    FailureClass::Critical | FailureClass::Transport => tracing::error!(
                        name = %recipient.display_name,
                        to = %recipient.canonical_phone,
                        code = ?err.code,
                        class = %err.class,
                        error = %err,
                        "Message failed with a provider-wide error; later sends are likely to fail too"
                    ),
                }
                DispatchOutcome::failed(recipient, &err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use blastline_common::error::ProviderError;
    use blastline_common::types::{AccountInfo, DeliveryStatus, ProviderReceipt};

    use super::*;

    /// Records every message and fails the ones addressed to `failing_to`.
    #[derive(Default)]
    struct RecordingProvider {
        sent: Mutex<Vec<OutboundMessage>>,
        failing_to: Option<(String, ProviderError)>,
    }

    #[async_trait]
    impl MessageProvider for RecordingProvider {
        async fn send(&self, message: &OutboundMessage) -> Result<ProviderReceipt, ProviderError> {
            self.sent.lock().unwrap().push(message.clone());
            if let Some((to, err)) = &self.failing_to
                && *to == message.to
            {
                return Err(err.clone());
            }
            Ok(ProviderReceipt {
                id: "SM42".to_string(),
                status: "queued".to_string(),
            })
        }

        async fn verify_credentials(&self) -> Result<AccountInfo, ProviderError> {
            unreachable!("not used by the worker")
        }
    }

    fn dana() -> NormalizedRecipient {
        NormalizedRecipient {
            display_name: "Dana".to_string(),
            raw_phone_text: "404-555-0100".to_string(),
            canonical_phone: "+14045550100".to_string(),
            dedup_key: "14045550100".to_string(),
        }
    }

    #[test]
    fn test_personalize_replaces_every_placeholder() {
        assert_eq!(personalize(Some("Hi {name}!"), "Dana"), "Hi Dana!");
        assert_eq!(
            personalize(Some("{name}, {name}, {name}"), "Eli"),
            "Eli, Eli, Eli"
        );
        assert_eq!(personalize(Some("No placeholder"), "Dana"), "No placeholder");
        assert_eq!(personalize(None, "Dana"), "");
    }

    #[test]
    fn test_personalize_is_literal() {
        // Braces in names are inserted as-is and never re-expanded
        assert_eq!(personalize(Some("Hi {name}"), "{name}"), "Hi {name}");
        assert_eq!(personalize(Some("Hi {NAME}"), "Dana"), "Hi {NAME}");
    }

    #[tokio::test]
    async fn test_send_success() {
        let provider = Arc::new(RecordingProvider::default());
        let worker = DispatchWorker::new(
            provider.clone(),
            "+15005550006",
            Some("Hi {name}!".to_string()),
            Some("https://cdn.example.com/flyer.png".to_string()),
        );

        let outcome = worker.send(&dana()).await;

        assert_eq!(outcome.status, DeliveryStatus::Sent);
        assert_eq!(outcome.provider_message_id.as_deref(), Some("SM42"));
        assert_eq!(outcome.provider_status.as_deref(), Some("queued"));

        let sent = provider.sent.lock().unwrap();
        assert_eq!(
            sent[0],
            OutboundMessage {
                from: "+15005550006".to_string(),
                to: "+14045550100".to_string(),
                body: "Hi Dana!".to_string(),
                media_url: Some("https://cdn.example.com/flyer.png".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_media_only_send_has_empty_body() {
        let provider = Arc::new(RecordingProvider::default());
        let worker = DispatchWorker::new(
            provider.clone(),
            "+15005550006",
            None,
            Some("https://cdn.example.com/flyer.png".to_string()),
        );

        let outcome = worker.send(&dana()).await;

        assert!(outcome.is_sent());
        assert_eq!(provider.sent.lock().unwrap()[0].body, "");
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_failed_outcome() {
        let provider = Arc::new(RecordingProvider {
            failing_to: Some((
                "+14045550100".to_string(),
                ProviderError {
                    code: Some(21608),
                    message: "The number is unverified".to_string(),
                    http_status: Some(400),
                    class: FailureClass::Critical,
                },
            )),
            ..Default::default()
        });
        let worker = DispatchWorker::new(provider, "+15005550006", Some("Hi".to_string()), None);

        let outcome = worker.send(&dana()).await;

        assert_eq!(outcome.status, DeliveryStatus::Failed);
        assert_eq!(outcome.error_code, Some(21608));
        assert_eq!(outcome.error_message.as_deref(), Some("The number is unverified"));
        assert!(outcome.is_critical());
        assert_eq!(outcome.provider_message_id, None);
    }
}
