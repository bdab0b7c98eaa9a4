//! Inbound update handling, independent of the transport.
//!
//! The adapter parses and downloads; this module decides what to say and
//! sends it through a [`MessagingPort`].

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    classifier::classify,
    config::Config,
    domain::ChatId,
    extract::{self, DecodedPayload, ExtractionError, PayloadExtractor},
    formatting,
    messaging::{
        port::MessagingPort,
        types::{Command, IncomingUpdate, PhotoMessage, TextMessage},
    },
    utils::{find_link, mentions_link},
    Result,
};

/// Host capabilities decided once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub qr_available: bool,
}

impl Capabilities {
    /// QR scanning needs both the compiled-in decoder and the runtime switch.
    pub fn detect(cfg: &Config) -> Self {
        Self {
            qr_available: cfg.qr_scanning_enabled && extract::QR_SUPPORTED,
        }
    }
}

pub struct Handler {
    caps: Capabilities,
    extractor: Arc<dyn PayloadExtractor>,
    preview_chars: usize,
    started_at: DateTime<Utc>,
}

impl Handler {
    pub fn new(
        caps: Capabilities,
        extractor: Arc<dyn PayloadExtractor>,
        preview_chars: usize,
    ) -> Self {
        Self {
            caps,
            extractor,
            preview_chars,
            started_at: Utc::now(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            Capabilities::detect(cfg),
            extract::default_extractor(cfg.max_image_bytes),
            cfg.payload_preview_chars,
        )
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    pub async fn handle(
        &self,
        update: IncomingUpdate,
        messenger: &dyn MessagingPort,
    ) -> Result<()> {
        match update {
            IncomingUpdate::Command(cmd) => self.handle_command(cmd, messenger).await,
            IncomingUpdate::Text(msg) => self.handle_text(msg, messenger).await,
            IncomingUpdate::Photo(photo) => self.handle_photo(photo, messenger).await,
        }
    }

    /// Acknowledge a photo before the adapter downloads it.
    ///
    /// Returns `false` (after telling the user) when QR scanning is unavailable,
    /// in which case the photo must not be downloaded or scanned.
    pub async fn photo_received(
        &self,
        chat_id: ChatId,
        messenger: &dyn MessagingPort,
    ) -> Result<bool> {
        if !self.caps.qr_available {
            messenger
                .send_html(chat_id, formatting::qr_unavailable())
                .await?;
            return Ok(false);
        }
        messenger
            .send_html(chat_id, formatting::photo_received())
            .await?;
        Ok(true)
    }

    async fn handle_command(&self, cmd: Command, messenger: &dyn MessagingPort) -> Result<()> {
        tracing::info!(
            user_id = cmd.sender.user_id.0,
            username = ?cmd.sender.username,
            command = %cmd.name,
            "command"
        );

        let qr = self.caps.qr_available;
        let reply = match cmd.name.as_str() {
            "start" => formatting::welcome(&cmd.sender.first_name, qr),
            "help" => formatting::help(qr),
            "stats" => formatting::stats(&cmd.sender, qr, self.started_at),
            "check" => {
                let link = cmd.args.trim();
                if link.is_empty() {
                    formatting::check_usage().to_string()
                } else {
                    let result = classify(link);
                    tracing::info!(
                        user_id = cmd.sender.user_id.0,
                        verdict = ?result.verdict,
                        "explicit link check"
                    );
                    formatting::link_report(link, &result)
                }
            }
            other => formatting::unknown_command(other),
        };

        messenger.send_html(cmd.chat_id, &reply).await?;
        Ok(())
    }

    async fn handle_text(&self, msg: TextMessage, messenger: &dyn MessagingPort) -> Result<()> {
        if !mentions_link(&msg.text) {
            messenger
                .send_html(msg.chat_id, &formatting::greeting(self.caps.qr_available))
                .await?;
            return Ok(());
        }

        messenger
            .send_html(msg.chat_id, formatting::checking_link())
            .await?;

        let Some(link) = find_link(&msg.text) else {
            messenger
                .send_html(msg.chat_id, formatting::link_not_found())
                .await?;
            return Ok(());
        };

        let result = classify(link);
        tracing::info!(
            user_id = msg.sender.user_id.0,
            verdict = ?result.verdict,
            confidence = %result.confidence,
            "link check"
        );
        messenger
            .send_html(msg.chat_id, &formatting::link_report(link, &result))
            .await?;
        Ok(())
    }

    async fn handle_photo(
        &self,
        photo: PhotoMessage,
        messenger: &dyn MessagingPort,
    ) -> Result<()> {
        let chat_id = photo.chat_id;
        let user_id = photo.sender.user_id.0;

        if !self.caps.qr_available {
            messenger
                .send_html(chat_id, formatting::qr_unavailable())
                .await?;
            return Ok(());
        }

        tracing::info!(user_id, bytes = photo.image.len(), "scanning photo");

        let payloads = match self.run_extractor(photo.image).await {
            Ok(Ok(payloads)) => payloads,
            Ok(Err(e)) => {
                tracing::info!(user_id, error = %e, "no payload extracted");
                let reply = match e {
                    ExtractionError::NoPayloadFound => formatting::no_payload_found().to_string(),
                    ExtractionError::DecodeFailure(reason) => formatting::image_error(&reason),
                    ExtractionError::FeatureUnavailable => {
                        formatting::qr_unavailable().to_string()
                    }
                };
                messenger.send_html(chat_id, &reply).await?;
                return Ok(());
            }
            Err(join_err) => {
                tracing::error!(user_id, error = %join_err, "payload extraction crashed");
                messenger
                    .send_html(chat_id, formatting::unexpected_error())
                    .await?;
                return Ok(());
            }
        };

        for (i, payload) in payloads.iter().enumerate() {
            let reply = formatting::payload_report(i, payload, self.preview_chars);
            messenger.send_html(chat_id, &reply).await?;
        }

        tracing::info!(user_id, payloads = payloads.len(), "photo scan complete");
        Ok(())
    }

    /// Image decoding is CPU-bound; keep it off the async workers and contain panics.
    async fn run_extractor(
        &self,
        image: Vec<u8>,
    ) -> std::result::Result<
        std::result::Result<Vec<DecodedPayload>, ExtractionError>,
        tokio::task::JoinError,
    > {
        let extractor = self.extractor.clone();
        tokio::task::spawn_blocking(move || extractor.extract(&image)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        domain::{MessageId, MessageRef, Sender, UserId},
        extract::{SymbolKind, UnavailableExtractor},
    };

    #[derive(Default)]
    struct RecordingMessenger {
        sent: Mutex<Vec<(i64, String)>>,
    }

    impl RecordingMessenger {
        fn texts(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|(_, t)| t.clone())
                .collect()
        }
    }

    #[async_trait]
    impl MessagingPort for RecordingMessenger {
        async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
            let mut sent = self.sent.lock().unwrap();
            sent.push((chat_id.0, html.to_string()));
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(sent.len() as i32),
            })
        }
    }

    /// Returns canned payloads regardless of input.
    struct FixedExtractor(std::result::Result<Vec<DecodedPayload>, ExtractionError>);

    impl PayloadExtractor for FixedExtractor {
        fn extract(&self, _image: &[u8]) -> std::result::Result<Vec<DecodedPayload>, ExtractionError> {
            self.0.clone()
        }
    }

    struct PanickingExtractor;

    impl PayloadExtractor for PanickingExtractor {
        fn extract(&self, _image: &[u8]) -> std::result::Result<Vec<DecodedPayload>, ExtractionError> {
            panic!("decoder blew up");
        }
    }

    fn sender() -> Sender {
        Sender {
            user_id: UserId(7),
            first_name: "Noa".to_string(),
            username: Some("noa".to_string()),
        }
    }

    fn handler(qr_available: bool, extractor: Arc<dyn PayloadExtractor>) -> Handler {
        Handler::new(Capabilities { qr_available }, extractor, 100)
    }

    fn text(t: &str) -> IncomingUpdate {
        IncomingUpdate::Text(TextMessage {
            chat_id: ChatId(1),
            sender: sender(),
            text: t.to_string(),
        })
    }

    fn command(name: &str, args: &str) -> IncomingUpdate {
        IncomingUpdate::Command(Command {
            chat_id: ChatId(1),
            sender: sender(),
            name: name.to_string(),
            args: args.to_string(),
        })
    }

    fn photo() -> IncomingUpdate {
        IncomingUpdate::Photo(PhotoMessage {
            chat_id: ChatId(1),
            sender: sender(),
            image: vec![1, 2, 3],
        })
    }

    fn qr(text: &str) -> DecodedPayload {
        DecodedPayload {
            text: text.to_string(),
            kind: SymbolKind::QrCode,
        }
    }

    #[test]
    fn capabilities_follow_config_switch() {
        let mut cfg = Config::from_lookup(|k| (k == "TELEGRAM_BOT_TOKEN").then(|| "t".to_string()))
            .unwrap();
        assert_eq!(Capabilities::detect(&cfg).qr_available, extract::QR_SUPPORTED);
        cfg.qr_scanning_enabled = false;
        assert!(!Capabilities::detect(&cfg).qr_available);
    }

    #[tokio::test]
    async fn text_with_link_gets_verdict() {
        let m = RecordingMessenger::default();
        let h = handler(true, Arc::new(UnavailableExtractor));

        h.handle(text("please check https://github.com/x now"), &m)
            .await
            .unwrap();

        let sent = m.texts();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], formatting::checking_link());
        assert!(sent[1].contains("looks safe"));
        assert!(sent[1].contains("https://github.com/x"));
        assert!(!sent[1].contains("please"));
    }

    #[tokio::test]
    async fn text_without_link_gets_greeting() {
        let m = RecordingMessenger::default();
        handler(false, Arc::new(UnavailableExtractor))
            .handle(text("hello there"), &m)
            .await
            .unwrap();
        assert_eq!(m.texts(), vec![formatting::greeting(false)]);
    }

    #[tokio::test]
    async fn check_command_classifies_argument() {
        let m = RecordingMessenger::default();
        let h = handler(true, Arc::new(UnavailableExtractor));

        h.handle(command("check", "http://urgent-bank-login.example"), &m)
            .await
            .unwrap();
        h.handle(command("check", ""), &m).await.unwrap();

        let sent = m.texts();
        assert!(sent[0].contains("looks suspicious"));
        assert!(sent[0].contains("urgent, bank, login"));
        assert_eq!(sent[1], formatting::check_usage());
    }

    #[tokio::test]
    async fn commands_reply() {
        let m = RecordingMessenger::default();
        let h = handler(true, Arc::new(UnavailableExtractor));

        for name in ["start", "help", "stats", "bogus"] {
            h.handle(command(name, ""), &m).await.unwrap();
        }

        let sent = m.texts();
        assert!(sent[0].contains("Hello Noa"));
        assert!(sent[1].contains("/check"));
        assert!(sent[2].contains("ID: 7"));
        assert!(sent[3].contains("Unknown command /bogus"));
    }

    #[tokio::test]
    async fn photo_is_refused_when_qr_unavailable() {
        let m = RecordingMessenger::default();
        let extractor = Arc::new(PanickingExtractor);
        let h = handler(false, extractor);

        assert!(!h.photo_received(ChatId(1), &m).await.unwrap());
        h.handle(photo(), &m).await.unwrap();

        assert_eq!(
            m.texts(),
            vec![
                formatting::qr_unavailable().to_string(),
                formatting::qr_unavailable().to_string()
            ]
        );
    }

    #[tokio::test]
    async fn photo_is_acknowledged_when_qr_available() {
        let m = RecordingMessenger::default();
        let h = handler(true, Arc::new(UnavailableExtractor));
        assert!(h.photo_received(ChatId(1), &m).await.unwrap());
        assert_eq!(m.texts(), vec![formatting::photo_received().to_string()]);
    }

    #[tokio::test]
    async fn each_payload_gets_its_own_reply() {
        let m = RecordingMessenger::default();
        let h = handler(
            true,
            Arc::new(FixedExtractor(Ok(vec![
                qr("https://example.com"),
                qr("a@b.com"),
                qr("+15551234567"),
                qr("hello"),
            ]))),
        );

        h.handle(photo(), &m).await.unwrap();

        let sent = m.texts();
        assert_eq!(sent.len(), 4);
        assert!(sent[0].contains("#1") && sent[0].contains("Not sure about this link"));
        assert!(sent[1].contains("#2") && sent[1].contains("email address"));
        assert!(sent[2].contains("#3") && sent[2].contains("phone number"));
        assert!(sent[3].contains("#4") && sent[3].contains("plain text"));
    }

    #[tokio::test]
    async fn extraction_errors_become_replies() {
        let cases = [
            (
                ExtractionError::NoPayloadFound,
                formatting::no_payload_found().to_string(),
            ),
            (
                ExtractionError::DecodeFailure("bad header".to_string()),
                formatting::image_error("bad header"),
            ),
            (
                ExtractionError::FeatureUnavailable,
                formatting::qr_unavailable().to_string(),
            ),
        ];

        for (err, expected) in cases {
            let m = RecordingMessenger::default();
            handler(true, Arc::new(FixedExtractor(Err(err))))
                .handle(photo(), &m)
                .await
                .unwrap();
            assert_eq!(m.texts(), vec![expected]);
        }
    }

    #[tokio::test]
    async fn extractor_panic_is_contained() {
        let m = RecordingMessenger::default();
        handler(true, Arc::new(PanickingExtractor))
            .handle(photo(), &m)
            .await
            .unwrap();
        assert_eq!(m.texts(), vec![formatting::unexpected_error().to_string()]);
    }

    #[cfg(feature = "qr")]
    #[tokio::test]
    async fn real_qr_photo_end_to_end() {
        let m = RecordingMessenger::default();
        let h = handler(true, extract::default_extractor(1024 * 1024));

        h.handle(
            IncomingUpdate::Photo(PhotoMessage {
                chat_id: ChatId(1),
                sender: sender(),
                image: extract::test_images::qr_png("http://free-money.example"),
            }),
            &m,
        )
        .await
        .unwrap();

        let sent = m.texts();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("http://free-money.example"));
        assert!(sent[0].contains("free, money"));
    }
}
