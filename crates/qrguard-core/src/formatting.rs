//! User-facing reply text (Telegram HTML parse mode).

use chrono::{DateTime, Utc};

use crate::{
    classifier::{ClassificationResult, Verdict, REASON_ABNORMALLY_LONG},
    domain::Sender,
    extract::DecodedPayload,
    routing::{route, PayloadRoute},
    utils::truncate_text,
};

/// Longest link echoed back in a verdict reply.
pub const LINK_ECHO_CHARS: usize = 300;

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn qr_status(qr_available: bool) -> &'static str {
    if qr_available {
        "✅ active"
    } else {
        "❌ unavailable"
    }
}

pub fn welcome(first_name: &str, qr_available: bool) -> String {
    format!(
        "🔒 Hello {name}!\n\n\
         I'm a link safety checker 🤖\n\n\
         🎯 What I can do:\n\
         • 🔗 Check suspicious links\n\
         • 📱 Read QR codes ({status})\n\
         • 🛡️ Tell you whether content looks safe\n\n\
         📝 How to use me:\n\
         • Send me a link to check\n\
         • Send me a photo of a QR code\n\n\
         🆘 Help: /help\n\
         📊 Stats: /stats",
        name = escape_html(first_name),
        status = qr_status(qr_available),
    )
}

pub fn help(qr_available: bool) -> String {
    let qr_section = if qr_available {
        "📱 <b>QR codes:</b>\n\
         • Send a photo that contains a QR code\n\
         • I'll decode it and look at the content\n\
         • If it holds a link, I'll check how safe it looks"
    } else {
        "📱 <b>QR codes:</b>\n\
         ❌ Not available right now"
    };

    format!(
        "🆘 <b>How to use this bot</b>\n\n\
         1️⃣ Send me any link\n\
         2️⃣ Or send a photo with a QR code\n\
         3️⃣ I check the content automatically\n\
         4️⃣ You get an answer within seconds\n\n\
         🎯 <b>Commands:</b>\n\
         /start - welcome message\n\
         /help - this guide\n\
         /check &lt;link&gt; - check a link explicitly\n\
         /stats - your info\n\n\
         {qr_section}\n\n\
         ⚠️ <b>Safety tips:</b>\n\
         • Be careful with links that arrive by SMS\n\
         • QR codes can hide dangerous links\n\
         • Never enter personal details on suspicious sites\n\
         • If something looks suspicious, it probably is\n\n\
         🔒 Photos and personal data are never stored"
    )
}

pub fn stats(sender: &Sender, qr_available: bool, started_at: DateTime<Utc>) -> String {
    format!(
        "📊 <b>Your info:</b>\n\n\
         👤 Name: {name}\n\
         🆔 ID: {id}\n\
         🔍 Link checking: ✅ active\n\
         📱 QR scanning: {status}\n\
         🕒 Running since: {started}",
        name = escape_html(&sender.first_name),
        id = sender.user_id.0,
        status = qr_status(qr_available),
        started = started_at.format("%Y-%m-%d %H:%M UTC"),
    )
}

pub fn greeting(qr_available: bool) -> String {
    let qr_line = if qr_available {
        "\n📱 Or send a photo of a QR code"
    } else {
        ""
    };
    format!(
        "👋 Hi! I'm a link safety checker\n\n\
         🔍 Send me a link to check{qr_line}\n\
         🆘 Or type /help for help"
    )
}

pub fn checking_link() -> &'static str {
    "🔍 Found a link! Checking..."
}

pub fn link_not_found() -> &'static str {
    "🤔 Couldn't find a valid link in your message"
}

pub fn check_usage() -> &'static str {
    "ℹ️ Usage: /check &lt;link&gt;"
}

pub fn unknown_command(name: &str) -> String {
    format!(
        "🤷 Unknown command /{}. Type /help for the list of commands",
        escape_html(name)
    )
}

pub fn photo_received() -> &'static str {
    "📱 Got your photo! Looking for QR codes..."
}

pub fn qr_unavailable() -> &'static str {
    "❌ Sorry, QR scanning is not available right now\n\
     💡 This deployment was started without QR support"
}

pub fn no_payload_found() -> &'static str {
    "❌ No QR code found in the image"
}

pub fn image_error(reason: &str) -> String {
    format!(
        "❌ Error processing the image: {}",
        escape_html(&truncate_text(reason, 100))
    )
}

pub fn download_failed(reason: &str) -> String {
    format!(
        "❌ Failed to download photo: {}",
        escape_html(&truncate_text(reason, 100))
    )
}

pub fn unexpected_error() -> &'static str {
    "❌ Something went wrong while processing your photo. Please try again."
}

fn reason_line(result: &ClassificationResult) -> String {
    let reason = escape_html(&result.reason);
    match result.verdict {
        Verdict::Safe => format!("📊 Reason: known safe domain: {reason}"),
        Verdict::Suspicious if result.reason == REASON_ABNORMALLY_LONG => {
            "📊 Reason: the link is abnormally long".to_string()
        }
        Verdict::Suspicious => format!("📊 Reason: suspicious keywords found: {reason}"),
        Verdict::Unknown => {
            format!("📊 Note: {reason}, but stay careful")
        }
    }
}

fn verdict_headline(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Safe => "✅ The link looks safe",
        Verdict::Suspicious => "⚠️ The link looks suspicious!",
        Verdict::Unknown => "🤔 Not sure about this link",
    }
}

fn verdict_footer(result: &ClassificationResult) -> String {
    let confidence = format!("🎯 Confidence: {}", result.confidence);
    match result.verdict {
        Verdict::Safe => confidence,
        Verdict::Suspicious => format!("{confidence}\n🚨 Recommendation: do not open this link!"),
        Verdict::Unknown => format!("{confidence}\n⚠️ Recommendation: proceed with caution"),
    }
}

/// Verdict reply for a link sent as text or via `/check`.
pub fn link_report(link: &str, result: &ClassificationResult) -> String {
    format!(
        "{headline}\n\n🔗 Link: {link}\n{reason}\n{footer}",
        headline = verdict_headline(result.verdict),
        link = escape_html(&truncate_text(link, LINK_ECHO_CHARS)),
        reason = reason_line(result),
        footer = verdict_footer(result),
    )
}

/// One reply per decoded payload; `index` is zero-based.
pub fn payload_report(index: usize, payload: &DecodedPayload, preview_chars: usize) -> String {
    let mut out = format!(
        "✅ Found QR code #{n}:\n\n📋 Type: {kind}\n💾 Content: {preview}\n\n",
        n = index + 1,
        kind = payload.kind,
        preview = escape_html(&truncate_text(&payload.text, preview_chars)),
    );

    match route(&payload.text) {
        PayloadRoute::Link(result) => {
            out.push_str("🔍 It's a link! Checking safety...\n\n");
            out.push_str(verdict_headline(result.verdict));
            out.push('\n');
            out.push_str(&reason_line(&result));
            out.push('\n');
            out.push_str(&verdict_footer(&result));
        }
        PayloadRoute::EmailLike => out.push_str("📧 This looks like an email address"),
        PayloadRoute::PhoneLike => out.push_str("📞 This looks like a phone number"),
        PayloadRoute::PlainText => out.push_str("📝 This is plain text"),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{classifier::classify, domain::UserId, extract::SymbolKind};

    fn payload(text: &str) -> DecodedPayload {
        DecodedPayload {
            text: text.to_string(),
            kind: SymbolKind::QrCode,
        }
    }

    #[test]
    fn escapes_html() {
        let s = r#"<a href="x&y">"#;
        assert_eq!(escape_html(s), "&lt;a href=&quot;x&amp;y&quot;&gt;");
    }

    #[test]
    fn suspicious_link_report_warns_and_lists_keywords() {
        let link = "http://free-prize.example";
        let out = link_report(link, &classify(link));
        assert!(out.starts_with("⚠️ The link looks suspicious!"));
        assert!(out.contains("free, prize"));
        assert!(out.contains("Confidence: medium"));
        assert!(out.contains("do not open"));
    }

    #[test]
    fn link_report_escapes_and_truncates_echo() {
        let link = format!("https://x.y/<{}", "a".repeat(400));
        let out = link_report(&link, &classify(&link));
        assert!(out.contains("https://x.y/&lt;"));
        assert!(out.contains("..."));
        assert!(!out.contains(&"a".repeat(LINK_ECHO_CHARS)));
    }

    #[test]
    fn payload_report_routes_content() {
        let out = payload_report(0, &payload("https://github.com/rust-lang"), 100);
        assert!(out.contains("#1"));
        assert!(out.contains("Type: QRCODE"));
        assert!(out.contains("The link looks safe"));
        assert!(out.contains("github.com"));

        assert!(payload_report(1, &payload("a@b.com"), 100).contains("email address"));
        assert!(payload_report(2, &payload("+15551234567"), 100).contains("phone number"));
        assert!(payload_report(3, &payload("hello"), 100).contains("plain text"));
    }

    #[test]
    fn payload_preview_is_truncated() {
        let text = "b".repeat(150);
        let out = payload_report(0, &payload(&text), 100);
        assert!(out.contains(&format!("{}...", "b".repeat(100))));
        assert!(!out.contains(&"b".repeat(101)));
    }

    #[test]
    fn qr_availability_shows_in_texts() {
        assert!(welcome("Dana", true).contains("✅ active"));
        assert!(welcome("Dana", false).contains("❌ unavailable"));
        assert!(greeting(true).contains("QR code"));
        assert!(!greeting(false).contains("QR code"));
        assert!(help(false).contains("Not available"));
    }

    #[test]
    fn stats_shows_sender() {
        let sender = Sender {
            user_id: UserId(42),
            first_name: "<Dana>".to_string(),
            username: None,
        };
        let started = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        let out = stats(&sender, true, started);
        assert!(out.contains("&lt;Dana&gt;"));
        assert!(out.contains("ID: 42"));
        assert!(out.contains("1970-01-01 00:00 UTC"));
    }
}
