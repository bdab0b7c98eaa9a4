use crate::classifier::{classify, ClassificationResult};

/// What a decoded payload looks like, and for links, how it classified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayloadRoute {
    Link(ClassificationResult),
    EmailLike,
    PhoneLike,
    PlainText,
}

const LINK_PREFIXES: [&str; 3] = ["http://", "https://", "www."];

/// Single-pass dispatch on the payload text. Only links reach the classifier.
pub fn route(text: &str) -> PayloadRoute {
    if LINK_PREFIXES.iter().any(|p| text.starts_with(p)) {
        return PayloadRoute::Link(classify(text));
    }
    if text.contains('@') {
        return PayloadRoute::EmailLike;
    }
    if text.starts_with('+') || is_all_digits(text) {
        return PayloadRoute::PhoneLike;
    }
    PayloadRoute::PlainText
}

fn is_all_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}
