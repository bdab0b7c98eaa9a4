//! Machine-readable payload extraction from photos.
//!
//! QR decoding is behind the `qr` cargo feature. Without it the bot still
//! runs, and [`default_extractor`] returns an extractor that reports
//! [`ExtractionError::FeatureUnavailable`].

use std::{fmt, sync::Arc};

/// Whether a symbol decoder is compiled into this build.
pub const QR_SUPPORTED: bool = cfg!(feature = "qr");

/// Format of the symbol a payload was decoded from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    QrCode,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::QrCode => "QRCODE",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedPayload {
    pub text: String,
    pub kind: SymbolKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("could not decode image: {0}")]
    DecodeFailure(String),

    #[error("no machine-readable code found in image")]
    NoPayloadFound,

    #[error("QR scanning is not available in this build")]
    FeatureUnavailable,
}

/// Locates and decodes machine-readable symbols in an encoded image.
pub trait PayloadExtractor: Send + Sync {
    fn extract(&self, image: &[u8]) -> Result<Vec<DecodedPayload>, ExtractionError>;
}

/// Extractor used when no decoder is compiled in.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableExtractor;

impl PayloadExtractor for UnavailableExtractor {
    fn extract(&self, _image: &[u8]) -> Result<Vec<DecodedPayload>, ExtractionError> {
        Err(ExtractionError::FeatureUnavailable)
    }
}

/// Build the best extractor this build supports.
#[cfg(feature = "qr")]
pub fn default_extractor(max_image_bytes: usize) -> Arc<dyn PayloadExtractor> {
    Arc::new(QrExtractor::new(max_image_bytes))
}

/// Build the best extractor this build supports.
#[cfg(not(feature = "qr"))]
pub fn default_extractor(_max_image_bytes: usize) -> Arc<dyn PayloadExtractor> {
    Arc::new(UnavailableExtractor)
}

#[cfg(feature = "qr")]
pub use qr::QrExtractor;

#[cfg(feature = "qr")]
mod qr {
    use rqrr::PreparedImage;

    use super::{DecodedPayload, ExtractionError, PayloadExtractor, SymbolKind};

    /// QR decoder over `image` + `rqrr`.
    #[derive(Clone, Debug)]
    pub struct QrExtractor {
        max_image_bytes: usize,
    }

    impl QrExtractor {
        pub fn new(max_image_bytes: usize) -> Self {
            Self { max_image_bytes }
        }
    }

    impl PayloadExtractor for QrExtractor {
        fn extract(&self, image: &[u8]) -> Result<Vec<DecodedPayload>, ExtractionError> {
            if image.len() > self.max_image_bytes {
                return Err(ExtractionError::DecodeFailure(format!(
                    "image too large: {} bytes (max: {} bytes)",
                    image.len(),
                    self.max_image_bytes
                )));
            }

            let luma = image::load_from_memory(image)
                .map_err(|e| ExtractionError::DecodeFailure(e.to_string()))?
                .to_luma8();

            let (width, height) = luma.dimensions();
            let mut prepared =
                PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
                    luma.get_pixel(x as u32, y as u32).0[0]
                });

            let mut payloads = Vec::new();
            for grid in prepared.detect_grids() {
                match grid.decode() {
                    Ok((_meta, text)) => payloads.push(DecodedPayload {
                        text,
                        kind: SymbolKind::QrCode,
                    }),
                    Err(e) => tracing::debug!(error = ?e, "skipping undecodable QR grid"),
                }
            }

            if payloads.is_empty() {
                return Err(ExtractionError::NoPayloadFound);
            }
            Ok(payloads)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_extractor_reports_feature_unavailable() {
        assert_eq!(
            UnavailableExtractor.extract(b"anything"),
            Err(ExtractionError::FeatureUnavailable)
        );
    }

    #[test]
    fn symbol_kind_display() {
        assert_eq!(SymbolKind::QrCode.to_string(), "QRCODE");
    }

    #[cfg(feature = "qr")]
    mod qr {
        use super::super::{test_images, *};

        const MAX: usize = 10 * 1024 * 1024;

        #[test]
        fn decodes_single_qr_code() {
            let png = test_images::qr_png("https://example.com");
            let payloads = QrExtractor::new(MAX).extract(&png).unwrap();
            assert_eq!(
                payloads,
                vec![DecodedPayload {
                    text: "https://example.com".to_string(),
                    kind: SymbolKind::QrCode,
                }]
            );
        }

        #[test]
        fn blank_image_has_no_payload() {
            let png = test_images::blank_png();
            assert_eq!(
                QrExtractor::new(MAX).extract(&png),
                Err(ExtractionError::NoPayloadFound)
            );
        }

        #[test]
        fn invalid_bytes_fail_to_decode() {
            let err = QrExtractor::new(MAX)
                .extract(b"definitely not an image")
                .unwrap_err();
            assert!(matches!(err, ExtractionError::DecodeFailure(_)));
        }

        #[test]
        fn oversized_buffer_is_rejected_before_decoding() {
            let png = test_images::qr_png("hello");
            let err = QrExtractor::new(16).extract(&png).unwrap_err();
            match err {
                ExtractionError::DecodeFailure(reason) => assert!(reason.contains("too large")),
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[test]
        fn default_extractor_decodes_when_compiled_in() {
            assert!(QR_SUPPORTED);
            let png = test_images::qr_png("hello");
            let payloads = default_extractor(MAX).extract(&png).unwrap();
            assert_eq!(payloads[0].text, "hello");
        }
    }
}
