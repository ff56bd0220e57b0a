//! Resume text extraction. Decoding failures never leave this module: the
//! candidate's identifier is scored in place of its body.

use thiserror::Error;
use tracing::warn;

use crate::matching::models::{CandidateInput, CandidateText};

const UTF8_BOM: &str = "\u{feff}";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("content is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Decodes raw resume content into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, input: &CandidateInput) -> Result<String, ExtractionError>;
}

/// Treats every upload as UTF-8 text. Binary formats (PDF, Word) fail to decode
/// and fall back to the filename.
pub struct Utf8TextExtractor;

impl TextExtractor for Utf8TextExtractor {
    fn extract(&self, input: &CandidateInput) -> Result<String, ExtractionError> {
        let text = std::str::from_utf8(&input.content)?;
        Ok(text.strip_prefix(UTF8_BOM).unwrap_or(text).to_string())
    }
}

/// Runs `extractor`, substituting the identifier when decoding fails.
pub fn extract_text(extractor: &dyn TextExtractor, input: &CandidateInput) -> CandidateText {
    match extractor.extract(input) {
        Ok(text) => CandidateText::Extracted(text),
        Err(e) => {
            warn!(
                "Could not read {}, using identifier for matching: {e}",
                input.identifier
            );
            CandidateText::Degraded {
                identifier: input.identifier.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_content_is_extracted() {
        let input = CandidateInput::new("alice.txt", "BS Biology, lab assistant 2 years");
        let text = extract_text(&Utf8TextExtractor, &input);
        assert_eq!(
            text,
            CandidateText::Extracted("BS Biology, lab assistant 2 years".to_string())
        );
    }

    #[test]
    fn test_bom_is_stripped() {
        let input = CandidateInput::new("bom.txt", "\u{feff}Chemistry minor");
        let text = extract_text(&Utf8TextExtractor, &input);
        assert_eq!(text.as_str(), "Chemistry minor");
    }

    #[test]
    fn test_invalid_bytes_fall_back_to_identifier() {
        let input = CandidateInput::new("scan.pdf", vec![0x25u8, 0x50, 0xff, 0xfe, 0x00]);
        let text = extract_text(&Utf8TextExtractor, &input);
        assert!(text.is_degraded());
        assert_eq!(text.as_str(), "scan.pdf");
    }

    #[test]
    fn test_empty_content_is_not_an_error() {
        let input = CandidateInput::new("empty.txt", Vec::<u8>::new());
        let text = extract_text(&Utf8TextExtractor, &input);
        assert_eq!(text, CandidateText::Extracted(String::new()));
    }

    struct FailingExtractor;

    impl TextExtractor for FailingExtractor {
        fn extract(&self, _input: &CandidateInput) -> Result<String, ExtractionError> {
            let err = std::str::from_utf8(&[0xc3, 0x28]).unwrap_err();
            Err(ExtractionError::InvalidUtf8(err))
        }
    }

    #[test]
    fn test_custom_extractor_failure_degrades() {
        let input = CandidateInput::new("bob.docx", "valid text");
        let text = extract_text(&FailingExtractor, &input);
        assert_eq!(
            text,
            CandidateText::Degraded {
                identifier: "bob.docx".to_string()
            }
        );
    }
}
