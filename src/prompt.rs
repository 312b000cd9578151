//! Prompt construction for the food-guide extraction.
//!
//! The JSON shape in [`OUTPUT_SCHEMA`] is what [`crate::parser::ResponseParser`]
//! reads back, so the field names here and there must stay in sync.

use std::sync::Arc;

use crate::data_models::{ExtractionRequest, NormalizedDocument};
use crate::logging::Logger;

/// Appended to a document that was cut to fit the input budget.
pub const TRUNCATION_NOTICE: &str = "\n\n[Content truncated because it was too long]";

const SYSTEM_MESSAGE: &str = "You are a food and travel expert. You extract structured information from the content you are given.";

const OUTPUT_SCHEMA: &str = r#"{
  "cuisine summary": "...",
  "dishes": [
    {
      "name": "Dish name",
      "description": "Short description of the dish",
      "restaurants": [
        {
          "name": "Restaurant name",
          "address": "Address",
          "contact": "Phone number or website"
        }
      ]
    }
  ]
}"#;

pub struct ExtractionPromptBuilder {
    city: String,
    logger: Arc<dyn Logger>,
}

impl ExtractionPromptBuilder {
    pub fn new(city: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self {
            city: city.into(),
            logger,
        }
    }

    pub fn system_message(&self) -> &'static str {
        SYSTEM_MESSAGE
    }

    /// Fixed instructions, ending right where the document text is appended.
    pub fn instructions(&self) -> String {
        let city = &self.city;
        let mut prompt = String::new();
        prompt.push_str(&format!(
            "This content is a food guide for {city}. Extract the following information and answer in JSON:\n\n"
        ));
        prompt.push_str(&format!(
            "1. What are the most important dishes and desserts to try in {city}?\n"
        ));
        prompt.push_str(
            "2. Which are the best restaurants for each dish? (with address and contact details)\n",
        );
        prompt.push_str(&format!(
            "3. What are the general characteristics of {city}'s cuisine?\n\n"
        ));
        prompt.push_str("Structure your answer in this format:\n");
        prompt.push_str(OUTPUT_SCHEMA);
        prompt.push_str("\n\nContent to process:\n\n");
        prompt
    }

    /// Cuts the document to `max_chars` characters plus [`TRUNCATION_NOTICE`]
    /// when it is longer than that; otherwise passes it through.
    pub fn build(&self, document: NormalizedDocument, max_chars: usize) -> ExtractionRequest {
        let length = document.char_len();
        let (document, truncated) = if length > max_chars {
            self.logger.warn(&format!(
                "content is too long ({length} characters), truncating to {max_chars}"
            ));
            let mut text: String = document.text.chars().take(max_chars).collect();
            text.push_str(TRUNCATION_NOTICE);
            (NormalizedDocument::new(text), true)
        } else {
            (document, false)
        };

        ExtractionRequest {
            instructions: self.instructions(),
            document,
            max_chars,
            truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{NoopLogger, RecordingLogger};
    use tracing::Level;

    fn builder() -> ExtractionPromptBuilder {
        ExtractionPromptBuilder::new("Rome", Arc::new(NoopLogger))
    }

    #[test]
    fn test_short_document_passes_through() {
        let request = builder().build(NormalizedDocument::new("# Title\n\nText".into()), 100);
        assert!(!request.truncated);
        assert_eq!(request.document.text, "# Title\n\nText");
        assert_eq!(request.max_chars, 100);
    }

    #[test]
    fn test_exact_length_is_not_truncated() {
        let request = builder().build(NormalizedDocument::new("abcde".into()), 5);
        assert!(!request.truncated);
        assert_eq!(request.document.text, "abcde");
    }

    #[test]
    fn test_long_document_is_cut_with_notice() {
        let logger = Arc::new(RecordingLogger::new());
        let builder = ExtractionPromptBuilder::new("Rome", logger.clone());
        let request = builder.build(NormalizedDocument::new("x".repeat(50)), 20);

        assert!(request.truncated);
        assert_eq!(
            request.document.char_len(),
            20 + TRUNCATION_NOTICE.chars().count()
        );
        assert!(request.document.text.starts_with(&"x".repeat(20)));
        assert!(request.document.text.ends_with(TRUNCATION_NOTICE));
        assert_eq!(logger.messages(Level::WARN).len(), 1);
    }

    #[test]
    fn test_truncation_counts_characters() {
        let request = builder().build(NormalizedDocument::new("ğ".repeat(10)), 4);
        assert_eq!(
            request.document.text,
            format!("ğğğğ{TRUNCATION_NOTICE}")
        );
    }

    #[test]
    fn test_instructions_name_schema_fields() {
        let instructions = builder().instructions();
        assert!(instructions.contains("food guide for Rome"));
        for field in [
            "\"cuisine summary\"",
            "\"dishes\"",
            "\"name\"",
            "\"description\"",
            "\"restaurants\"",
            "\"address\"",
            "\"contact\"",
        ] {
            assert!(instructions.contains(field), "missing {field}");
        }
        assert!(instructions.contains("1. "));
        assert!(instructions.contains("2. "));
        assert!(instructions.contains("3. "));
        assert!(!instructions.contains("4. "));
    }

    #[test]
    fn test_prompt_embeds_document_after_instructions() {
        let request = builder().build(NormalizedDocument::new("Supplì".into()), 100);
        let prompt = request.prompt();
        assert!(prompt.starts_with("This content is a food guide"));
        assert!(prompt.ends_with("Content to process:\n\nSupplì"));
    }
}
