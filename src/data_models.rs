use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw markup returned by the fetcher. Empty `html` means the fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub url: String,
    pub html: String,
}

impl FetchResult {
    pub fn new(url: String, html: String) -> FetchResult {
        FetchResult { url, html }
    }

    pub fn failed(url: String) -> FetchResult {
        FetchResult {
            url,
            html: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }
}

/// Flat markdown text of the isolated article.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedDocument {
    pub text: String,
}

impl NormalizedDocument {
    pub fn new(text: String) -> NormalizedDocument {
        NormalizedDocument { text }
    }

    /// Length in characters, which is what the prompt budget is counted in.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub instructions: String,
    pub document: NormalizedDocument,
    pub max_chars: usize,
    pub truncated: bool,
}

impl ExtractionRequest {
    /// The user message sent to the model: instructions followed by the document.
    pub fn prompt(&self) -> String {
        let mut prompt = String::with_capacity(self.instructions.len() + self.document.text.len());
        prompt.push_str(&self.instructions);
        prompt.push_str(&self.document.text);
        prompt
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Restaurant {
    pub name: String,
    pub address: String,
    pub contact: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Dish {
    pub name: String,
    pub description: String,
    pub restaurants: Vec<Restaurant>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractionResult {
    Structured {
        #[serde(rename = "cuisine summary")]
        cuisine_summary: String,
        dishes: Vec<Dish>,
        /// Top-level fields the model returned outside the requested schema.
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        extra: Map<String, Value>,
    },
    Unstructured {
        raw_text: String,
    },
    Failed {
        message: String,
    },
}

impl ExtractionResult {
    pub fn failed(message: impl Into<String>) -> ExtractionResult {
        ExtractionResult::Failed {
            message: message.into(),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, ExtractionResult::Structured { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ExtractionResult::Failed { .. })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub url: String,
    pub title: String,
    pub processed: bool,
    pub extraction: ExtractionResult,
}

impl PipelineResult {
    pub fn new(url: String, title: String, extraction: ExtractionResult) -> PipelineResult {
        PipelineResult {
            url,
            title,
            processed: true,
            extraction,
        }
    }

    pub fn unprocessed(url: String, title: String, message: impl Into<String>) -> PipelineResult {
        PipelineResult {
            url,
            title,
            processed: false,
            extraction: ExtractionResult::failed(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_serializes_with_schema_field_names() {
        let result = ExtractionResult::Structured {
            cuisine_summary: "simple and seasonal".to_string(),
            dishes: vec![Dish {
                name: "Carbonara".to_string(),
                description: "eggs, guanciale, pecorino".to_string(),
                restaurants: vec![Restaurant {
                    name: "Roscioli".to_string(),
                    address: "Via dei Giubbonari 21".to_string(),
                    contact: "+39 06 687 5287".to_string(),
                }],
            }],
            extra: Map::new(),
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "structured");
        assert_eq!(value["cuisine summary"], "simple and seasonal");
        assert_eq!(value["dishes"][0]["restaurants"][0]["name"], "Roscioli");
        assert!(value.get("extra").is_none());
    }

    #[test]
    fn test_unstructured_and_failed_tags() {
        let unstructured = ExtractionResult::Unstructured {
            raw_text: "prose".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&unstructured).unwrap(),
            json!({"status": "unstructured", "raw_text": "prose"})
        );

        let failed = ExtractionResult::failed("quota exceeded");
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"status": "failed", "message": "quota exceeded"})
        );
    }

    #[test]
    fn test_prompt_is_instructions_then_document() {
        let request = ExtractionRequest {
            instructions: "Extract:\n\n".to_string(),
            document: NormalizedDocument::new("# Title".to_string()),
            max_chars: 100,
            truncated: false,
        };
        assert_eq!(request.prompt(), "Extract:\n\n# Title");
    }

    #[test]
    fn test_char_len_counts_characters_not_bytes() {
        let document = NormalizedDocument::new("çğış".to_string());
        assert_eq!(document.char_len(), 4);
        assert!(document.text.len() > 4);
    }
}
