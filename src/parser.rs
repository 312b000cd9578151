//! Reads the model's reply back into the dish/restaurant schema.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::data_models::{Dish, ExtractionResult, Restaurant};
use crate::logging::Logger;

static JSON_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```json\s*([\s\S]*?)\s*```").expect("valid fence pattern"));

const CUISINE_SUMMARY_KEYS: &[&str] = &["cuisine summary", "cuisine_summary"];
const KNOWN_KEYS: &[&str] = &["cuisine summary", "cuisine_summary", "dishes"];

pub struct ResponseParser {
    logger: Arc<dyn Logger>,
}

impl ResponseParser {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }

    /// Never fails: a reply that is not a JSON object comes back as
    /// [`ExtractionResult::Unstructured`] with the reply untouched.
    pub fn parse(&self, raw_text: &str) -> ExtractionResult {
        let candidate = extract_json(raw_text);
        match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(object)) => {
                self.logger.info("model reply parsed as structured JSON");
                structured_from(object)
            }
            Ok(_) => {
                self.logger
                    .warn("model reply is JSON but not an object, keeping it as text");
                unstructured(raw_text)
            }
            Err(e) => {
                self.logger
                    .warn(&format!("model reply is not JSON ({e}), keeping it as text"));
                unstructured(raw_text)
            }
        }
    }
}

/// Inner content of the first ```` ```json ```` fence, or the whole reply.
pub fn extract_json(raw_text: &str) -> &str {
    JSON_FENCE_RE
        .captures(raw_text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw_text)
}

fn unstructured(raw_text: &str) -> ExtractionResult {
    ExtractionResult::Unstructured {
        raw_text: raw_text.to_string(),
    }
}

fn structured_from(mut object: Map<String, Value>) -> ExtractionResult {
    let cuisine_summary = CUISINE_SUMMARY_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string();

    let dishes = object
        .get("dishes")
        .and_then(Value::as_array)
        .map(|dishes| dishes.iter().filter_map(parse_dish).collect())
        .unwrap_or_default();

    object.retain(|key, _| !KNOWN_KEYS.contains(&key.as_str()));

    ExtractionResult::Structured {
        cuisine_summary,
        dishes,
        extra: object,
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn parse_dish(value: &Value) -> Option<Dish> {
    let object = value.as_object()?;
    let restaurants = object
        .get("restaurants")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(parse_restaurant).collect())
        .unwrap_or_default();

    Some(Dish {
        name: string_field(object, "name"),
        description: string_field(object, "description"),
        restaurants,
    })
}

fn parse_restaurant(value: &Value) -> Option<Restaurant> {
    let object = value.as_object()?;
    Some(Restaurant {
        name: string_field(object, "name"),
        address: string_field(object, "address"),
        contact: string_field(object, "contact"),
    })
}
