use anyhow::{Context, Result};

pub fn encode_categories(labels: &[String]) -> Result<String> {
    serde_json::to_string(labels).context("failed to encode category list")
}

pub fn decode_categories(value: &str, field: &str) -> Result<Vec<String>> {
    serde_json::from_str(value).with_context(|| format!("failed to parse {field}"))
}
