//! Per-item parameter reading and option assembly.
//!
//! Parameters for item `i` are resolved by looking at the item object
//! first, then the node's static config. Routing parameters (`resource`,
//! `operation`) are resolved the same way, per item, so a mixed batch
//! routes each item correctly.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::client::{AnswerOptions, FindSimilarOptions, SearchOptions};
use crate::error::{Error, Result};

/// The `model` value that means "let the remote service pick".
const DEFAULT_MODEL_SENTINEL: &str = "default";

/// Top-level remote operation category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    Search,
    FindSimilar,
    GetContents,
    Answer,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Search => "search",
            Resource::FindSimilar => "findSimilar",
            Resource::GetContents => "getContents",
            Resource::Answer => "answer",
        }
    }

    /// The operation selected when the parameter is absent (schema default).
    fn default_operation(&self) -> Operation {
        match self {
            Resource::Search => Operation::Search,
            Resource::FindSimilar => Operation::FindSimilar,
            Resource::GetContents => Operation::GetContents,
            Resource::Answer => Operation::Answer,
        }
    }

    /// Whether `operation` is valid under this resource.
    fn allows(&self, operation: Operation) -> bool {
        matches!(
            (self, operation),
            (Resource::Search, Operation::Search)
                | (Resource::Search, Operation::SearchAndContents)
                | (Resource::FindSimilar, Operation::FindSimilar)
                | (Resource::FindSimilar, Operation::FindSimilarAndContents)
                | (Resource::GetContents, Operation::GetContents)
                | (Resource::Answer, Operation::Answer)
        )
    }
}

/// Resource-scoped operation variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Search,
    SearchAndContents,
    FindSimilar,
    FindSimilarAndContents,
    GetContents,
    Answer,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Search => "search",
            Operation::SearchAndContents => "searchAndContents",
            Operation::FindSimilar => "findSimilar",
            Operation::FindSimilarAndContents => "findSimilarAndContents",
            Operation::GetContents => "getContents",
            Operation::Answer => "answer",
        }
    }
}

/// `additionalFields` for the search resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFields {
    pub use_autoprompt: Option<bool>,
    pub num_results: Option<u32>,
    pub start_published_date: Option<String>,
    pub end_published_date: Option<String>,
    pub include_domains: Option<String>,
}

impl SearchFields {
    /// Assemble remote options. `with_contents` forces `text` and
    /// `highlights` for the searchAndContents variant; the schema exposes
    /// neither flag, so the forced values always stand.
    pub fn to_options(&self, with_contents: bool) -> SearchOptions {
        SearchOptions {
            use_autoprompt: self.use_autoprompt,
            num_results: self.num_results,
            start_published_date: self.start_published_date.clone(),
            end_published_date: self.end_published_date.clone(),
            include_domains: self
                .include_domains
                .as_deref()
                .map(split_csv)
                .filter(|domains| !domains.is_empty()),
            text: with_contents.then_some(true),
            highlights: with_contents.then_some(true),
        }
    }
}

/// `additionalFields` for the findSimilar resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FindSimilarFields {
    pub exclude_source_domain: Option<bool>,
    pub num_results: Option<u32>,
}

impl FindSimilarFields {
    pub fn to_options(&self, with_contents: bool) -> FindSimilarOptions {
        FindSimilarOptions {
            exclude_source_domain: self.exclude_source_domain,
            num_results: self.num_results,
            text: with_contents.then_some(true),
            highlights: with_contents.then_some(true),
        }
    }
}

/// `additionalFields` for the answer resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnswerFields {
    pub text: Option<bool>,
    pub model: Option<String>,
}

impl AnswerFields {
    /// A `model` of `"default"` means "omit the field"; anything else is
    /// passed through verbatim.
    pub fn to_options(&self) -> AnswerOptions {
        AnswerOptions {
            text: self.text,
            model: self
                .model
                .clone()
                .filter(|m| m != DEFAULT_MODEL_SENTINEL),
        }
    }
}

/// Split a comma-separated string, trimming each entry and dropping
/// empty ones.
pub fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Look up `key` on the item first, then the node config.
fn lookup<'a>(config: &'a Value, item: &'a Value, key: &str) -> Option<&'a Value> {
    item.get(key).or_else(|| config.get(key)).filter(|v| !v.is_null())
}

/// Read a required string parameter.
pub fn required_str(config: &Value, item: &Value, key: &str) -> Result<String> {
    lookup(config, item, key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::Node(format!("Missing required parameter: {}", key)))
}

/// Read the `resource` routing parameter.
pub fn resource(config: &Value, item: &Value) -> Result<Resource> {
    let value = lookup(config, item, "resource")
        .ok_or_else(|| Error::Node("Missing required parameter: resource".to_string()))?;

    Resource::deserialize(value)
        .map_err(|_| Error::Node(format!("Unknown resource: {}", value)))
}

/// Read the `operation` routing parameter, falling back to the resource's
/// default and rejecting operations that belong to another resource.
pub fn operation(config: &Value, item: &Value, resource: Resource) -> Result<Operation> {
    let operation = match lookup(config, item, "operation") {
        Some(value) => Operation::deserialize(value)
            .map_err(|_| Error::Node(format!("Unknown operation: {}", value)))?,
        None => resource.default_operation(),
    };

    if !resource.allows(operation) {
        return Err(Error::Node(format!(
            "Operation '{}' is not valid for resource '{}'",
            operation.as_str(),
            resource.as_str()
        )));
    }

    Ok(operation)
}

/// Read the `additionalFields` bag into a typed struct. An absent bag
/// yields the all-empty default.
pub fn additional_fields<T>(config: &Value, item: &Value) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match lookup(config, item, "additionalFields") {
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| Error::Node(format!("Invalid additionalFields: {}", e))),
        None => Ok(T::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_csv_trims_entries() {
        assert_eq!(
            split_csv("a.com, b.com , c.com"),
            vec!["a.com", "b.com", "c.com"]
        );
    }

    #[test]
    fn test_split_csv_drops_empty_entries() {
        assert_eq!(split_csv("a,,b"), vec!["a", "b"]);
        assert!(split_csv("").is_empty());
        assert!(split_csv(" , ").is_empty());
    }

    #[test]
    fn test_search_options_copy_present_fields() {
        let fields = SearchFields {
            use_autoprompt: Some(true),
            num_results: Some(5),
            include_domains: Some("a.com, b.com".to_string()),
            ..Default::default()
        };
        let options = fields.to_options(false);
        assert_eq!(options.use_autoprompt, Some(true));
        assert_eq!(options.num_results, Some(5));
        assert_eq!(
            options.include_domains,
            Some(vec!["a.com".to_string(), "b.com".to_string()])
        );
        assert_eq!(options.text, None);
        assert_eq!(options.highlights, None);
    }

    #[test]
    fn test_search_and_contents_forces_flags() {
        let options = SearchFields::default().to_options(true);
        assert_eq!(options.text, Some(true));
        assert_eq!(options.highlights, Some(true));
    }

    #[test]
    fn test_find_similar_and_contents_forces_flags() {
        let options = FindSimilarFields::default().to_options(true);
        assert_eq!(options.text, Some(true));
        assert_eq!(options.highlights, Some(true));
    }

    #[test]
    fn test_answer_model_sentinel_omitted() {
        let fields = AnswerFields {
            model: Some("default".to_string()),
            ..Default::default()
        };
        assert_eq!(fields.to_options().model, None);

        let fields = AnswerFields {
            model: Some("exa-pro".to_string()),
            ..Default::default()
        };
        assert_eq!(fields.to_options().model, Some("exa-pro".to_string()));
    }

    #[test]
    fn test_item_overrides_config() {
        let config = json!({"query": "from config"});
        let item = json!({"query": "from item"});
        assert_eq!(
            required_str(&config, &item, "query").unwrap(),
            "from item"
        );
        assert_eq!(
            required_str(&config, &json!({}), "query").unwrap(),
            "from config"
        );
    }

    #[test]
    fn test_required_str_missing() {
        let err = required_str(&json!({}), &json!({}), "query").unwrap_err();
        assert!(err.to_string().contains("Missing required parameter: query"));
    }

    #[test]
    fn test_resource_parsing() {
        let config = json!({"resource": "findSimilar"});
        assert_eq!(
            resource(&config, &json!({})).unwrap(),
            Resource::FindSimilar
        );

        let err = resource(&json!({"resource": "bogus"}), &json!({})).unwrap_err();
        assert!(err.to_string().contains("Unknown resource"));
    }

    #[test]
    fn test_operation_defaults_per_resource() {
        let empty = json!({});
        assert_eq!(
            operation(&empty, &empty, Resource::Search).unwrap(),
            Operation::Search
        );
        assert_eq!(
            operation(&empty, &empty, Resource::Answer).unwrap(),
            Operation::Answer
        );
    }

    #[test]
    fn test_operation_rejected_for_wrong_resource() {
        let config = json!({"operation": "searchAndContents"});
        let err = operation(&config, &json!({}), Resource::Answer).unwrap_err();
        assert!(err.to_string().contains("not valid for resource 'answer'"));
    }

    #[test]
    fn test_additional_fields_absent_yields_default() {
        let fields: SearchFields = additional_fields(&json!({}), &json!({})).unwrap();
        assert!(fields.num_results.is_none());
    }

    #[test]
    fn test_additional_fields_parsed_from_item() {
        let item = json!({"additionalFields": {"numResults": 7, "useAutoprompt": true}});
        let fields: SearchFields = additional_fields(&json!({}), &item).unwrap();
        assert_eq!(fields.num_results, Some(7));
        assert_eq!(fields.use_autoprompt, Some(true));
    }
}
