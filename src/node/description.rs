//! Declarative node description.
//!
//! This is configuration metadata for the host's form renderer and
//! expression evaluator, not runtime logic: which resources and operations
//! exist, which fields each one takes, and when a field is shown. The host
//! enforces the type tags; the node only declares them.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

use crate::credentials::CREDENTIAL_NAME;

/// Field type tags the host's form renderer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    String,
    Number,
    Boolean,
    Options,
    Collection,
}

/// One selectable value of an options-typed property.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Choice {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            description: None,
        }
    }

    pub fn describe(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }
}

/// Display conditioning: the property is shown only when every listed
/// governing parameter currently holds one of the allowed values.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DisplayOptions {
    pub show: BTreeMap<String, Vec<String>>,
}

/// What an options-typed or collection-typed property contains.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PropertyOptions {
    /// Selectable values (options kind).
    Choices(Vec<Choice>),
    /// Nested fields (collection kind).
    Fields(Vec<Property>),
}

/// A single declarative node parameter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub display_name: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    pub default: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_options: Option<DisplayOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<PropertyOptions>,
}

impl Property {
    fn new(name: &str, display_name: &str, kind: PropertyKind, default: Value) -> Self {
        Self {
            display_name: display_name.to_string(),
            name: name.to_string(),
            kind,
            required: false,
            default,
            description: None,
            display_options: None,
            options: None,
        }
    }

    pub fn string(name: &str, display_name: &str) -> Self {
        Self::new(name, display_name, PropertyKind::String, json!(""))
    }

    pub fn number(name: &str, display_name: &str, default: i64) -> Self {
        Self::new(name, display_name, PropertyKind::Number, json!(default))
    }

    pub fn boolean(name: &str, display_name: &str) -> Self {
        Self::new(name, display_name, PropertyKind::Boolean, json!(false))
    }

    pub fn options(name: &str, display_name: &str, choices: Vec<Choice>, default: &str) -> Self {
        let mut prop = Self::new(name, display_name, PropertyKind::Options, json!(default));
        prop.options = Some(PropertyOptions::Choices(choices));
        prop
    }

    pub fn collection(name: &str, display_name: &str, fields: Vec<Property>) -> Self {
        let mut prop = Self::new(name, display_name, PropertyKind::Collection, json!({}));
        prop.options = Some(PropertyOptions::Fields(fields));
        prop
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn describe(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    /// Show this property only when `resource` holds one of `values`.
    pub fn show_for_resource(mut self, values: &[&str]) -> Self {
        self.display_options
            .get_or_insert_with(DisplayOptions::default)
            .show
            .insert(
                "resource".to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            );
        self
    }

    /// Show this property only when `operation` holds one of `values`.
    pub fn show_for_operation(mut self, values: &[&str]) -> Self {
        self.display_options
            .get_or_insert_with(DisplayOptions::default)
            .show
            .insert(
                "operation".to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            );
        self
    }

    /// Evaluate the display condition for the current resource/operation.
    pub fn is_shown(&self, resource: &str, operation: &str) -> bool {
        let Some(display) = &self.display_options else {
            return true;
        };

        display.show.iter().all(|(key, allowed)| {
            let current = match key.as_str() {
                "resource" => resource,
                "operation" => operation,
                _ => return false,
            };
            allowed.iter().any(|v| v == current)
        })
    }
}

/// Reference to a credential type this node requires.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRef {
    pub name: String,
    pub required: bool,
}

/// Full node description consumed by the host.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    pub display_name: String,
    pub name: String,
    pub group: Vec<String>,
    pub version: u32,
    pub description: String,
    pub defaults: Value,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub credentials: Vec<CredentialRef>,
    pub properties: Vec<Property>,
}

impl NodeDescription {
    /// Properties visible for the given resource/operation selection.
    pub fn visible_properties(&self, resource: &str, operation: &str) -> Vec<&Property> {
        self.properties
            .iter()
            .filter(|p| p.is_shown(resource, operation))
            .collect()
    }
}

/// Build the Exa node description: four resources, their operations, and
/// per-resource fields.
pub fn exa_description() -> NodeDescription {
    let mut properties = vec![Property::options(
        "resource",
        "Resource",
        vec![
            Choice::new("Search", "search"),
            Choice::new("Find Similar", "findSimilar"),
            Choice::new("Get Content", "getContents"),
            Choice::new("Answer", "answer"),
        ],
        "search",
    )];

    // Search
    properties.push(
        Property::options(
            "operation",
            "Operation",
            vec![
                Choice::new("Search", "search").describe("Search for content"),
                Choice::new("Search and Get Contents", "searchAndContents")
                    .describe("Search and retrieve content"),
            ],
            "search",
        )
        .show_for_resource(&["search"]),
    );
    properties.push(
        Property::string("query", "Query")
            .required()
            .describe("The search query")
            .show_for_resource(&["search"]),
    );
    properties.push(
        Property::collection(
            "additionalFields",
            "Additional Fields",
            vec![
                Property::boolean("useAutoprompt", "Use Autoprompt")
                    .describe("Whether to use autoprompt for the query"),
                Property::number("numResults", "Number of Results", 10)
                    .describe("The number of results to return"),
                Property::string("startPublishedDate", "Start Published Date")
                    .describe("The start date for filtering results (YYYY-MM-DD)"),
                Property::string("endPublishedDate", "End Published Date")
                    .describe("The end date for filtering results (YYYY-MM-DD)"),
                Property::string("includeDomains", "Include Domains")
                    .describe("Comma-separated list of domains to include"),
            ],
        )
        .show_for_resource(&["search"]),
    );

    // Find Similar
    properties.push(
        Property::options(
            "operation",
            "Operation",
            vec![
                Choice::new("Find Similar", "findSimilar").describe("Find similar content"),
                Choice::new("Find Similar and Get Contents", "findSimilarAndContents")
                    .describe("Find similar content and retrieve it"),
            ],
            "findSimilar",
        )
        .show_for_resource(&["findSimilar"]),
    );
    properties.push(
        Property::string("url", "URL")
            .required()
            .describe("The URL to find similar content for")
            .show_for_resource(&["findSimilar"]),
    );
    properties.push(
        Property::collection(
            "additionalFields",
            "Additional Fields",
            vec![
                Property::boolean("excludeSourceDomain", "Exclude Source Domain")
                    .describe("Whether to exclude the source domain from results"),
                Property::number("numResults", "Number of Results", 10)
                    .describe("The number of results to return"),
            ],
        )
        .show_for_resource(&["findSimilar"]),
    );

    // Get Contents
    properties.push(
        Property::options(
            "operation",
            "Operation",
            vec![Choice::new("Get Contents", "getContents").describe("Get contents of URLs")],
            "getContents",
        )
        .show_for_resource(&["getContents"]),
    );
    properties.push(
        Property::string("urls", "URLs")
            .required()
            .describe("Comma-separated list of URLs to get contents for")
            .show_for_resource(&["getContents"]),
    );

    // Answer
    properties.push(
        Property::options(
            "operation",
            "Operation",
            vec![Choice::new("Get Answer", "answer").describe("Get an answer to a question")],
            "answer",
        )
        .show_for_resource(&["answer"]),
    );
    properties.push(
        Property::string("question", "Question")
            .required()
            .describe("The question to get an answer for")
            .show_for_resource(&["answer"]),
    );
    properties.push(
        Property::collection(
            "additionalFields",
            "Additional Fields",
            vec![
                Property::boolean("text", "Include Text")
                    .describe("Whether to include the source text in the response"),
                Property::options(
                    "model",
                    "Model",
                    vec![
                        Choice::new("Default", "default"),
                        Choice::new("Exa Pro", "exa-pro"),
                    ],
                    "default",
                )
                .describe("The model to use for generating the answer"),
            ],
        )
        .show_for_resource(&["answer"]),
    );

    NodeDescription {
        display_name: "Exa".to_string(),
        name: "exa".to_string(),
        group: vec!["transform".to_string()],
        version: 1,
        description: "Interact with the Exa API".to_string(),
        defaults: json!({ "name": "Exa" }),
        inputs: vec!["main".to_string()],
        outputs: vec!["main".to_string()],
        credentials: vec![CredentialRef {
            name: CREDENTIAL_NAME.to_string(),
            required: true,
        }],
        properties,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_identity() {
        let desc = exa_description();
        assert_eq!(desc.name, "exa");
        assert_eq!(desc.inputs, vec!["main"]);
        assert_eq!(desc.outputs, vec!["main"]);
        assert_eq!(desc.credentials.len(), 1);
        assert_eq!(desc.credentials[0].name, "exaApi");
        assert!(desc.credentials[0].required);
    }

    #[test]
    fn test_resource_choices() {
        let desc = exa_description();
        let resource = &desc.properties[0];
        assert_eq!(resource.name, "resource");

        let Some(PropertyOptions::Choices(choices)) = &resource.options else {
            panic!("resource property must carry choices");
        };
        let values: Vec<&str> = choices.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(
            values,
            vec!["search", "findSimilar", "getContents", "answer"]
        );
    }

    #[test]
    fn test_display_condition_hides_other_resources() {
        let desc = exa_description();

        let query = desc.properties.iter().find(|p| p.name == "query").unwrap();
        assert!(query.is_shown("search", "search"));
        assert!(!query.is_shown("answer", "answer"));
        assert!(!query.is_shown("findSimilar", "findSimilar"));

        let url = desc.properties.iter().find(|p| p.name == "url").unwrap();
        assert!(url.is_shown("findSimilar", "findSimilar"));
        assert!(!url.is_shown("search", "search"));
    }

    #[test]
    fn test_visible_properties_per_resource() {
        let desc = exa_description();

        let visible = desc.visible_properties("getContents", "getContents");
        let names: Vec<&str> = visible.iter().map(|p| p.name.as_str()).collect();
        assert!(names.contains(&"resource"));
        assert!(names.contains(&"operation"));
        assert!(names.contains(&"urls"));
        assert!(!names.contains(&"query"));
        assert!(!names.contains(&"question"));
        // getContents has no additionalFields collection
        assert!(!names.contains(&"additionalFields"));
    }

    #[test]
    fn test_each_resource_has_one_operation_property() {
        let desc = exa_description();
        for resource in ["search", "findSimilar", "getContents", "answer"] {
            let shown: Vec<&Property> = desc
                .properties
                .iter()
                .filter(|p| p.name == "operation" && p.is_shown(resource, ""))
                .collect();
            assert_eq!(shown.len(), 1, "resource {} operation properties", resource);
        }
    }

    #[test]
    fn test_answer_model_choices_include_sentinel() {
        let desc = exa_description();
        let fields = desc
            .properties
            .iter()
            .find(|p| p.name == "additionalFields" && p.is_shown("answer", "answer"))
            .unwrap();

        let Some(PropertyOptions::Fields(nested)) = &fields.options else {
            panic!("additionalFields must carry nested fields");
        };
        let model = nested.iter().find(|p| p.name == "model").unwrap();
        let Some(PropertyOptions::Choices(choices)) = &model.options else {
            panic!("model must carry choices");
        };
        let values: Vec<&str> = choices.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["default", "exa-pro"]);
        assert_eq!(model.default, "default");
    }

    #[test]
    fn test_serializes_camel_case() {
        let desc = exa_description();
        let value = serde_json::to_value(&desc).unwrap();
        assert_eq!(value["displayName"], "Exa");

        let query = value["properties"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["name"] == "query")
            .unwrap();
        assert_eq!(query["type"], "string");
        assert_eq!(query["displayOptions"]["show"]["resource"][0], "search");
    }
}
