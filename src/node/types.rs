//! Node trait and context types.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use super::description::NodeDescription;
use crate::error::Result;

/// Context passed to a node for one execution.
///
/// The host resolves credentials and input items before calling the node;
/// this carries what the node is allowed to see.
#[derive(Debug, Clone, Default)]
pub struct NodeContext {
    /// Input items, one JSON object per row.
    pub items: Vec<Value>,

    /// Decrypted credentials keyed by credential type name.
    pub credentials: HashMap<String, String>,

    /// When set, a failing item yields an `{ "error": … }` result in its
    /// slot instead of aborting the batch.
    pub continue_on_fail: bool,

    /// Execution ID, for log correlation.
    pub execution_id: String,
}

impl NodeContext {
    /// Create a new context.
    pub fn new(execution_id: &str) -> Self {
        Self {
            execution_id: execution_id.to_string(),
            ..Self::default()
        }
    }

    /// Set the input items.
    pub fn with_items(mut self, items: Vec<Value>) -> Self {
        self.items = items;
        self
    }

    /// Add a credential.
    pub fn with_credential(mut self, name: &str, value: &str) -> Self {
        self.credentials.insert(name.to_string(), value.to_string());
        self
    }

    /// Enable the continue-on-fail policy.
    pub fn with_continue_on_fail(mut self) -> Self {
        self.continue_on_fail = true;
        self
    }
}

/// Trait that integration nodes implement.
#[async_trait]
pub trait Node: Send + Sync {
    /// The node type name the host registers (e.g. "exa").
    fn name(&self) -> &str;

    /// The declarative parameter schema for the host's form renderer.
    fn describe(&self) -> NodeDescription;

    /// Execute the node over the context's input items.
    ///
    /// `config` holds the node's configured parameters; per-item values in
    /// the input objects override it. Returns one result item per input
    /// item, in input order.
    async fn execute(&self, config: &Value, ctx: &NodeContext) -> Result<Vec<Value>>;
}
