//! The Exa integration node.
//!
//! For each input item the node reads its routing parameters, assembles the
//! remote options, calls one of the six Exa operations, and appends the
//! JSON response to the output batch. One client is built per execution and
//! reused for every item; items run strictly in order, one call in flight
//! at a time.

pub mod description;
pub mod params;
pub mod types;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::client::{ContentsOptions, ExaApi, ExaClient};
use crate::credentials;
use crate::error::Result;

use description::{exa_description, NodeDescription};
use params::{
    AnswerFields, FindSimilarFields, Operation, Resource, SearchFields,
};
use types::{Node, NodeContext};

/// Exa API node.
pub struct ExaNode;

impl ExaNode {
    pub fn new() -> Self {
        Self
    }

    /// Execute against an injected client. This is the whole routine minus
    /// credential resolution; tests drive it with a mock.
    pub async fn execute_with_client(
        &self,
        client: &dyn ExaApi,
        config: &Value,
        ctx: &NodeContext,
    ) -> Result<Vec<Value>> {
        let mut return_data = Vec::with_capacity(ctx.items.len());

        for (i, item) in ctx.items.iter().enumerate() {
            match run_item(client, config, item).await {
                Ok(response) => return_data.push(response),
                Err(e) if ctx.continue_on_fail => {
                    warn!(item = i, "item failed, continuing: {}", e);
                    return_data.push(json!({ "error": e.to_string() }));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(return_data)
    }
}

impl Default for ExaNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Node for ExaNode {
    fn name(&self) -> &str {
        "exa"
    }

    fn describe(&self) -> NodeDescription {
        exa_description()
    }

    async fn execute(&self, config: &Value, ctx: &NodeContext) -> Result<Vec<Value>> {
        let credential = credentials::resolve(&ctx.credentials)?;
        let client = ExaClient::new(credential.api_key());
        self.execute_with_client(&client, config, ctx).await
    }
}

/// Route one item to its remote call.
async fn run_item(client: &dyn ExaApi, config: &Value, item: &Value) -> Result<Value> {
    let resource = params::resource(config, item)?;
    let operation = params::operation(config, item, resource)?;
    debug!(
        resource = resource.as_str(),
        operation = operation.as_str(),
        "dispatching item"
    );

    match resource {
        Resource::Search => {
            let query = params::required_str(config, item, "query")?;
            let fields: SearchFields = params::additional_fields(config, item)?;
            match operation {
                Operation::SearchAndContents => {
                    client
                        .search_and_contents(&query, &fields.to_options(true))
                        .await
                }
                _ => client.search(&query, &fields.to_options(false)).await,
            }
        }
        Resource::FindSimilar => {
            let url = params::required_str(config, item, "url")?;
            let fields: FindSimilarFields = params::additional_fields(config, item)?;
            match operation {
                Operation::FindSimilarAndContents => {
                    client
                        .find_similar_and_contents(&url, &fields.to_options(true))
                        .await
                }
                _ => client.find_similar(&url, &fields.to_options(false)).await,
            }
        }
        Resource::GetContents => {
            let urls = params::split_csv(&params::required_str(config, item, "urls")?);
            client
                .get_contents(&urls, &ContentsOptions { text: true })
                .await
        }
        Resource::Answer => {
            let question = params::required_str(config, item, "question")?;
            let fields: AnswerFields = params::additional_fields(config, item)?;
            client.answer(&question, &fields.to_options()).await
        }
    }
}
