//! exa-node - Exa API integration node for workflow automation
//!
//! This crate packages two things a workflow host needs to offer Exa as a
//! step in user-authored workflows:
//!
//! - **Credential descriptor**: the `exaApi` credential type (one API key),
//!   its header-injection rule, and the fixed request the host issues to
//!   test a stored key.
//! - **Integration node**: the `exa` node — a declarative parameter schema
//!   (resource, operation, per-operation fields) and an execution routine
//!   that maps each input item to one of the Exa API operations and
//!   collects the JSON results in input order.
//!
//! ## Example
//!
//! ```no_run
//! use exa_node::node::types::{Node, NodeContext};
//! use exa_node::ExaNode;
//! use serde_json::json;
//!
//! # async fn run() -> exa_node::Result<()> {
//! let node = ExaNode::new();
//! let config = json!({
//!     "resource": "search",
//!     "operation": "searchAndContents",
//!     "query": "rust workflow engines",
//!     "additionalFields": { "numResults": 5 },
//! });
//! let ctx = NodeContext::new("exec-1")
//!     .with_items(vec![json!({})])
//!     .with_credential("exaApi", "my-api-key");
//!
//! let results = node.execute(&config, &ctx).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod credentials;
pub mod error;
pub mod node;

pub use client::{ExaApi, ExaClient};
pub use credentials::ExaApiCredential;
pub use error::{Error, Result};
pub use node::ExaNode;
