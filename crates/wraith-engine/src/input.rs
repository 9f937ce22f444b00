//! Parameter templating using minijinja.
//!
//! String parameters containing `{{` or `{%` are rendered against the run so
//! far before a node executes. Other values pass through untouched.
//!
//! # Template context
//! ```json
//! {
//!   "nodes": { "<node_id>": { ...output } },
//!   "wallet": { "address": "...", "walletType": "...", "walletCount": 1 },
//!   "<node_id>": { ...output }
//! }
//! ```
//! Outputs are also exposed at the top level under their node id when the id
//! is a plain identifier, so `{{ price_eth.price }}` works alongside
//! `{{ nodes["node-1"].price }}`.
//!
//! Rendered values are always strings; numeric parameters accept numeric
//! strings, so `"amount": "{{ nodes.p.price / 1000 }}"` is a valid amount.

use minijinja::{Environment, Value};
use serde_json::json;
use wraith_config::{NodeData, WalletInfo};

use crate::context::ExecutionContext;
use crate::error::NodeError;

/// Render every templated string in `data`, recursing into arrays and objects.
pub fn render_params(
  data: &NodeData,
  context: &ExecutionContext,
  wallet: &WalletInfo,
) -> Result<NodeData, NodeError> {
  if !data.values().any(contains_template) {
    return Ok(data.clone());
  }

  let env = Environment::new();
  let ctx = Value::from_serialize(template_context(context, wallet));

  data
    .iter()
    .map(|(key, value)| Ok((key.clone(), render_value(&env, key, value, &ctx)?)))
    .collect()
}

fn template_context(context: &ExecutionContext, wallet: &WalletInfo) -> serde_json::Value {
  let mut root = serde_json::Map::new();
  for (node_id, output) in context.iter() {
    if is_identifier(node_id) {
      root.insert(node_id.to_string(), output.clone());
    }
  }
  root.insert("nodes".to_string(), context.to_value());
  root.insert(
    "wallet".to_string(),
    json!({
      "address": wallet.address,
      "walletType": wallet.wallet_type,
      "walletCount": wallet.wallet_count(),
    }),
  );
  serde_json::Value::Object(root)
}

fn render_value(
  env: &Environment,
  key: &str,
  value: &serde_json::Value,
  ctx: &Value,
) -> Result<serde_json::Value, NodeError> {
  match value {
    serde_json::Value::String(s) if is_template(s) => env
      .render_str(s, ctx.clone())
      .map(serde_json::Value::String)
      .map_err(|e| NodeError::Template {
        key: key.to_string(),
        message: e.to_string(),
      }),
    serde_json::Value::Array(items) => items
      .iter()
      .map(|item| render_value(env, key, item, ctx))
      .collect::<Result<Vec<_>, _>>()
      .map(serde_json::Value::Array),
    serde_json::Value::Object(map) => map
      .iter()
      .map(|(k, v)| Ok((k.clone(), render_value(env, key, v, ctx)?)))
      .collect::<Result<serde_json::Map<_, _>, NodeError>>()
      .map(serde_json::Value::Object),
    other => Ok(other.clone()),
  }
}

fn is_template(s: &str) -> bool {
  s.contains("{{") || s.contains("{%")
}

fn contains_template(value: &serde_json::Value) -> bool {
  match value {
    serde_json::Value::String(s) => is_template(s),
    serde_json::Value::Array(items) => items.iter().any(contains_template),
    serde_json::Value::Object(map) => map.values().any(contains_template),
    _ => false,
  }
}

fn is_identifier(s: &str) -> bool {
  let mut chars = s.chars();
  matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    && s != "nodes"
    && s != "wallet"
}

#[cfg(test)]
mod tests {
  use super::*;
  use wraith_config::WalletType;

  fn data(value: serde_json::Value) -> NodeData {
    value.as_object().cloned().unwrap()
  }

  fn wallet() -> WalletInfo {
    WalletInfo::new("0xabc", WalletType::Metamask)
  }

  #[test]
  fn test_plain_values_pass_through() {
    let params = data(json!({ "token": "ETH", "threshold": 1000, "nested": { "a": [1, 2] } }));
    let rendered = render_params(&params, &ExecutionContext::new(), &wallet()).unwrap();
    assert_eq!(rendered, params);
  }

  #[test]
  fn test_renders_upstream_outputs() {
    let mut ctx = ExecutionContext::new();
    ctx.insert("price_eth", json!({ "token": "ETH", "price": 1200.5 }));
    ctx.insert("node-2", json!({ "currentGas": 30 }));

    let params = data(json!({
      "message": "ETH is {{ price_eth.price }}",
      "gas": "{{ nodes['node-2'].currentGas }}",
      "owner": "{{ wallet.address }}",
      "count": 3,
    }));
    let rendered = render_params(&params, &ctx, &wallet()).unwrap();

    assert_eq!(rendered["message"], "ETH is 1200.5");
    assert_eq!(rendered["gas"], "30");
    assert_eq!(rendered["owner"], "0xabc");
    assert_eq!(rendered["count"], 3);
  }

  #[test]
  fn test_renders_nested_values() {
    let mut ctx = ExecutionContext::new();
    ctx.insert("t", json!({ "name": "drop" }));

    let params = data(json!({ "tags": ["{{ t.name | upper }}", "static"] }));
    let rendered = render_params(&params, &ctx, &wallet()).unwrap();
    assert_eq!(rendered["tags"], json!(["DROP", "static"]));
  }

  #[test]
  fn test_render_error_names_parameter() {
    let params = data(json!({ "message": "{{ unclosed" }));
    let err = render_params(&params, &ExecutionContext::new(), &wallet()).unwrap_err();
    assert!(matches!(err, NodeError::Template { ref key, .. } if key == "message"));
  }

  #[test]
  fn test_identifier_rules() {
    assert!(is_identifier("price_eth"));
    assert!(is_identifier("_x1"));
    assert!(!is_identifier("node-1"));
    assert!(!is_identifier("1abc"));
    assert!(!is_identifier("wallet"));
  }
}
