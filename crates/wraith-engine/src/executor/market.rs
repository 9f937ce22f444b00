use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::{Value, json};
use wraith_config::NodeData;
use wraith_host::{GasPrice, HostError};

use super::params::{self, opt_f64, opt_string};
use super::{NodeEnv, NodeOutcome};
use crate::context::{ExecutionContext, number};
use crate::error::NodeError;

/// Tolerance used by the `=` comparison.
const EQ_EPSILON: f64 = 0.001;

const DEFAULT_TOKEN: &str = "ETH";
const DEFAULT_CHAIN: &str = "ethereum";

/// A Condition node comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
  Gt,
  Gte,
  Lt,
  Lte,
  Eq,
}

impl Operator {
  pub fn evaluate(self, actual: f64, threshold: f64) -> bool {
    match self {
      Operator::Gt => actual > threshold,
      Operator::Gte => actual >= threshold,
      Operator::Lt => actual < threshold,
      Operator::Lte => actual <= threshold,
      Operator::Eq => (actual - threshold).abs() < EQ_EPSILON,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Operator::Gt => ">",
      Operator::Gte => ">=",
      Operator::Lt => "<",
      Operator::Lte => "<=",
      Operator::Eq => "=",
    }
  }
}

impl FromStr for Operator {
  type Err = NodeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      ">" | "gt" => Ok(Operator::Gt),
      ">=" | "gte" => Ok(Operator::Gte),
      "<" | "lt" => Ok(Operator::Lt),
      "<=" | "lte" => Ok(Operator::Lte),
      "=" | "==" | "eq" => Ok(Operator::Eq),
      other => Err(NodeError::InvalidParams(format!(
        "unknown operator '{}'",
        other
      ))),
    }
  }
}

impl fmt::Display for Operator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

async fn fetch_price(env: &NodeEnv, token: &str) -> Result<f64, NodeError> {
  let oracle = env
    .capabilities
    .prices
    .as_ref()
    .ok_or(NodeError::MissingCapability("price oracle"))?;
  oracle
    .get_price(token)
    .await?
    .ok_or_else(|| HostError::NotFound(format!("no price for '{}'", token)).into())
}

async fn fetch_gas(env: &NodeEnv, chain: &str) -> Result<GasPrice, NodeError> {
  let oracle = env
    .capabilities
    .gas
    .as_ref()
    .ok_or(NodeError::MissingCapability("gas oracle"))?;
  Ok(oracle.get_gas_price(chain).await?)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceCheckParams {
  #[serde(default, deserialize_with = "opt_string")]
  token: Option<String>,
  #[serde(default, deserialize_with = "opt_string")]
  price_source: Option<String>,
  #[serde(default, deserialize_with = "opt_f64")]
  threshold: Option<f64>,
  /// `above` or `below`.
  #[serde(default, alias = "condition", deserialize_with = "opt_string")]
  direction: Option<String>,
}

/// Fetch a token price. The threshold is informational and never halts the run.
pub(super) async fn price_check(data: &NodeData, env: &NodeEnv) -> Result<NodeOutcome, NodeError> {
  let p: PriceCheckParams = params::parse(data)?;
  let token = p.token.unwrap_or_else(|| DEFAULT_TOKEN.to_string()).to_uppercase();
  let direction = p.direction.unwrap_or_else(|| "above".to_string());

  let price = fetch_price(env, &token).await?;

  let condition_met = match (p.threshold, direction.as_str()) {
    (None, _) => Value::Null,
    (Some(t), "below") => json!(price < t),
    (Some(t), "above") => json!(price > t),
    (Some(_), other) => {
      return Err(NodeError::InvalidParams(format!(
        "direction must be 'above' or 'below', got '{}'",
        other
      )));
    }
  };

  Ok(NodeOutcome::success(json!({
    "token": token,
    "price": price,
    "source": p.price_source.unwrap_or_else(|| "oracle".to_string()),
    "threshold": p.threshold,
    "direction": direction,
    "conditionMet": condition_met,
  })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GasParams {
  #[serde(default, deserialize_with = "opt_string")]
  chain: Option<String>,
  #[serde(default, deserialize_with = "opt_f64")]
  max_gas: Option<f64>,
}

pub(super) async fn gas_optimizer(data: &NodeData, env: &NodeEnv) -> Result<NodeOutcome, NodeError> {
  let p: GasParams = params::parse(data)?;
  let chain = p.chain.unwrap_or_else(|| DEFAULT_CHAIN.to_string());

  let gas = fetch_gas(env, &chain).await?;
  let within_limit = p.max_gas.map(|max| gas.standard <= max).unwrap_or(true);

  Ok(NodeOutcome::success(json!({
    "chain": chain,
    "currentGas": gas.standard,
    "fastGas": gas.fast,
    "maxGas": p.max_gas,
    "optimized": within_limit,
  })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConditionParams {
  #[serde(default, deserialize_with = "opt_string")]
  condition_type: Option<String>,
  #[serde(default, deserialize_with = "opt_string")]
  token: Option<String>,
  #[serde(default, deserialize_with = "opt_string")]
  chain: Option<String>,
  #[serde(default, deserialize_with = "opt_string")]
  operator: Option<String>,
  #[serde(default, deserialize_with = "opt_f64")]
  value: Option<f64>,
  /// `<node_id>.<field>` for custom conditions.
  #[serde(default, deserialize_with = "opt_string")]
  field: Option<String>,
}

/// Where a Condition node's actual value came from.
enum ValueSource {
  Context(String),
  Oracle,
}

impl ValueSource {
  fn describe(&self) -> String {
    match self {
      ValueSource::Context(node_id) => format!("context:{}", node_id),
      ValueSource::Oracle => "oracle".to_string(),
    }
  }
}

/// Compare a value against a threshold; a false result halts the run.
///
/// `price` and `gas` read the most recent upstream value and fall back to the
/// oracles. `balance` has no collaborator to fall back to: it only passes
/// when an upstream output (or a single-node payload) carries a `balance`
/// for the token. `compare` and `custom` read `field` when given; `compare`
/// otherwise takes the most recent upstream `price`.
pub(super) async fn condition(
  data: &NodeData,
  context: &ExecutionContext,
  env: &NodeEnv,
) -> Result<NodeOutcome, NodeError> {
  let p: ConditionParams = params::parse(data)?;
  let condition_type = p.condition_type.unwrap_or_else(|| "price".to_string());
  let operator: Operator = p.operator.as_deref().unwrap_or(">").parse()?;
  let threshold = p
    .value
    .ok_or_else(|| NodeError::InvalidParams("condition value is required".to_string()))?;
  let requested_token = p.token.map(|t| t.to_uppercase());
  let token = requested_token
    .clone()
    .unwrap_or_else(|| DEFAULT_TOKEN.to_string());

  let (actual, source) = match condition_type.as_str() {
    "price" => match context.latest_number("price", Some(&token)) {
      Some((id, price)) => (price, ValueSource::Context(id.to_string())),
      None => (fetch_price(env, &token).await?, ValueSource::Oracle),
    },
    "gas" => match context.latest_number("currentGas", None) {
      Some((id, gas)) => (gas, ValueSource::Context(id.to_string())),
      None => {
        let chain = p.chain.unwrap_or_else(|| DEFAULT_CHAIN.to_string());
        (fetch_gas(env, &chain).await?.standard, ValueSource::Oracle)
      }
    },
    "balance" => context
      .latest_number("balance", Some(&token))
      .map(|(id, balance)| (balance, ValueSource::Context(id.to_string())))
      .ok_or_else(|| NodeError::Rejected(format!("no upstream balance for {}", token)))?,
    "custom" => {
      let field = p.field.ok_or_else(|| {
        NodeError::InvalidParams("custom conditions need a field like 'node_id.value'".to_string())
      })?;
      custom_value(context, &field)?
    }
    "compare" => match p.field {
      Some(field) => custom_value(context, &field)?,
      None => context
        .latest_number("price", requested_token.as_deref())
        .map(|(id, value)| (value, ValueSource::Context(id.to_string())))
        .ok_or_else(|| NodeError::Rejected("no upstream value to compare".to_string()))?,
    },
    other => {
      return Err(NodeError::InvalidParams(format!(
        "unknown condition type '{}'",
        other
      )));
    }
  };

  let passed = operator.evaluate(actual, threshold);
  let output = json!({
    "conditionType": condition_type,
    "token": token,
    "operator": operator.as_str(),
    "threshold": threshold,
    "actualValue": actual,
    "valueSource": source.describe(),
    "passed": passed,
    "branch": if passed { "true" } else { "false" },
  });

  Ok(if passed {
    NodeOutcome::success(output)
  } else {
    NodeOutcome::halted(output)
  })
}

/// Resolve `node_id.path.to.field` against the context.
fn custom_value(context: &ExecutionContext, field: &str) -> Result<(f64, ValueSource), NodeError> {
  let (node_id, path) = field
    .split_once('.')
    .ok_or_else(|| NodeError::InvalidParams(format!("field '{}' has no node id", field)))?;
  let output = context
    .get(node_id)
    .ok_or_else(|| NodeError::Rejected(format!("node '{}' has no output yet", node_id)))?;
  let pointer = format!("/{}", path.replace('.', "/"));
  output
    .pointer(&pointer)
    .and_then(number)
    .map(|n| (n, ValueSource::Context(node_id.to_string())))
    .ok_or_else(|| NodeError::Rejected(format!("'{}' is not a number", field)))
}
