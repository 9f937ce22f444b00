//! Typed parameter parsing.
//!
//! Node data comes from a visual editor, so numbers and flags may arrive as
//! strings. The deserializers here accept both forms and treat empty strings
//! as absent.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use wraith_config::NodeData;

use crate::error::NodeError;

/// Parse a node's (rendered) data into its parameter struct.
pub(crate) fn parse<T: DeserializeOwned>(data: &NodeData) -> Result<T, NodeError> {
  serde_json::from_value(Value::Object(data.clone()))
    .map_err(|e| NodeError::InvalidParams(e.to_string()))
}

pub(crate) fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<Value>::deserialize(deserializer)? {
    None | Some(Value::Null) => Ok(None),
    Some(Value::Number(n)) => Ok(n.as_f64()),
    Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
    Some(Value::String(s)) => match s.trim().parse::<f64>() {
      Ok(n) if n.is_finite() => Ok(Some(n)),
      _ => Err(de::Error::custom(format!("expected a number, got '{}'", s))),
    },
    Some(other) => Err(de::Error::custom(format!(
      "expected a number, got {}",
      other
    ))),
  }
}

pub(crate) fn opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
  D: Deserializer<'de>,
{
  match opt_f64(deserializer)? {
    None => Ok(None),
    Some(n) if n >= 0.0 && n.is_finite() => Ok(Some(n.floor() as u64)),
    Some(n) => Err(de::Error::custom(format!(
      "expected a non-negative count, got {}",
      n
    ))),
  }
}

pub(crate) fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<Value>::deserialize(deserializer)? {
    None | Some(Value::Null) => Ok(None),
    Some(Value::Bool(b)) => Ok(Some(b)),
    Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
      "" => Ok(None),
      "true" => Ok(Some(true)),
      "false" => Ok(Some(false)),
      _ => Err(de::Error::custom(format!("expected a boolean, got '{}'", s))),
    },
    Some(other) => Err(de::Error::custom(format!(
      "expected a boolean, got {}",
      other
    ))),
  }
}

/// An amount that is either a number of token units or a symbolic quantity
/// such as `"all"` or `"rewards"`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Amount {
  Units(f64),
  Symbolic(String),
}

pub(crate) fn opt_amount<'de, D>(deserializer: D) -> Result<Option<Amount>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<Value>::deserialize(deserializer)? {
    None | Some(Value::Null) => Ok(None),
    Some(Value::Number(n)) => match n.as_f64() {
      Some(n) if n.is_finite() => Ok(Some(Amount::Units(n))),
      _ => Err(de::Error::custom(format!("expected an amount, got {}", n))),
    },
    Some(Value::String(s)) => {
      let s = s.trim();
      if s.is_empty() {
        return Ok(None);
      }
      match s.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(Some(Amount::Units(n))),
        Ok(_) => Err(de::Error::custom(format!("expected an amount, got '{}'", s))),
        Err(_) => Ok(Some(Amount::Symbolic(s.to_lowercase()))),
      }
    }
    Some(other) => Err(de::Error::custom(format!(
      "expected an amount, got {}",
      other
    ))),
  }
}

/// A string parameter, with empty strings treated as absent.
pub(crate) fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<Value>::deserialize(deserializer)? {
    None | Some(Value::Null) => Ok(None),
    Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
    Some(Value::String(s)) => Ok(Some(s)),
    Some(Value::Number(n)) => Ok(Some(n.to_string())),
    Some(Value::Bool(b)) => Ok(Some(b.to_string())),
    Some(other) => Err(de::Error::custom(format!(
      "expected a string, got {}",
      other
    ))),
  }
}
