use serde_json::Value;

/// Outputs of the nodes that have run so far, keyed by node id.
///
/// Entries keep the order in which nodes completed so lookups can prefer
/// the most recent producer of a value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionContext {
  entries: Vec<(String, Value)>,
}

impl ExecutionContext {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build a context from a JSON payload.
  ///
  /// An object is treated as `{ node_id: output }`. Any other value is stored
  /// under the key `trigger`.
  pub fn from_value(value: Value) -> Self {
    let mut context = Self::new();
    match value {
      Value::Object(map) => {
        for (node_id, output) in map {
          context.insert(node_id, output);
        }
      }
      Value::Null => {}
      other => context.insert("trigger", other),
    }
    context
  }

  /// Record a node's output, replacing any earlier output for the same id.
  pub fn insert(&mut self, node_id: impl Into<String>, output: Value) {
    let node_id = node_id.into();
    self.entries.retain(|(id, _)| *id != node_id);
    self.entries.push((node_id, output));
  }

  pub fn get(&self, node_id: &str) -> Option<&Value> {
    self
      .entries
      .iter()
      .find(|(id, _)| id == node_id)
      .map(|(_, v)| v)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Iterate entries in completion order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.entries.iter().map(|(id, v)| (id.as_str(), v))
  }

  /// Find the most recent numeric `field` in the context.
  ///
  /// When `token` is given, only outputs whose `token` field matches it
  /// (case-insensitively) are considered. Returns the producing node id
  /// along with the value.
  pub fn latest_number(&self, field: &str, token: Option<&str>) -> Option<(&str, f64)> {
    self.entries.iter().rev().find_map(|(id, output)| {
      if let Some(token) = token {
        let matches = output
          .get("token")
          .and_then(Value::as_str)
          .is_some_and(|t| t.eq_ignore_ascii_case(token));
        if !matches {
          return None;
        }
      }
      output.get(field).and_then(number).map(|n| (id.as_str(), n))
    })
  }

  /// The context as a JSON object `{ node_id: output }`.
  pub fn to_value(&self) -> Value {
    Value::Object(
      self
        .entries
        .iter()
        .map(|(id, v)| (id.clone(), v.clone()))
        .collect(),
    )
  }
}

/// Read a JSON number, or a string holding one.
pub(crate) fn number(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
    _ => None,
  }
}
