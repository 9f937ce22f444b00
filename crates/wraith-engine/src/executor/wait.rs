use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use wraith_config::NodeData;

use super::params::{self, opt_bool, opt_f64, opt_string};
use super::{NodeEnv, NodeOutcome};
use crate::error::NodeError;

const DEFAULT_DURATION: f64 = 60.0;
const DEFAULT_RANDOM_RANGE_PCT: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeUnit {
  Seconds,
  Minutes,
  Hours,
}

impl TimeUnit {
  fn parse(s: &str) -> Result<Self, NodeError> {
    match s.trim().to_ascii_lowercase().as_str() {
      "s" | "sec" | "second" | "seconds" => Ok(TimeUnit::Seconds),
      "m" | "min" | "minute" | "minutes" => Ok(TimeUnit::Minutes),
      "h" | "hour" | "hours" => Ok(TimeUnit::Hours),
      other => Err(NodeError::InvalidParams(format!(
        "unknown time unit '{}'",
        other
      ))),
    }
  }

  fn millis(self) -> f64 {
    match self {
      TimeUnit::Seconds => 1_000.0,
      TimeUnit::Minutes => 60_000.0,
      TimeUnit::Hours => 3_600_000.0,
    }
  }

  fn as_str(self) -> &'static str {
    match self {
      TimeUnit::Seconds => "seconds",
      TimeUnit::Minutes => "minutes",
      TimeUnit::Hours => "hours",
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WaitParams {
  #[serde(default, deserialize_with = "opt_f64")]
  duration: Option<f64>,
  #[serde(default, deserialize_with = "opt_string")]
  unit: Option<String>,
  #[serde(default, deserialize_with = "opt_bool")]
  randomize: Option<bool>,
  /// Variance as a percentage of the base duration.
  #[serde(default, deserialize_with = "opt_f64")]
  random_range: Option<f64>,
}

/// Scale `base_ms` by a factor drawn uniformly from `[1 - range, 1 + range)`.
///
/// `sample` is a uniform draw from `[0, 1)`.
fn apply_variance(base_ms: f64, range_pct: f64, sample: f64) -> f64 {
  let variance = (range_pct / 100.0).clamp(0.0, 1.0);
  let factor = 1.0 + (sample * 2.0 - 1.0) * variance;
  (base_ms * factor).max(0.0)
}

pub(super) async fn wait_delay(data: &NodeData, env: &NodeEnv) -> Result<NodeOutcome, NodeError> {
  let p: WaitParams = params::parse(data)?;

  let duration = p.duration.unwrap_or(DEFAULT_DURATION);
  if !duration.is_finite() || duration < 0.0 {
    return Err(NodeError::InvalidParams(format!(
      "wait duration must be non-negative, got {}",
      duration
    )));
  }
  let unit = match p.unit.as_deref() {
    Some(unit) => TimeUnit::parse(unit)?,
    None => TimeUnit::Seconds,
  };
  let randomized = p.randomize.unwrap_or(false);

  let mut wait_ms = duration * unit.millis();
  if randomized {
    let range = p.random_range.unwrap_or(DEFAULT_RANDOM_RANGE_PCT);
    wait_ms = apply_variance(wait_ms, range, rand::random::<f64>());
  }

  let mut wait = Duration::from_millis(wait_ms.floor() as u64);
  let capped = match env.max_wait {
    Some(max) if wait > max => {
      wait = max;
      true
    }
    _ => false,
  };

  debug!(run_id = %env.run_id, wait_ms = wait.as_millis() as u64, capped, "waiting");
  tokio::time::sleep(wait).await;

  Ok(NodeOutcome::success(json!({
    "waited": wait.as_secs_f64(),
    "requested": duration,
    "unit": unit.as_str(),
    "randomized": randomized,
    "capped": capped,
  })))
}
