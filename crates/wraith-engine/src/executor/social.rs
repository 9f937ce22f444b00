use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};
use wraith_config::NodeData;
use wraith_host::{SocialPlatform, SocialTask};

use super::params::{self, opt_string};
use super::{NodeEnv, NodeOutcome};
use crate::error::NodeError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlertParams {
  #[serde(default, deserialize_with = "opt_string")]
  alert_type: Option<String>,
  #[serde(default, deserialize_with = "opt_string")]
  message: Option<String>,
  #[serde(default, deserialize_with = "opt_string")]
  webhook_url: Option<String>,
}

/// Alerts are delivered to the log.
pub(super) fn alert(data: &NodeData, env: &NodeEnv) -> Result<NodeOutcome, NodeError> {
  let p: AlertParams = params::parse(data)?;
  let alert_type = p.alert_type.unwrap_or_else(|| "webhook".to_string());
  let message = p.message.unwrap_or_else(|| "Flow alert".to_string());

  info!(run_id = %env.run_id, alert_type = %alert_type, message = %message, "alert");

  Ok(NodeOutcome::success(json!({
    "alertType": alert_type,
    "message": message,
    "webhookUrl": p.webhook_url,
    "sent": true,
  })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SocialParams {
  #[serde(default, alias = "action", deserialize_with = "opt_string")]
  task_type: Option<String>,
  #[serde(default, deserialize_with = "opt_string")]
  target: Option<String>,
  #[serde(default, deserialize_with = "opt_string")]
  server_id: Option<String>,
  #[serde(default, deserialize_with = "opt_string")]
  campaign_name: Option<String>,
}

fn default_action(platform: SocialPlatform) -> &'static str {
  match platform {
    SocialPlatform::Twitter => "follow",
    SocialPlatform::Discord => "join",
    SocialPlatform::Galxe => "claim",
  }
}

/// Turn node parameters into a connector task.
///
/// The target is the account (Twitter), server (Discord) or campaign (Galxe).
/// Every other parameter is forwarded as platform config.
fn build_task(platform: SocialPlatform, data: &NodeData, env: &NodeEnv) -> Result<SocialTask, NodeError> {
  let p: SocialParams = params::parse(data)?;

  let target = match platform {
    SocialPlatform::Twitter => p.target,
    SocialPlatform::Discord => p.server_id.or(p.target),
    SocialPlatform::Galxe => p.campaign_name.or(p.target),
  }
  .unwrap_or_default();

  let mut config = data.clone();
  for key in ["taskType", "action", "target", "serverId", "campaignName", "label"] {
    config.remove(key);
  }
  if platform == SocialPlatform::Galxe && !config.contains_key("walletAddress") {
    config.insert(
      "walletAddress".to_string(),
      Value::String(env.wallet.address.clone()),
    );
  }

  Ok(SocialTask {
    platform,
    action: p
      .task_type
      .unwrap_or_else(|| default_action(platform).to_string()),
    target,
    config,
  })
}

/// Run a Twitter, Discord or Galxe task through the social connector.
///
/// An unsuccessful outcome fails the node. Without a connector the task is
/// recorded as simulated.
pub(super) async fn social_task(
  platform: SocialPlatform,
  data: &NodeData,
  env: &NodeEnv,
) -> Result<NodeOutcome, NodeError> {
  let task = build_task(platform, data, env)?;

  let Some(connector) = env.capabilities.social.as_ref() else {
    debug!(run_id = %env.run_id, %platform, "no social connector configured, recording placeholder");
    return Ok(NodeOutcome::success(json!({
      "platform": platform,
      "taskType": task.action,
      "target": task.target,
      "completed": true,
      "simulated": true,
    })));
  };

  let outcome = connector.perform_task(&task).await?;
  if !outcome.success {
    return Err(NodeError::Rejected(outcome.message));
  }

  Ok(NodeOutcome::success(json!({
    "platform": platform,
    "taskType": task.action,
    "target": task.target,
    "message": outcome.message,
    "result": outcome.data,
    "completed": true,
  })))
}
