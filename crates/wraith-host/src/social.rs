use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::HostError;
use crate::token::truncate_address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialPlatform {
  Twitter,
  Discord,
  Galxe,
}

impl fmt::Display for SocialPlatform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      SocialPlatform::Twitter => "twitter",
      SocialPlatform::Discord => "discord",
      SocialPlatform::Galxe => "galxe",
    })
  }
}

/// A task to perform on a social platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialTask {
  pub platform: SocialPlatform,
  /// Platform action, e.g. `follow`, `retweet`, `message`, `join`.
  pub action: String,
  /// Account, server or campaign the action targets.
  pub target: String,
  /// Remaining platform-specific settings (channel, message, wallet, ...).
  #[serde(default)]
  pub config: serde_json::Map<String, serde_json::Value>,
}

/// The result reported by a connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialOutcome {
  pub success: bool,
  pub message: String,
  #[serde(default)]
  pub data: serde_json::Value,
}

/// Performs tasks on social platforms.
#[async_trait]
pub trait SocialConnector: Send + Sync {
  async fn perform_task(&self, task: &SocialTask) -> Result<SocialOutcome, HostError>;
}

/// A connector that validates tasks and reports what it would have done.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSocialConnector;

#[async_trait]
impl SocialConnector for SimulatedSocialConnector {
  async fn perform_task(&self, task: &SocialTask) -> Result<SocialOutcome, HostError> {
    if task.target.trim().is_empty() {
      return Err(HostError::Rejected(format!(
        "{} task '{}' has no target",
        task.platform, task.action
      )));
    }

    let setting = |key: &str| task.config.get(key).cloned().unwrap_or(serde_json::Value::Null);

    let data = match task.platform {
      SocialPlatform::Twitter => json!({
        "taskType": task.action,
        "target": task.target,
        "completed": true,
        "simulated": true,
        "note": "Configure a Twitter connector for real execution",
      }),
      SocialPlatform::Discord => json!({
        "taskType": task.action,
        "serverId": task.target,
        "channelId": setting("channelId"),
        "message": setting("message"),
        "completed": true,
        "simulated": true,
        "note": "Configure a Discord bot token or webhook for real execution",
      }),
      SocialPlatform::Galxe => {
        let wallet = task
          .config
          .get("walletAddress")
          .and_then(|v| v.as_str())
          .map(truncate_address)
          .unwrap_or_else(|| "not provided".to_string());
        json!({
          "campaignName": task.target,
          "campaignUrl": setting("campaignUrl"),
          "walletAddress": wallet,
          "status": "eligibility_checked",
          "eligible": true,
          "simulated": true,
          "note": "Configure a Galxe access token for real campaign interaction",
        })
      }
    };

    Ok(SocialOutcome {
      success: true,
      message: format!("simulated {} {} on {}", task.platform, task.action, task.target),
      data,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn task(platform: SocialPlatform, action: &str, target: &str) -> SocialTask {
    SocialTask {
      platform,
      action: action.to_string(),
      target: target.to_string(),
      config: Default::default(),
    }
  }

  #[tokio::test]
  async fn test_twitter_follow_is_simulated() {
    let outcome = SimulatedSocialConnector
      .perform_task(&task(SocialPlatform::Twitter, "follow", "@solana"))
      .await
      .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.data["target"], "@solana");
    assert_eq!(outcome.data["simulated"], true);
  }

  #[tokio::test]
  async fn test_galxe_truncates_wallet() {
    let mut t = task(SocialPlatform::Galxe, "claim", "Summer Quest");
    t.config.insert("walletAddress".to_string(), json!("0xabcdef123456"));

    let outcome = SimulatedSocialConnector.perform_task(&t).await.unwrap();
    assert_eq!(outcome.data["walletAddress"], "0xabcd...");
    assert_eq!(outcome.data["status"], "eligibility_checked");
  }

  #[tokio::test]
  async fn test_missing_target_is_rejected() {
    let result = SimulatedSocialConnector
      .perform_task(&task(SocialPlatform::Discord, "join", " "))
      .await;
    assert!(matches!(result, Err(HostError::Rejected(_))));
  }
}
