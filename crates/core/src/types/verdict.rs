//! Feedback verdicts issued by judge nodes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Outcome of a feedback judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    /// Output accepted; commit and move on.
    Pass,
    /// Re-dispatch the judged node with the feedback message attached.
    NeedRetry,
    /// The plan itself is unsound; route back to the planner.
    NeedPlanFix,
}

impl VerdictStatus {
    /// Wire/label form of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictStatus::Pass => "pass",
            VerdictStatus::NeedRetry => "need_retry",
            VerdictStatus::NeedPlanFix => "need_plan_fix",
        }
    }
}

/// A judge's decision plus its free-text reasoning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackVerdict {
    pub status: VerdictStatus,
    pub message: Option<String>,
}

impl FeedbackVerdict {
    pub fn pass() -> Self {
        Self {
            status: VerdictStatus::Pass,
            message: None,
        }
    }

    pub fn retry(message: impl Into<String>) -> Self {
        Self {
            status: VerdictStatus::NeedRetry,
            message: Some(message.into()),
        }
    }

    pub fn plan_fix(message: impl Into<String>) -> Self {
        Self {
            status: VerdictStatus::NeedPlanFix,
            message: Some(message.into()),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.status == VerdictStatus::Pass
    }

    /// Parse the JSON a judge LLM replies with.
    ///
    /// The wire format is `{"validation_status": "...", "feedback_message": "..."}`.
    /// Status aliases from the various judge prompts are all accepted
    /// (`need_fix`, `need_plan_fix`, `need_regenerate` and so on).
    pub fn from_judge_json(value: &Value) -> Result<Self> {
        let status_str = value
            .get("validation_status")
            .or_else(|| value.get("status"))
            .and_then(Value::as_str)
            .ok_or_else(|| Error::judge("judge reply carries no validation_status"))?;

        let message = value
            .get("feedback_message")
            .or_else(|| value.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .filter(|m| !m.is_empty());

        let status = match status_str.trim().to_ascii_lowercase().as_str() {
            "pass" | "ok" => VerdictStatus::Pass,
            "need_retry" | "retry" | "need_regenerate" => VerdictStatus::NeedRetry,
            "need_plan_fix" | "need_fix" | "plan_fix" => VerdictStatus::NeedPlanFix,
            other => {
                return Err(Error::judge(format!("unknown validation_status: {other}")));
            }
        };

        Ok(Self { status, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_pass() {
        let v = FeedbackVerdict::from_judge_json(&json!({
            "validation_status": "pass",
            "feedback_message": "Plan is valid"
        }))
        .unwrap();
        assert!(v.is_pass());
        assert_eq!(v.message.as_deref(), Some("Plan is valid"));
    }

    #[test]
    fn parses_retry_and_plan_fix_aliases() {
        for (raw, expected) in [
            ("need_retry", VerdictStatus::NeedRetry),
            ("need_regenerate", VerdictStatus::NeedRetry),
            ("need_fix", VerdictStatus::NeedPlanFix),
            ("need_plan_fix", VerdictStatus::NeedPlanFix),
        ] {
            let v = FeedbackVerdict::from_judge_json(&json!({"validation_status": raw})).unwrap();
            assert_eq!(v.status, expected, "alias {raw}");
        }
    }

    #[test]
    fn missing_status_is_a_judge_error() {
        assert!(FeedbackVerdict::from_judge_json(&json!({"feedback_message": "x"})).is_err());
    }
}
