//! Request and response schemas of the decision and telemetry endpoints

use crate::core::error::{AgentError, Result};
use crate::observation::Observation;
use crate::reward::{CurrentState, RewardEvent};
use crate::service::spaces::ActionSpaceConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /predict-action/{model}`
#[derive(Debug, Serialize)]
pub struct PredictRequest<'a> {
    pub observation: &'a Observation,
    pub action_space: &'a ActionSpaceConfig,
    pub bot_name: &'a str,
}

/// Policy output. Every field is optional; absent fields leave the
/// corresponding control released.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionCommand {
    pub movement: Option<i64>,
    pub jump: Option<bool>,
    pub sneak: Option<bool>,
    pub sprint: Option<bool>,
    pub attack: Option<bool>,
    pub use_item: Option<bool>,
    pub hotbar: Option<i64>,
    pub yaw: Option<f32>,
    pub pitch: Option<f32>,
}

fn int_field(map: &Map<String, Value>, key: &str, rejected: &mut Vec<String>) -> Option<i64> {
    let value = map.get(key).filter(|v| !v.is_null())?;
    // Policies emitting floats for bins send whole numbers like 2.0
    let parsed = value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    });
    if parsed.is_none() {
        rejected.push(key.to_owned());
    }
    parsed
}

fn bool_field(map: &Map<String, Value>, key: &str, rejected: &mut Vec<String>) -> Option<bool> {
    let value = map.get(key).filter(|v| !v.is_null())?;
    let parsed = value.as_bool();
    if parsed.is_none() {
        rejected.push(key.to_owned());
    }
    parsed
}

fn angle_field(map: &Map<String, Value>, key: &str, rejected: &mut Vec<String>) -> Option<f32> {
    let value = map.get(key).filter(|v| !v.is_null())?;
    let parsed = value
        .as_f64()
        .filter(|f| f.is_finite())
        .map(|f| f as f32);
    if parsed.is_none() {
        rejected.push(key.to_owned());
    }
    parsed
}

impl ActionCommand {
    /// Decode leniently: a field of the wrong type counts as absent and its
    /// key is returned in the second element.
    pub fn from_map(map: &Map<String, Value>) -> (Self, Vec<String>) {
        let mut rejected = Vec::new();
        let command = ActionCommand {
            movement: int_field(map, "movement", &mut rejected),
            jump: bool_field(map, "jump", &mut rejected),
            sneak: bool_field(map, "sneak", &mut rejected),
            sprint: bool_field(map, "sprint", &mut rejected),
            attack: bool_field(map, "attack", &mut rejected),
            use_item: bool_field(map, "useItem", &mut rejected),
            hotbar: int_field(map, "hotbar", &mut rejected),
            yaw: angle_field(map, "yaw", &mut rejected),
            pitch: angle_field(map, "pitch", &mut rejected),
        };
        (command, rejected)
    }
}

/// Decoded body of a `/predict-action` response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictResponse {
    pub action: ActionCommand,
    pub tick_rate: Option<f64>,
    /// Action fields dropped for having the wrong type
    pub rejected: Vec<String>,
}

impl PredictResponse {
    /// Parse a response body. Only body-level problems fail: invalid JSON, a
    /// non-object body, or an `action` that is not an object.
    pub fn parse(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)?;
        let root = value
            .as_object()
            .ok_or_else(|| AgentError::Decode("response body is not an object".into()))?;

        let (action, mut rejected) = match root.get("action") {
            None | Some(Value::Null) => (ActionCommand::default(), Vec::new()),
            Some(Value::Object(map)) => ActionCommand::from_map(map),
            Some(other) => {
                return Err(AgentError::Decode(format!(
                    "action must be an object, got {}",
                    other
                )))
            }
        };

        let tick_rate = match root.get("tick_rate") {
            None | Some(Value::Null) => None,
            Some(v) => {
                let rate = v.as_f64().filter(|r| r.is_finite() && *r > 0.0);
                if rate.is_none() {
                    rejected.push("tick_rate".into());
                }
                rate
            }
        };

        Ok(Self {
            action,
            tick_rate,
            rejected,
        })
    }
}

/// Body of `GET /set-model`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelSelection {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl ModelSelection {
    /// Route segment for `/predict-action/{model}`; an explicit endpoint wins
    /// over a version
    pub fn route(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .or(self.version.as_deref())
            .map(|s| s.trim_matches('/'))
            .filter(|s| !s.is_empty())
    }
}

/// Body of `POST /add-reward/`
#[derive(Debug, Serialize)]
pub struct RewardBatch<'a> {
    pub bot_name: &'a str,
    pub events: &'a [RewardEvent],
    pub current_state: &'a CurrentState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_response() {
        let resp = PredictResponse::parse(
            r#"{"action": {"movement": 2, "attack": true, "yaw": 4.5}, "tick_rate": 20}"#,
        )
        .unwrap();
        assert_eq!(resp.action.movement, Some(2));
        assert_eq!(resp.action.attack, Some(true));
        assert_eq!(resp.action.yaw, Some(4.5));
        assert_eq!(resp.action.jump, None);
        assert_eq!(resp.tick_rate, Some(20.0));
        assert!(resp.rejected.is_empty());
    }

    #[test]
    fn test_wrong_typed_fields_are_absent() {
        let resp = PredictResponse::parse(
            r#"{"action": {"movement": "left", "jump": 1, "hotbar": 3.0}, "tick_rate": "fast"}"#,
        )
        .unwrap();
        assert_eq!(resp.action.movement, None);
        assert_eq!(resp.action.jump, None);
        assert_eq!(resp.action.hotbar, Some(3));
        assert_eq!(resp.tick_rate, None);
        assert_eq!(resp.rejected, vec!["movement", "jump", "tick_rate"]);
    }

    #[test]
    fn test_body_level_failures() {
        assert!(PredictResponse::parse("not json").is_err());
        assert!(PredictResponse::parse("[1, 2]").is_err());
        assert!(matches!(
            PredictResponse::parse(r#"{"action": 5}"#),
            Err(AgentError::Decode(_))
        ));
    }

    #[test]
    fn test_missing_action_is_empty_command() {
        let resp = PredictResponse::parse(r#"{"tick_rate": 10.0}"#).unwrap();
        assert_eq!(resp.action, ActionCommand::default());
    }

    #[test]
    fn test_model_route_prefers_endpoint() {
        let both: ModelSelection =
            serde_json::from_str(r#"{"endpoint": "/ppo/", "version": "v2"}"#).unwrap();
        assert_eq!(both.route(), Some("ppo"));
        let version: ModelSelection = serde_json::from_str(r#"{"version": "v2"}"#).unwrap();
        assert_eq!(version.route(), Some("v2"));
        assert_eq!(ModelSelection::default().route(), None);
    }
}
