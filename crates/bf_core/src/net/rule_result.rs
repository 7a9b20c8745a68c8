use serde::{Deserialize, Serialize};

use crate::engine::rules::{RuleState, TurnOutcome};
use crate::error::{CoreError, Result};
use crate::models::{TeamSide, Vec2};

/// "Rule result" event sent after a turn resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    pub state: RuleState,
    pub active: TeamSide,
    pub changed_ball_owner: bool,
    pub set_piece_at: Option<Vec2>,
    pub goal: Option<TeamSide>,
    /// Turn counter after the resolution, for ordering on the receiver
    pub turn: u32,
}

impl RuleResult {
    pub fn from_outcome(outcome: &TurnOutcome, turn: u32) -> Self {
        Self {
            state: outcome.state,
            active: outcome.active,
            changed_ball_owner: outcome.changed_ball_owner,
            set_piece_at: outcome.set_piece_at,
            goal: outcome.goal,
            turn,
        }
    }

    pub fn to_outcome(&self) -> TurnOutcome {
        TurnOutcome {
            state: self.state,
            active: self.active,
            changed_ball_owner: self.changed_ball_owner,
            set_piece_at: self.set_piece_at,
            goal: self.goal,
        }
    }
}

/// Compact MessagePack payload for the network layer.
pub fn encode_rule_result(result: &RuleResult) -> Result<Vec<u8>> {
    rmp_serde::to_vec(result).map_err(|e| CoreError::Serialization(e.to_string()))
}

pub fn decode_rule_result(bytes: &[u8]) -> Result<RuleResult> {
    rmp_serde::from_slice(bytes).map_err(|e| CoreError::Deserialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vec2;

    #[test]
    fn test_wire_payload_decodes_to_same_result() {
        let result = RuleResult {
            state: RuleState::CornerKick,
            active: TeamSide::Away,
            changed_ball_owner: true,
            set_piece_at: Some(vec2(-38.9, 58.9)),
            goal: None,
            turn: 17,
        };
        let bytes = encode_rule_result(&result).unwrap();
        assert_eq!(decode_rule_result(&bytes).unwrap(), result);
    }

    #[test]
    fn test_truncated_payload_is_rejected() {
        let bytes = encode_rule_result(&RuleResult {
            state: RuleState::Normal,
            active: TeamSide::Home,
            changed_ball_owner: false,
            set_piece_at: None,
            goal: None,
            turn: 1,
        })
        .unwrap();
        let result = decode_rule_result(&bytes[..bytes.len() / 2]);
        assert!(matches!(result, Err(CoreError::Deserialization(_))));
    }
}
