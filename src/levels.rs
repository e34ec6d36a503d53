// Gate definitions and the campaign data.

use thiserror::Error;

use crate::progression::Direction;

/// Misconfiguration detectable when the game is assembled. Runtime engine
/// operations never fail; only construction does.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("campaign has no gates")]
    EmptyCampaign,

    #[error("gate {0} has no required directions")]
    EmptyGate(usize),

    /// A gate that costs nothing could never end the game.
    #[error("gate {0} has a zero penalty weight")]
    ZeroPenalty(usize),

    #[error("starting light {0} is outside 1..=5")]
    LightOutOfRange(u32),
}

/// One gate of the escape: the direction sequence Luma must walk, plus the
/// content the presentation layer needs. The engine never reads the content
/// fields.
#[derive(Debug, Clone)]
pub struct LevelDefinition {
    /// Directions that must be chosen, in order, to clear the gate.
    pub required: &'static [Direction],
    /// The wrong direction that walks straight into this gate's own guard.
    /// Any other wrong choice runs into the roaming guard instead.
    pub ambush: Direction,
    /// Light bars lost on a wrong choice.
    pub penalty: u32,
    pub prompt: &'static str,
    pub background: &'static str,
    pub guard_image: &'static str,
}

/// The ordered gates of a run. Validated on construction, immutable after.
#[derive(Debug, Clone)]
pub struct LevelSet {
    gates: Vec<LevelDefinition>,
}

impl LevelSet {
    pub fn new(gates: Vec<LevelDefinition>) -> Result<Self, ConfigError> {
        if gates.is_empty() {
            return Err(ConfigError::EmptyCampaign);
        }
        for (index, gate) in gates.iter().enumerate() {
            if gate.required.is_empty() {
                return Err(ConfigError::EmptyGate(index));
            }
            if gate.penalty == 0 {
                return Err(ConfigError::ZeroPenalty(index));
            }
        }
        Ok(Self { gates })
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn get(&self, index: usize) -> Option<&LevelDefinition> {
        self.gates.get(index)
    }
}

const PROMPT: &str = "Which way will Luma go? LEFT, RIGHT, or FORWARD?";

/// The three gates of the shadow realm. The last gate is shorter but a wrong
/// turn there costs double.
pub fn campaign() -> Result<LevelSet, ConfigError> {
    use Direction::{Left, Right, Straight};

    LevelSet::new(vec![
        LevelDefinition {
            required: &[Right, Straight, Left],
            ambush: Straight,
            penalty: 1,
            prompt: PROMPT,
            background: "levels/gate1.png",
            guard_image: "guards/guard1.png",
        },
        LevelDefinition {
            required: &[Straight, Left, Right],
            ambush: Right,
            penalty: 1,
            prompt: PROMPT,
            background: "levels/gate2.png",
            guard_image: "guards/guard2.png",
        },
        LevelDefinition {
            required: &[Left, Straight],
            ambush: Left,
            penalty: 2,
            prompt: PROMPT,
            background: "levels/gate3.png",
            guard_image: "guards/guard3.png",
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::{Left, Right, Straight};

    fn gate(required: &'static [Direction], penalty: u32) -> LevelDefinition {
        LevelDefinition {
            required,
            ambush: Straight,
            penalty,
            prompt: "",
            background: "",
            guard_image: "",
        }
    }

    #[test]
    fn campaign_is_valid() {
        let campaign = campaign().unwrap();
        assert_eq!(campaign.len(), 3);
        assert_eq!(campaign.get(0).unwrap().required, &[Right, Straight, Left]);
        assert_eq!(campaign.get(2).unwrap().penalty, 2);
        assert!(campaign.get(3).is_none());
    }

    #[test]
    fn empty_campaign_is_rejected() {
        assert!(matches!(
            LevelSet::new(Vec::new()),
            Err(ConfigError::EmptyCampaign)
        ));
    }

    #[test]
    fn gate_without_directions_is_rejected() {
        let gates = vec![gate(&[Left], 1), gate(&[], 1)];
        assert!(matches!(LevelSet::new(gates), Err(ConfigError::EmptyGate(1))));
    }

    #[test]
    fn zero_penalty_is_rejected() {
        let gates = vec![gate(&[Left], 0)];
        assert!(matches!(
            LevelSet::new(gates),
            Err(ConfigError::ZeroPenalty(0))
        ));
    }
}
