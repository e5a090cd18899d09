//! Validation and setup errors for roster placement. A dedicated error enum
//! so callers can match on failure kind instead of string-matching a
//! message, the pattern `kuelshammer-battlesim2` uses for its `EngineError`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BattleError {
    #[error("team '{team}' is empty")]
    EmptyTeam { team: &'static str },

    #[error("team '{team}' exceeds the maximum roster size of {max} ({got} units)")]
    TeamTooLarge { team: &'static str, max: usize, got: usize },

    #[error("unit template '{0}' is not in the catalog")]
    UnknownUnitTemplate(String),

    #[error("unit '{instance_id}' deployment position {x},{y} is outside its team's deployment zone")]
    InvalidDeploymentPosition { instance_id: String, x: u8, y: u8 },

    #[error("two units were placed on the same cell: '{a}' and '{b}' both at {x},{y}")]
    DuplicatePosition { a: String, b: String, x: u8, y: u8 },

    #[error("position ({x}, {y}) is outside the {width}x{height} grid")]
    PositionOutOfBounds { x: i32, y: i32, width: u8, height: u8 },
}
