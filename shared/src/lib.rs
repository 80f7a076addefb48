//! Hexapod Skill Shared Types
//!
//! This crate provides the command tokens, motion constants, link state
//! machine and framing codec shared by the robot-side skill and the remote
//! client.

pub mod codec;
pub mod command;
pub mod state_machine;

pub use codec::{Frame, FrameKind};
pub use command::{Command, UnknownCommand};
pub use state_machine::{LinkEvent, LinkState, LinkStateMachine, TransitionResult};

/// Motion parameters for the hexapod body
pub mod motion {
    /// Target time between command receipt and motion response
    pub const REACTION_LATENCY_MS: u64 = 1000;

    /// How long a directional walk is held before stopping
    pub const MOVE_DURATION_MS: u64 = 2000;

    /// Time given to the head to return to its neutral angle
    pub const HEAD_RECENTER_DURATION_MS: u64 = 500;

    /// Neutral head angle in degrees
    pub const HEAD_NEUTRAL_DEG: f64 = 0.0;

    /// Continuous walk speed (cm per second)
    pub const WALK_SPEED: f64 = 1.0;

    /// Body height for "stand-up"
    pub const STAND_UP_HEIGHT: f64 = 50.0;

    /// Body height for "stand-down"
    pub const STAND_DOWN_HEIGHT: f64 = -10.0;

    pub const DIRECTION_FORWARD_DEG: f64 = 0.0;
    pub const DIRECTION_LEFT_DEG: f64 = 90.0;
    pub const DIRECTION_BACKWARD_DEG: f64 = 180.0;
    pub const DIRECTION_RIGHT_DEG: f64 = 270.0;

    /// Start sequence pitch swing in degrees (left is negative)
    pub const START_PITCH_DEG: f64 = 20.0;

    /// Duration of the first (leftward) start pitch
    pub const START_PITCH_LEFT_MS: u64 = 750;

    /// Duration of the second (rightward) start pitch
    pub const START_PITCH_RIGHT_MS: u64 = 1500;
}

/// Link parameters for the remote connection
pub mod link {
    /// Default TCP port the skill listens on
    pub const DEFAULT_PORT: u16 = 5670;

    /// Time the remote waits for the robot to finish a motion before sending another
    pub const REMOTE_BUSY_WINDOW_MS: u64 = 2500;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_angles_are_cardinal() {
        let angles = [
            motion::DIRECTION_FORWARD_DEG,
            motion::DIRECTION_LEFT_DEG,
            motion::DIRECTION_BACKWARD_DEG,
            motion::DIRECTION_RIGHT_DEG,
        ];
        for angle in angles {
            assert!((0.0..360.0).contains(&angle));
            assert_eq!(angle % 90.0, 0.0);
        }
    }

    #[test]
    fn test_stand_heights_ordered() {
        assert!(motion::STAND_UP_HEIGHT > motion::STAND_DOWN_HEIGHT);
    }
}
