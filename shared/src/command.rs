//! Command tokens sent by the remote client

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A command the skill understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Greeting choreography: recenter, pitch left/right, stand down/up
    Start,
    /// Stop walking and relax
    Stop,
    Left,
    Right,
    Forward,
    Backward,
    /// Raise the body
    StandUp,
    /// Lower the body
    StandDown,
}

/// Returned when a token is not one of the known commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown command token: {0:?}")]
pub struct UnknownCommand(pub String);

impl Command {
    /// Every command, in wire order
    pub const ALL: [Command; 8] = [
        Command::Start,
        Command::Stop,
        Command::Left,
        Command::Right,
        Command::Forward,
        Command::Backward,
        Command::StandUp,
        Command::StandDown,
    ];

    /// Parse an exact wire token. Matching is case-sensitive.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "start" => Some(Command::Start),
            "stop" => Some(Command::Stop),
            "left" => Some(Command::Left),
            "right" => Some(Command::Right),
            "forward" => Some(Command::Forward),
            "backward" => Some(Command::Backward),
            "stand-up" => Some(Command::StandUp),
            "stand-down" => Some(Command::StandDown),
            _ => None,
        }
    }

    /// The wire token for this command
    pub fn token(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Stop => "stop",
            Command::Left => "left",
            Command::Right => "right",
            Command::Forward => "forward",
            Command::Backward => "backward",
            Command::StandUp => "stand-up",
            Command::StandDown => "stand-down",
        }
    }

    /// Whether this command starts a directional walk
    pub fn is_walk(&self) -> bool {
        matches!(
            self,
            Command::Left | Command::Right | Command::Forward | Command::Backward
        )
    }

    /// Whether this command runs as a background motion
    pub fn is_motion(&self) -> bool {
        !matches!(self, Command::Stop)
    }
}

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::from_token(s).ok_or_else(|| UnknownCommand(s.to_string()))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
