//! Skill lifecycle
//!
//! This module handles:
//! - The hooks the connection layer calls (start, connect, disconnect, close, messages)
//! - Gating commands on the link state
//! - Turning a disconnect into a shutdown request for the host

mod handler;
mod host;
mod motion_skill;

pub use handler::{ShutdownReason, SkillHandler};
pub use host::host;
pub use motion_skill::MotionSkill;
