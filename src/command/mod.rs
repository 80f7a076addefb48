//! Command dispatch for the hexapod body
//!
//! This module handles:
//! - Mapping command tokens to actuator calls
//! - Spawning long-running motions as tracked background tasks
//! - The stop signal shared with in-flight motions
//! - Optional preemption and cooperative-stop policies

mod cancel;
mod dispatcher;
mod task;

pub use dispatcher::MotionDispatcher;
