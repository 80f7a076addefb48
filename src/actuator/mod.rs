//! Actuator seam between the dispatcher and the hexapod body

#[cfg(test)]
pub mod mock;
mod sim;
mod traits;

pub use sim::SimulatedBody;
pub use traits::Actuator;
