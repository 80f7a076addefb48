//! Actuator trait abstraction for the physical body

use anyhow::Result;
use async_trait::async_trait;

/// Motion primitives of a hexapod body
///
/// Calls may arrive concurrently from several motion tasks; implementations
/// serialise internally if the hardware needs it.
#[async_trait]
pub trait Actuator: Send + Sync + 'static {
    /// Energise the body
    async fn start(&self) -> Result<()>;

    /// Release the body
    async fn close(&self) -> Result<()>;

    async fn stand_with_height(&self, height: f64) -> Result<()>;

    /// Rotate the head to `angle_deg` over `duration_ms`
    async fn move_head(&self, angle_deg: f64, duration_ms: u64) -> Result<()>;

    /// Tilt the body by `angle_deg` over `duration_ms`
    async fn pitch(&self, angle_deg: f64, duration_ms: u64) -> Result<()>;

    /// Walk towards `direction_deg` until told to stop
    async fn walk_continuously(&self, direction_deg: f64, speed: f64) -> Result<()>;

    async fn stop_walking_continuously(&self) -> Result<()>;

    /// De-energise all legs
    async fn relax(&self) -> Result<()>;

    /// Current heading in degrees
    fn direction(&self) -> f64;

    /// Human-readable name for this body
    fn name(&self) -> &'static str;
}
