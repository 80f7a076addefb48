//! Simulated hexapod body
//!
//! Stands in for the physical driver: logs each primitive, tracks pose, and
//! blocks for the duration of timed moves the way the real body does.

use super::traits::Actuator;
use crate::config::BodyConfig;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct BodyPose {
    pub started: bool,
    pub heading_deg: f64,
    pub height: f64,
    pub pitch_deg: f64,
    /// Direction of the continuous walk, if walking
    pub walking: Option<f64>,
    pub relaxed: bool,
}

impl Default for BodyPose {
    fn default() -> Self {
        Self {
            started: false,
            heading_deg: 0.0,
            height: 0.0,
            pitch_deg: 0.0,
            walking: None,
            relaxed: true,
        }
    }
}

pub struct SimulatedBody {
    config: BodyConfig,
    pose: Mutex<BodyPose>,
}

impl SimulatedBody {
    pub fn new(config: BodyConfig) -> Self {
        Self {
            config,
            pose: Mutex::new(BodyPose::default()),
        }
    }

    /// Snapshot of the current pose
    pub fn pose(&self) -> BodyPose {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BodyPose> {
        // A poisoned pose is still a valid pose
        self.pose.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Actuator for SimulatedBody {
    async fn start(&self) -> Result<()> {
        if self.config.fail_start {
            bail!("{}: body did not respond to start", self.config.name);
        }
        self.lock().started = true;
        info!("[BODY] {} started", self.config.name);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut pose = self.lock();
        pose.started = false;
        pose.walking = None;
        pose.relaxed = true;
        info!("[BODY] {} closed", self.config.name);
        Ok(())
    }

    async fn stand_with_height(&self, height: f64) -> Result<()> {
        let mut pose = self.lock();
        pose.height = height;
        pose.relaxed = false;
        info!("[BODY] Stand with height {}", height);
        Ok(())
    }

    async fn move_head(&self, angle_deg: f64, duration_ms: u64) -> Result<()> {
        debug!("[BODY] Move head to {}° over {}ms", angle_deg, duration_ms);
        sleep(Duration::from_millis(duration_ms)).await;
        self.lock().heading_deg = angle_deg.rem_euclid(360.0);
        Ok(())
    }

    async fn pitch(&self, angle_deg: f64, duration_ms: u64) -> Result<()> {
        debug!("[BODY] Pitch {}° over {}ms", angle_deg, duration_ms);
        sleep(Duration::from_millis(duration_ms)).await;
        self.lock().pitch_deg = angle_deg;
        Ok(())
    }

    async fn walk_continuously(&self, direction_deg: f64, speed: f64) -> Result<()> {
        let mut pose = self.lock();
        pose.walking = Some(direction_deg);
        pose.relaxed = false;
        info!("[BODY] Walking towards {}° at {}", direction_deg, speed);
        Ok(())
    }

    async fn stop_walking_continuously(&self) -> Result<()> {
        if self.lock().walking.take().is_some() {
            info!("[BODY] Walk stopped");
        }
        Ok(())
    }

    async fn relax(&self) -> Result<()> {
        let mut pose = self.lock();
        pose.relaxed = true;
        pose.pitch_deg = 0.0;
        info!("[BODY] Relaxed");
        Ok(())
    }

    fn direction(&self) -> f64 {
        self.lock().heading_deg
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_move_head_blocks_for_duration() {
        let body = SimulatedBody::new(BodyConfig::default());
        let started = tokio::time::Instant::now();

        body.move_head(450.0, 500).await.unwrap();

        assert_eq!(started.elapsed(), Duration::from_millis(500));
        assert_eq!(body.direction(), 90.0);
    }

    #[tokio::test]
    async fn test_walk_and_relax_update_pose() {
        let body = SimulatedBody::new(BodyConfig::default());
        body.start().await.unwrap();
        body.walk_continuously(180.0, 1.0).await.unwrap();
        assert_eq!(body.pose().walking, Some(180.0));

        body.stop_walking_continuously().await.unwrap();
        body.relax().await.unwrap();

        let pose = body.pose();
        assert_eq!(pose.walking, None);
        assert!(pose.relaxed);
        assert!(pose.started);
    }

    #[tokio::test]
    async fn test_fail_start() {
        let body = SimulatedBody::new(BodyConfig {
            fail_start: true,
            ..Default::default()
        });
        assert!(body.start().await.is_err());
        assert!(!body.pose().started);
    }
}
