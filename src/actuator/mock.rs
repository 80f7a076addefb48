//! Recording actuator for tests
//!
//! Every primitive is recorded with the (tokio) instant it was issued. Calls
//! return immediately so holds in the dispatcher are the only time that
//! passes, unless the actuator is built `timed()`.

use super::traits::Actuator;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    Start,
    Close,
    StandWithHeight(f64),
    MoveHead { angle_deg: f64, duration_ms: u64 },
    Pitch { angle_deg: f64, duration_ms: u64 },
    WalkContinuously { direction_deg: f64, speed: f64 },
    StopWalkingContinuously,
    Relax,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub call: ActuatorCall,
    /// Time since the actuator was created
    pub at: Duration,
}

pub struct RecordingActuator {
    epoch: Instant,
    calls: Mutex<Vec<RecordedCall>>,
    failing: Mutex<Vec<ActuatorCall>>,
    /// Head moves and pitches take their full duration
    timed: bool,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(Vec::new()),
            timed: false,
        }
    }

    /// Make every `start()` call fail
    pub fn failing_start() -> Self {
        let actuator = Self::new();
        actuator.fail_on(ActuatorCall::Start);
        actuator
    }

    /// Block for head move and pitch durations like a real body
    pub fn timed() -> Self {
        Self {
            timed: true,
            ..Self::new()
        }
    }

    /// Fail every call equal to `call`; the call is still recorded
    pub fn fail_on(&self, call: ActuatorCall) {
        self.failing.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<ActuatorCall> {
        self.recorded().into_iter().map(|r| r.call).collect()
    }

    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Count calls matching a predicate
    pub fn count_where(&self, pred: impl Fn(&ActuatorCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|r| pred(&r.call)).count()
    }

    fn record(&self, call: ActuatorCall) -> Result<()> {
        let at = self.epoch.elapsed();
        self.calls.lock().unwrap().push(RecordedCall {
            call: call.clone(),
            at,
        });
        if self.failing.lock().unwrap().contains(&call) {
            bail!("mock failure on {:?}", call);
        }
        Ok(())
    }

    async fn take(&self, duration_ms: u64) {
        if self.timed {
            sleep(Duration::from_millis(duration_ms)).await;
        }
    }
}

#[async_trait]
impl Actuator for RecordingActuator {
    async fn start(&self) -> Result<()> {
        self.record(ActuatorCall::Start)
    }

    async fn close(&self) -> Result<()> {
        self.record(ActuatorCall::Close)
    }

    async fn stand_with_height(&self, height: f64) -> Result<()> {
        self.record(ActuatorCall::StandWithHeight(height))
    }

    async fn move_head(&self, angle_deg: f64, duration_ms: u64) -> Result<()> {
        let result = self.record(ActuatorCall::MoveHead {
            angle_deg,
            duration_ms,
        });
        self.take(duration_ms).await;
        result
    }

    async fn pitch(&self, angle_deg: f64, duration_ms: u64) -> Result<()> {
        let result = self.record(ActuatorCall::Pitch {
            angle_deg,
            duration_ms,
        });
        self.take(duration_ms).await;
        result
    }

    async fn walk_continuously(&self, direction_deg: f64, speed: f64) -> Result<()> {
        self.record(ActuatorCall::WalkContinuously {
            direction_deg,
            speed,
        })
    }

    async fn stop_walking_continuously(&self) -> Result<()> {
        self.record(ActuatorCall::StopWalkingContinuously)
    }

    async fn relax(&self) -> Result<()> {
        self.record(ActuatorCall::Relax)
    }

    fn direction(&self) -> f64 {
        0.0
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
