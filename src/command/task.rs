//! Background motion routines

use super::cancel::CancelListener;
use crate::actuator::Actuator;
use crate::config::MotionConfig;
use anyhow::Result;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, info, warn};

/// Identifier of a spawned motion task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a motion task does
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionKind {
    /// Recenter, walk towards `direction` for the move duration, stop
    Walk { direction: f64 },
    /// Recenter, pitch left then right, stand down then up
    StartSequence,
    /// Move the body to a fixed height
    Stand { height: f64 },
}

/// How a routine ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionOutcome {
    Completed,
    /// A stop cut the routine short
    Interrupted,
}

/// Public view of a tracked task
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskInfo {
    pub id: TaskId,
    pub kind: MotionKind,
}

/// A spawned motion and its handle
#[derive(Debug)]
pub struct MotionTask {
    pub id: TaskId,
    pub kind: MotionKind,
    pub started_at: Instant,
    pub handle: JoinHandle<MotionOutcome>,
}

impl MotionTask {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn info(&self) -> TaskInfo {
        TaskInfo {
            id: self.id,
            kind: self.kind,
        }
    }
}

/// Log an actuator failure; motion carries on with the next step
pub(crate) fn check_step(step: &str, result: Result<()>) {
    if let Err(e) = result {
        warn!("[DISPATCH] Actuator {} failed: {:#}", step, e);
    }
}

/// Everything a motion task needs, moved into the spawned future
pub(crate) struct MotionRoutine<A: Actuator> {
    pub actuator: Arc<A>,
    pub config: Arc<MotionConfig>,
    pub cancel: CancelListener,
    /// Observe the cancel signal during holds
    pub cooperative: bool,
}

impl<A: Actuator> MotionRoutine<A> {
    pub async fn run(mut self, id: TaskId, kind: MotionKind) -> MotionOutcome {
        let started = Instant::now();
        let outcome = match kind {
            MotionKind::Walk { direction } => self.walk(direction).await,
            MotionKind::StartSequence => self.start_sequence().await,
            MotionKind::Stand { height } => self.stand(height).await,
        };
        debug!(
            "[DISPATCH] Task {} {:?} finished: {:?} after {:?}",
            id,
            kind,
            outcome,
            started.elapsed()
        );
        outcome
    }

    async fn recenter_head(&self) {
        let result = self
            .actuator
            .move_head(self.config.head_neutral_deg, self.config.head_recenter_duration_ms)
            .await;
        check_step("recenter head", result);
    }

    async fn walk(&mut self, direction: f64) -> MotionOutcome {
        info!("[DISPATCH] Walk: head direction before recenter: {}", self.actuator.direction());
        self.recenter_head().await;
        info!("[DISPATCH] Walk: head direction after recenter: {}", self.actuator.direction());

        let result = self
            .actuator
            .walk_continuously(direction, self.config.walk_speed)
            .await;
        check_step("walk", result);

        let outcome = self.hold(self.config.move_duration()).await;

        check_step("stop walking", self.actuator.stop_walking_continuously().await);
        outcome
    }

    async fn start_sequence(&mut self) -> MotionOutcome {
        info!("[DISPATCH] Start: head direction before recenter: {}", self.actuator.direction());
        self.recenter_head().await;
        info!("[DISPATCH] Start: head direction after recenter: {}", self.actuator.direction());

        let swing = self.config.start_pitch_deg;
        let steps = [
            (-swing, self.config.start_pitch_left_ms),
            (swing, self.config.start_pitch_right_ms),
        ];
        for (angle, duration_ms) in steps {
            if self.interrupted() {
                return MotionOutcome::Interrupted;
            }
            check_step("pitch", self.actuator.pitch(angle, duration_ms).await);
        }

        for height in [self.config.stand_down_height, self.config.stand_up_height] {
            if self.interrupted() {
                return MotionOutcome::Interrupted;
            }
            check_step("stand", self.actuator.stand_with_height(height).await);
        }
        MotionOutcome::Completed
    }

    async fn stand(&mut self, height: f64) -> MotionOutcome {
        check_step("stand", self.actuator.stand_with_height(height).await);
        MotionOutcome::Completed
    }

    /// Wait out a hold; under cooperative stop a stop ends it early
    async fn hold(&mut self, duration: Duration) -> MotionOutcome {
        if !self.cooperative {
            sleep(duration).await;
            return MotionOutcome::Completed;
        }
        tokio::select! {
            _ = sleep(duration) => MotionOutcome::Completed,
            _ = self.cancel.cancelled() => MotionOutcome::Interrupted,
        }
    }

    fn interrupted(&self) -> bool {
        self.cooperative && self.cancel.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::mock::{ActuatorCall, RecordingActuator};
    use crate::command::cancel::CancelSignal;

    fn routine(
        actuator: &Arc<RecordingActuator>,
        signal: &CancelSignal,
        cooperative: bool,
    ) -> MotionRoutine<RecordingActuator> {
        MotionRoutine {
            actuator: actuator.clone(),
            config: Arc::new(MotionConfig::default()),
            cancel: signal.subscribe(),
            cooperative,
        }
    }

    fn first_pitch() -> ActuatorCall {
        ActuatorCall::Pitch {
            angle_deg: -20.0,
            duration_ms: 750,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_pitch_interrupts_start_sequence() {
        let actuator = Arc::new(RecordingActuator::timed());
        let signal = CancelSignal::new();
        let task = tokio::spawn(
            routine(&actuator, &signal, true).run(TaskId(1), MotionKind::StartSequence),
        );

        // Inside the first pitch (500..1250 ms)
        sleep(Duration::from_millis(800)).await;
        signal.signal();

        assert_eq!(task.await.unwrap(), MotionOutcome::Interrupted);
        assert_eq!(
            actuator.calls(),
            vec![
                ActuatorCall::MoveHead {
                    angle_deg: 0.0,
                    duration_ms: 500,
                },
                first_pitch(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_sequence_runs_through_without_cooperation() {
        let actuator = Arc::new(RecordingActuator::timed());
        let signal = CancelSignal::new();
        let task = tokio::spawn(
            routine(&actuator, &signal, false).run(TaskId(1), MotionKind::StartSequence),
        );

        sleep(Duration::from_millis(800)).await;
        signal.signal();

        assert_eq!(task.await.unwrap(), MotionOutcome::Completed);
        assert_eq!(actuator.count(), 5);
        assert_eq!(
            actuator.calls().last(),
            Some(&ActuatorCall::StandWithHeight(50.0))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_step_does_not_end_routine() {
        let actuator = Arc::new(RecordingActuator::new());
        actuator.fail_on(first_pitch());
        let signal = CancelSignal::new();

        let outcome = routine(&actuator, &signal, false)
            .run(TaskId(1), MotionKind::StartSequence)
            .await;

        assert_eq!(outcome, MotionOutcome::Completed);
        assert_eq!(actuator.count(), 5);
    }
}
