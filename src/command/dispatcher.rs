//! Motion dispatcher - maps commands to actuator calls and motion tasks

use super::cancel::CancelSignal;
use super::task::{check_step, MotionKind, MotionRoutine, MotionTask, TaskId, TaskInfo};
use crate::actuator::Actuator;
use crate::config::{MotionConfig, MotionPolicy};
use futures::future::join_all;
use hexa_shared::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{timeout, Duration, Instant};
use tracing::{debug, info, warn};

/// Turns commands into actuator calls
///
/// `stop` runs inline. Every other command is spawned as an independent
/// motion task, so the caller can keep feeding commands while the body
/// moves. Unless `preempt_previous` is set, nothing serialises motion tasks:
/// two motions issued back to back run concurrently and their actuator
/// calls interleave.
pub struct MotionDispatcher<A: Actuator> {
    actuator: Arc<A>,
    config: Arc<MotionConfig>,
    policy: MotionPolicy,
    cancel: CancelSignal,
    next_task_id: AtomicU64,
    tasks: Arc<RwLock<Vec<MotionTask>>>,
}

impl<A: Actuator> MotionDispatcher<A> {
    /// Create a new dispatcher driving `actuator`
    pub fn new(actuator: Arc<A>, config: MotionConfig, policy: MotionPolicy) -> Self {
        Self {
            actuator,
            config: Arc::new(config),
            policy,
            cancel: CancelSignal::new(),
            next_task_id: AtomicU64::new(0),
            tasks: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Handle a raw wire token; unknown tokens are ignored
    pub async fn handle_token(&self, token: &str) {
        match Command::from_token(token) {
            Some(command) => self.handle(command).await,
            None => debug!("[DISPATCH] Ignoring unknown token {:?}", token),
        }
    }

    /// Handle one command. Never fails: actuator errors are logged.
    pub async fn handle(&self, command: Command) {
        debug!("[DISPATCH] Handling {}", command);

        let kind = match command {
            Command::Stop => {
                self.stop().await;
                return;
            }
            Command::Start => MotionKind::StartSequence,
            Command::StandUp => MotionKind::Stand {
                height: self.config.stand_up_height,
            },
            Command::StandDown => MotionKind::Stand {
                height: self.config.stand_down_height,
            },
            Command::Left | Command::Right | Command::Forward | Command::Backward => {
                match self.config.walk_direction(command) {
                    Some(direction) => MotionKind::Walk { direction },
                    None => return,
                }
            }
        };

        let id = self.spawn_motion(kind).await;
        info!("[DISPATCH] {} -> task {} ({:?})", command, id, kind);
    }

    /// Signal cancellation, then put the body in a safe pose
    async fn stop(&self) {
        let started = Instant::now();
        self.cancel.signal();
        info!(
            "[DISPATCH] Stop #{} requested, {} motion task(s) in flight",
            self.cancel.generation(),
            self.active_tasks().await
        );

        let result = self
            .actuator
            .move_head(self.config.head_neutral_deg, self.config.head_recenter_duration_ms)
            .await;
        check_step("recenter head", result);
        check_step("stop walking", self.actuator.stop_walking_continuously().await);
        check_step("relax", self.actuator.relax().await);

        let elapsed = started.elapsed();
        if elapsed > self.config.reaction_latency() {
            warn!(
                "[DISPATCH] Stop took {:?}, over the {:?} reaction target",
                elapsed,
                self.config.reaction_latency()
            );
        }
    }

    async fn spawn_motion(&self, kind: MotionKind) -> TaskId {
        if self.policy.preempt_previous {
            self.preempt().await;
        }

        let id = TaskId(self.next_task_id.fetch_add(1, Ordering::SeqCst) + 1);
        let routine = MotionRoutine {
            actuator: self.actuator.clone(),
            config: self.config.clone(),
            // Subscribe before spawning so a stop right after is not missed
            cancel: self.cancel.subscribe(),
            cooperative: self.policy.cooperative_stop,
        };
        let handle = tokio::spawn(routine.run(id, kind));

        let mut tasks = self.tasks.write().await;
        tasks.retain(|t| !t.is_finished());
        tasks.push(MotionTask {
            id,
            kind,
            started_at: Instant::now(),
            handle,
        });
        id
    }

    /// Abort every unfinished motion and leave the body standing still
    async fn preempt(&self) {
        let previous: Vec<MotionTask> = std::mem::take(&mut *self.tasks.write().await);

        for task in previous {
            if task.is_finished() {
                continue;
            }
            task.handle.abort();
            // Wait for the abort to land so the old task issues no more calls
            let _ = task.handle.await;
            info!(
                "[DISPATCH] Preempted task {} ({:?}) after {:?}",
                task.id,
                task.kind,
                task.started_at.elapsed()
            );
            if let MotionKind::Walk { .. } = task.kind {
                check_step(
                    "stop walking",
                    self.actuator.stop_walking_continuously().await,
                );
            }
        }
    }

    /// Latest motion task that has not finished
    pub async fn current_task(&self) -> Option<TaskInfo> {
        self.tasks
            .read()
            .await
            .iter()
            .rev()
            .find(|t| !t.is_finished())
            .map(MotionTask::info)
    }

    /// Number of motion tasks still running
    pub async fn active_tasks(&self) -> usize {
        self.tasks
            .read()
            .await
            .iter()
            .filter(|t| !t.is_finished())
            .count()
    }

    /// Wait up to `limit` for tracked motions, then abort the rest
    ///
    /// Returns how many tasks had to be aborted.
    pub async fn drain_for(&self, limit: Duration) -> usize {
        let mut tasks: Vec<MotionTask> = std::mem::take(&mut *self.tasks.write().await);

        let waited = timeout(limit, join_all(tasks.iter_mut().map(|t| &mut t.handle))).await;
        if let Ok(results) = waited {
            for result in results {
                if let Err(e) = result {
                    if !e.is_cancelled() {
                        warn!("[DISPATCH] Motion task panicked: {}", e);
                    }
                }
            }
        }

        let mut aborted = 0;
        for task in tasks {
            if !task.is_finished() {
                task.handle.abort();
                aborted += 1;
            }
        }
        aborted
    }
}
