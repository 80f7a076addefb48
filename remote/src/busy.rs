//! Busy window between motion commands
//!
//! After a motion is sent the body needs time to carry it out, so further
//! motions are held back until the window passes. `stop` always goes through.

use hexa_shared::Command;
use tokio::time::{Duration, Instant};

/// Whether a token should be sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Send,
    /// Suppressed; the window ends after `remaining`
    Busy { remaining: Duration },
}

#[derive(Debug)]
pub struct BusyWindow {
    window: Duration,
    busy_until: Option<Instant>,
}

impl BusyWindow {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            busy_until: None,
        }
    }

    /// Decide for `token` at `now`, opening a new window when a motion is sent
    pub fn check(&mut self, token: &str, now: Instant) -> Verdict {
        let command = Command::from_token(token);

        // Stop and unknown tokens don't move the body
        let moves = matches!(command, Some(cmd) if cmd.is_motion());
        if !moves {
            if command == Some(Command::Stop) {
                self.busy_until = None;
            }
            return Verdict::Send;
        }

        if let Some(until) = self.busy_until {
            if now < until {
                return Verdict::Busy {
                    remaining: until - now,
                };
            }
        }
        self.busy_until = Some(now + self.window);
        Verdict::Send
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(2500);

    #[tokio::test(start_paused = true)]
    async fn test_motion_opens_window() {
        let mut busy = BusyWindow::new(WINDOW);
        let t0 = Instant::now();

        assert_eq!(busy.check("forward", t0), Verdict::Send);
        assert_eq!(
            busy.check("left", t0 + Duration::from_millis(1000)),
            Verdict::Busy {
                remaining: Duration::from_millis(1500)
            }
        );
        assert_eq!(busy.check("left", t0 + WINDOW), Verdict::Send);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_always_sent_and_clears_window() {
        let mut busy = BusyWindow::new(WINDOW);
        let t0 = Instant::now();

        assert_eq!(busy.check("start", t0), Verdict::Send);
        assert_eq!(busy.check("stop", t0 + Duration::from_millis(10)), Verdict::Send);
        assert_eq!(busy.check("stand-up", t0 + Duration::from_millis(20)), Verdict::Send);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_tokens_pass_without_window() {
        let mut busy = BusyWindow::new(WINDOW);
        let t0 = Instant::now();

        assert_eq!(busy.check("wave", t0), Verdict::Send);
        assert_eq!(busy.check("backward", t0), Verdict::Send);
        assert_eq!(
            busy.check("wave", t0 + Duration::from_millis(5)),
            Verdict::Send
        );
    }
}
