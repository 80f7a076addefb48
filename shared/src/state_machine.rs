//! Link State Machine
//!
//! Tracks the skill's relationship with its controlling client. There is no
//! reconnection path: once the client goes away the link is terminated.

/// Link state of the skill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No client, actuators not started
    Disconnected,
    /// Client connected, actuators starting
    Connecting,
    /// Actuators running, dispatcher accepting commands
    Connected,
    /// Client left; the host process should exit
    Terminated,
}

/// Events that can trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    /// Remote client connected
    ClientConnected,
    /// Actuator subsystem started
    ActuatorsStarted,
    /// Actuator subsystem failed to start
    ActuatorsFailed { reason: String },
    /// Remote client disconnected
    ClientDisconnected,
}

/// Result of a state transition attempt
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionResult {
    /// Transition was valid and state changed
    Success(LinkState),
    /// Transition was invalid from current state
    Invalid { from: LinkState, event: LinkEvent },
    /// Connect sequence was aborted; the client must reconnect
    ConnectAborted { reason: String },
    /// Link ended; shutdown requested
    Shutdown,
}

#[derive(Debug)]
pub struct LinkStateMachine {
    current_state: LinkState,
    connect_attempts: u32,
}

impl Default for LinkStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkStateMachine {
    /// Create a new state machine in Disconnected state
    pub fn new() -> Self {
        Self {
            current_state: LinkState::Disconnected,
            connect_attempts: 0,
        }
    }

    pub fn state(&self) -> LinkState {
        self.current_state
    }

    /// Whether commands should reach the dispatcher
    pub fn accepts_commands(&self) -> bool {
        self.current_state == LinkState::Connected
    }

    pub fn is_terminated(&self) -> bool {
        self.current_state == LinkState::Terminated
    }

    /// Number of connect sequences started so far
    pub fn connect_attempts(&self) -> u32 {
        self.connect_attempts
    }

    /// Process an event and return the transition result
    pub fn process_event(&mut self, event: LinkEvent) -> TransitionResult {
        use LinkEvent::*;
        use LinkState::*;

        match (self.current_state, &event) {
            (Disconnected, ClientConnected) => {
                self.connect_attempts += 1;
                self.current_state = Connecting;
                TransitionResult::Success(Connecting)
            }
            (Connecting, ActuatorsStarted) => {
                self.current_state = Connected;
                TransitionResult::Success(Connected)
            }
            (Connecting, ActuatorsFailed { reason }) => {
                self.current_state = Disconnected;
                TransitionResult::ConnectAborted {
                    reason: reason.clone(),
                }
            }
            // Losing the client is fatal from any live state
            (Disconnected | Connecting | Connected, ClientDisconnected) => {
                self.current_state = Terminated;
                TransitionResult::Shutdown
            }
            (from, _) => TransitionResult::Invalid {
                from,
                event: event.clone(),
            },
        }
    }
}
