/// Presentation module - foreground lifecycle state machine

mod presentation_state_machine;

pub use presentation_state_machine::{
    PresentationState, PresentationStateMachine, ShutdownHook, TickOutcome,
};
