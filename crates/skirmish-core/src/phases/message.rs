//! Message phase.

use crate::engine::EngineContext;
use crate::phase::{Await, Phase, PhaseKind, PhaseStatus};

/// Shows one message and waits for the presentation layer to acknowledge it.
///
/// # Example
///
/// ```
/// use skirmish_core::phase::{Phase, PhaseKind};
/// use skirmish_core::phases::MessagePhase;
///
/// let phase = MessagePhase::new("It's raining!");
/// assert_eq!(phase.kind(), PhaseKind::Message);
/// assert_eq!(phase.text(), "It's raining!");
/// ```
#[derive(Debug, Clone)]
pub struct MessagePhase {
    text: String,
}

impl MessagePhase {
    /// Creates a message phase.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns the message text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Phase for MessagePhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Message
    }

    fn start(&mut self, ctx: &mut EngineContext) -> PhaseStatus {
        ctx.message(self.text.clone());
        PhaseStatus::Await(Await::Message)
    }
}
