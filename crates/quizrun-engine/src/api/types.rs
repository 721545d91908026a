use bytemuck::{Pod, Zeroable};

use crate::terrain::row::SectionKind;

/// Game flow stage as the engine observes it. The engine only detects
/// transitions and fires them once; the surrounding game state owns the
/// rest of the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Home,
    Intro,
    Running,
    Question,
}

impl Stage {
    /// Numeric code for the wire protocol.
    pub fn code(self) -> u32 {
        match self {
            Stage::Home => 0,
            Stage::Intro => 1,
            Stage::Running => 2,
            Stage::Question => 3,
        }
    }
}

/// Event kind: a stage transition. `a` = new stage code, `b` = scroll
/// position at the transition.
pub const EVENT_STAGE: f32 = 1.0;

/// Event kind: a section's end row was consumed. `a` = section kind code.
pub const EVENT_SECTION_ENDED: f32 = 2.0;

/// An engine event communicated to the host via the shared buffer.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct EngineEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl EngineEvent {
    pub const FLOATS: usize = 4;

    pub fn stage(stage: Stage, scroll_pos: f32) -> Self {
        Self {
            kind: EVENT_STAGE,
            a: stage.code() as f32,
            b: scroll_pos,
            c: 0.0,
        }
    }

    pub fn section_ended(kind: SectionKind) -> Self {
        Self {
            kind: EVENT_SECTION_ENDED,
            a: kind.code() as f32,
            b: 0.0,
            c: 0.0,
        }
    }
}
