pub mod api;
pub mod bridge;
pub mod core;
pub mod extensions;
pub mod input;
pub mod renderer;
pub mod terrain;

// Re-export key types at crate root for convenience
pub use crate::api::engine::{EngineConfig, FrameInput, TerrainEngine};
pub use crate::api::types::{EngineEvent, Stage, EVENT_SECTION_ENDED, EVENT_STAGE};
pub use crate::bridge::protocol::ProtocolLayout;
pub use crate::core::config::EngineTuning;
pub use crate::core::constants::Geometry;
pub use crate::core::time::FrameClock;
pub use crate::input::queue::{Signal, SignalQueue};
pub use crate::renderer::instance::{ElementTransform, RowTransform, TileAttributes};
pub use crate::terrain::binder::{ElementBinder, ELEMENT_SLOTS};
pub use crate::terrain::obstacles::ObstacleParams;
pub use crate::terrain::row::{Placements, RowData, SectionKind, SAFE_HEIGHT, UNSAFE_HEIGHT};
