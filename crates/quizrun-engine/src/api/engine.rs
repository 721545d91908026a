//! The engine facade: owns every piece of terrain state and advances it
//! once per frame. The host (render loop) feeds it `FrameInput` and drains
//! the resulting buffers and events.

use glam::Vec3;

use crate::api::types::{EngineEvent, Stage};
use crate::core::config::EngineTuning;
use crate::core::constants::Geometry;
use crate::core::time::FrameClock;
use crate::input::queue::{Signal, SignalQueue};
use crate::renderer::instance::{ElementTransform, RowTransform, TileAttributes};
use crate::terrain::binder::{ElementBinder, ELEMENT_SLOTS};
use crate::terrain::decel::Decelerator;
use crate::terrain::layouts;
use crate::terrain::rng::Rng;
use crate::terrain::row::SectionKind;
use crate::terrain::scroll::ScrollEngine;
use crate::terrain::stream::{RowStream, Sequencer};

/// Largest frame delta the scroll will honour; longer stalls are clamped.
const MAX_FRAME_DT: f32 = 0.1;

/// Engine configuration, fixed for the lifetime of one run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub geometry: Geometry,
    pub tuning: EngineTuning,
    pub seed: u64,
    /// Maximum outbound events per frame.
    pub max_events: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            geometry: Geometry::default(),
            tuning: EngineTuning::default(),
            seed: 1,
            max_events: 32,
        }
    }
}

/// Per-frame input from the host render loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    /// Wall-clock time in seconds (unused by core logic, passed to shaders).
    pub time: f32,
    /// Frame delta in seconds.
    pub dt: f32,
    /// Normalized terrain speed, 0..1, owned by the surrounding game state.
    pub speed: f32,
    /// Any change triggers a full engine re-initialization.
    pub reset_tick: u32,
}

pub struct TerrainEngine {
    config: EngineConfig,
    stream: RowStream,
    sequencer: Sequencer,
    scroll: ScrollEngine,
    attributes: TileAttributes,
    binder: ElementBinder,
    decel: Decelerator,
    clock: FrameClock,
    events: Vec<EngineEvent>,
    stage: Stage,
    player_pos: Vec3,
    speed_factor: f32,
    last_reset_tick: u32,
}

impl TerrainEngine {
    pub fn new(config: EngineConfig) -> Self {
        let (stream, sequencer, scroll, attributes) = Self::build(&config);
        let binder = ElementBinder::new(&config.geometry);
        log::info!(
            "terrain engine initialized: {} slots x {} columns, seed {}",
            config.geometry.rows_visible,
            config.geometry.columns,
            config.seed
        );
        Self {
            binder,
            decel: Decelerator::new(config.tuning.decel_power),
            clock: FrameClock::new(MAX_FRAME_DT),
            events: Vec::with_capacity(config.max_events),
            stage: Stage::Home,
            player_pos: Vec3::ZERO,
            speed_factor: 1.0,
            last_reset_tick: 0,
            stream,
            sequencer,
            scroll,
            attributes,
            config,
        }
    }

    fn build(
        config: &EngineConfig,
    ) -> (RowStream, Sequencer, ScrollEngine, TileAttributes) {
        let geo = &config.geometry;
        let mut stream = RowStream::new();
        let mut sequencer = Sequencer::new(geo.clone(), &config.tuning, config.seed);
        sequencer.bootstrap(&mut stream, config.tuning.bootstrap_pairs);

        let mut rng = Rng::new(config.seed ^ 0xa5a5_a5a5_a5a5_a5a5);
        let mut attributes = TileAttributes::new(geo.rows_visible, geo.columns, &mut rng);
        let scroll = ScrollEngine::new(geo.clone(), &mut stream, &mut attributes);
        (stream, sequencer, scroll, attributes)
    }

    /// Discard all terrain state and reconstruct from the config. Sections
    /// are append-only, so there is no partial teardown to order.
    pub fn reset(&mut self) {
        let (stream, sequencer, scroll, attributes) = Self::build(&self.config);
        self.stream = stream;
        self.sequencer = sequencer;
        self.scroll = scroll;
        self.attributes = attributes;
        self.binder.reset();
        self.decel.reset();
        self.clock.reset();
        self.events.clear();
        self.stage = Stage::Home;
        self.speed_factor = 1.0;
        log::info!("terrain engine reset");
    }

    /// Advance one frame. All terrain logic runs synchronously here;
    /// nothing blocks or suspends.
    pub fn update(&mut self, input: &FrameInput, signals: &mut SignalQueue) {
        if input.reset_tick != self.last_reset_tick {
            self.last_reset_tick = input.reset_tick;
            self.reset();
        }
        self.events.clear();

        for signal in signals.drain() {
            self.handle_signal(signal);
        }

        let dt = self.clock.advance(input.dt);
        self.speed_factor = self.decel.factor(self.scroll.scroll_pos());
        let z_step = input.speed.clamp(0.0, 1.0)
            * self.speed_factor
            * self.config.geometry.scroll_rate
            * dt;

        // Elements advance before the scroll settles, so anything bound
        // this frame lands exactly on its row's post-scroll Z.
        self.binder.advance(z_step);

        let advance = self.scroll.advance(
            z_step,
            &mut self.stream,
            &mut self.sequencer,
            &mut self.attributes,
        );

        for kind in &advance.sections_ended {
            self.push_event(EngineEvent::section_ended(*kind));
        }

        for &slot in &advance.raised {
            let row = self.scroll.slot_row(slot).clone();
            let row_z = self.scroll.transforms()[slot].z;
            self.binder.bind_row(&row, row_z);
            if row.is_section_start {
                self.on_section_start_raised(row.kind);
            }
        }
    }

    fn handle_signal(&mut self, signal: Signal) {
        match signal {
            Signal::AnswerConfirmed { tile } => {
                log::debug!("answer confirmed on tile {}", tile);
                self.decel.reset();
                if self.stage == Stage::Question {
                    self.set_stage(Stage::Running);
                }
            }
            Signal::PlayerPosition { x, y, z } => {
                self.player_pos = Vec3::new(x, y, z);
            }
            Signal::Custom { .. } => {}
        }
    }

    fn on_section_start_raised(&mut self, kind: SectionKind) {
        match kind {
            SectionKind::Intro if self.stage == Stage::Home => {
                self.set_stage(Stage::Intro);
            }
            SectionKind::Obstacles
                if matches!(self.stage, Stage::Home | Stage::Intro) =>
            {
                self.set_stage(Stage::Running);
            }
            SectionKind::Question if self.stage != Stage::Question => {
                self.set_stage(Stage::Question);
                let tile = self.config.geometry.tile_size;
                let delay = self.config.tuning.decel_delay_rows;
                let start = self.scroll.scroll_pos() + delay * tile;
                let end = start + (layouts::QUESTION_ROWS as f32 - delay) * tile;
                self.decel.arm(start, end);
            }
            _ => {}
        }
    }

    fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
        let ev = EngineEvent::stage(stage, self.scroll.scroll_pos());
        self.push_event(ev);
    }

    fn push_event(&mut self, event: EngineEvent) {
        if self.events.len() < self.config.max_events {
            self.events.push(event);
        } else {
            log::warn!("event buffer full, dropping kind {}", event.kind);
        }
    }

    /// Run deferred work (obstacle buffer refill). Call from an idle tick,
    /// never from the frame callback. Returns batches generated.
    pub fn maintain(&mut self) -> usize {
        self.sequencer.maintain()
    }

    // ---- Accessors ----

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn scroll_pos(&self) -> f32 {
        self.scroll.scroll_pos()
    }

    /// Speed multiplier applied this frame (1.0 outside question sections).
    pub fn speed_factor(&self) -> f32 {
        self.speed_factor
    }

    /// Rows wrapped since the intro completed.
    pub fn distance(&self) -> u64 {
        self.scroll.distance()
    }

    pub fn row_transforms(&self) -> &[RowTransform] {
        self.scroll.transforms()
    }

    pub fn attributes(&self) -> &TileAttributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut TileAttributes {
        &mut self.attributes
    }

    pub fn element_transforms(&self) -> [ElementTransform; ELEMENT_SLOTS] {
        let mut out = [ElementTransform::default(); ELEMENT_SLOTS];
        self.binder.write_transforms(&mut out);
        out
    }

    pub fn binder(&self) -> &ElementBinder {
        &self.binder
    }

    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    pub fn player_pos(&self) -> Vec3 {
        self.player_pos
    }

    pub fn buffer_underruns(&self) -> u32 {
        self.sequencer.buffer().underruns()
    }

    pub fn stream_unread(&self) -> usize {
        self.stream.unread()
    }
}
