use quizrun_engine::{
    bridge::protocol::{self, ProtocolLayout},
    EngineConfig, EngineTuning, FrameInput, Signal, SignalQueue, TerrainEngine,
};

/// Engine runner that wires up the frame loop and packs the shared buffer.
///
/// The browser owns a `thread_local!` EngineRunner and exports free
/// functions via `#[wasm_bindgen]`; TypeScript reads the flat f32 buffer
/// through the returned pointer each animation frame.
pub struct EngineRunner {
    engine: TerrainEngine,
    signals: SignalQueue,
    layout: ProtocolLayout,
    buffer: Vec<f32>,
    frame_counter: f32,
}

impl EngineRunner {
    pub fn new(seed: u64) -> Self {
        let config = EngineConfig {
            seed,
            ..EngineConfig::default()
        };
        let layout = ProtocolLayout::from_config(&config);
        let buffer = vec![0.0; layout.buffer_total_floats];
        let mut runner = Self {
            engine: TerrainEngine::new(config),
            signals: SignalQueue::new(),
            layout,
            buffer,
            frame_counter: 0.0,
        };
        runner.write_frame();
        runner
    }

    /// Replace the tuning and rebuild the engine around it. Generation
    /// parameters shape the bootstrap, so a live engine cannot adopt them
    /// in place.
    pub fn load_tuning(&mut self, json: &str) {
        match EngineTuning::from_json(json) {
            Ok(tuning) => {
                let mut config = self.engine.config().clone();
                config.tuning = tuning;
                self.layout = ProtocolLayout::from_config(&config);
                self.buffer = vec![0.0; self.layout.buffer_total_floats];
                self.engine = TerrainEngine::new(config);
                self.frame_counter = 0.0;
                self.write_frame();
            }
            Err(err) => log::error!("invalid tuning JSON: {}", err),
        }
    }

    /// Push an inbound signal for the next tick to drain.
    pub fn push_signal(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    /// Run one frame and repack the shared buffer.
    pub fn tick(&mut self, time: f32, dt: f32, speed: f32, reset_tick: u32) {
        self.engine.update(
            &FrameInput {
                time,
                dt,
                speed,
                reset_tick,
            },
            &mut self.signals,
        );
        self.write_frame();
    }

    /// Run deferred obstacle-buffer refills. Scheduled from
    /// `requestIdleCallback` on the JS side, never from the frame loop.
    pub fn maintain(&mut self) -> u32 {
        self.engine.maintain() as u32
    }

    fn write_frame(&mut self) {
        self.frame_counter += 1.0;
        let layout = &self.layout;
        let buf = &mut self.buffer;

        buf[protocol::HEADER_LOCK] = 1.0;
        buf[protocol::HEADER_FRAME_COUNTER] = self.frame_counter;
        buf[protocol::HEADER_PROTOCOL_VERSION] = protocol::PROTOCOL_VERSION;
        buf[protocol::HEADER_ROWS_VISIBLE] = layout.rows_visible as f32;
        buf[protocol::HEADER_COLUMNS] = layout.columns as f32;
        buf[protocol::HEADER_TILE_SIZE] = self.engine.config().geometry.tile_size;
        buf[protocol::HEADER_MAX_Z] = self.engine.config().geometry.max_z;
        buf[protocol::HEADER_STAGE] = self.engine.stage().code() as f32;
        buf[protocol::HEADER_DISTANCE] = self.engine.distance() as f32;
        buf[protocol::HEADER_SCROLL_POS] = self.engine.scroll_pos();
        buf[protocol::HEADER_SPEED_FACTOR] = self.engine.speed_factor();
        buf[protocol::HEADER_MAX_EVENTS] = layout.max_events as f32;
        buf[protocol::HEADER_ELEMENT_SLOTS] =
            quizrun_engine::ELEMENT_SLOTS as f32;
        let player = self.engine.player_pos();
        buf[protocol::HEADER_PLAYER_X] = player.x;
        buf[protocol::HEADER_PLAYER_Y] = player.y;
        buf[protocol::HEADER_PLAYER_Z] = player.z;
        buf[protocol::HEADER_BUFFER_UNDERRUNS] =
            self.engine.buffer_underruns() as f32;

        let mut offset = layout.row_data_offset;
        for t in self.engine.row_transforms() {
            buf[offset] = t.x;
            buf[offset + 1] = t.y;
            buf[offset + 2] = t.z;
            buf[offset + 3] = t.wraps;
            offset += protocol::ROW_TRANSFORM_FLOATS;
        }

        // Attribute streams are only repacked when the engine marked them
        // dirty; the header flag tells TypeScript to re-upload.
        let dirty = self.engine.attributes().is_dirty();
        buf[protocol::HEADER_ATTRS_DIRTY] = if dirty { 1.0 } else { 0.0 };
        if dirty {
            let attrs = self.engine.attributes();
            let streams = [attrs.visibility(), attrs.seeds(), attrs.answers()];
            for (i, stream) in streams.iter().enumerate() {
                let base = layout.attribute_stream_offset(i);
                buf[base..base + stream.len()].copy_from_slice(stream);
            }
            self.engine.attributes_mut().clear_dirty();
        }

        let mut offset = self.layout.element_offset;
        for t in self.engine.element_transforms() {
            self.buffer[offset] = t.x;
            self.buffer[offset + 1] = t.y;
            self.buffer[offset + 2] = t.z;
            self.buffer[offset + 3] = t.active;
            offset += protocol::ELEMENT_FLOATS;
        }

        let events = self.engine.events();
        let mut offset = self.layout.event_offset;
        for ev in events {
            self.buffer[offset] = ev.kind;
            self.buffer[offset + 1] = ev.a;
            self.buffer[offset + 2] = ev.b;
            self.buffer[offset + 3] = ev.c;
            offset += protocol::EVENT_FLOATS;
        }
        self.buffer[protocol::HEADER_EVENT_COUNT] = events.len() as f32;
        self.buffer[protocol::HEADER_LOCK] = 0.0;
    }

    // ---- Pointer accessors for SharedArrayBuffer reads ----

    pub fn buffer_ptr(&self) -> *const f32 {
        self.buffer.as_ptr()
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.layout.buffer_total_floats as u32
    }

    pub fn rows_visible(&self) -> u32 {
        self.layout.rows_visible as u32
    }

    pub fn columns(&self) -> u32 {
        self.layout.columns as u32
    }

    pub fn max_events(&self) -> u32 {
        self.layout.max_events as u32
    }

    pub fn stage(&self) -> u32 {
        self.engine.stage().code()
    }

    pub fn distance(&self) -> u32 {
        self.engine.distance() as u32
    }

    pub fn buffer_underruns(&self) -> u32 {
        self.engine.buffer_underruns()
    }
}
