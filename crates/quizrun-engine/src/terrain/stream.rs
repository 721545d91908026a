//! The row stream and its feeders: an append-only logical sequence of rows
//! consumed by the scroll engine, a sequencer deciding which section comes
//! next, and a precomputed obstacle-batch buffer that keeps heavy corridor
//! generation off the per-frame path.

use std::collections::VecDeque;

use crate::core::config::EngineTuning;
use crate::core::constants::Geometry;
use crate::terrain::layouts;
use crate::terrain::obstacles::{self, ObstacleParams};
use crate::terrain::rng::Rng;
use crate::terrain::row::{RowData, SectionKind};

/// Append-only sequence of rows, consumed front to back by index. The
/// consumed prefix is retained; sections are small enough that pruning
/// is not worth giving up stable indices.
pub struct RowStream {
    rows: Vec<RowData>,
    next: usize,
}

impl RowStream {
    pub fn new() -> Self {
        Self {
            rows: Vec::with_capacity(512),
            next: 0,
        }
    }

    pub fn append(&mut self, batch: Vec<RowData>) {
        self.rows.extend(batch);
    }

    /// Consume the next unread row.
    ///
    /// The sequencer's append-ahead discipline guarantees at least
    /// `rows_visible` unread rows at all times; running dry here is a
    /// programming error, not a runtime condition.
    pub fn take_next(&mut self) -> RowData {
        assert!(
            self.next < self.rows.len(),
            "row stream exhausted at index {} (append-ahead violated)",
            self.next
        );
        let row = self.rows[self.next].clone();
        self.next += 1;
        row
    }

    /// Rows appended but not yet consumed.
    pub fn unread(&self) -> usize {
        self.rows.len() - self.next
    }

    pub fn next_index(&self) -> usize {
        self.next
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Peek at an absolute stream index (consumed rows included).
    pub fn get(&self, index: usize) -> Option<&RowData> {
        self.rows.get(index)
    }
}

impl Default for RowStream {
    fn default() -> Self {
        Self::new()
    }
}

/// FIFO of precomputed obstacle batches. Refills are deferred: the frame
/// callback only schedules them, the host runs them on an idle tick.
pub struct ObstacleBuffer {
    queue: VecDeque<Vec<RowData>>,
    target_depth: usize,
    low_water: usize,
    refill_scheduled: bool,
    underruns: u32,
    params: ObstacleParams,
    columns: usize,
    rng: Rng,
}

impl ObstacleBuffer {
    pub fn new(
        params: ObstacleParams,
        columns: usize,
        target_depth: usize,
        low_water: usize,
        seed: u64,
    ) -> Self {
        Self {
            queue: VecDeque::with_capacity(target_depth),
            target_depth,
            low_water,
            refill_scheduled: false,
            underruns: 0,
            params,
            columns,
            rng: Rng::new(seed),
        }
    }

    fn generate_one(&mut self) -> Vec<RowData> {
        let seed = self.rng.next_u64();
        obstacles::generate(&self.params, self.columns, seed)
    }

    /// Fill the queue up to the target depth. Returns batches generated.
    pub fn fill(&mut self) -> usize {
        let mut generated = 0;
        while self.queue.len() < self.target_depth {
            let batch = self.generate_one();
            self.queue.push_back(batch);
            generated += 1;
        }
        self.refill_scheduled = false;
        generated
    }

    /// Pop the next precomputed batch, falling back to synchronous
    /// generation on underrun (a frame hitch beats stalling the game).
    pub fn pop(&mut self) -> Vec<RowData> {
        match self.queue.pop_front() {
            Some(batch) => batch,
            None => {
                self.underruns += 1;
                log::warn!(
                    "obstacle buffer underrun #{}, generating synchronously",
                    self.underruns
                );
                self.generate_one()
            }
        }
    }

    pub fn needs_refill(&self) -> bool {
        self.queue.len() <= self.low_water
    }

    /// Arm the deferred refill. The in-flight flag guards re-entrancy:
    /// only one refill may be pending at a time.
    pub fn schedule_refill(&mut self) -> bool {
        if self.refill_scheduled || !self.needs_refill() {
            return false;
        }
        self.refill_scheduled = true;
        true
    }

    pub fn refill_scheduled(&self) -> bool {
        self.refill_scheduled
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn underruns(&self) -> u32 {
        self.underruns
    }
}

/// Section ordering policy. Bootstraps the designed opening order, then
/// reacts to consumed section ends: a finished obstacle section queues a
/// question, a finished question queues the next precomputed obstacle batch.
pub struct Sequencer {
    geo: Geometry,
    buffer: ObstacleBuffer,
}

impl Sequencer {
    pub fn new(geo: Geometry, tuning: &EngineTuning, seed: u64) -> Self {
        let mut buffer = ObstacleBuffer::new(
            tuning.obstacle.clone(),
            geo.columns,
            tuning.buffer_depth,
            tuning.buffer_low_water,
            seed,
        );
        buffer.fill();
        Self { geo, buffer }
    }

    /// Seed the stream with the opening order:
    /// home, intro, then `pairs` alternating question/obstacle sections.
    pub fn bootstrap(&mut self, stream: &mut RowStream, pairs: usize) {
        stream.append(layouts::home(&self.geo));
        stream.append(layouts::intro(&self.geo));
        for _ in 0..pairs {
            stream.append(layouts::question(&self.geo));
            stream.append(self.buffer.pop());
        }
        self.buffer.schedule_refill();
    }

    /// A row flagged `is_section_end` was consumed by a wrap; append the
    /// follow-up section.
    pub fn on_section_end(&mut self, stream: &mut RowStream, kind: SectionKind) {
        match kind {
            SectionKind::Obstacles => {
                stream.append(layouts::question(&self.geo));
            }
            SectionKind::Question => {
                stream.append(self.buffer.pop());
                self.buffer.schedule_refill();
            }
            // Home and intro run once; their successors are bootstrapped.
            SectionKind::Home | SectionKind::Intro => {}
        }
    }

    /// Run the deferred refill if one is scheduled. Call from an idle
    /// tick, never from the frame callback. Returns batches generated.
    pub fn maintain(&mut self) -> usize {
        if self.buffer.refill_scheduled() {
            let generated = self.buffer.fill();
            log::debug!("obstacle buffer refilled with {} batches", generated);
            generated
        } else {
            0
        }
    }

    pub fn buffer(&self) -> &ObstacleBuffer {
        &self.buffer
    }
}
