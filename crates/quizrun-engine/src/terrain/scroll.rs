//! Ring-buffer scroll engine: the streaming state machine.
//!
//! A fixed set of visible row slots scrolls along +Z at a variable rate.
//! Each slot's wrapped position is recomputed every frame; when it crosses
//! the wrap boundary the slot atomically takes the next row from the stream
//! (firing section-end hooks against the outgoing row first) and rewrites
//! its per-column attributes. Rows lift into place across the entry window
//! and sink back down across the exit window; crossing the end of the entry
//! window fires a one-shot "raised" event per content assignment.

use crate::core::constants::Geometry;
use crate::extensions::easing::{inv_lerp, lerp};
use crate::renderer::instance::{RowTransform, TileAttributes};
use crate::terrain::row::{RowData, SectionKind};
use crate::terrain::stream::{RowStream, Sequencer};

/// One visible row slot.
struct Slot {
    base_z: f32,
    wrap_count: u32,
    raised: bool,
    row: RowData,
}

/// What one `advance` call did, for the caller to react to.
#[derive(Debug, Default)]
pub struct AdvanceResult {
    /// Slots whose rows crossed the raised threshold this frame, in slot
    /// order. Content swaps are applied before this check, so a row that
    /// wraps and immediately raises in one large step is reported with its
    /// new content.
    pub raised: Vec<usize>,
    /// Total wraps applied across all slots this frame.
    pub wraps: u32,
    /// Kinds of the section-end rows consumed by those wraps.
    pub sections_ended: Vec<SectionKind>,
}

pub struct ScrollEngine {
    geo: Geometry,
    scroll_pos: f32,
    slots: Vec<Slot>,
    transforms: Vec<RowTransform>,
    distance: u64,
    intro_done: bool,
}

impl ScrollEngine {
    /// Build the ring from the first `rows_visible` rows of the stream and
    /// write the initial attribute fill.
    pub fn new(geo: Geometry, stream: &mut RowStream, attrs: &mut TileAttributes) -> Self {
        let mut slots = Vec::with_capacity(geo.rows_visible);
        for i in 0..geo.rows_visible {
            let row = stream.take_next();
            attrs.write_row(i, &row);
            slots.push(Slot {
                base_z: geo.base_z(i),
                wrap_count: 0,
                raised: false,
                row,
            });
        }
        attrs.mark_dirty();

        let mut engine = Self {
            transforms: vec![RowTransform::default(); geo.rows_visible],
            geo,
            scroll_pos: 0.0,
            slots,
            distance: 0,
            intro_done: false,
        };
        engine.place_all();
        engine
    }

    /// Advance the scroll by `z_step` world units and settle every slot:
    /// wraps (with section hooks and attribute writes), lift offsets, and
    /// raised events.
    pub fn advance(
        &mut self,
        z_step: f32,
        stream: &mut RowStream,
        sequencer: &mut Sequencer,
        attrs: &mut TileAttributes,
    ) -> AdvanceResult {
        self.scroll_pos += z_step;
        let cycle = self.geo.cycle_length();
        let mut result = AdvanceResult::default();
        let mut any_wrap = false;

        for (i, slot) in self.slots.iter_mut().enumerate() {
            let mut z = slot.base_z + self.scroll_pos;
            let mut wraps_total = slot.wrap_count;
            // Recompute the wrapped position from scratch; the loop also
            // counts how many boundary crossings the raw position implies.
            let mut crossings = 0;
            while z >= self.geo.max_z {
                z -= cycle;
                crossings += 1;
            }

            // Apply any wraps not yet reflected in the slot's content.
            while crossings > wraps_total {
                let outgoing = &slot.row;
                if outgoing.is_section_end {
                    if outgoing.kind == SectionKind::Intro {
                        self.intro_done = true;
                    }
                    result.sections_ended.push(outgoing.kind);
                    sequencer.on_section_end(stream, outgoing.kind);
                }
                if self.intro_done {
                    self.distance += 1;
                }
                slot.row = stream.take_next();
                attrs.write_row(i, &slot.row);
                wraps_total += 1;
                slot.raised = false;
                result.wraps += 1;
                any_wrap = true;
            }
            slot.wrap_count = wraps_total;

            self.transforms[i] = RowTransform {
                x: 0.0,
                y: lift_y(&self.geo, z),
                z,
                wraps: slot.wrap_count as f32,
            };

            // Swap-before-raise ordering: the raised check always sees the
            // slot's current content.
            if !slot.raised && z >= self.geo.entry_end_z {
                slot.raised = true;
                result.raised.push(i);
            }
        }

        if any_wrap {
            attrs.mark_dirty();
        }
        result
    }

    fn place_all(&mut self) {
        let cycle = self.geo.cycle_length();
        for (i, slot) in self.slots.iter().enumerate() {
            let mut z = slot.base_z + self.scroll_pos;
            while z >= self.geo.max_z {
                z -= cycle;
            }
            self.transforms[i] = RowTransform {
                x: 0.0,
                y: lift_y(&self.geo, z),
                z,
                wraps: slot.wrap_count as f32,
            };
        }
    }

    pub fn scroll_pos(&self) -> f32 {
        self.scroll_pos
    }

    pub fn slot_row(&self, slot: usize) -> &RowData {
        &self.slots[slot].row
    }

    pub fn slot_wraps(&self, slot: usize) -> u32 {
        self.slots[slot].wrap_count
    }

    pub fn transforms(&self) -> &[RowTransform] {
        &self.transforms
    }

    /// Rows wrapped since the intro completed; the scoring distance.
    pub fn distance(&self) -> u64 {
        self.distance
    }

    pub fn intro_done(&self) -> bool {
        self.intro_done
    }
}

/// Lift offset for a wrapped row position: lowered outside the level span,
/// linear ramps across the entry and exit windows.
fn lift_y(geo: &Geometry, z: f32) -> f32 {
    if z < geo.entry_start_z {
        geo.lowered_y
    } else if z < geo.entry_end_z {
        let t = inv_lerp(geo.entry_start_z, geo.entry_end_z, z);
        lerp(geo.lowered_y, 0.0, t)
    } else if z < geo.exit_start_z {
        0.0
    } else if z < geo.exit_end_z {
        let t = inv_lerp(geo.exit_start_z, geo.exit_end_z, z);
        lerp(0.0, geo.lowered_y, t)
    } else {
        geo.lowered_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineTuning;
    use crate::terrain::layouts;
    use crate::terrain::rng::Rng;
    use crate::terrain::row::RowData;

    /// A tiny world whose entry window sits below the whole visible span,
    /// so rows are always raised and lift never interferes.
    fn tiny_geometry(rows_visible: usize, columns: usize, max_z: f32) -> Geometry {
        Geometry {
            columns,
            rows_visible,
            tile_size: 1.0,
            max_z,
            entry_start_z: -100.0,
            entry_end_z: -99.0,
            exit_start_z: max_z - 0.2,
            exit_end_z: max_z - 0.1,
            ..Geometry::default()
        }
    }

    fn open_rows(kind: SectionKind, n: usize, columns: usize) -> Vec<RowData> {
        let mut rows: Vec<RowData> =
            (0..n).map(|_| RowData::open(kind, columns)).collect();
        rows.first_mut().unwrap().is_section_start = true;
        rows.last_mut().unwrap().is_section_end = true;
        rows
    }

    fn harness(
        geo: &Geometry,
        seed_rows: Vec<RowData>,
    ) -> (ScrollEngine, RowStream, Sequencer, TileAttributes) {
        let mut stream = RowStream::new();
        stream.append(seed_rows);
        let sequencer = Sequencer::new(geo.clone(), &EngineTuning::default(), 7);
        let mut rng = Rng::new(99);
        let mut attrs = TileAttributes::new(geo.rows_visible, geo.columns, &mut rng);
        let engine = ScrollEngine::new(geo.clone(), &mut stream, &mut attrs);
        (engine, stream, sequencer, attrs)
    }

    #[test]
    fn wrap_counts_match_closed_form_oracle() {
        let geo = tiny_geometry(4, 3, 4.0);
        let (mut engine, mut stream, mut seq, mut attrs) =
            harness(&geo, open_rows(SectionKind::Home, 60, 3));

        let cycle = geo.cycle_length();
        for step in 1..=20 {
            engine.advance(1.0, &mut stream, &mut seq, &mut attrs);
            for slot in 0..4 {
                let base_z = geo.base_z(slot);
                let raw = base_z + step as f32 - geo.max_z;
                let expected = if raw < 0.0 {
                    0
                } else {
                    (raw / cycle).floor() as u32 + 1
                };
                assert_eq!(
                    engine.slot_wraps(slot),
                    expected,
                    "step {} slot {}",
                    step,
                    slot
                );
            }
        }
    }

    #[test]
    fn wrapped_positions_stay_in_window() {
        let geo = tiny_geometry(4, 3, 4.0);
        let (mut engine, mut stream, mut seq, mut attrs) =
            harness(&geo, open_rows(SectionKind::Home, 200, 3));

        for _ in 0..50 {
            engine.advance(0.7, &mut stream, &mut seq, &mut attrs);
            for t in engine.transforms() {
                assert!(t.z < geo.max_z);
                assert!(t.z >= geo.max_z - geo.cycle_length() - 1e-4);
            }
        }
    }

    #[test]
    fn basic_wrap_swaps_content_and_fires_hook_once() {
        let geo = tiny_geometry(2, 3, 2.0);
        // R0..R3: R2 ends an obstacle section, so its consumption must
        // append exactly one question section.
        let mut rows = open_rows(SectionKind::Obstacles, 3, 3);
        rows[0].is_section_start = true;
        let mut extra = RowData::open(SectionKind::Question, 3);
        extra.is_section_start = true;
        rows.push(extra);
        let (mut engine, mut stream, mut seq, mut attrs) = harness(&geo, rows);

        assert_eq!(stream.len(), 4);
        assert_eq!(engine.slot_row(0).kind, SectionKind::Obstacles);

        // Frame 1: slot 0 (front) crosses the boundary and takes R2.
        let r1 = engine.advance(1.0, &mut stream, &mut seq, &mut attrs);
        assert_eq!(r1.wraps, 1);
        assert_eq!(engine.slot_wraps(0), 1);
        assert!(engine.slot_row(0).is_section_end);
        assert!(r1.sections_ended.is_empty());

        // Frame 2: slot 1 wraps and takes R3.
        let r2 = engine.advance(1.0, &mut stream, &mut seq, &mut attrs);
        assert_eq!(r2.wraps, 1);
        assert_eq!(engine.slot_row(1).kind, SectionKind::Question);

        // Frame 3: slot 0 consumes R2 (obstacle section end) — the hook
        // fires once and appends a question section to the stream.
        let before = stream.len();
        let r3 = engine.advance(1.0, &mut stream, &mut seq, &mut attrs);
        assert_eq!(r3.sections_ended, vec![SectionKind::Obstacles]);
        assert_eq!(stream.len() - before, layouts::QUESTION_ROWS);
    }

    #[test]
    fn multiple_wraps_in_one_step_are_applied() {
        let geo = tiny_geometry(2, 3, 2.0);
        let (mut engine, mut stream, mut seq, mut attrs) =
            harness(&geo, open_rows(SectionKind::Home, 40, 3));

        // One huge step: 5 full cycles ahead.
        let result = engine.advance(10.0, &mut stream, &mut seq, &mut attrs);
        assert_eq!(engine.slot_wraps(0) + engine.slot_wraps(1), result.wraps);
        assert!(result.wraps >= 9, "expected many wraps, got {}", result.wraps);
        for t in engine.transforms() {
            assert!(t.z < geo.max_z);
        }
    }

    #[test]
    fn attrs_dirty_once_per_wrapping_frame() {
        let geo = tiny_geometry(2, 3, 2.0);
        let (mut engine, mut stream, mut seq, mut attrs) =
            harness(&geo, open_rows(SectionKind::Home, 40, 3));
        attrs.clear_dirty();

        // No boundary crossing: buffers stay clean.
        engine.advance(0.25, &mut stream, &mut seq, &mut attrs);
        assert!(!attrs.is_dirty());

        // Crossing marks them dirty until the consumer acknowledges.
        engine.advance(1.0, &mut stream, &mut seq, &mut attrs);
        assert!(attrs.is_dirty());
        attrs.clear_dirty();
        engine.advance(0.1, &mut stream, &mut seq, &mut attrs);
        assert!(!attrs.is_dirty());
    }

    #[test]
    fn raised_fires_once_per_content_assignment() {
        let geo = Geometry {
            columns: 3,
            rows_visible: 4,
            tile_size: 1.0,
            max_z: 4.0,
            entry_start_z: 0.5,
            entry_end_z: 1.0,
            exit_start_z: 3.0,
            exit_end_z: 3.5,
            ..Geometry::default()
        };
        let (mut engine, mut stream, mut seq, mut attrs) =
            harness(&geo, open_rows(SectionKind::Home, 60, 3));

        // First frame: slots already past entry_end_z raise together.
        let first = engine.advance(0.0, &mut stream, &mut seq, &mut attrs);
        assert_eq!(first.raised, vec![0, 1, 2]);

        // Half a tile: nothing new crosses the threshold.
        let second = engine.advance(0.5, &mut stream, &mut seq, &mut attrs);
        assert!(second.raised.is_empty());

        // Slot 3 (z = 0 -> 1.0) crosses and raises exactly once.
        let third = engine.advance(0.5, &mut stream, &mut seq, &mut attrs);
        assert_eq!(third.raised, vec![3]);
        let fourth = engine.advance(0.25, &mut stream, &mut seq, &mut attrs);
        assert!(fourth.raised.is_empty());
    }

    #[test]
    fn distance_counts_wraps_after_intro() {
        let geo = tiny_geometry(2, 3, 2.0);
        let mut rows = open_rows(SectionKind::Intro, 3, 3);
        rows.extend(open_rows(SectionKind::Obstacles, 40, 3));
        let (mut engine, mut stream, mut seq, mut attrs) = harness(&geo, rows);

        assert_eq!(engine.distance(), 0);
        assert!(!engine.intro_done());

        // Consume until the intro's end row (index 2) has wrapped.
        for _ in 0..3 {
            engine.advance(1.0, &mut stream, &mut seq, &mut attrs);
        }
        assert!(engine.intro_done());
        let at_intro_done = engine.distance();

        for _ in 0..4 {
            engine.advance(1.0, &mut stream, &mut seq, &mut attrs);
        }
        assert_eq!(engine.distance(), at_intro_done + 4);
    }

    #[test]
    fn lift_ramps_across_windows() {
        let geo = Geometry::default();
        assert_eq!(lift_y(&geo, -24.0), geo.lowered_y);
        assert_eq!(lift_y(&geo, geo.entry_start_z), geo.lowered_y);
        let mid_in = lift_y(&geo, (geo.entry_start_z + geo.entry_end_z) / 2.0);
        assert!((mid_in - geo.lowered_y / 2.0).abs() < 1e-4);
        assert_eq!(lift_y(&geo, 0.0), 0.0);
        let mid_out = lift_y(&geo, (geo.exit_start_z + geo.exit_end_z) / 2.0);
        assert!((mid_out - geo.lowered_y / 2.0).abs() < 1e-4);
        assert_eq!(lift_y(&geo, geo.exit_end_z + 0.5), geo.lowered_y);
    }
}
