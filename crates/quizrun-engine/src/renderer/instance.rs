use bytemuck::{Pod, Zeroable};

use crate::terrain::rng::Rng;
use crate::terrain::row::{RowData, SAFE_HEIGHT};

/// Per-slot row transform written to the shared buffer for the renderer
/// and physics layer. 4 floats = 16 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct RowTransform {
    /// X position in world space (rows never move laterally).
    pub x: f32,
    /// Lift offset: `lowered_y` outside the level span, 0 when level.
    pub y: f32,
    /// Wrapped scroll position.
    pub z: f32,
    /// Wrap count, so the renderer can detect content swaps.
    pub wraps: f32,
}

impl RowTransform {
    pub const FLOATS: usize = 4;
}

/// World transform of one bound element. `active` is 0.0 or 1.0.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct ElementTransform {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub active: f32,
}

impl ElementTransform {
    pub const FLOATS: usize = 4;
}

/// Per-tile instance attributes, `rows_visible x columns` flat arrays in
/// slot-major order. Written on initial fill and on every row wrap;
/// consumed by the renderer as dirty-flagged GPU buffers.
pub struct TileAttributes {
    columns: usize,
    /// 1.0 where the tile is rollable, 0.0 where sunken.
    visibility: Vec<f32>,
    /// Stable per-physical-instance seed: written once at setup and never
    /// on recycle, so cosmetic jitter does not pop when content swaps.
    seeds: Vec<f32>,
    /// Answer-tile ownership, 0.0 or 1.0..=4.0.
    answers: Vec<f32>,
    dirty: bool,
}

impl TileAttributes {
    pub fn new(rows_visible: usize, columns: usize, rng: &mut Rng) -> Self {
        let count = rows_visible * columns;
        let seeds = (0..count).map(|_| rng.next_f32()).collect();
        Self {
            columns,
            visibility: vec![0.0; count],
            seeds,
            answers: vec![0.0; count],
            dirty: false,
        }
    }

    /// Write one slot's attributes from its newly assigned row.
    /// Does not touch the dirty flag; the scroll engine marks it at most
    /// once per frame.
    pub fn write_row(&mut self, slot: usize, row: &RowData) {
        let base = slot * self.columns;
        for col in 0..self.columns {
            self.visibility[base + col] =
                if row.heights[col] == SAFE_HEIGHT { 1.0 } else { 0.0 };
            self.answers[base + col] = row.answer_numbers[col] as f32;
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Consumer acknowledges the upload.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn tile_count(&self) -> usize {
        self.visibility.len()
    }

    pub fn visibility(&self) -> &[f32] {
        &self.visibility
    }

    pub fn seeds(&self) -> &[f32] {
        &self.seeds
    }

    pub fn answers(&self) -> &[f32] {
        &self.answers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::row::{RowData, SectionKind, UNSAFE_HEIGHT};

    #[test]
    fn transforms_are_four_floats() {
        assert_eq!(std::mem::size_of::<RowTransform>(), 16);
        assert_eq!(std::mem::size_of::<ElementTransform>(), 16);
    }

    #[test]
    fn write_row_mirrors_heights_and_answers() {
        let mut rng = Rng::new(1);
        let mut attrs = TileAttributes::new(2, 3, &mut rng);
        let mut row = RowData::open(SectionKind::Question, 3);
        row.heights[1] = UNSAFE_HEIGHT;
        row.answer_numbers = vec![1, 0, 2];

        attrs.write_row(1, &row);
        assert_eq!(&attrs.visibility()[3..6], &[1.0, 0.0, 1.0]);
        assert_eq!(&attrs.answers()[3..6], &[1.0, 0.0, 2.0]);
        // Slot 0 untouched.
        assert_eq!(&attrs.visibility()[0..3], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn seeds_survive_recycling() {
        let mut rng = Rng::new(1);
        let mut attrs = TileAttributes::new(2, 3, &mut rng);
        let seeds_before = attrs.seeds().to_vec();

        let row = RowData::open(SectionKind::Obstacles, 3);
        attrs.write_row(0, &row);
        attrs.write_row(1, &row);
        assert_eq!(attrs.seeds(), &seeds_before[..]);
    }

    #[test]
    fn dirty_flag_is_explicit() {
        let mut rng = Rng::new(1);
        let mut attrs = TileAttributes::new(1, 3, &mut rng);
        assert!(!attrs.is_dirty());

        let row = RowData::open(SectionKind::Home, 3);
        attrs.write_row(0, &row);
        assert!(!attrs.is_dirty());

        attrs.mark_dirty();
        assert!(attrs.is_dirty());
        attrs.clear_dirty();
        assert!(!attrs.is_dirty());
    }
}
