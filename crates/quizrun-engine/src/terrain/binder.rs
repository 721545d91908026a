//! Moving-element binder: glues auxiliary entities (question text, answer
//! tiles, colour picker, info zones, logo) to their trigger rows.
//!
//! Elements are positioned when their row is raised, advance with the same
//! per-frame scroll delta as the terrain, and are parked at a fixed
//! off-screen position once past the far plane — no unbounded drift, no
//! per-frame writes for off-screen entities.

use glam::Vec3;

use crate::core::constants::Geometry;
use crate::renderer::instance::ElementTransform;
use crate::terrain::row::RowData;

pub const MAX_ANSWER_TILES: usize = 4;
pub const MAX_INFO_ZONES: usize = 4;

/// Fixed pool: text, 4 answer tiles, logo, colour picker, 4 info zones.
pub const ELEMENT_SLOTS: usize = 3 + MAX_ANSWER_TILES + MAX_INFO_ZONES;

pub const SLOT_QUESTION_TEXT: usize = 0;
pub const SLOT_ANSWER_BASE: usize = 1;
pub const SLOT_LOGO: usize = 1 + MAX_ANSWER_TILES;
pub const SLOT_COLOUR_PICKER: usize = 2 + MAX_ANSWER_TILES;
pub const SLOT_INFO_BASE: usize = 3 + MAX_ANSWER_TILES;

#[derive(Debug, Clone, Copy)]
struct BoundElement {
    pos: Vec3,
    active: bool,
}

pub struct ElementBinder {
    elements: [BoundElement; ELEMENT_SLOTS],
    hide_z: f32,
    hidden_pos: Vec3,
}

impl ElementBinder {
    pub fn new(geo: &Geometry) -> Self {
        Self {
            elements: [BoundElement {
                pos: geo.hidden_pos,
                active: false,
            }; ELEMENT_SLOTS],
            hide_z: geo.hide_z,
            hidden_pos: geo.hidden_pos,
        }
    }

    /// Park every element off-screen.
    pub fn reset(&mut self) {
        for el in self.elements.iter_mut() {
            el.pos = self.hidden_pos;
            el.active = false;
        }
    }

    /// Advance active elements by the frame's scroll delta. Past the far
    /// plane they snap to the parking position and stop advancing until a
    /// future trigger repositions them.
    pub fn advance(&mut self, z_step: f32) {
        for el in self.elements.iter_mut() {
            if !el.active {
                continue;
            }
            el.pos.z += z_step;
            if el.pos.z > self.hide_z {
                el.pos = self.hidden_pos;
                el.active = false;
            }
        }
    }

    /// Position every element the raised row carries a placement for.
    /// Placement indices beyond the pool are skipped — content-driven
    /// counts can legitimately exceed the pool (legacy 4-tile layouts).
    pub fn bind_row(&mut self, row: &RowData, row_z: f32) {
        let p = &row.placements;
        if let Some(rel) = p.question_text {
            self.place(SLOT_QUESTION_TEXT, rel, row_z);
        }
        for (i, rel) in p.answer_tiles.iter().enumerate().take(MAX_ANSWER_TILES) {
            self.place(SLOT_ANSWER_BASE + i, *rel, row_z);
        }
        if let Some(rel) = p.logo {
            self.place(SLOT_LOGO, rel, row_z);
        }
        if let Some(rel) = p.colour_picker {
            self.place(SLOT_COLOUR_PICKER, rel, row_z);
        }
        for (i, rel) in p.info_zones.iter().enumerate().take(MAX_INFO_ZONES) {
            self.place(SLOT_INFO_BASE + i, *rel, row_z);
        }
    }

    fn place(&mut self, slot: usize, rel: Vec3, row_z: f32) {
        self.elements[slot] = BoundElement {
            pos: Vec3::new(rel.x, rel.y, row_z + rel.z),
            active: true,
        };
    }

    pub fn position(&self, slot: usize) -> Vec3 {
        self.elements[slot].pos
    }

    pub fn is_active(&self, slot: usize) -> bool {
        self.elements[slot].active
    }

    pub fn active_count(&self) -> usize {
        self.elements.iter().filter(|e| e.active).count()
    }

    /// Write the pool into a wire-format transform slice.
    pub fn write_transforms(&self, out: &mut [ElementTransform]) {
        for (el, t) in self.elements.iter().zip(out.iter_mut()) {
            *t = ElementTransform {
                x: el.pos.x,
                y: el.pos.y,
                z: el.pos.z,
                active: if el.active { 1.0 } else { 0.0 },
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::row::{RowData, SectionKind};

    fn binder() -> ElementBinder {
        ElementBinder::new(&Geometry::default())
    }

    fn question_row(tiles: usize) -> RowData {
        let mut row = RowData::open(SectionKind::Question, 9);
        row.placements.answer_tiles = (0..tiles)
            .map(|i| Vec3::new(i as f32, 0.0, 0.5))
            .collect();
        row
    }

    #[test]
    fn bind_positions_relative_to_row() {
        let mut b = binder();
        let mut row = RowData::open(SectionKind::Question, 9);
        row.placements.question_text = Some(Vec3::new(0.0, 1.5, 2.0));
        b.bind_row(&row, -16.0);

        assert!(b.is_active(SLOT_QUESTION_TEXT));
        assert_eq!(b.position(SLOT_QUESTION_TEXT), Vec3::new(0.0, 1.5, -14.0));
    }

    #[test]
    fn advance_moves_active_elements_only() {
        let mut b = binder();
        b.bind_row(&question_row(2), 0.0);
        let before_inactive = b.position(SLOT_LOGO);

        b.advance(1.5);
        assert_eq!(b.position(SLOT_ANSWER_BASE).z, 2.0);
        assert_eq!(b.position(SLOT_LOGO), before_inactive);
    }

    #[test]
    fn hides_and_freezes_past_far_plane() {
        let geo = Geometry::default();
        let mut b = ElementBinder::new(&geo);
        b.bind_row(&question_row(1), geo.hide_z - 1.0);

        b.advance(0.5);
        assert!(b.is_active(SLOT_ANSWER_BASE));

        b.advance(1.0);
        assert!(!b.is_active(SLOT_ANSWER_BASE));
        assert_eq!(b.position(SLOT_ANSWER_BASE), geo.hidden_pos);

        // Frozen: further advances leave the parked position untouched.
        b.advance(100.0);
        assert_eq!(b.position(SLOT_ANSWER_BASE), geo.hidden_pos);
    }

    #[test]
    fn skips_placements_beyond_pool() {
        let mut b = binder();
        // 6 tiles in content, 4 slots in the pool: extras must be ignored,
        // never panic.
        b.bind_row(&question_row(6), 0.0);
        assert_eq!(b.active_count(), MAX_ANSWER_TILES);
    }

    #[test]
    fn reset_parks_everything() {
        let geo = Geometry::default();
        let mut b = ElementBinder::new(&geo);
        b.bind_row(&question_row(2), 0.0);
        assert!(b.active_count() > 0);

        b.reset();
        assert_eq!(b.active_count(), 0);
        assert_eq!(b.position(SLOT_ANSWER_BASE), geo.hidden_pos);
    }

    #[test]
    fn write_transforms_round_trips_activity() {
        let mut b = binder();
        b.bind_row(&question_row(1), 2.0);
        let mut out = [ElementTransform::default(); ELEMENT_SLOTS];
        b.write_transforms(&mut out);
        assert_eq!(out[SLOT_ANSWER_BASE].active, 1.0);
        assert_eq!(out[SLOT_ANSWER_BASE].z, 2.5);
        assert_eq!(out[SLOT_LOGO].active, 0.0);
    }
}
