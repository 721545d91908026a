//! Fixed-layout section generators: home, intro and question batches.
//!
//! These need no randomness — positions are fixed offsets within the
//! section. Each section designates trigger rows whose placements are fired
//! when the row is raised into the active window.

use glam::Vec3;

use crate::core::constants::Geometry;
use crate::terrain::row::{RowData, SectionKind, UNSAFE_HEIGHT};

/// Rows per question section.
pub const QUESTION_ROWS: usize = 24;

/// Row band occupied by the answer-tile footprints.
pub const QUESTION_TILE_FIRST_ROW: usize = 12;
pub const QUESTION_TILE_LAST_ROW: usize = 15;

/// Trigger row for the question text: early enough that the text is
/// readable before the answer tiles arrive.
pub const QUESTION_TEXT_ROW: usize = 3;

/// Rows per home section.
pub const HOME_ROWS: usize = 20;
pub const HOME_LOGO_ROW: usize = 2;
pub const HOME_COLOUR_PICKER_ROW: usize = 8;
pub const HOME_INFO_ROW: usize = 13;

/// Rows per intro section.
pub const INTRO_ROWS: usize = 16;
pub const INTRO_INFO_ROW: usize = 4;

fn open_section(kind: SectionKind, rows: usize, columns: usize) -> Vec<RowData> {
    let mut batch: Vec<RowData> = (0..rows).map(|_| RowData::open(kind, columns)).collect();
    if let Some(first) = batch.first_mut() {
        first.is_section_start = true;
    }
    if let Some(last) = batch.last_mut() {
        last.is_section_end = true;
    }
    batch
}

/// Trigger row and relative Z offset for a footprint centred on
/// `centre_row`. The trigger is the ceiling of the centre; the offset walks
/// the element back onto the exact geometric centre (earlier rows in a
/// section sit closer to the player, so the offset points along +Z).
fn trigger_for_centre(centre_row: f32, tile_size: f32) -> (usize, f32) {
    let trigger = centre_row.ceil();
    (trigger as usize, (trigger - centre_row) * tile_size)
}

/// Question section: two symmetric answer-tile footprints separated by a
/// blocked centre column, forcing the player onto one tile or the other.
pub fn question(geo: &Geometry) -> Vec<RowData> {
    let columns = geo.columns;
    let mut batch = open_section(SectionKind::Question, QUESTION_ROWS, columns);

    let gap = columns / 2;
    for row in &mut batch[QUESTION_TILE_FIRST_ROW..=QUESTION_TILE_LAST_ROW] {
        row.heights[gap] = UNSAFE_HEIGHT;
        for col in 0..columns {
            if col < gap {
                row.answer_numbers[col] = 1;
            } else if col > gap {
                row.answer_numbers[col] = 2;
            }
        }
    }

    let centre_row =
        (QUESTION_TILE_FIRST_ROW + QUESTION_TILE_LAST_ROW) as f32 / 2.0;
    let (trigger, z_rel) = trigger_for_centre(centre_row, geo.tile_size);
    let left_x = geo.column_x((gap as f32 - 1.0) / 2.0);
    let right_x = geo.column_x((gap + 1 + columns - 1) as f32 / 2.0);
    batch[trigger].placements.answer_tiles = vec![
        Vec3::new(left_x, 0.0, z_rel),
        Vec3::new(right_x, 0.0, z_rel),
    ];

    batch[QUESTION_TEXT_ROW].placements.question_text = Some(Vec3::new(0.0, 1.5, 0.0));

    batch
}

/// Home section: fully open terrain carrying the logo, the colour picker
/// and two info zones at fixed trigger rows.
pub fn home(geo: &Geometry) -> Vec<RowData> {
    let mut batch = open_section(SectionKind::Home, HOME_ROWS, geo.columns);

    batch[HOME_LOGO_ROW].placements.logo = Some(Vec3::new(0.0, 2.5, 0.0));
    batch[HOME_COLOUR_PICKER_ROW].placements.colour_picker =
        Some(Vec3::new(0.0, 0.0, 0.0));

    let offset = geo.columns as f32 / 3.5;
    batch[HOME_INFO_ROW].placements.info_zones = vec![
        Vec3::new(-offset * geo.tile_size, 0.5, 0.0),
        Vec3::new(offset * geo.tile_size, 0.5, 0.0),
    ];

    batch
}

/// Intro section: open runway with one instructional info zone.
pub fn intro(geo: &Geometry) -> Vec<RowData> {
    let mut batch = open_section(SectionKind::Intro, INTRO_ROWS, geo.columns);
    batch[INTRO_INFO_ROW].placements.info_zones = vec![Vec3::new(0.0, 0.8, 0.0)];
    batch
}
