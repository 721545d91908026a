//! Shared geometry contract between the engine and the rendering/physics
//! layers. Tile world positions must align with collider placement, so these
//! values are read by both sides verbatim (the WASM bridge writes them into
//! the protocol header).

use glam::Vec3;

/// Tiles per terrain row.
pub const COLUMNS: usize = 9;

/// Row slots in the visible recycling window.
pub const ROWS_VISIBLE: usize = 30;

/// World-space depth of one row.
pub const TILE_SIZE: f32 = 1.0;

/// Wrap boundary: a row crossing this Z recycles to the far side.
pub const MAX_Z: f32 = 6.0;

/// Entry window: rows rise from `LOWERED_Y` to level between these two Z
/// values. A row becomes "raised" once it passes `ENTRY_END_Z`.
pub const ENTRY_START_Z: f32 = -20.0;
pub const ENTRY_END_Z: f32 = -16.0;

/// Exit window: rows sink back down between these two Z values before the
/// wrap boundary.
pub const EXIT_START_Z: f32 = 3.0;
pub const EXIT_END_Z: f32 = 5.0;

/// Resting Y for rows outside the level span.
pub const LOWERED_Y: f32 = -6.0;

/// Bound elements past this Z are parked off-screen.
pub const ELEMENT_HIDE_Z: f32 = 8.0;

/// Off-screen parking position for hidden elements.
pub const ELEMENT_HIDDEN_POS: Vec3 = Vec3::new(0.0, -40.0, 40.0);

/// World units scrolled per second at full terrain speed.
pub const SCROLL_RATE: f32 = 10.0;

/// The spatial contract in one struct. `Default` is the production contract
/// above; tests construct small worlds directly.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub columns: usize,
    pub rows_visible: usize,
    pub tile_size: f32,
    pub max_z: f32,
    pub entry_start_z: f32,
    pub entry_end_z: f32,
    pub exit_start_z: f32,
    pub exit_end_z: f32,
    pub lowered_y: f32,
    pub hide_z: f32,
    pub hidden_pos: Vec3,
    pub scroll_rate: f32,
}

impl Geometry {
    /// World-space length of one full recycling cycle.
    pub fn cycle_length(&self) -> f32 {
        self.rows_visible as f32 * self.tile_size
    }

    /// Static offset of a slot within the cycle. Slot 0 is the front row;
    /// freshly wrapped content re-enters at the far side.
    pub fn base_z(&self, slot: usize) -> f32 {
        self.max_z - (slot as f32 + 1.0) * self.tile_size
    }

    /// World X of a column centre, with the grid centred on X = 0.
    pub fn column_x(&self, col: f32) -> f32 {
        (col - (self.columns as f32 - 1.0) / 2.0) * self.tile_size
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            columns: COLUMNS,
            rows_visible: ROWS_VISIBLE,
            tile_size: TILE_SIZE,
            max_z: MAX_Z,
            entry_start_z: ENTRY_START_Z,
            entry_end_z: ENTRY_END_Z,
            exit_start_z: EXIT_START_Z,
            exit_end_z: EXIT_END_Z,
            lowered_y: LOWERED_Y,
            hide_z: ELEMENT_HIDE_Z,
            hidden_pos: ELEMENT_HIDDEN_POS,
            scroll_rate: SCROLL_RATE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_z_spans_one_cycle() {
        let geo = Geometry::default();
        assert_eq!(geo.base_z(0), MAX_Z - TILE_SIZE);
        let back = geo.base_z(ROWS_VISIBLE - 1);
        assert!((back - (MAX_Z - geo.cycle_length())).abs() < 1e-6);
    }

    #[test]
    fn windows_sit_inside_visible_span() {
        let geo = Geometry::default();
        let span_start = geo.max_z - geo.cycle_length();
        assert!(geo.entry_start_z > span_start);
        assert!(geo.entry_end_z > geo.entry_start_z);
        assert!(geo.exit_start_z > geo.entry_end_z);
        assert!(geo.exit_end_z < geo.max_z);
    }

    #[test]
    fn column_x_is_centred() {
        let geo = Geometry::default();
        assert_eq!(geo.column_x(4.0), 0.0);
        assert_eq!(geo.column_x(0.0), -4.0);
        assert_eq!(geo.column_x(8.0), 4.0);
    }
}
