//! Obstacle section generator.
//!
//! Produces a batch of rows whose safe columns form one contiguous corridor:
//! the centre drifts with 1-D coherent noise (clamped to the player's lateral
//! movement budget per row), the width breathes and shrinks across the batch,
//! and both ends taper to fully open so sections stitch seamlessly with their
//! neighbours.

use serde::{Deserialize, Serialize};

use crate::extensions::easing::lerp;
use crate::terrain::noise::Noise1D;
use crate::terrain::rng::Rng;
use crate::terrain::row::{RowData, SectionKind, SAFE_HEIGHT, UNSAFE_HEIGHT};

/// Breathing term above this noise threshold shaves one column off the width.
const BREATH_THRESHOLD: f32 = 0.72;

/// Generation parameters for one obstacle batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleParams {
    /// Rows per batch.
    #[serde(default = "default_rows")]
    pub rows: usize,
    /// Narrowest corridor, in columns.
    #[serde(default = "default_min_width")]
    pub min_width: usize,
    /// Widest corridor, in columns.
    #[serde(default = "default_max_width")]
    pub max_width: usize,
    /// Maximum corridor-centre shift per row. Must not exceed the player's
    /// per-row lateral movement budget.
    #[serde(default = "default_move_per_row")]
    pub move_per_row: f32,
    /// Noise frequency for the centre drift.
    #[serde(default = "default_freq")]
    pub freq: f32,
    /// Probability of nibbling 1-2 cells off a corridor edge, per row.
    #[serde(default = "default_notch_chance")]
    pub notch_chance: f32,
    /// Rows of width easing at each end of the batch.
    #[serde(default = "default_taper_rows")]
    pub taper_rows: usize,
}

fn default_rows() -> usize {
    40
}
fn default_min_width() -> usize {
    2
}
fn default_max_width() -> usize {
    7
}
fn default_move_per_row() -> f32 {
    1.0
}
fn default_freq() -> f32 {
    0.15
}
fn default_notch_chance() -> f32 {
    0.25
}
fn default_taper_rows() -> usize {
    8
}

impl Default for ObstacleParams {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            min_width: default_min_width(),
            max_width: default_max_width(),
            move_per_row: default_move_per_row(),
            freq: default_freq(),
            notch_chance: default_notch_chance(),
            taper_rows: default_taper_rows(),
        }
    }
}

/// Generate one obstacle batch. Pure and deterministic per `(params, seed)`.
pub fn generate(params: &ObstacleParams, columns: usize, seed: u64) -> Vec<RowData> {
    generate_traced(params, columns, seed).0
}

/// Like [`generate`], but also returns the per-row corridor centres the
/// drift produced, for invariant checks.
pub(crate) fn generate_traced(
    params: &ObstacleParams,
    columns: usize,
    seed: u64,
) -> (Vec<RowData>, Vec<f32>) {
    let drift = Noise1D::new(seed, params.freq);
    let breath = Noise1D::new(seed ^ 0x9e37_79b9_7f4a_7c15, params.freq * 2.3);
    let mut rng = Rng::new(seed | 1);

    // Taper bands must never overlap, even for short batches.
    let taper = params.taper_rows.min(params.rows / 2);
    let span = (params.rows.saturating_sub(1)).max(1) as f32;

    let mut centre = (columns as f32 - 1.0) * 0.5;
    let mut rows = Vec::with_capacity(params.rows);
    let mut centres = Vec::with_capacity(params.rows);

    for i in 0..params.rows {
        let target = drift.sample(i) * (columns as f32 - 1.0);
        let delta = (target - centre).clamp(-params.move_per_row, params.move_per_row);
        centre = (centre + delta).clamp(0.0, columns as f32 - 1.0);
        centres.push(centre);

        // Width shrinks linearly across the batch, with a noise-driven
        // breathing term that occasionally shaves one column.
        let mut width =
            lerp(params.max_width as f32, params.min_width as f32, i as f32 / span);
        if breath.sample(i) > BREATH_THRESHOLD {
            width -= 1.0;
        }
        let width = width.clamp(params.min_width as f32, params.max_width as f32);

        // Taper factor: 0 at the batch edges (fully open), 1 in the middle.
        let f_in = if taper == 0 {
            1.0
        } else {
            (i as f32 / taper as f32).min(1.0)
        };
        let f_out = if taper == 0 {
            1.0
        } else {
            ((params.rows - 1 - i) as f32 / taper as f32).min(1.0)
        };
        let f = f_in.min(f_out);
        let effective = lerp(columns as f32, width, f);

        let mut row = RowData::open(SectionKind::Obstacles, columns);
        if effective < columns as f32 {
            let half = (effective - 1.0) * 0.5;
            let left = ((centre - half).round() as i32).clamp(0, columns as i32 - 1) as usize;
            let right = ((centre + half).round() as i32).clamp(0, columns as i32 - 1) as usize;
            for (col, h) in row.heights.iter_mut().enumerate() {
                if col < left || col > right {
                    *h = UNSAFE_HEIGHT;
                }
            }

            // Near-miss notch: only outside the taper bands, and never
            // allowed to seal the corridor.
            if f >= 1.0 && rng.chance(params.notch_chance) {
                let depth = 1 + rng.next_int(2) as usize;
                let from_left = rng.next_int(2) == 0;
                for d in 0..depth {
                    let col = if from_left {
                        left as i32 + d as i32
                    } else {
                        right as i32 - d as i32
                    };
                    if col >= left as i32 && col <= right as i32 {
                        row.heights[col as usize] = UNSAFE_HEIGHT;
                    }
                }
                if row.safe_count() == 0 {
                    let reopen =
                        (centre.round() as i32).clamp(0, columns as i32 - 1) as usize;
                    row.heights[reopen] = SAFE_HEIGHT;
                }
            }
        }

        rows.push(row);
    }

    if let Some(first) = rows.first_mut() {
        first.is_section_start = true;
    }
    if let Some(last) = rows.last_mut() {
        last.is_section_end = true;
    }

    (rows, centres)
}
