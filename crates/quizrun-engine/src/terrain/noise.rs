//! Hash-based coherent value noise for corridor shaping.
//!
//! A 2-D primitive (hashed lattice, smoothstep bilinear blend) from which the
//! obstacle generator derives 1-D functions by fixing one axis to a
//! seed-dependent offset.

use crate::extensions::easing::smoothstep;

/// Hash a lattice point to a pseudo-random value in [0, 1).
pub fn hash_2d(x: f32, y: f32) -> f32 {
    let n = (x * 127.1 + y * 311.7).sin() * 43758.5453;
    n - n.floor()
}

/// 2-D value noise in [0, 1).
pub fn value_noise_2d(x: f32, y: f32) -> f32 {
    let ix = x.floor();
    let iy = y.floor();
    let fx = x - ix;
    let fy = y - iy;

    let v00 = hash_2d(ix, iy);
    let v10 = hash_2d(ix + 1.0, iy);
    let v01 = hash_2d(ix, iy + 1.0);
    let v11 = hash_2d(ix + 1.0, iy + 1.0);

    let sx = smoothstep(fx);
    let sy = smoothstep(fy);

    let v0 = v00 + sx * (v10 - v00);
    let v1 = v01 + sx * (v11 - v01);

    v0 + sy * (v1 - v0)
}

/// A 1-D slice of the 2-D noise field: one axis fixed by the seed, the other
/// scaled by `freq` so consecutive integer samples vary coherently.
#[derive(Debug, Clone)]
pub struct Noise1D {
    axis: f32,
    freq: f32,
}

impl Noise1D {
    pub fn new(seed: u64, freq: f32) -> Self {
        // Fold the seed into a lattice offset; modulo keeps it within f32
        // precision so distinct seeds stay distinct.
        let axis = (seed % 8192) as f32 * 0.917 + 0.5;
        Self { axis, freq }
    }

    /// Sample at integer position `i`, returning a value in [0, 1).
    pub fn sample(&self, i: usize) -> f32 {
        value_noise_2d(i as f32 * self.freq, self.axis)
    }
}
