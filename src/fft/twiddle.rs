//! Twiddle factors and source indices for every butterfly stage.
//!
//! Stage `s` of an N-point transform has N/2 butterflies. Butterfly `j`
//! reads samples `i` and `i + b` where `b = N >> (s + 1)` and
//! `i = 2b·(j / b) + j % b`, and rotates the second one by
//! `e^{-iπ·(j / b) / 2^s}`. Writing the sum to `j` and the difference to
//! `j + N/2` gives a self-sorting schedule: the last stage leaves the
//! transform in natural order, so no separate bit-reversal pass is needed.

use crate::error::{ensure_texture_size, OceanError};

/// One butterfly: rotation factor and the two samples it combines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Butterfly {
    pub twiddle: [f32; 2],
    pub inputs: [u32; 2],
}

/// Immutable (log2 N) × (N/2) table of butterflies
#[derive(Debug, Clone)]
pub struct TwiddleTable {
    size: u32,
    stages: u32,
    entries: Vec<Butterfly>,
}

impl TwiddleTable {
    pub fn new(size: u32) -> Result<Self, OceanError> {
        ensure_texture_size(size)?;

        let stages = size.trailing_zeros();
        let half = size / 2;
        let mut entries = Vec::with_capacity((stages * half) as usize);

        for stage in 0..stages {
            let span = size >> (stage + 1);
            let half_stage_width = (1u32 << stage) as f64;
            for j in 0..half {
                let group = j / span;
                let first = 2 * span * group + j % span;
                let angle = -std::f64::consts::PI * group as f64 / half_stage_width;
                entries.push(Butterfly {
                    twiddle: [angle.cos() as f32, angle.sin() as f32],
                    inputs: [first, first + span],
                });
            }
        }

        Ok(Self {
            size,
            stages,
            entries,
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of butterfly stages per axis (log2 N)
    pub fn stages(&self) -> u32 {
        self.stages
    }

    pub fn butterfly(&self, stage: u32, index: u32) -> Butterfly {
        self.entries[(stage * self.size / 2 + index) as usize]
    }

    /// Texel data for an RGBA32F texture of width N/2 and height log2 N:
    /// `(re, im, first input, second input)`
    pub fn to_texels(&self) -> Vec<f32> {
        self.entries
            .iter()
            .flat_map(|b| {
                [
                    b.twiddle[0],
                    b.twiddle[1],
                    b.inputs[0] as f32,
                    b.inputs[1] as f32,
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustfft::num_complex::Complex;
    use rustfft::FftPlanner;

    type C64 = Complex<f64>;

    /// One inverse butterfly stage exactly as the GPU kernel evaluates it
    fn inverse_stage(table: &TwiddleTable, stage: u32, input: &[C64]) -> Vec<C64> {
        let half = table.size() / 2;
        (0..table.size())
            .map(|x| {
                let b = table.butterfly(stage, x % half);
                let sign = if x >= half { -1.0 } else { 1.0 };
                let w = C64::new(b.twiddle[0] as f64, -(b.twiddle[1] as f64)) * sign;
                input[b.inputs[0] as usize] + w * input[b.inputs[1] as usize]
            })
            .collect()
    }

    fn inverse_1d(table: &TwiddleTable, data: &[C64]) -> Vec<C64> {
        (0..table.stages()).fold(data.to_vec(), |acc, stage| inverse_stage(table, stage, &acc))
    }

    fn pseudo_random(n: usize, seed: u64) -> Vec<C64> {
        let mut state = seed;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5
        };
        (0..n).map(|_| C64::new(next(), next())).collect()
    }

    #[test]
    fn test_table_shape() {
        let table = TwiddleTable::new(64).unwrap();
        assert_eq!(table.stages(), 6);
        assert_eq!(table.to_texels().len(), 6 * 32 * 4);
        assert!(TwiddleTable::new(1).is_err());
        assert!(TwiddleTable::new(24).is_err());
    }

    #[test]
    fn test_first_stage_pairs_half_apart() {
        let table = TwiddleTable::new(8).unwrap();
        for j in 0..4 {
            let b = table.butterfly(0, j);
            assert_eq!(b.inputs, [j, j + 4]);
            assert_eq!(b.twiddle, [1.0, 0.0]);
        }
        // Last stage pairs neighbours with twiddle e^{-iπj/4}
        let last = table.butterfly(2, 1);
        assert_eq!(last.inputs, [2, 3]);
        assert!((last.twiddle[0] - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((last.twiddle[1] + std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_schedule_matches_reference_inverse_fft() {
        let mut planner = FftPlanner::<f64>::new();
        for size in [2u32, 4, 8, 16, 64, 256] {
            let table = TwiddleTable::new(size).unwrap();
            let input = pseudo_random(size as usize, size as u64);

            let ours = inverse_1d(&table, &input);

            let mut reference = input.clone();
            planner.plan_fft_inverse(size as usize).process(&mut reference);

            for (a, b) in ours.iter().zip(&reference) {
                assert!((a - b).norm() < 1e-4, "size {}: {} vs {}", size, a, b);
            }
        }
    }

    #[test]
    fn test_separable_2d_schedule_with_checkerboard() {
        // Rows then columns, then (-1)^(x+y): equals the centred inverse DFT
        let size = 16usize;
        let table = TwiddleTable::new(size as u32).unwrap();
        let spectrum = pseudo_random(size * size, 99);

        let mut grid = spectrum.clone();
        for y in 0..size {
            let row = inverse_1d(&table, &grid[y * size..(y + 1) * size]);
            grid[y * size..(y + 1) * size].copy_from_slice(&row);
        }
        for x in 0..size {
            let column: Vec<C64> = (0..size).map(|y| grid[y * size + x]).collect();
            for (y, v) in inverse_1d(&table, &column).into_iter().enumerate() {
                grid[y * size + x] = v;
            }
        }

        let half = size as f64 / 2.0;
        for y in 0..size {
            for x in 0..size {
                let sign = if (x + y) % 2 == 0 { 1.0 } else { -1.0 };
                let ours = grid[y * size + x] * sign;

                let mut expected = C64::new(0.0, 0.0);
                for ky in 0..size {
                    for kx in 0..size {
                        let phase = std::f64::consts::TAU
                            * ((kx as f64 - half) * x as f64 + (ky as f64 - half) * y as f64)
                            / size as f64;
                        expected += spectrum[ky * size + kx] * C64::from_polar(1.0, phase);
                    }
                }
                assert!((ours - expected).norm() < 1e-3);
            }
        }
    }
}
