//! Probability helpers and a scripted RNG for replaying fixed rolls.

use rand::{Error, Rng, RngCore};

/// Uniform roll in `[0, 1)`.
pub fn roll(rng: &mut impl Rng) -> f64 {
    rng.gen::<f64>()
}

/// True with probability `chance` (clamped to `[0, 1]`).
pub fn chance(rng: &mut impl Rng, chance: f64) -> bool {
    roll(rng) < clamp_probability(chance)
}

/// Uniform value in `[min, max]`; returns `min` when the range is empty.
pub fn range(rng: &mut impl Rng, min: f64, max: f64) -> f64 {
    if max <= min {
        return min;
    }
    min + roll(rng) * (max - min)
}

/// Uniform index in `0..len` drawn from a single unit roll (0 when `len` is 0).
///
/// Integer draws go through here rather than `gen_range` so a scripted roll
/// maps to a predictable slot instead of hitting rejection sampling.
pub fn pick_index(rng: &mut impl Rng, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    ((roll(rng) * len as f64) as usize).min(len - 1)
}

/// Clamp a probability into `[0, 1]`, mapping NaN to 0.
pub fn clamp_probability(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// RNG that yields a scripted sequence of unit rolls, then repeats the last.
///
/// `gen::<f64>()` on this generator returns exactly the scripted values, so a
/// roll of `0.5` always beats a 60% check and always fails a 5% check.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    rolls: Vec<f64>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(rolls: Vec<f64>) -> Self {
        let rolls = if rolls.is_empty() { vec![0.5] } else { rolls };
        Self { rolls, cursor: 0 }
    }

    /// Every roll returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    fn next_roll(&mut self) -> f64 {
        let index = self.cursor.min(self.rolls.len() - 1);
        self.cursor = self.cursor.saturating_add(1);
        self.rolls[index]
    }
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        // f64 sampling keeps the top 53 bits.
        let unit = self.next_roll().clamp(0.0, 1.0 - f64::EPSILON);
        ((unit * (1u64 << 53) as f64) as u64) << 11
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
