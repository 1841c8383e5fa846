//! Deterministic generator behind the `random` routine.

use rand::RngCore;

/// xorshift128 over four 32-bit words.
///
/// Scripts see `next_u32() / 2^32`, a float in `[0, 1)`. The state is reseeded
/// on every runtime initialization so a given seed replays the same sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XorShift128 {
    state: [u32; 4],
}

impl XorShift128 {
    pub fn new(seed: [u32; 4]) -> Self {
        let mut rng = Self { state: [0; 4] };
        rng.reseed(seed);
        rng
    }

    /// An all-zero state never leaves zero, so it is replaced by a fixed word.
    pub fn reseed(&mut self, seed: [u32; 4]) {
        self.state = if seed.iter().all(|word| *word == 0) {
            [0x9E37_79B9, 0, 0, 0]
        } else {
            seed
        };
    }

    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.step()) / 4_294_967_296.0
    }

    fn step(&mut self) -> u32 {
        let [x, y, z, w] = self.state;
        let mut t = x ^ (x << 11);
        t ^= t >> 8;
        let next = w ^ (w >> 19) ^ t;
        self.state = [y, z, w, next];
        next
    }
}

impl RngCore for XorShift128 {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let low = u64::from(self.step());
        let high = u64::from(self.step());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
