//! Seeded pseudo-random generator.
//!
//! The kernel hands every thread a seed at start. The stack guard and this
//! generator are both derived from it, so the generator is ready before the
//! thread's entry point can draw from it.

use spin::Mutex;

use shield_abi::SspSeed;

/// Marsaglia xorshift generator over a 32-bit state.
///
/// The state must never be zero; [`Xorshift32::from_seed`] mixes the seed so
/// that every seed, zero included, yields a valid state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    pub const fn from_seed(seed: SspSeed) -> Self {
        Self { state: mix(seed) }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

const fn mix(seed: u32) -> u32 {
    let mut z = seed.wrapping_add(0x9E37_79B9);
    z = (z ^ (z >> 16)).wrapping_mul(0x85EB_CA6B);
    z = (z ^ (z >> 13)).wrapping_mul(0xC2B2_AE35);
    z ^= z >> 16;
    if z == 0 { 0x6D2B_79F5 } else { z }
}

static RNG: Mutex<Option<Xorshift32>> = Mutex::new(None);

/// (Re)seed the thread's generator.
pub fn rand_set_seed(seed: SspSeed) {
    *RNG.lock() = Some(Xorshift32::from_seed(seed));
}

pub fn rand_is_seeded() -> bool {
    RNG.lock().is_some()
}

/// Next value, or `None` if the generator was never seeded.
pub fn rand_next_u32() -> Option<u32> {
    RNG.lock().as_mut().map(Xorshift32::next_u32)
}
