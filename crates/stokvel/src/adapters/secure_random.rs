// Rust guideline compliant 2026-10-19

//! Draw generator for the rotation allocator: `rand`'s `StdRng` (ChaCha-based
//! CSPRNG).
//!
//! Build one per draw: an OS-seeded instance shares no state with any other
//! draw. A fixed seed makes a draw replayable, which is only meant for demos
//! and tests.

use rand::{SeedableRng as _, rngs::StdRng};

/// Create the generator for one draw.
///
/// `seed = Some(s)` produces a replayable stream; `None` seeds from the OS.
#[must_use]
pub fn draw_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}
