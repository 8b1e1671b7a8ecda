//! Stack guard store.
//!
//! Compiler stack protection reads `__stack_chk_guard` in every protected
//! prologue and compares against it in the epilogue. The value is written once
//! per thread start from the kernel seed and has no public read accessor.

use core::sync::atomic::{AtomicUsize, Ordering};

use shield_abi::SspSeed;

/// Pointer-sized guard word.
///
/// `repr(transparent)` keeps the layout identical to the plain word the
/// compiler's instrumentation loads.
#[repr(transparent)]
pub struct GuardStore {
    value: AtomicUsize,
}

impl GuardStore {
    pub const fn new() -> Self {
        Self {
            value: AtomicUsize::new(0),
        }
    }

    /// Overwrite the guard with `seed`. Cannot fail.
    #[inline(always)]
    pub fn install(&self, seed: SspSeed) {
        self.value.store(seed as usize, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn current(&self) -> usize {
        self.value.load(Ordering::Relaxed)
    }
}

impl Default for GuardStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide guard. Unmangled only on bare-metal targets so hosted builds
/// do not collide with the host libc's own guard.
#[allow(non_upper_case_globals)]
#[cfg_attr(target_os = "none", unsafe(no_mangle))]
pub(crate) static __stack_chk_guard: GuardStore = GuardStore::new();

/// Install `seed` into the process-wide guard.
pub fn install_guard(seed: SspSeed) {
    __stack_chk_guard.install(seed);
}
