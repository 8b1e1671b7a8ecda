//! Atomic one-shot initialization flag.
//!
//! `InitFlag` tracks whether a piece of runtime state has been set up. It is
//! monotonic: once set it stays set for the lifetime of the thread image, so
//! no reset operation is provided.
//!
//! # Usage
//!
//! ```ignore
//! use shield_lib::InitFlag;
//!
//! static SUBSYSTEM_INIT: InitFlag = InitFlag::new();
//!
//! pub fn init() {
//!     if !SUBSYSTEM_INIT.init_once() {
//!         return; // Already initialized
//!     }
//!     // ... perform initialization ...
//! }
//! ```
//!
//! # Memory Ordering
//!
//! `init_once()` uses a `SeqCst` swap, so the winning caller's setup is
//! ordered before anything a losing caller does afterwards.

use core::sync::atomic::{AtomicBool, Ordering};

/// Atomic flag for tracking initialization state.
#[repr(transparent)]
pub struct InitFlag {
    flag: AtomicBool,
}

impl InitFlag {
    /// Create a new unset flag.
    #[inline]
    pub const fn new() -> Self {
        Self {
            flag: AtomicBool::new(false),
        }
    }

    /// Atomically attempt to initialize.
    ///
    /// Returns `true` if this call performed the initialization (flag was previously unset).
    /// Returns `false` if already initialized.
    #[inline]
    pub fn init_once(&self) -> bool {
        // swap returns the OLD value
        !self.flag.swap(true, Ordering::SeqCst)
    }
}

impl Default for InitFlag {
    fn default() -> Self {
        Self::new()
    }
}
