//! Thread start and exit ABI.
//!
//! The kernel enters every thread with two 32-bit words in the first two
//! argument registers: the thread identifier and the SSP seed. Global and
//! static memory is already zeroed and the data segment copied by then.

/// Kernel-assigned thread identifier.
pub type ThreadId = u32;

/// Per-thread seed for the stack guard and the other seeded subsystems.
pub type SspSeed = u32;

/// Arguments handed to the thread entry symbol by the kernel.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThreadStartArgs {
    pub thread_id: ThreadId,
    pub seed: SspSeed,
}

impl ThreadStartArgs {
    #[inline]
    pub const fn new(thread_id: ThreadId, seed: SspSeed) -> Self {
        Self { thread_id, seed }
    }
}

/// Status delivered to the kernel when a thread terminates.
///
/// Values returned by the thread's entry point are passed through verbatim.
/// [`ExitStatus::STACK_SMASHED`] is reserved for stack guard failures; an entry
/// point returning the same value is indistinguishable from the outside.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ExitStatus(i32);

impl ExitStatus {
    pub const SUCCESS: Self = Self(0);

    /// Fixed status reported when a stack guard check fails.
    pub const STACK_SMASHED: Self = Self(123);

    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn is_stack_smashed(self) -> bool {
        self.0 == Self::STACK_SMASHED.0
    }
}

impl From<i32> for ExitStatus {
    fn from(raw: i32) -> Self {
        Self::from_raw(raw)
    }
}

impl From<ExitStatus> for i32 {
    fn from(status: ExitStatus) -> Self {
        status.as_raw()
    }
}
