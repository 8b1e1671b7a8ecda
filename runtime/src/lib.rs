//! Userland thread bootstrap for the shield runtime.
//!
//! The kernel enters a new thread at `_start(thread_id, seed)`. From there the
//! runtime installs the stack guard from the seed, performs the one-time
//! runtime setup, seeds the random generator with the same seed, runs the
//! application's `main` and hands its return value back to the kernel. Any
//! guard mismatch detected by compiler instrumentation lands in
//! `__stack_chk_fail`, which terminates the thread with
//! [`ExitStatus::STACK_SMASHED`].

#![no_std]
#![forbid(unsafe_op_in_unsafe_fn)]

#[cfg(test)]
extern crate std;

pub mod exit;
pub mod guard;
pub mod init;
pub mod ssp;
pub mod start;

#[cfg(test)]
mod test_support;

pub use exit::ExitChannel;
#[cfg(target_os = "none")]
pub use exit::KernelExit;
pub use guard::{install_guard, GuardStore};
pub use init::runtime_init;
pub use shield_abi::{ExitStatus, SspSeed, ThreadId, ThreadStartArgs};
pub use ssp::{report_stack_smash, StackFrameCheck};
pub use start::{
    current_thread_id, startup_phase, RuntimeCollaborators, StartupPhase, ThreadCollaborators,
    ThreadImage, THREAD_IMAGE,
};
