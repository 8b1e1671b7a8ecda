//! Exit channel strategy.
//!
//! Both termination paths of a thread, the entry point returning and a stack
//! guard failure, go through an [`ExitChannel`]. The implementation is chosen
//! at build time: `KernelExit` is the kernel backend on bare-metal targets,
//! tests substitute a recording channel.

use shield_abi::ExitStatus;

#[cfg(not(feature = "sentry"))]
compile_error!("no supported backend");

/// Non-returning request to terminate the current thread.
pub trait ExitChannel {
    fn exit(status: ExitStatus) -> !;

    /// Terminate with [`ExitStatus::STACK_SMASHED`].
    ///
    /// Runs on a stack that may already be corrupted; implementations must not
    /// rely on local data.
    fn exit_corrupted() -> ! {
        Self::exit(ExitStatus::STACK_SMASHED)
    }
}

/// Kernel exit backend.
#[cfg(target_os = "none")]
pub struct KernelExit;

#[cfg(target_os = "none")]
impl ExitChannel for KernelExit {
    #[inline(always)]
    fn exit(status: ExitStatus) -> ! {
        shield_lib::sys_exit(status)
    }
}
