//! Stack smashing failure reporting.

#[cfg(all(target_os = "none", target_arch = "arm"))]
use core::arch::naked_asm;

use crate::exit::ExitChannel;
use crate::guard::GuardStore;

/// Terminate the thread through `E` with the stack-smashed status.
#[inline(always)]
pub fn report_stack_smash<E: ExitChannel>() -> ! {
    E::exit_corrupted()
}

/// Called by compiler instrumentation when a guard comparison fails.
///
/// Naked: no prologue, no stack access. The status goes straight into r0 and
/// the exit request is issued.
#[cfg(all(target_os = "none", target_arch = "arm"))]
#[unsafe(naked)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __stack_chk_fail() -> ! {
    naked_asm!(
        "movs r0, #{status}",
        "svc #{exit}",
        "1:",
        "b 1b",
        status = const shield_abi::ExitStatus::STACK_SMASHED.as_raw(),
        exit = const shield_abi::SYSCALL_EXIT,
    )
}

/// Portable fallback: a regular call into the exit request. Uses the normal
/// calling convention but touches no local data.
#[cfg(all(target_os = "none", not(target_arch = "arm")))]
#[unsafe(no_mangle)]
pub extern "C" fn __stack_chk_fail() -> ! {
    report_stack_smash::<crate::exit::KernelExit>()
}

/// Software form of the compiler's prologue/epilogue pair.
///
/// `enter` saves the live guard, `check` compares it again and diverts to the
/// failure path on mismatch. Useful for code built without instrumentation.
pub struct StackFrameCheck<'g> {
    guard: &'g GuardStore,
    saved: usize,
}

impl<'g> StackFrameCheck<'g> {
    #[inline(always)]
    pub fn enter(guard: &'g GuardStore) -> Self {
        Self {
            guard,
            saved: guard.current(),
        }
    }

    #[inline(always)]
    pub fn check<E: ExitChannel>(self) {
        if self.guard.current() != self.saved {
            report_stack_smash::<E>();
        }
    }
}
