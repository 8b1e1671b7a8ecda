//! Thread entry trampoline.
//!
//! Order of operations for every thread start:
//!
//! 1. install the stack guard from the kernel seed
//! 2. one-time runtime setup (once per thread image)
//! 3. seed the other seeded subsystems with the same seed
//! 4. run the entry point
//! 5. hand its return value to the exit channel
//!
//! On bare-metal targets `_start` is a naked function: it has no prologue, so
//! it runs without stack protection while it stores the seed into the guard,
//! then tail-branches into the protected part of the bootstrap.

use core::sync::atomic::{AtomicU32, Ordering};

use bitflags::bitflags;
use shield_abi::{ExitStatus, SspSeed, ThreadId, ThreadStartArgs};
use shield_lib::{klog_debug, InitFlag};

use crate::exit::ExitChannel;
use crate::guard::{GuardStore, __stack_chk_guard};

bitflags! {
    /// Bootstrap progress of a thread image. Phases are entered in order.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct StartupPhase: u32 {
        const GUARD_INSTALLED = 1 << 0;
        const RUNTIME_READY = 1 << 1;
        const SUBSYSTEMS_SEEDED = 1 << 2;
        const ENTRY_RUNNING = 1 << 3;
    }
}

/// External collaborators invoked by the trampoline.
pub trait ThreadCollaborators {
    /// One-time runtime setup. Either succeeds or terminates the thread itself.
    fn runtime_init(&mut self);

    /// Seed every subsystem keyed on the thread seed.
    fn seed_subsystems(&mut self, seed: SspSeed);

    /// The thread's logical entry point. Its return value is the exit status.
    fn entry(&mut self) -> i32;
}

/// Per-image bootstrap state.
pub struct ThreadImage<'g> {
    guard: &'g GuardStore,
    runtime_init: InitFlag,
    thread_id: AtomicU32,
    phase: AtomicU32,
}

impl<'g> ThreadImage<'g> {
    pub const fn new(guard: &'g GuardStore) -> Self {
        Self {
            guard,
            runtime_init: InitFlag::new(),
            thread_id: AtomicU32::new(0),
            phase: AtomicU32::new(0),
        }
    }

    pub fn phase(&self) -> StartupPhase {
        StartupPhase::from_bits_truncate(self.phase.load(Ordering::Acquire))
    }

    /// Identifier of the running thread, once the guard has been installed.
    pub fn thread_id(&self) -> Option<ThreadId> {
        if self.phase().contains(StartupPhase::GUARD_INSTALLED) {
            Some(self.thread_id.load(Ordering::Relaxed))
        } else {
            None
        }
    }

    #[inline(always)]
    fn enter_phase(&self, phase: StartupPhase) {
        self.phase.fetch_or(phase.bits(), Ordering::Release);
    }

    /// Run the bootstrap sequence. Never returns: every path ends in `E`.
    pub fn start<E, C>(&self, args: ThreadStartArgs, collaborators: &mut C) -> !
    where
        E: ExitChannel,
        C: ThreadCollaborators,
    {
        self.guard.install(args.seed);
        self.thread_id.store(args.thread_id, Ordering::Relaxed);
        self.enter_phase(StartupPhase::GUARD_INSTALLED);

        if self.runtime_init.init_once() {
            collaborators.runtime_init();
        }
        self.enter_phase(StartupPhase::RUNTIME_READY);

        collaborators.seed_subsystems(args.seed);
        self.enter_phase(StartupPhase::SUBSYSTEMS_SEEDED);

        klog_debug!("shield-rt: thread {} entering main", args.thread_id);
        self.enter_phase(StartupPhase::ENTRY_RUNNING);
        let status = collaborators.entry();

        E::exit(ExitStatus::from_raw(status))
    }
}

/// The running program's thread image, bound to the exported guard.
pub static THREAD_IMAGE: ThreadImage<'static> = ThreadImage::new(&__stack_chk_guard);

pub fn current_thread_id() -> Option<ThreadId> {
    THREAD_IMAGE.thread_id()
}

pub fn startup_phase() -> StartupPhase {
    THREAD_IMAGE.phase()
}

/// Collaborators of a real thread image: the runtime's one-time setup, the
/// seeded generator, and the program entry point.
pub struct RuntimeCollaborators {
    entry: fn() -> i32,
}

impl RuntimeCollaborators {
    pub const fn new(entry: fn() -> i32) -> Self {
        Self { entry }
    }
}

impl ThreadCollaborators for RuntimeCollaborators {
    fn runtime_init(&mut self) {
        crate::init::runtime_init();
    }

    fn seed_subsystems(&mut self, seed: SspSeed) {
        shield_lib::rand_set_seed(seed);
    }

    fn entry(&mut self) -> i32 {
        (self.entry)()
    }
}

#[cfg(target_os = "none")]
mod entry {
    use core::arch::naked_asm;
    use core::ffi::c_int;

    use shield_abi::{SspSeed, ThreadId, ThreadStartArgs};

    use super::{RuntimeCollaborators, THREAD_IMAGE};
    use crate::exit::KernelExit;

    unsafe extern "C" {
        fn main() -> c_int;
    }

    fn program_main() -> i32 {
        unsafe { main() }
    }

    /// Protected half of the entry sequence; the guard is already live here.
    #[unsafe(no_mangle)]
    pub extern "C" fn __shield_thread_start(thread_id: ThreadId, seed: SspSeed) -> ! {
        THREAD_IMAGE.start::<KernelExit, _>(
            ThreadStartArgs::new(thread_id, seed),
            &mut RuntimeCollaborators::new(program_main),
        )
    }

    // Kernel entry. r0 = thread id, r1 = seed.
    #[cfg(target_arch = "arm")]
    #[unsafe(naked)]
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn _start(_thread_id: ThreadId, _seed: SspSeed) -> ! {
        naked_asm!(
            "movw r2, :lower16:{guard}",
            "movt r2, :upper16:{guard}",
            "str r1, [r2]",
            "b {start}",
            guard = sym crate::guard::__stack_chk_guard,
            start = sym __shield_thread_start,
        )
    }

    // Kernel entry. w0 = thread id, w1 = seed.
    #[cfg(target_arch = "aarch64")]
    #[unsafe(naked)]
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn _start(_thread_id: ThreadId, _seed: SspSeed) -> ! {
        naked_asm!(
            "mov w1, w1",
            "adrp x2, {guard}",
            "str x1, [x2, :lo12:{guard}]",
            "b {start}",
            guard = sym crate::guard::__stack_chk_guard,
            start = sym __shield_thread_start,
        )
    }

    // Kernel entry. edi = thread id, esi = seed.
    #[cfg(target_arch = "x86_64")]
    #[unsafe(naked)]
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn _start(_thread_id: ThreadId, _seed: SspSeed) -> ! {
        naked_asm!(
            "mov esi, esi",
            "mov qword ptr [rip + {guard}], rsi",
            "jmp {start}",
            guard = sym crate::guard::__stack_chk_guard,
            start = sym __shield_thread_start,
        )
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;
    use std::vec::Vec;

    use super::*;
    use crate::ssp::StackFrameCheck;
    use crate::test_support::{run_to_exit, RecordingExit};

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Call {
        RuntimeInit { guard: usize },
        Seed(SspSeed),
        Entry { guard: usize, phase: StartupPhase },
    }

    struct ScriptedThread<'a> {
        image: &'a ThreadImage<'a>,
        guard: &'a GuardStore,
        calls: Vec<Call>,
        main: fn(&GuardStore) -> i32,
    }

    impl<'a> ScriptedThread<'a> {
        fn new(image: &'a ThreadImage<'a>, guard: &'a GuardStore, main: fn(&GuardStore) -> i32) -> Self {
            Self {
                image,
                guard,
                calls: Vec::new(),
                main,
            }
        }

        fn runtime_inits(&self) -> usize {
            self.calls
                .iter()
                .filter(|call| matches!(call, Call::RuntimeInit { .. }))
                .count()
        }
    }

    impl ThreadCollaborators for ScriptedThread<'_> {
        fn runtime_init(&mut self) {
            self.calls.push(Call::RuntimeInit {
                guard: self.guard.current(),
            });
        }

        fn seed_subsystems(&mut self, seed: SspSeed) {
            self.calls.push(Call::Seed(seed));
        }

        fn entry(&mut self) -> i32 {
            self.calls.push(Call::Entry {
                guard: self.guard.current(),
                phase: self.image.phase(),
            });
            (self.main)(self.guard)
        }
    }

    std::thread_local! {
        static AFTER_SMASH: Cell<bool> = const { Cell::new(false) };
    }

    fn returns_zero(_: &GuardStore) -> i32 {
        0
    }

    fn returns_42(_: &GuardStore) -> i32 {
        42
    }

    fn smashes_stack(guard: &GuardStore) -> i32 {
        let frame = StackFrameCheck::enter(guard);
        guard.install(0x0BAD_0BAD);
        frame.check::<RecordingExit>();
        AFTER_SMASH.with(|after| after.set(true));
        99
    }

    fn boot(
        image: &ThreadImage<'_>,
        thread: &mut ScriptedThread<'_>,
        thread_id: ThreadId,
        seed: SspSeed,
    ) -> Vec<ExitStatus> {
        run_to_exit(|| {
            image.start::<RecordingExit, _>(ThreadStartArgs::new(thread_id, seed), thread)
        })
    }

    #[test]
    fn clean_run_exits_with_zero() {
        let guard = GuardStore::new();
        let image = ThreadImage::new(&guard);
        let mut thread = ScriptedThread::new(&image, &guard, returns_zero);

        let exits = boot(&image, &mut thread, 7, 0xDEAD_BEEF);

        assert_eq!(exits.as_slice(), &[ExitStatus::SUCCESS]);
        assert_eq!(
            thread.calls.as_slice(),
            &[
                Call::RuntimeInit { guard: 0xDEAD_BEEF },
                Call::Seed(0xDEAD_BEEF),
                Call::Entry {
                    guard: 0xDEAD_BEEF,
                    phase: StartupPhase::all(),
                },
            ]
        );
    }

    #[test]
    fn entry_value_becomes_exit_status() {
        let guard = GuardStore::new();
        let image = ThreadImage::new(&guard);
        let mut thread = ScriptedThread::new(&image, &guard, returns_42);

        let exits = boot(&image, &mut thread, 3, 0x1);

        assert_eq!(exits.as_slice(), &[ExitStatus::from_raw(42)]);
        assert_eq!(thread.runtime_inits(), 1);
    }

    #[test]
    fn every_entry_value_passes_through() {
        std::thread_local! {
            static NEXT: Cell<i32> = const { Cell::new(0) };
        }
        fn returns_next(_: &GuardStore) -> i32 {
            NEXT.with(Cell::get)
        }

        for raw in [0, 1, -1, 42, 122, 124, 255, i32::MIN, i32::MAX] {
            NEXT.with(|next| next.set(raw));
            let guard = GuardStore::new();
            let image = ThreadImage::new(&guard);
            let mut thread = ScriptedThread::new(&image, &guard, returns_next);

            let exits = boot(&image, &mut thread, 1, 0xA5A5_A5A5);

            assert_eq!(exits.as_slice(), &[ExitStatus::from_raw(raw)]);
        }
    }

    #[test]
    fn guard_corruption_exits_with_123() {
        AFTER_SMASH.with(|after| after.set(false));
        let guard = GuardStore::new();
        let image = ThreadImage::new(&guard);
        let mut thread = ScriptedThread::new(&image, &guard, smashes_stack);

        let exits = boot(&image, &mut thread, 5, 0x1234_5678);

        assert_eq!(exits.as_slice(), &[ExitStatus::STACK_SMASHED]);
        assert!(!AFTER_SMASH.with(Cell::get));
        assert!(matches!(thread.calls.last(), Some(Call::Entry { .. })));
    }

    #[test]
    fn guard_installed_before_any_collaborator_runs() {
        for seed in [0, 1, 0x8000_0000, u32::MAX] {
            let guard = GuardStore::new();
            guard.install(0x7777_7777);
            let image = ThreadImage::new(&guard);
            let mut thread = ScriptedThread::new(&image, &guard, returns_zero);

            boot(&image, &mut thread, 9, seed);

            assert_eq!(thread.calls[0], Call::RuntimeInit { guard: seed as usize });
            assert_eq!(guard.current(), seed as usize);
        }
    }

    #[test]
    fn seeded_subsystems_receive_guard_seed() {
        for seed in [0, 0x1, 0xDEAD_BEEF, u32::MAX] {
            let guard = GuardStore::new();
            let image = ThreadImage::new(&guard);
            let mut thread = ScriptedThread::new(&image, &guard, returns_zero);

            boot(&image, &mut thread, 2, seed);

            let seeds: Vec<SspSeed> = thread
                .calls
                .iter()
                .filter_map(|call| match call {
                    Call::Seed(seed) => Some(*seed),
                    _ => None,
                })
                .collect();
            assert_eq!(seeds.as_slice(), &[seed]);
        }
    }

    #[test]
    fn runtime_setup_runs_once_per_image() {
        let guard = GuardStore::new();
        let image = ThreadImage::new(&guard);
        let mut thread = ScriptedThread::new(&image, &guard, returns_42);

        boot(&image, &mut thread, 1, 0x1111_1111);
        boot(&image, &mut thread, 2, 0x2222_2222);

        assert_eq!(thread.runtime_inits(), 1);
        assert_eq!(
            thread.calls.last(),
            Some(&Call::Entry {
                guard: 0x2222_2222,
                phase: StartupPhase::all(),
            })
        );
        assert_eq!(image.thread_id(), Some(2));
    }

    #[test]
    fn runtime_setup_runs_even_when_entry_fails() {
        let guard = GuardStore::new();
        let image = ThreadImage::new(&guard);
        let mut thread = ScriptedThread::new(&image, &guard, smashes_stack);

        boot(&image, &mut thread, 4, 0xFEED_F00D);

        assert_eq!(thread.runtime_inits(), 1);
    }

    #[test]
    fn thread_id_visible_after_start_only() {
        let guard = GuardStore::new();
        let image = ThreadImage::new(&guard);
        assert_eq!(image.thread_id(), None);
        assert!(image.phase().is_empty());

        let mut thread = ScriptedThread::new(&image, &guard, returns_zero);
        boot(&image, &mut thread, 7, 0xDEAD_BEEF);

        assert_eq!(image.thread_id(), Some(7));
        assert_eq!(image.phase(), StartupPhase::all());
    }

    #[test]
    fn process_image_is_idle_on_host() {
        assert_eq!(current_thread_id(), None);
        assert!(startup_phase().is_empty());
    }

    #[test]
    fn runtime_collaborators_seed_generator_and_reset_log_level() {
        use shield_lib::{klog_get_level, klog_set_level, rand_next_u32, KlogLevel, Xorshift32};

        fn program_main() -> i32 {
            0
        }

        const SEED: SspSeed = 0xC0FF_EE11;
        klog_set_level(KlogLevel::Error);
        let guard = GuardStore::new();
        let image = ThreadImage::new(&guard);
        let mut thread = RuntimeCollaborators::new(program_main);

        let exits = run_to_exit(|| {
            image.start::<RecordingExit, _>(ThreadStartArgs::new(4, SEED), &mut thread)
        });

        assert_eq!(exits.as_slice(), &[ExitStatus::SUCCESS]);
        assert_eq!(guard.current(), SEED as usize);
        assert_eq!(
            rand_next_u32(),
            Some(Xorshift32::from_seed(SEED).next_u32())
        );
        let build_default = if cfg!(feature = "verbose-startup") {
            KlogLevel::Debug
        } else {
            KlogLevel::Info
        };
        assert_eq!(klog_get_level(), build_default);
    }
}
