//! Host test doubles for the exit channel.

use std::boxed::Box;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::vec::Vec;

use shield_abi::ExitStatus;

use crate::exit::ExitChannel;

std::thread_local! {
    static EXITS: RefCell<Vec<ExitStatus>> = const { RefCell::new(Vec::new()) };
}

/// Unwind payload standing in for a terminated thread.
pub(crate) struct ThreadExited;

/// Records every exit request, then unwinds out of the "thread".
pub(crate) struct RecordingExit;

impl ExitChannel for RecordingExit {
    fn exit(status: ExitStatus) -> ! {
        EXITS.with(|exits| exits.borrow_mut().push(status));
        panic::resume_unwind(Box::new(ThreadExited))
    }
}

/// Run `thread` until it reaches the exit channel and return what it reported.
///
/// Fails the test if `thread` returns normally or panics for any other reason.
pub(crate) fn run_to_exit(thread: impl FnOnce()) -> Vec<ExitStatus> {
    EXITS.with(|exits| exits.borrow_mut().clear());
    match panic::catch_unwind(AssertUnwindSafe(thread)) {
        Ok(()) => panic!("thread returned without reaching the exit channel"),
        Err(payload) => assert!(
            payload.downcast_ref::<ThreadExited>().is_some(),
            "thread panicked instead of exiting"
        ),
    }
    EXITS.with(|exits| exits.borrow().clone())
}
