//! Shield Kernel-Userland ABI Types
//!
//! Canonical definitions for everything exchanged between the kernel and a
//! userland thread at the startup/exit boundary: request numbers, kernel status
//! codes, the thread start arguments, the exit status carried back to the
//! kernel and the shared memory descriptors.
//!
//! All types in this crate are `#[repr(C)]` or `#[repr(transparent)]` for ABI
//! stability.

#![no_std]
#![forbid(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod shm;
pub mod status;
pub mod syscall;
pub mod thread;

pub use shm::*;
pub use status::*;
pub use syscall::*;
pub use thread::*;
