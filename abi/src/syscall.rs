//! Kernel request numbers.
//!
//! This module is the single source of truth for request numbers. On ARM the
//! number is the `svc` immediate; on the other targets it travels in the
//! architecture's syscall-number register.

/// Terminate the calling thread. Argument 0 carries the exit status.
pub const SYSCALL_EXIT: u32 = 0;

/// Give the rest of the current time slice back to the scheduler.
pub const SYSCALL_YIELD: u32 = 3;

/// Emit one line on the kernel log. Arguments are (buffer, length).
pub const SYSCALL_LOG: u32 = 22;

/// Largest number of bytes the kernel accepts in a single log request.
pub const LOG_LINE_MAX: usize = 128;

/// Resolve a shared memory label to a handle. Arguments are (label, out handle).
pub const SYSCALL_GET_SHM_HANDLE: u32 = 2;

/// Map a shared memory region into the caller's address space.
pub const SYSCALL_MAP_SHM: u32 = 9;

/// Unmap a shared memory region from the caller's address space.
pub const SYSCALL_UNMAP_SHM: u32 = 10;

/// Grant another task access to a shared memory region.
/// Arguments are (handle, target task, permission bits).
pub const SYSCALL_SHM_SET_CREDENTIAL: u32 = 11;

/// Fetch the descriptor of a shared memory region. Arguments are (handle, out info).
pub const SYSCALL_SHM_GET_INFOS: u32 = 19;
