#![no_std]

#[cfg(test)]
extern crate std;

pub mod init_flag;
pub mod klog;
pub mod rand;
pub mod shm;
#[cfg(target_os = "none")]
pub mod user_syscall;

pub use init_flag::InitFlag;
pub use klog::{klog_get_level, klog_init, klog_is_enabled, klog_set_level, KlogLevel};
pub use rand::{rand_is_seeded, rand_next_u32, rand_set_seed, Xorshift32};
#[cfg(target_os = "none")]
pub use shm::KernelShm;
pub use shm::{Mapped, Shm, ShmBackend, Unmapped};
#[cfg(target_os = "none")]
pub use user_syscall::*;
