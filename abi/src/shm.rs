//! Shared memory types.

use bitflags::bitflags;

/// Build-time label naming a shared memory region.
pub type ShmLabel = u32;

/// Kernel handle for a shared memory region, valid for the owning task.
pub type ShmHandle = u32;

bitflags! {
    /// Access rights a task holds on a shared memory region.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ShmPermission: u32 {
        const MAP = 1 << 0;
        const READ = 1 << 1;
        const WRITE = 1 << 2;
        const TRANSFER = 1 << 3;
    }
}

/// Descriptor the kernel fills in for a shared memory region.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShmInfo {
    pub label: ShmLabel,
    pub handle: ShmHandle,
    pub base: usize,
    pub len: usize,
    pub perms: u32,
}

impl ShmInfo {
    /// Permission bits, unknown bits dropped.
    #[inline]
    pub fn permissions(&self) -> ShmPermission {
        ShmPermission::from_bits_truncate(self.perms)
    }
}
