//! Shared memory handles.
//!
//! The mapping state of a region lives in the type: [`Shm<Unmapped, _>`]
//! can be granted to other tasks and mapped, [`Shm<Mapped, _>`] can only be
//! unmapped. Kernel requests go through a [`ShmBackend`] so the state machine
//! does not depend on the transport.
//!
//! # Invariants
//! - a `Shm` always owns a handle the kernel resolved for its label
//! - every transition drops the cached descriptor

use core::marker::PhantomData;

use shield_abi::{KernelResult, KernelStatus, ShmHandle, ShmInfo, ShmLabel, ShmPermission, ThreadId};

/// Kernel requests needed by [`Shm`].
pub trait ShmBackend {
    fn handle_of(&self, label: ShmLabel) -> KernelResult<ShmHandle>;
    fn info(&self, handle: ShmHandle) -> KernelResult<ShmInfo>;
    fn map(&self, handle: ShmHandle) -> KernelResult;
    fn unmap(&self, handle: ShmHandle) -> KernelResult;
    fn set_credentials(&self, handle: ShmHandle, target: ThreadId, perms: ShmPermission)
    -> KernelResult;
}

/// Backend issuing the real kernel requests.
#[cfg(target_os = "none")]
#[derive(Clone, Copy, Debug, Default)]
pub struct KernelShm;

#[cfg(target_os = "none")]
impl ShmBackend for KernelShm {
    fn handle_of(&self, label: ShmLabel) -> KernelResult<ShmHandle> {
        let mut handle = 0;
        crate::user_syscall::sys_get_shm_handle(label, &mut handle)?;
        Ok(handle)
    }

    fn info(&self, handle: ShmHandle) -> KernelResult<ShmInfo> {
        let mut info = ShmInfo::default();
        crate::user_syscall::sys_shm_get_infos(handle, &mut info)?;
        Ok(info)
    }

    fn map(&self, handle: ShmHandle) -> KernelResult {
        crate::user_syscall::sys_map_shm(handle)
    }

    fn unmap(&self, handle: ShmHandle) -> KernelResult {
        crate::user_syscall::sys_unmap_shm(handle)
    }

    fn set_credentials(
        &self,
        handle: ShmHandle,
        target: ThreadId,
        perms: ShmPermission,
    ) -> KernelResult {
        crate::user_syscall::sys_shm_set_credential(handle, target, perms)
    }
}

/// Region exists but is not mapped in this task.
pub struct Unmapped;

/// Region is mapped in this task.
pub struct Mapped;

pub struct Shm<State, B: ShmBackend> {
    backend: B,
    handle: ShmHandle,
    label: ShmLabel,
    info_cache: Option<ShmInfo>,
    _state: PhantomData<State>,
}

impl<State, B: ShmBackend> Shm<State, B> {
    pub fn handle(&self) -> ShmHandle {
        self.handle
    }

    pub fn label(&self) -> ShmLabel {
        self.label
    }

    /// Cached descriptor, fetched from the kernel on first use.
    fn info(&mut self) -> KernelResult<&ShmInfo> {
        if self.info_cache.is_none() {
            self.info_cache = Some(self.backend.info(self.handle)?);
        }
        self.info_cache.as_ref().ok_or(KernelStatus::Critical)
    }

    fn has_permission(&mut self, perm: ShmPermission) -> bool {
        self.info()
            .map(|info| info.permissions().contains(perm))
            .unwrap_or(false)
    }

    fn into_state<Next>(self) -> Shm<Next, B> {
        Shm {
            backend: self.backend,
            handle: self.handle,
            label: self.label,
            info_cache: None,
            _state: PhantomData,
        }
    }

    pub fn permissions(&mut self) -> KernelResult<ShmPermission> {
        Ok(self.info()?.permissions())
    }

    pub fn base_address(&mut self) -> KernelResult<usize> {
        Ok(self.info()?.base)
    }

    pub fn length(&mut self) -> KernelResult<usize> {
        Ok(self.info()?.len)
    }

    pub fn is_readable(&mut self) -> bool {
        self.has_permission(ShmPermission::READ)
    }

    pub fn is_writable(&mut self) -> bool {
        self.has_permission(ShmPermission::WRITE)
    }

    pub fn is_transferable(&mut self) -> bool {
        self.has_permission(ShmPermission::TRANSFER)
    }

    pub fn is_mappable(&mut self) -> bool {
        self.has_permission(ShmPermission::MAP)
    }
}

impl<B: ShmBackend> Shm<Unmapped, B> {
    /// Resolve `label` to a handle. Does not map anything.
    pub fn new(backend: B, label: ShmLabel) -> KernelResult<Self> {
        let handle = backend.handle_of(label)?;
        Ok(Self {
            backend,
            handle,
            label,
            info_cache: None,
            _state: PhantomData,
        })
    }

    /// Map the region into this task.
    pub fn map(self) -> KernelResult<Shm<Mapped, B>> {
        self.backend.map(self.handle)?;
        Ok(self.into_state())
    }

    /// Grant `perms` on the region to `target`. Only valid while unmapped.
    pub fn set_credentials(&mut self, target: ThreadId, perms: ShmPermission) -> KernelResult {
        self.backend.set_credentials(self.handle, target, perms)?;
        self.info_cache = None;
        Ok(())
    }
}

impl<B: ShmBackend> Shm<Mapped, B> {
    /// Unmap the region from this task.
    pub fn unmap(self) -> KernelResult<Shm<Unmapped, B>> {
        self.backend.unmap(self.handle)?;
        Ok(self.into_state())
    }
}
