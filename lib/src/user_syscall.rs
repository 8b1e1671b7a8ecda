//! Raw kernel request transport and typed wrappers.
//!
//! On ARM the request number is encoded in the `svc` immediate and arguments
//! travel in r0-r2. AArch64 uses `svc #0` with the number in x8; x86_64 uses
//! `syscall` with the number in rax.
//!
//! Only built for bare-metal targets: on a hosted OS the same instructions
//! would reach the host kernel with an unrelated meaning.

use core::arch::asm;

use shield_abi::{
    ExitStatus, KernelResult, KernelStatus, LOG_LINE_MAX, SYSCALL_EXIT, SYSCALL_GET_SHM_HANDLE,
    SYSCALL_LOG, SYSCALL_MAP_SHM, SYSCALL_SHM_GET_INFOS, SYSCALL_SHM_SET_CREDENTIAL,
    SYSCALL_UNMAP_SHM, SYSCALL_YIELD, ShmHandle, ShmInfo, ShmLabel, ShmPermission, ThreadId,
};

#[cfg(target_arch = "arm")]
macro_rules! syscall {
    ($num:expr, $a0:expr, $a1:expr, $a2:expr) => {{
        let ret: u32;
        unsafe {
            asm!(
                "svc #{num}",
                num = const $num,
                inlateout("r0") ($a0) as u32 => ret,
                in("r1") ($a1) as u32,
                in("r2") ($a2) as u32,
                options(nostack),
            );
        }
        ret as usize
    }};
}

#[cfg(target_arch = "aarch64")]
macro_rules! syscall {
    ($num:expr, $a0:expr, $a1:expr, $a2:expr) => {{
        let ret: u64;
        unsafe {
            asm!(
                "svc #0",
                in("x8") ($num) as u64,
                inlateout("x0") ($a0) as u64 => ret,
                in("x1") ($a1) as u64,
                in("x2") ($a2) as u64,
                options(nostack),
            );
        }
        ret as usize
    }};
}

#[cfg(target_arch = "x86_64")]
macro_rules! syscall {
    ($num:expr, $a0:expr, $a1:expr, $a2:expr) => {{
        let ret: u64;
        unsafe {
            asm!(
                "syscall",
                inlateout("rax") ($num) as u64 => ret,
                in("rdi") ($a0) as u64,
                in("rsi") ($a1) as u64,
                in("rdx") ($a2) as u64,
                out("rcx") _,
                out("r11") _,
                options(nostack),
            );
        }
        ret as usize
    }};
}

#[cfg(not(any(target_arch = "arm", target_arch = "aarch64", target_arch = "x86_64")))]
compile_error!("no kernel request transport for this architecture");

#[inline(always)]
fn status_of(ret: usize) -> KernelStatus {
    KernelStatus::from_raw(ret as u32)
}

/// Terminate the calling thread with `status`.
///
/// The kernel never schedules the thread again after this request. Should it
/// return anyway, the thread parks here instead of running on.
pub fn sys_exit(status: ExitStatus) -> ! {
    syscall!(SYSCALL_EXIT, status.as_raw() as u32, 0u32, 0u32);
    loop {
        core::hint::spin_loop();
    }
}

pub fn sys_yield() -> KernelResult {
    status_of(syscall!(SYSCALL_YIELD, 0u32, 0u32, 0u32)).into_result()
}

/// Emit `line` on the kernel log, truncated to [`LOG_LINE_MAX`] bytes.
pub fn sys_log(line: &[u8]) -> KernelResult {
    let len = line.len().min(LOG_LINE_MAX);
    status_of(syscall!(SYSCALL_LOG, line.as_ptr() as usize, len, 0u32)).into_result()
}

/// Resolve `label` to a handle, written to `handle` on success.
pub fn sys_get_shm_handle(label: ShmLabel, handle: &mut ShmHandle) -> KernelResult {
    let out = handle as *mut ShmHandle as usize;
    status_of(syscall!(SYSCALL_GET_SHM_HANDLE, label, out, 0u32)).into_result()
}

/// Fill `info` with the kernel's descriptor for `handle`.
pub fn sys_shm_get_infos(handle: ShmHandle, info: &mut ShmInfo) -> KernelResult {
    let out = info as *mut ShmInfo as usize;
    status_of(syscall!(SYSCALL_SHM_GET_INFOS, handle, out, 0u32)).into_result()
}

pub fn sys_map_shm(handle: ShmHandle) -> KernelResult {
    status_of(syscall!(SYSCALL_MAP_SHM, handle, 0u32, 0u32)).into_result()
}

pub fn sys_unmap_shm(handle: ShmHandle) -> KernelResult {
    status_of(syscall!(SYSCALL_UNMAP_SHM, handle, 0u32, 0u32)).into_result()
}

pub fn sys_shm_set_credential(
    handle: ShmHandle,
    target: ThreadId,
    perms: ShmPermission,
) -> KernelResult {
    status_of(syscall!(SYSCALL_SHM_SET_CREDENTIAL, handle, target, perms.bits())).into_result()
}
