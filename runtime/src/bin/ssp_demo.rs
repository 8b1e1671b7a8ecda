#![no_std]
#![no_main]

use core::ffi::c_int;

use shield_lib::{klog_info, rand_next_u32};
use shield_rt::{current_thread_id, ExitChannel, ExitStatus, KernelExit};

#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    KernelExit::exit(ExitStatus::from_raw(-1))
}

#[unsafe(no_mangle)]
pub extern "C" fn main() -> c_int {
    let tid = current_thread_id().unwrap_or(u32::MAX);
    klog_info!("ssp_demo: thread {} running under an active guard", tid);
    for round in 0..3 {
        if let Some(value) = rand_next_u32() {
            klog_info!("ssp_demo: draw {} = {:#010x}", round, value);
        }
    }
    0
}
