//! One-time runtime setup.

use shield_lib::{klog_debug, klog_init};

/// Default setup run once per thread image before the entry point.
///
/// Resets the log level to the build default. Running it at most once is the
/// caller's job (see [`crate::ThreadImage`]).
pub fn runtime_init() {
    klog_init();
    #[cfg(feature = "verbose-startup")]
    shield_lib::klog_set_level(shield_lib::KlogLevel::Debug);
    klog_debug!("shield-rt: runtime ready");
}

