//! Status codes returned by the kernel.

/// Implement the conversion helpers shared by kernel status enums.
///
/// Generates `as_raw()`, `from_raw()`, `is_ok()`, `is_error()` and
/// `into_result()` for `#[repr(u32)]` enums following the kernel's convention
/// (zero is success).
macro_rules! impl_kernel_status {
    ($ty:ty, fallback: $fallback:ident, variants: { $($val:literal => $variant:ident),* $(,)? }) => {
        impl $ty {
            /// Raw register value as returned by the kernel.
            #[inline]
            pub fn as_raw(self) -> u32 {
                self as u32
            }

            /// Decode a raw register value.
            #[inline]
            pub fn from_raw(val: u32) -> Self {
                match val {
                    $($val => Self::$variant,)*
                    _ => Self::$fallback,
                }
            }

            #[inline]
            pub fn is_ok(self) -> bool {
                matches!(self, Self::Ok)
            }

            #[inline]
            pub fn is_error(self) -> bool {
                !self.is_ok()
            }

            /// Turn the status into a `Result` so callers can use `?`.
            #[inline]
            pub fn into_result(self) -> Result<(), Self> {
                if self.is_ok() { Ok(()) } else { Err(self) }
            }
        }
    };
}

/// Result type for kernel requests that carry no payload.
pub type KernelResult<T = ()> = Result<T, KernelStatus>;

/// Kernel request outcome.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KernelStatus {
    /// Request succeeded
    #[default]
    Ok = 0,
    /// Malformed argument
    Invalid = 1,
    /// Caller lacks the capability for this request
    Denied = 2,
    /// Target object does not exist
    NoEntity = 3,
    /// Resource currently in use
    Busy = 4,
    /// Object already mapped in the caller's address space
    AlreadyMapped = 5,
    /// Deadline elapsed before completion
    Timeout = 6,
    /// Unrecoverable kernel-side failure
    Critical = 7,
    /// Transient failure, retry later
    Again = 8,
}

impl_kernel_status!(KernelStatus, fallback: Critical, variants: {
    0 => Ok,
    1 => Invalid,
    2 => Denied,
    3 => NoEntity,
    4 => Busy,
    5 => AlreadyMapped,
    6 => Timeout,
    7 => Critical,
    8 => Again,
});
