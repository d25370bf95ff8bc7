//! Device selection module.
//!
//! This module defines the compute devices an [`Array`](crate::Array) operation
//! can be dispatched to, and the functions used to choose between them.
//!
//! # Supported Devices
//!
//! - `Cpu`: pure Rust loops, parallelized with `rayon` (default).
//! - `Gpu`: WGSL compute kernels through `wgpu` (requires the `wgpu` feature).
//!
//! The process-wide default is stored in an `AtomicU8` so switching between
//! CPU and GPU at runtime is cheap. A thread may temporarily override it with
//! [`with_device`], which is how tests and libraries pin a device without
//! disturbing the rest of the process.
//!
//! Changing the device while operations are in flight on other threads is not
//! synchronized with those operations; each call reads the selector once, when
//! it is dispatched.

use core::cell::Cell;
use core::convert::TryFrom;
use core::fmt;
use core::str::FromStr;
use core::sync::atomic::{AtomicU8, Ordering};

/// Enumeration of supported compute devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(u8)]
pub enum Device {
    /// CPU loops (default).
    #[default]
    Cpu = 0,
    /// GPU compute kernels through `wgpu`.
    Gpu = 1,
}

impl TryFrom<u8> for Device {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Cpu),
            1 => Ok(Self::Gpu),
            _ => Err(()),
        }
    }
}

impl FromStr for Device {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            "gpu" | "wgpu" => Ok(Self::Gpu),
            other => Err(crate::Error::Unsupported(format!(
                "unknown device `{other}`, expected `cpu` or `gpu`"
            ))),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Gpu => write!(f, "gpu"),
        }
    }
}

/// Process-wide default device.
static GLOBAL_DEFAULT_DEVICE: AtomicU8 = AtomicU8::new(Device::Cpu as u8);

thread_local! {
    static SCOPED_DEVICE: Cell<Option<Device>> = const { Cell::new(None) };
}

/// Sets the process-wide device used for array computation.
///
/// # Example
///
/// ```
/// use briny_array::backend::{set_device, get_device, Device};
/// set_device(Device::Cpu);
/// assert_eq!(get_device(), Device::Cpu);
/// ```
pub fn set_device(device: Device) {
    log::debug!("default device set to {device}");
    GLOBAL_DEFAULT_DEVICE.store(device as u8, Ordering::Release);
}

/// Returns the device the calling thread dispatches to.
///
/// A [`with_device`] scope on this thread takes precedence over the
/// process-wide default. An invalid stored value reads as [`Device::Cpu`].
pub fn get_device() -> Device {
    SCOPED_DEVICE.with(Cell::get).unwrap_or_else(|| {
        Device::try_from(GLOBAL_DEFAULT_DEVICE.load(Ordering::Acquire)).unwrap_or_default()
    })
}

/// Shorthand for `set_device(Device::Cpu)`.
pub fn use_cpu() {
    set_device(Device::Cpu);
}

/// Shorthand for `set_device(Device::Gpu)`.
pub fn use_gpu() {
    set_device(Device::Gpu);
}

/// Runs `f` with `device` selected for the current thread only.
///
/// The previous selection is restored when `f` returns or unwinds.
///
/// # Example
///
/// ```
/// use briny_array::backend::{with_device, get_device, Device};
/// let d = with_device(Device::Cpu, get_device);
/// assert_eq!(d, Device::Cpu);
/// ```
pub fn with_device<R>(device: Device, f: impl FnOnce() -> R) -> R {
    struct Restore(Option<Device>);

    impl Drop for Restore {
        fn drop(&mut self) {
            SCOPED_DEVICE.with(|cell| cell.set(self.0));
        }
    }

    let _restore = Restore(SCOPED_DEVICE.with(|cell| cell.replace(Some(device))));
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_round_trips_through_u8_and_str() {
        assert_eq!(Device::try_from(Device::Gpu as u8), Ok(Device::Gpu));
        assert_eq!(Device::try_from(7), Err(()));
        assert_eq!("CPU".parse::<Device>().unwrap(), Device::Cpu);
        assert_eq!(" gpu ".parse::<Device>().unwrap(), Device::Gpu);
        assert!("tpu".parse::<Device>().is_err());
    }

    #[test]
    fn scoped_device_is_restored_after_scope_and_panic() {
        let outer = get_device();
        with_device(Device::Gpu, || {
            assert_eq!(get_device(), Device::Gpu);
            with_device(Device::Cpu, || assert_eq!(get_device(), Device::Cpu));
            assert_eq!(get_device(), Device::Gpu);
        });
        assert_eq!(get_device(), outer);

        let result = std::panic::catch_unwind(|| with_device(Device::Gpu, || panic!("boom")));
        assert!(result.is_err());
        assert_eq!(get_device(), outer);
    }
}
