//! Access qualifiers for the plain-memory fallback.

/// How the fallback path touches memory.
///
/// The qualifier only changes the kind of access; the fallback algorithm is
/// the same for both.
pub trait Qualifier: Copy + Default + Send + Sync + 'static + sealed::Sealed {
    /// `true` for [`Volatile`].
    const VOLATILE: bool;

    /// Reads a value.
    ///
    /// # Safety
    /// `ptr` must be valid for reads and aligned for `T`.
    unsafe fn read<T: Copy>(ptr: *const T) -> T;

    /// Writes a value.
    ///
    /// # Safety
    /// `ptr` must be valid for writes and aligned for `T`.
    unsafe fn write<T: Copy>(ptr: *mut T, value: T);
}

mod sealed {
    pub trait Sealed {}
}

/// Ordinary loads and stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Plain;

/// Volatile loads and stores, never elided or merged by the compiler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Volatile;

impl sealed::Sealed for Plain {}
impl sealed::Sealed for Volatile {}

impl Qualifier for Plain {
    const VOLATILE: bool = false;

    #[inline(always)]
    unsafe fn read<T: Copy>(ptr: *const T) -> T {
        // SAFETY: forwarded to the caller.
        unsafe { ptr.read() }
    }

    #[inline(always)]
    unsafe fn write<T: Copy>(ptr: *mut T, value: T) {
        // SAFETY: forwarded to the caller.
        unsafe { ptr.write(value) }
    }
}

impl Qualifier for Volatile {
    const VOLATILE: bool = true;

    #[inline(always)]
    unsafe fn read<T: Copy>(ptr: *const T) -> T {
        // SAFETY: forwarded to the caller.
        unsafe { ptr.read_volatile() }
    }

    #[inline(always)]
    unsafe fn write<T: Copy>(ptr: *mut T, value: T) {
        // SAFETY: forwarded to the caller.
        unsafe { ptr.write_volatile(value) }
    }
}
