//! Backend selection and the word-level interface both backends implement.
//!
//! Exactly one backend is compiled, selected by build configuration:
//!
//! | configuration                 | backend            |
//! |-------------------------------|--------------------|
//! | `target_os = "cuda"`          | [`device`] (PTX)   |
//! | anything else                 | [`host`] (`core`)  |
//!
//! There is no runtime detection. A target without the required atomic
//! instructions has to pick a different backend when it is built.

use serde::{Deserialize, Serialize};

use crate::order::MemoryOrder;
use crate::scope::Scope;

pub mod cas;

#[cfg(target_os = "cuda")]
pub mod device;
#[cfg(not(target_os = "cuda"))]
pub mod host;

#[cfg(target_os = "cuda")]
pub use device::fence;
#[cfg(not(target_os = "cuda"))]
pub use host::fence;

/// Which backend a build uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// `core::sync::atomic` on the host CPU.
    Host,
    /// PTX instructions on a CUDA device.
    Device,
}

/// The backend selected for this build.
#[cfg(not(target_os = "cuda"))]
pub const ACTIVE: BackendKind = BackendKind::Host;
/// The backend selected for this build.
#[cfg(target_os = "cuda")]
pub const ACTIVE: BackendKind = BackendKind::Device;

/// Bitwise atomic primitives on one proxy word.
///
/// # Safety
///
/// Implementations must perform each operation as a single atomic
/// read-modify-write (or a lock-free loop of them) with at least the
/// requested ordering, visible at least at the requested scope.
///
/// Every method requires `ptr` to be valid for reads and writes of `Self`,
/// aligned to `align_of::<Self::AlignAs>()`, and not accessed concurrently by
/// non-atomic or differently-sized operations.
pub unsafe trait Word: Copy + Eq + Send + Sync + 'static {
    /// A type whose alignment storage for this word must satisfy.
    type AlignAs: Sync;

    /// Atomic load.
    ///
    /// # Safety
    /// See the trait-level requirements.
    unsafe fn load(ptr: *const Self, order: MemoryOrder, scope: Scope) -> Self;

    /// Atomic store.
    ///
    /// # Safety
    /// See the trait-level requirements.
    unsafe fn store(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope);

    /// Atomic exchange, returning the previous value.
    ///
    /// # Safety
    /// See the trait-level requirements.
    unsafe fn exchange(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self;

    /// Atomic compare-exchange.
    ///
    /// Returns `true` and stores `desired` if the current value equals
    /// `*expected`. Otherwise writes the observed value into `*expected` and
    /// returns `false`. With `weak` set the operation may fail even when the
    /// values are equal.
    ///
    /// # Safety
    /// See the trait-level requirements.
    #[allow(clippy::too_many_arguments)]
    unsafe fn compare_exchange(
        ptr: *mut Self,
        expected: &mut Self,
        desired: Self,
        weak: bool,
        success: MemoryOrder,
        failure: MemoryOrder,
        scope: Scope,
    ) -> bool;

    /// Atomic bitwise and, returning the previous value.
    ///
    /// # Safety
    /// See the trait-level requirements.
    unsafe fn fetch_and(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self;

    /// Atomic bitwise or, returning the previous value.
    ///
    /// # Safety
    /// See the trait-level requirements.
    unsafe fn fetch_or(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self;

    /// Atomic bitwise xor, returning the previous value.
    ///
    /// # Safety
    /// See the trait-level requirements.
    unsafe fn fetch_xor(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self;
}

/// Arithmetic and ordered atomic primitives on one numeric proxy.
///
/// # Safety
///
/// Same contract as [`Word`]. `fetch_max`/`fetch_min` store
/// `max(old, val)`/`min(old, val)` as defined by
/// [`combine_max`](crate::proxy::combine_max) and
/// [`combine_min`](crate::proxy::combine_min).
pub unsafe trait NumericWord: Copy + PartialOrd + Send + Sync + 'static {
    /// Atomic add (wrapping for integers), returning the previous value.
    ///
    /// # Safety
    /// See [`Word`].
    unsafe fn fetch_add(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self;

    /// Atomic maximum, returning the previous value.
    ///
    /// # Safety
    /// See [`Word`].
    unsafe fn fetch_max(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self;

    /// Atomic minimum, returning the previous value.
    ///
    /// # Safety
    /// See [`Word`].
    unsafe fn fetch_min(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self;
}
