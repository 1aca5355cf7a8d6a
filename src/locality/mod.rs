//! The locality fallback path.
//!
//! When a target address is provably private to the executing thread, no other
//! unit can observe the access, so the operation is served by plain memory
//! accesses and no atomic or fence instruction is emitted. Each entry point
//! returns `true` when it handled the operation and writes the operation's
//! results through its output parameters. It returns `false`, touching
//! nothing, when privacy cannot be proven.
//!
//! The privacy predicate is a [`Locality`] type parameter. Results are
//! bit-identical to the atomic path for any access the predicate admits.

mod qualifier;

pub use qualifier::{Plain, Qualifier, Volatile};

use core::mem;

use crate::proxy::{combine_max, combine_min, BitwiseProxy, NumericProxy};

/// Decides whether an address range is private to the executing thread.
pub trait Locality {
    /// Returns `true` only if no other concurrent unit can access
    /// `size` bytes at `addr`.
    fn is_private(addr: *const u8, size: usize) -> bool;
}

/// The predicate the build target supplies.
///
/// On the device an address in the `.local` state space is private. On the
/// host nothing is proven private.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PlatformLocality;

impl Locality for PlatformLocality {
    #[inline(always)]
    fn is_private(addr: *const u8, _size: usize) -> bool {
        #[cfg(target_os = "cuda")]
        {
            crate::backend::device::is_local(addr)
        }
        #[cfg(not(target_os = "cuda"))]
        {
            let _ = addr;
            false
        }
    }
}

/// Never takes the fallback path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NeverPrivate;

impl Locality for NeverPrivate {
    #[inline(always)]
    fn is_private(_addr: *const u8, _size: usize) -> bool {
        false
    }
}

/// Always takes the fallback path.
///
/// Only sound for storage the caller owns exclusively, such as a value behind
/// `&mut` that has not been shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AlwaysPrivate;

impl Locality for AlwaysPrivate {
    #[inline(always)]
    fn is_private(_addr: *const u8, _size: usize) -> bool {
        true
    }
}

#[inline(always)]
fn private<L: Locality, P>(ptr: *const P) -> bool {
    L::is_private(ptr.cast(), mem::size_of::<P>())
}

/// Fallback load.
///
/// # Safety
/// `ptr` must be valid for reads and aligned for `P`.
#[inline(always)]
pub unsafe fn load_if_local<L: Locality, Q: Qualifier, P: BitwiseProxy>(ptr: *const P, out: &mut P) -> bool {
    if !private::<L, P>(ptr) {
        return false;
    }
    // SAFETY: forwarded to the caller.
    *out = unsafe { Q::read(ptr) };
    true
}

/// Fallback store.
///
/// # Safety
/// `ptr` must be valid for writes and aligned for `P`.
#[inline(always)]
pub unsafe fn store_if_local<L: Locality, Q: Qualifier, P: BitwiseProxy>(ptr: *mut P, val: P) -> bool {
    if !private::<L, P>(ptr) {
        return false;
    }
    // SAFETY: forwarded to the caller.
    unsafe { Q::write(ptr, val) };
    true
}

/// Reads the old value, writes `f(old)`, and reports `old` through `out`.
///
/// # Safety
/// `ptr` must be valid for reads and writes and aligned for `P`.
#[inline(always)]
unsafe fn modify_if_local<L: Locality, Q: Qualifier, P: Copy>(
    ptr: *mut P,
    out: &mut P,
    f: impl FnOnce(P) -> P,
) -> bool {
    if !private::<L, P>(ptr) {
        return false;
    }
    // SAFETY: forwarded to the caller.
    unsafe {
        let old = Q::read(ptr);
        Q::write(ptr, f(old));
        *out = old;
    }
    true
}

/// Fallback exchange; the previous value goes to `out`.
///
/// # Safety
/// `ptr` must be valid for reads and writes and aligned for `P`.
#[inline(always)]
pub unsafe fn exchange_if_local<L: Locality, Q: Qualifier, P: BitwiseProxy>(ptr: *mut P, val: P, out: &mut P) -> bool {
    // SAFETY: forwarded to the caller.
    unsafe { modify_if_local::<L, Q, P>(ptr, out, |_| val) }
}

/// Fallback compare-exchange.
///
/// On a match `desired` is stored and `*succeeded` set. Otherwise the
/// observed value is written to `*expected` and `*succeeded` cleared. A
/// private access never fails spuriously.
///
/// # Safety
/// `ptr` must be valid for reads and writes and aligned for `P`.
#[inline(always)]
pub unsafe fn compare_exchange_if_local<L: Locality, Q: Qualifier, P: BitwiseProxy>(
    ptr: *mut P,
    expected: &mut P,
    desired: P,
    succeeded: &mut bool,
) -> bool {
    if !private::<L, P>(ptr) {
        return false;
    }
    // SAFETY: forwarded to the caller.
    let current = unsafe { Q::read(ptr) };
    if current == *expected {
        // SAFETY: forwarded to the caller.
        unsafe { Q::write(ptr, desired) };
        *succeeded = true;
    } else {
        *expected = current;
        *succeeded = false;
    }
    true
}

/// Fallback bitwise and; the previous value goes to `out`.
///
/// # Safety
/// `ptr` must be valid for reads and writes and aligned for `P`.
#[inline(always)]
pub unsafe fn fetch_and_if_local<L: Locality, Q: Qualifier, P: BitwiseProxy>(ptr: *mut P, val: P, out: &mut P) -> bool {
    // SAFETY: forwarded to the caller.
    unsafe { modify_if_local::<L, Q, P>(ptr, out, |old| old & val) }
}

/// Fallback bitwise or; the previous value goes to `out`.
///
/// # Safety
/// `ptr` must be valid for reads and writes and aligned for `P`.
#[inline(always)]
pub unsafe fn fetch_or_if_local<L: Locality, Q: Qualifier, P: BitwiseProxy>(ptr: *mut P, val: P, out: &mut P) -> bool {
    // SAFETY: forwarded to the caller.
    unsafe { modify_if_local::<L, Q, P>(ptr, out, |old| old | val) }
}

/// Fallback bitwise xor; the previous value goes to `out`.
///
/// # Safety
/// `ptr` must be valid for reads and writes and aligned for `P`.
#[inline(always)]
pub unsafe fn fetch_xor_if_local<L: Locality, Q: Qualifier, P: BitwiseProxy>(ptr: *mut P, val: P, out: &mut P) -> bool {
    // SAFETY: forwarded to the caller.
    unsafe { modify_if_local::<L, Q, P>(ptr, out, |old| old ^ val) }
}

/// Fallback add (wrapping for integers); the previous value goes to `out`.
///
/// # Safety
/// `ptr` must be valid for reads and writes and aligned for `P`.
#[inline(always)]
pub unsafe fn fetch_add_if_local<L: Locality, Q: Qualifier, P: NumericProxy>(ptr: *mut P, val: P, out: &mut P) -> bool {
    // SAFETY: forwarded to the caller.
    unsafe { modify_if_local::<L, Q, P>(ptr, out, |old| old.combine_add(val)) }
}

/// Fallback maximum; the previous value goes to `out`.
///
/// # Safety
/// `ptr` must be valid for reads and writes and aligned for `P`.
#[inline(always)]
pub unsafe fn fetch_max_if_local<L: Locality, Q: Qualifier, P: NumericProxy>(ptr: *mut P, val: P, out: &mut P) -> bool {
    // SAFETY: forwarded to the caller.
    unsafe { modify_if_local::<L, Q, P>(ptr, out, |old| combine_max(old, val)) }
}

/// Fallback minimum; the previous value goes to `out`.
///
/// # Safety
/// `ptr` must be valid for reads and writes and aligned for `P`.
#[inline(always)]
pub unsafe fn fetch_min_if_local<L: Locality, Q: Qualifier, P: NumericProxy>(ptr: *mut P, val: P, out: &mut P) -> bool {
    // SAFETY: forwarded to the caller.
    unsafe { modify_if_local::<L, Q, P>(ptr, out, |old| combine_min(old, val)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_private_touches_nothing() {
        let mut slot = 5u32;
        let mut out = 0;
        // SAFETY: `slot` is a live local.
        let handled = unsafe { exchange_if_local::<NeverPrivate, Plain, u32>(&mut slot, 9, &mut out) };
        assert!(!handled);
        assert_eq!((slot, out), (5, 0));
    }

    #[test]
    fn host_platform_never_proves_privacy() {
        let slot = 0u64;
        assert!(!PlatformLocality::is_private((&slot as *const u64).cast(), 8));
    }

    #[test]
    fn compare_exchange_reports_flag_and_observed_value() {
        let mut slot = 15u32;
        let mut expected = 15;
        let mut ok = false;
        // SAFETY: `slot` is a live local.
        unsafe {
            assert!(compare_exchange_if_local::<AlwaysPrivate, Plain, u32>(&mut slot, &mut expected, 20, &mut ok));
        }
        assert!(ok);
        assert_eq!(slot, 20);

        let mut stale = 15;
        // SAFETY: as above.
        unsafe {
            assert!(compare_exchange_if_local::<AlwaysPrivate, Volatile, u32>(&mut slot, &mut stale, 30, &mut ok));
        }
        assert!(!ok);
        assert_eq!(stale, 20);
        assert_eq!(slot, 20);
    }

    #[test]
    fn numeric_fallbacks_return_the_old_value() {
        let mut slot = 7i32;
        let mut out = 0;
        // SAFETY: `slot` is a live local.
        unsafe {
            assert!(fetch_add_if_local::<AlwaysPrivate, Plain, i32>(&mut slot, -10, &mut out));
            assert_eq!((out, slot), (7, -3));
            assert!(fetch_max_if_local::<AlwaysPrivate, Plain, i32>(&mut slot, -5, &mut out));
            assert_eq!((out, slot), (-3, -3));
            assert!(fetch_min_if_local::<AlwaysPrivate, Plain, i32>(&mut slot, -5, &mut out));
            assert_eq!((out, slot), (-3, -5));
        }
    }

    #[test]
    fn bitwise_fallbacks() {
        let mut slot = 0b1100u8;
        let mut out = 0;
        // SAFETY: `slot` is a live local.
        unsafe {
            assert!(fetch_and_if_local::<AlwaysPrivate, Plain, u8>(&mut slot, 0b1010, &mut out));
            assert_eq!((out, slot), (0b1100, 0b1000));
            assert!(fetch_or_if_local::<AlwaysPrivate, Plain, u8>(&mut slot, 0b0001, &mut out));
            assert_eq!(slot, 0b1001);
            assert!(fetch_xor_if_local::<AlwaysPrivate, Plain, u8>(&mut slot, 0b1111, &mut out));
            assert_eq!((out, slot), (0b1001, 0b0110));
            assert!(load_if_local::<AlwaysPrivate, Plain, u8>(&slot, &mut out));
            assert!(store_if_local::<AlwaysPrivate, Plain, u8>(&mut slot, 3));
        }
        assert_eq!((out, slot), (0b0110, 3));
    }
}
