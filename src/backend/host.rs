//! Host backend on `core::sync::atomic`.
//!
//! Host atomics are coherent across every CPU thread, so the requested scope
//! is accepted and never narrowed: a block-scoped operation on the host is as
//! strong as a system-scoped one. Float add/max/min have no native host
//! instruction and go through [`cas::fetch_update`] on the bit pattern.

use core::sync::atomic::{
    self, AtomicI16, AtomicI32, AtomicI64, AtomicI8, AtomicIsize, AtomicU16, AtomicU32, AtomicU64, AtomicU8,
    AtomicUsize,
};

use super::cas;
use super::{NumericWord, Word};
use crate::order::MemoryOrder;
use crate::proxy::{combine_max, combine_min, NumericProxy};
use crate::scope::Scope;

macro_rules! host_word {
    ($($word:ty => $atomic:ty),* $(,)?) => {
        $(
            // SAFETY: every method is a single `core` atomic operation on the
            // pointee, with the normalised ordering.
            unsafe impl Word for $word {
                type AlignAs = $atomic;

                #[inline(always)]
                unsafe fn load(ptr: *const Self, order: MemoryOrder, _scope: Scope) -> Self {
                    // SAFETY: the caller upholds the `Word` contract, which is
                    // exactly the contract of `from_ptr`.
                    unsafe { <$atomic>::from_ptr(ptr.cast_mut()) }.load(order.for_load().into())
                }

                #[inline(always)]
                unsafe fn store(ptr: *mut Self, val: Self, order: MemoryOrder, _scope: Scope) {
                    // SAFETY: see `load`.
                    unsafe { <$atomic>::from_ptr(ptr) }.store(val, order.for_store().into());
                }

                #[inline(always)]
                unsafe fn exchange(ptr: *mut Self, val: Self, order: MemoryOrder, _scope: Scope) -> Self {
                    // SAFETY: see `load`.
                    unsafe { <$atomic>::from_ptr(ptr) }.swap(val, order.for_rmw().into())
                }

                #[inline(always)]
                unsafe fn compare_exchange(
                    ptr: *mut Self,
                    expected: &mut Self,
                    desired: Self,
                    weak: bool,
                    success: MemoryOrder,
                    failure: MemoryOrder,
                    _scope: Scope,
                ) -> bool {
                    // SAFETY: see `load`.
                    let atomic = unsafe { <$atomic>::from_ptr(ptr) };
                    let success = success.for_rmw().into();
                    let failure = failure.for_load().into();
                    let result = if weak {
                        atomic.compare_exchange_weak(*expected, desired, success, failure)
                    } else {
                        atomic.compare_exchange(*expected, desired, success, failure)
                    };
                    match result {
                        Ok(_) => true,
                        Err(actual) => {
                            *expected = actual;
                            false
                        }
                    }
                }

                #[inline(always)]
                unsafe fn fetch_and(ptr: *mut Self, val: Self, order: MemoryOrder, _scope: Scope) -> Self {
                    // SAFETY: see `load`.
                    unsafe { <$atomic>::from_ptr(ptr) }.fetch_and(val, order.for_rmw().into())
                }

                #[inline(always)]
                unsafe fn fetch_or(ptr: *mut Self, val: Self, order: MemoryOrder, _scope: Scope) -> Self {
                    // SAFETY: see `load`.
                    unsafe { <$atomic>::from_ptr(ptr) }.fetch_or(val, order.for_rmw().into())
                }

                #[inline(always)]
                unsafe fn fetch_xor(ptr: *mut Self, val: Self, order: MemoryOrder, _scope: Scope) -> Self {
                    // SAFETY: see `load`.
                    unsafe { <$atomic>::from_ptr(ptr) }.fetch_xor(val, order.for_rmw().into())
                }
            }
        )*
    };
}

host_word! {
    u8 => AtomicU8,
    u16 => AtomicU16,
    u32 => AtomicU32,
    u64 => AtomicU64,
    usize => AtomicUsize,
}

macro_rules! host_integer {
    ($($word:ty => $atomic:ty),* $(,)?) => {
        $(
            // SAFETY: native `core` read-modify-writes; `fetch_max`/`fetch_min`
            // have the same tie behaviour as `combine_max`/`combine_min`.
            unsafe impl NumericWord for $word {
                #[inline(always)]
                unsafe fn fetch_add(ptr: *mut Self, val: Self, order: MemoryOrder, _scope: Scope) -> Self {
                    // SAFETY: the caller upholds the `Word` contract.
                    unsafe { <$atomic>::from_ptr(ptr) }.fetch_add(val, order.for_rmw().into())
                }

                #[inline(always)]
                unsafe fn fetch_max(ptr: *mut Self, val: Self, order: MemoryOrder, _scope: Scope) -> Self {
                    // SAFETY: see `fetch_add`.
                    unsafe { <$atomic>::from_ptr(ptr) }.fetch_max(val, order.for_rmw().into())
                }

                #[inline(always)]
                unsafe fn fetch_min(ptr: *mut Self, val: Self, order: MemoryOrder, _scope: Scope) -> Self {
                    // SAFETY: see `fetch_add`.
                    unsafe { <$atomic>::from_ptr(ptr) }.fetch_min(val, order.for_rmw().into())
                }
            }
        )*
    };
}

host_integer! {
    i8 => AtomicI8,
    i16 => AtomicI16,
    i32 => AtomicI32,
    i64 => AtomicI64,
    isize => AtomicIsize,
    u8 => AtomicU8,
    u16 => AtomicU16,
    u32 => AtomicU32,
    u64 => AtomicU64,
    usize => AtomicUsize,
}

macro_rules! host_float {
    ($($float:ty => $bits:ty, $atomic:ty);* $(;)?) => {
        $(
            // SAFETY: a CAS loop over the bit pattern is a sequence of atomic
            // read-modify-writes, each with the requested ordering.
            unsafe impl NumericWord for $float {
                #[inline(always)]
                unsafe fn fetch_add(ptr: *mut Self, val: Self, order: MemoryOrder, _scope: Scope) -> Self {
                    // SAFETY: `$float` and `$bits` have the same size, and the
                    // caller aligned the storage for `$atomic`.
                    let cell = unsafe { <$atomic>::from_ptr(ptr.cast::<$bits>()) };
                    <$float>::from_bits(cas::fetch_update(cell, order, |bits| {
                        <$float>::from_bits(bits).combine_add(val).to_bits()
                    }))
                }

                #[inline(always)]
                unsafe fn fetch_max(ptr: *mut Self, val: Self, order: MemoryOrder, _scope: Scope) -> Self {
                    // SAFETY: see `fetch_add`.
                    let cell = unsafe { <$atomic>::from_ptr(ptr.cast::<$bits>()) };
                    <$float>::from_bits(cas::fetch_update(cell, order, |bits| {
                        combine_max(<$float>::from_bits(bits), val).to_bits()
                    }))
                }

                #[inline(always)]
                unsafe fn fetch_min(ptr: *mut Self, val: Self, order: MemoryOrder, _scope: Scope) -> Self {
                    // SAFETY: see `fetch_add`.
                    let cell = unsafe { <$atomic>::from_ptr(ptr.cast::<$bits>()) };
                    <$float>::from_bits(cas::fetch_update(cell, order, |bits| {
                        combine_min(<$float>::from_bits(bits), val).to_bits()
                    }))
                }
            }
        )*
    };
}

host_float! {
    f32 => u32, AtomicU32;
    f64 => u64, AtomicU64;
}

/// A hardware fence. The scope is not narrowed on the host.
#[inline(always)]
pub fn fence(order: MemoryOrder, _scope: Scope) {
    if order != MemoryOrder::Relaxed {
        atomic::fence(order.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_strong_cas_reports_the_observed_word() {
        let mut word = 7u16;
        let mut expected = 3u16;
        // SAFETY: `word` is a live, aligned local.
        let swapped = unsafe {
            <u16 as Word>::compare_exchange(
                &mut word,
                &mut expected,
                9,
                false,
                MemoryOrder::SeqCst,
                MemoryOrder::SeqCst,
                Scope::Device,
            )
        };
        assert!(!swapped);
        assert_eq!(expected, 7);
        assert_eq!(word, 7);
    }

    #[test]
    fn ill_suited_orders_are_normalised() {
        let slot = AtomicU64::new(1);
        let ptr = slot.as_ptr();
        // SAFETY: `ptr` points at a live `AtomicU64`.
        let prev = unsafe {
            <u64 as Word>::store(ptr, 5, MemoryOrder::Acquire, Scope::System);
            assert_eq!(<u64 as Word>::load(ptr, MemoryOrder::Release, Scope::System), 5);
            <u64 as Word>::exchange(ptr, 8, MemoryOrder::Consume, Scope::Block)
        };
        assert_eq!(prev, 5);
        assert_eq!(slot.into_inner(), 8);
    }

    #[test]
    fn float_arithmetic_runs_through_the_cas_loop() {
        let slot = AtomicU64::new(2.5f64.to_bits());
        let ptr = slot.as_ptr().cast::<f64>();
        // SAFETY: `ptr` points at live storage aligned for `AtomicU64`.
        unsafe {
            assert_eq!(<f64 as NumericWord>::fetch_add(ptr, 1.0, MemoryOrder::AcqRel, Scope::Device), 2.5);
            assert_eq!(<f64 as NumericWord>::fetch_max(ptr, -4.0, MemoryOrder::Relaxed, Scope::Device), 3.5);
            assert_eq!(<f64 as NumericWord>::fetch_min(ptr, -4.0, MemoryOrder::Relaxed, Scope::Device), 3.5);
        }
        assert_eq!(f64::from_bits(slot.into_inner()), -4.0);
    }

    #[test]
    fn signed_max_min_use_signed_order() {
        let slot = AtomicI32::new(-5);
        let ptr = slot.as_ptr();
        // SAFETY: `ptr` points at a live `AtomicI32`.
        unsafe {
            assert_eq!(<i32 as NumericWord>::fetch_max(ptr, -10, MemoryOrder::SeqCst, Scope::Block), -5);
            assert_eq!(<i32 as NumericWord>::fetch_min(ptr, -10, MemoryOrder::SeqCst, Scope::Block), -5);
            assert_eq!(<i32 as NumericWord>::fetch_add(ptr, 3, MemoryOrder::SeqCst, Scope::Block), -10);
        }
        assert_eq!(slot.into_inner(), -7);
    }

    #[test]
    fn relaxed_fence_is_accepted() {
        fence(MemoryOrder::Relaxed, Scope::System);
        fence(MemoryOrder::SeqCst, Scope::Device);
    }
}
