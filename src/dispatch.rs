//! The atomic operation dispatcher.
//!
//! Every operation follows the same steps:
//!
//! 1. resolve the value's proxy word from the proxy tables,
//! 2. reinterpret the target and operands as that word, bit for bit,
//! 3. offer the operation to the locality fallback, returning early if it
//!    was handled,
//! 4. otherwise issue the backend primitive with the order and the scope
//!    taken from the `S` marker,
//! 5. reinterpret the result back into the value type.
//!
//! A type/operation pair with no table entry has no impl to satisfy the
//! bounds, so the call does not compile. Nothing here fails at runtime.

use core::fmt;
use core::marker::PhantomData;
use core::mem;

use serde::{Deserialize, Serialize};

use crate::backend::{NumericWord, Word};
use crate::locality::{self, Locality, Plain, PlatformLocality, Qualifier};
use crate::order::MemoryOrder;
use crate::proxy::{assert_proxy_layout, AtomicValue, BitwiseOps, NumericProxy, NumericValue};
use crate::scope::{self, Scope, ScopeTag};

/// The operation kinds the dispatcher serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// Atomic load.
    Load,
    /// Atomic store.
    Store,
    /// Atomic exchange.
    Exchange,
    /// Atomic compare-exchange (weak or strong).
    CompareExchange,
    /// Bitwise and.
    FetchAnd,
    /// Bitwise or.
    FetchOr,
    /// Bitwise xor.
    FetchXor,
    /// Addition.
    FetchAdd,
    /// Subtraction, served as addition of the negation.
    FetchSub,
    /// Maximum.
    FetchMax,
    /// Minimum.
    FetchMin,
    /// Memory fence.
    Fence,
}

impl OpKind {
    /// Every kind, in declaration order.
    pub const ALL: [OpKind; 12] = [
        OpKind::Load,
        OpKind::Store,
        OpKind::Exchange,
        OpKind::CompareExchange,
        OpKind::FetchAnd,
        OpKind::FetchOr,
        OpKind::FetchXor,
        OpKind::FetchAdd,
        OpKind::FetchSub,
        OpKind::FetchMax,
        OpKind::FetchMin,
        OpKind::Fence,
    ];

    /// The canonical lower-case name.
    pub const fn name(self) -> &'static str {
        match self {
            OpKind::Load => "load",
            OpKind::Store => "store",
            OpKind::Exchange => "exchange",
            OpKind::CompareExchange => "compare_exchange",
            OpKind::FetchAnd => "fetch_and",
            OpKind::FetchOr => "fetch_or",
            OpKind::FetchXor => "fetch_xor",
            OpKind::FetchAdd => "fetch_add",
            OpKind::FetchSub => "fetch_sub",
            OpKind::FetchMax => "fetch_max",
            OpKind::FetchMin => "fetch_min",
            OpKind::Fence => "fence",
        }
    }

    /// Returns `true` if the operation needs a [`BitwiseOps`] value.
    pub const fn is_bitwise(self) -> bool {
        matches!(self, OpKind::FetchAnd | OpKind::FetchOr | OpKind::FetchXor)
    }

    /// Returns `true` if the operation needs a [`NumericValue`].
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            OpKind::FetchAdd | OpKind::FetchSub | OpKind::FetchMax | OpKind::FetchMin
        )
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type Fallback<P> = unsafe fn(*mut P, P, &mut P) -> bool;
type Primitive<P> = unsafe fn(*mut P, P, MemoryOrder, Scope) -> P;

/// Dispatches atomic operations through a locality predicate `L` and an
/// access qualifier `Q`.
///
/// All methods are associated functions; the type is never instantiated.
/// [`ops`](crate::ops) exposes the default configuration as free functions.
///
/// # Safety
///
/// Every `unsafe` method requires `ptr` to be valid for reads and writes of
/// `T`, aligned to the atomic alignment of `T`'s proxy word (use
/// [`ScopedAtomic`](crate::ScopedAtomic) to get such storage), and accessed
/// concurrently only through atomic operations of the same size.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatcher<L = PlatformLocality, Q = Plain>(PhantomData<(L, Q)>);

#[inline(always)]
fn bitwise_ptr<T: AtomicValue>(ptr: *const T) -> *mut T::Bitwise {
    assert_proxy_layout::<T, T::Bitwise>();
    debug_assert!(
        ptr as usize % mem::align_of::<<T::Bitwise as Word>::AlignAs>() == 0,
        "atomic target is not aligned for its proxy word"
    );
    ptr.cast::<T::Bitwise>().cast_mut()
}

#[inline(always)]
fn numeric_ptr<T: NumericValue>(ptr: *mut T) -> *mut T::Numeric {
    assert_proxy_layout::<T, T::Numeric>();
    debug_assert!(
        ptr as usize % mem::align_of::<<T::Bitwise as Word>::AlignAs>() == 0,
        "atomic target is not aligned for its proxy word"
    );
    ptr.cast()
}

impl<L: Locality, Q: Qualifier> Dispatcher<L, Q> {
    #[inline(always)]
    #[allow(unused_variables)]
    unsafe fn bitwise_rmw<T: AtomicValue>(
        ptr: *mut T,
        val: T,
        order: MemoryOrder,
        scope: Scope,
        op: OpKind,
        fallback: Fallback<T::Bitwise>,
        primitive: Primitive<T::Bitwise>,
    ) -> T {
        let word = bitwise_ptr(ptr);
        let val = val.into_bits();
        let mut out = T::Bitwise::default();
        // SAFETY: forwarded to the caller.
        if unsafe { fallback(word, val, &mut out) } {
            trace_op!(op = %op, "served by the locality fallback");
            return T::from_bits(out);
        }
        // SAFETY: forwarded to the caller.
        T::from_bits(unsafe { primitive(word, val, order, scope) })
    }

    #[inline(always)]
    #[allow(unused_variables)]
    unsafe fn numeric_rmw<T: NumericValue>(
        ptr: *mut T,
        val: T::Numeric,
        order: MemoryOrder,
        scope: Scope,
        op: OpKind,
        fallback: Fallback<T::Numeric>,
        primitive: Primitive<T::Numeric>,
    ) -> T {
        let word = numeric_ptr(ptr);
        let mut out = T::Numeric::default();
        // SAFETY: forwarded to the caller.
        if unsafe { fallback(word, val, &mut out) } {
            trace_op!(op = %op, "served by the locality fallback");
            return T::from_numeric(out);
        }
        // SAFETY: forwarded to the caller.
        T::from_numeric(unsafe { primitive(word, val, order, scope) })
    }

    /// Atomically loads the value at `ptr`.
    ///
    /// Release halves of `order` are dropped.
    ///
    /// # Safety
    /// See the type-level requirements.
    #[inline(always)]
    pub unsafe fn load<T: AtomicValue, S: ScopeTag>(ptr: *const T, order: MemoryOrder, _scope: S) -> T {
        let word = bitwise_ptr(ptr);
        let mut out = T::Bitwise::default();
        // SAFETY: forwarded to the caller.
        if unsafe { locality::load_if_local::<L, Q, T::Bitwise>(word, &mut out) } {
            trace_op!(op = %OpKind::Load, "served by the locality fallback");
            return T::from_bits(out);
        }
        // SAFETY: forwarded to the caller.
        T::from_bits(unsafe { <T::Bitwise as Word>::load(word, order, S::SCOPE) })
    }

    /// Atomically stores `val` at `ptr`.
    ///
    /// Acquire halves of `order` are dropped.
    ///
    /// # Safety
    /// See the type-level requirements.
    #[inline(always)]
    pub unsafe fn store<T: AtomicValue, S: ScopeTag>(ptr: *mut T, val: T, order: MemoryOrder, _scope: S) {
        let word = bitwise_ptr(ptr);
        let val = val.into_bits();
        // SAFETY: forwarded to the caller.
        if unsafe { locality::store_if_local::<L, Q, T::Bitwise>(word, val) } {
            trace_op!(op = %OpKind::Store, "served by the locality fallback");
            return;
        }
        // SAFETY: forwarded to the caller.
        unsafe { <T::Bitwise as Word>::store(word, val, order, S::SCOPE) }
    }

    /// Atomically replaces the value at `ptr`, returning the previous one.
    ///
    /// # Safety
    /// See the type-level requirements.
    #[inline(always)]
    pub unsafe fn exchange<T: AtomicValue, S: ScopeTag>(ptr: *mut T, val: T, order: MemoryOrder, _scope: S) -> T {
        // SAFETY: forwarded to the caller.
        unsafe {
            Self::bitwise_rmw(
                ptr,
                val,
                order,
                S::SCOPE,
                OpKind::Exchange,
                locality::exchange_if_local::<L, Q, T::Bitwise>,
                <T::Bitwise as Word>::exchange,
            )
        }
    }

    /// Atomically stores `desired` if the value at `ptr` is bit-identical to
    /// `*expected`.
    ///
    /// Returns `true` on success. On failure the observed value is written to
    /// `*expected`. With `weak` set the exchange may fail even when the values
    /// match; a strong exchange never does.
    ///
    /// # Safety
    /// See the type-level requirements.
    #[inline(always)]
    #[allow(clippy::too_many_arguments)]
    pub unsafe fn compare_exchange<T: AtomicValue, S: ScopeTag>(
        ptr: *mut T,
        expected: &mut T,
        desired: T,
        weak: bool,
        success: MemoryOrder,
        failure: MemoryOrder,
        _scope: S,
    ) -> bool {
        let word = bitwise_ptr(ptr);
        let mut observed = expected.into_bits();
        let desired = desired.into_bits();
        let mut swapped = false;
        // SAFETY: forwarded to the caller.
        let handled = unsafe {
            locality::compare_exchange_if_local::<L, Q, T::Bitwise>(word, &mut observed, desired, &mut swapped)
        };
        if handled {
            trace_op!(op = %OpKind::CompareExchange, "served by the locality fallback");
        } else {
            // SAFETY: forwarded to the caller.
            swapped = unsafe {
                <T::Bitwise as Word>::compare_exchange(word, &mut observed, desired, weak, success, failure, S::SCOPE)
            };
        }
        if !swapped {
            *expected = T::from_bits(observed);
        }
        swapped
    }

    /// [`compare_exchange`](Self::compare_exchange) that never fails
    /// spuriously.
    ///
    /// # Safety
    /// See the type-level requirements.
    #[inline(always)]
    pub unsafe fn compare_exchange_strong<T: AtomicValue, S: ScopeTag>(
        ptr: *mut T,
        expected: &mut T,
        desired: T,
        success: MemoryOrder,
        failure: MemoryOrder,
        scope: S,
    ) -> bool {
        // SAFETY: forwarded to the caller.
        unsafe { Self::compare_exchange(ptr, expected, desired, false, success, failure, scope) }
    }

    /// [`compare_exchange`](Self::compare_exchange) that may fail spuriously.
    ///
    /// # Safety
    /// See the type-level requirements.
    #[inline(always)]
    pub unsafe fn compare_exchange_weak<T: AtomicValue, S: ScopeTag>(
        ptr: *mut T,
        expected: &mut T,
        desired: T,
        success: MemoryOrder,
        failure: MemoryOrder,
        scope: S,
    ) -> bool {
        // SAFETY: forwarded to the caller.
        unsafe { Self::compare_exchange(ptr, expected, desired, true, success, failure, scope) }
    }

    /// Atomic bitwise and, returning the previous value.
    ///
    /// # Safety
    /// See the type-level requirements.
    #[inline(always)]
    pub unsafe fn fetch_and<T: BitwiseOps, S: ScopeTag>(ptr: *mut T, val: T, order: MemoryOrder, _scope: S) -> T {
        // SAFETY: forwarded to the caller.
        unsafe {
            Self::bitwise_rmw(
                ptr,
                val,
                order,
                S::SCOPE,
                OpKind::FetchAnd,
                locality::fetch_and_if_local::<L, Q, T::Bitwise>,
                <T::Bitwise as Word>::fetch_and,
            )
        }
    }

    /// Atomic bitwise or, returning the previous value.
    ///
    /// # Safety
    /// See the type-level requirements.
    #[inline(always)]
    pub unsafe fn fetch_or<T: BitwiseOps, S: ScopeTag>(ptr: *mut T, val: T, order: MemoryOrder, _scope: S) -> T {
        // SAFETY: forwarded to the caller.
        unsafe {
            Self::bitwise_rmw(
                ptr,
                val,
                order,
                S::SCOPE,
                OpKind::FetchOr,
                locality::fetch_or_if_local::<L, Q, T::Bitwise>,
                <T::Bitwise as Word>::fetch_or,
            )
        }
    }

    /// Atomic bitwise xor, returning the previous value.
    ///
    /// # Safety
    /// See the type-level requirements.
    #[inline(always)]
    pub unsafe fn fetch_xor<T: BitwiseOps, S: ScopeTag>(ptr: *mut T, val: T, order: MemoryOrder, _scope: S) -> T {
        // SAFETY: forwarded to the caller.
        unsafe {
            Self::bitwise_rmw(
                ptr,
                val,
                order,
                S::SCOPE,
                OpKind::FetchXor,
                locality::fetch_xor_if_local::<L, Q, T::Bitwise>,
                <T::Bitwise as Word>::fetch_xor,
            )
        }
    }

    /// Atomic addition, returning the previous value. Integers wrap.
    ///
    /// # Safety
    /// See the type-level requirements.
    #[inline(always)]
    pub unsafe fn fetch_add<T: NumericValue, S: ScopeTag>(ptr: *mut T, val: T, order: MemoryOrder, _scope: S) -> T {
        // SAFETY: forwarded to the caller.
        unsafe {
            Self::numeric_rmw(
                ptr,
                val.into_numeric(),
                order,
                S::SCOPE,
                OpKind::FetchAdd,
                locality::fetch_add_if_local::<L, Q, T::Numeric>,
                <T::Numeric as NumericWord>::fetch_add,
            )
        }
    }

    /// Atomic subtraction, returning the previous value.
    ///
    /// Served as `fetch_add` of the negated operand (wrapping negation for
    /// integers), so no separate subtract instruction is needed.
    ///
    /// # Safety
    /// See the type-level requirements.
    #[inline(always)]
    pub unsafe fn fetch_sub<T: NumericValue, S: ScopeTag>(ptr: *mut T, val: T, order: MemoryOrder, _scope: S) -> T {
        // SAFETY: forwarded to the caller.
        unsafe {
            Self::numeric_rmw(
                ptr,
                val.into_numeric().negate(),
                order,
                S::SCOPE,
                OpKind::FetchSub,
                locality::fetch_add_if_local::<L, Q, T::Numeric>,
                <T::Numeric as NumericWord>::fetch_add,
            )
        }
    }

    /// Atomic maximum, returning the previous value.
    ///
    /// # Safety
    /// See the type-level requirements.
    #[inline(always)]
    pub unsafe fn fetch_max<T: NumericValue, S: ScopeTag>(ptr: *mut T, val: T, order: MemoryOrder, _scope: S) -> T {
        // SAFETY: forwarded to the caller.
        unsafe {
            Self::numeric_rmw(
                ptr,
                val.into_numeric(),
                order,
                S::SCOPE,
                OpKind::FetchMax,
                locality::fetch_max_if_local::<L, Q, T::Numeric>,
                <T::Numeric as NumericWord>::fetch_max,
            )
        }
    }

    /// Atomic minimum, returning the previous value.
    ///
    /// # Safety
    /// See the type-level requirements.
    #[inline(always)]
    pub unsafe fn fetch_min<T: NumericValue, S: ScopeTag>(ptr: *mut T, val: T, order: MemoryOrder, _scope: S) -> T {
        // SAFETY: forwarded to the caller.
        unsafe {
            Self::numeric_rmw(
                ptr,
                val.into_numeric(),
                order,
                S::SCOPE,
                OpKind::FetchMin,
                locality::fetch_min_if_local::<L, Q, T::Numeric>,
                <T::Numeric as NumericWord>::fetch_min,
            )
        }
    }

    /// Advances the pointer at `ptr` by `count` elements of `U`, returning the
    /// previous pointer.
    ///
    /// The offset is scaled by `size_of::<U>()` and wraps.
    ///
    /// # Safety
    /// See the type-level requirements.
    #[inline(always)]
    pub unsafe fn fetch_ptr_add<U, S: ScopeTag>(ptr: *mut *mut U, count: isize, order: MemoryOrder, _scope: S) -> *mut U {
        let word = bitwise_ptr(ptr);
        #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
        let bytes = count.wrapping_mul(mem::size_of::<U>() as isize) as usize;
        let mut out = 0usize;
        // SAFETY: forwarded to the caller.
        if unsafe { locality::fetch_add_if_local::<L, Q, usize>(word, bytes, &mut out) } {
            trace_op!(op = %OpKind::FetchAdd, "served by the locality fallback");
            return <*mut U>::from_bits(out);
        }
        // SAFETY: forwarded to the caller.
        <*mut U>::from_bits(unsafe { <usize as NumericWord>::fetch_add(word, bytes, order, S::SCOPE) })
    }

    /// Moves the pointer at `ptr` back by `count` elements of `U`, returning
    /// the previous pointer.
    ///
    /// # Safety
    /// See the type-level requirements.
    #[inline(always)]
    pub unsafe fn fetch_ptr_sub<U, S: ScopeTag>(ptr: *mut *mut U, count: isize, order: MemoryOrder, scope: S) -> *mut U {
        // SAFETY: forwarded to the caller.
        unsafe { Self::fetch_ptr_add(ptr, count.wrapping_neg(), order, scope) }
    }

    /// A memory fence at the scope of `S`.
    ///
    /// Thread scope only restricts compiler reordering; `Relaxed` does
    /// nothing.
    #[inline(always)]
    pub fn fence<S: ScopeTag>(order: MemoryOrder, _scope: S) {
        scope::fence(order, S::SCOPE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locality::{AlwaysPrivate, NeverPrivate};
    use crate::scope::{Block, Device, System};

    type Atomic = Dispatcher<NeverPrivate, Plain>;
    type Private = Dispatcher<AlwaysPrivate, Plain>;

    #[test]
    fn sub_is_add_of_negation() {
        let mut a = 100u32;
        let mut b = 100u32;
        // SAFETY: live, aligned locals.
        unsafe {
            assert_eq!(Atomic::fetch_sub(&mut a, 7, MemoryOrder::AcqRel, Device), 100);
            assert_eq!(Atomic::fetch_add(&mut b, 7u32.wrapping_neg(), MemoryOrder::AcqRel, Device), 100);
        }
        assert_eq!(a, b);
        assert_eq!(a, 93);
    }

    #[test]
    fn unsigned_sub_wraps_below_zero() {
        let mut x = 1u8;
        // SAFETY: live local.
        unsafe { Atomic::fetch_sub(&mut x, 2, MemoryOrder::Relaxed, Block) };
        assert_eq!(x, u8::MAX);
    }

    #[test]
    fn float_sub_negates() {
        let mut x = 1.5f32;
        // SAFETY: live, aligned local.
        let prev = unsafe { Atomic::fetch_sub(&mut x, 0.25, MemoryOrder::SeqCst, System) };
        assert_eq!(prev, 1.5);
        assert_eq!(x, 1.25);
    }

    #[test]
    fn compare_exchange_writes_back_observed_value() {
        let mut x = -3i64;
        let mut expected = 4i64;
        // SAFETY: live, aligned local.
        let ok = unsafe {
            Atomic::compare_exchange_strong(&mut x, &mut expected, 9, MemoryOrder::SeqCst, MemoryOrder::Relaxed, Device)
        };
        assert!(!ok);
        assert_eq!(expected, -3);

        // SAFETY: as above.
        let ok = unsafe {
            Private::compare_exchange_strong(&mut x, &mut expected, 9, MemoryOrder::SeqCst, MemoryOrder::Relaxed, Device)
        };
        assert!(ok);
        assert_eq!(x, 9);
    }

    #[test]
    fn pointer_arithmetic_scales_by_pointee() {
        let mut buf = [0u64; 8];
        let base = buf.as_mut_ptr();
        let mut cursor = base;
        // SAFETY: `cursor` is a live local; the resulting pointers stay in `buf`.
        unsafe {
            assert_eq!(Atomic::fetch_ptr_add(&mut cursor, 3, MemoryOrder::Relaxed, Device), base);
            assert_eq!(cursor, base.add(3));
            assert_eq!(Private::fetch_ptr_sub(&mut cursor, 2, MemoryOrder::Relaxed, Device), base.add(3));
            assert_eq!(cursor, base.add(1));
        }
    }

    #[test]
    fn op_kind_names_and_families() {
        assert_eq!(OpKind::CompareExchange.to_string(), "compare_exchange");
        assert_eq!(OpKind::ALL.iter().filter(|op| op.is_bitwise()).count(), 3);
        assert_eq!(OpKind::ALL.iter().filter(|op| op.is_numeric()).count(), 4);
    }

    #[test]
    fn fences_at_every_scope() {
        for order in MemoryOrder::ALL {
            Atomic::fence(order, crate::scope::Thread);
            Atomic::fence(order, System);
        }
    }
}
