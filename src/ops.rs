//! Free-function entry points with the platform locality predicate.
//!
//! The functions at the top level use plain accesses on the fallback path;
//! [`volatile`] has the same set with volatile accesses. Both forward to
//! [`Dispatcher`], so the safety requirements are the ones documented there.

use crate::dispatch::Dispatcher;
use crate::locality::{Plain, PlatformLocality, Volatile};
use crate::order::MemoryOrder;
use crate::proxy::{AtomicValue, BitwiseOps, NumericValue};
use crate::scope::ScopeTag;

macro_rules! entry_points {
    (@rmw $bound:ident; $($name:ident),*) => {
        $(
            #[doc = concat!("See [`Dispatcher::", stringify!($name), "`].")]
            ///
            /// # Safety
            /// See [`Dispatcher`].
            #[inline(always)]
            pub unsafe fn $name<T: $bound, S: ScopeTag>(ptr: *mut T, val: T, order: MemoryOrder, scope: S) -> T {
                // SAFETY: forwarded to the caller.
                unsafe { D::$name(ptr, val, order, scope) }
            }
        )*
    };
    ($qualifier:ty) => {
        type D = Dispatcher<PlatformLocality, $qualifier>;

        /// See [`Dispatcher::load`].
        ///
        /// # Safety
        /// See [`Dispatcher`].
        #[inline(always)]
        pub unsafe fn load<T: AtomicValue, S: ScopeTag>(ptr: *const T, order: MemoryOrder, scope: S) -> T {
            // SAFETY: forwarded to the caller.
            unsafe { D::load(ptr, order, scope) }
        }

        /// See [`Dispatcher::store`].
        ///
        /// # Safety
        /// See [`Dispatcher`].
        #[inline(always)]
        pub unsafe fn store<T: AtomicValue, S: ScopeTag>(ptr: *mut T, val: T, order: MemoryOrder, scope: S) {
            // SAFETY: forwarded to the caller.
            unsafe { D::store(ptr, val, order, scope) }
        }

        /// See [`Dispatcher::exchange`].
        ///
        /// # Safety
        /// See [`Dispatcher`].
        #[inline(always)]
        pub unsafe fn exchange<T: AtomicValue, S: ScopeTag>(ptr: *mut T, val: T, order: MemoryOrder, scope: S) -> T {
            // SAFETY: forwarded to the caller.
            unsafe { D::exchange(ptr, val, order, scope) }
        }

        /// See [`Dispatcher::compare_exchange`].
        ///
        /// # Safety
        /// See [`Dispatcher`].
        #[inline(always)]
        #[allow(clippy::too_many_arguments)]
        pub unsafe fn compare_exchange<T: AtomicValue, S: ScopeTag>(
            ptr: *mut T,
            expected: &mut T,
            desired: T,
            weak: bool,
            success: MemoryOrder,
            failure: MemoryOrder,
            scope: S,
        ) -> bool {
            // SAFETY: forwarded to the caller.
            unsafe { D::compare_exchange(ptr, expected, desired, weak, success, failure, scope) }
        }

        /// See [`Dispatcher::compare_exchange_strong`].
        ///
        /// # Safety
        /// See [`Dispatcher`].
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
            unsafe { D::compare_exchange_strong(ptr, expected, desired, success, failure, scope) }
        }

        /// See [`Dispatcher::compare_exchange_weak`].
        ///
        /// # Safety
        /// See [`Dispatcher`].
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
            unsafe { D::compare_exchange_weak(ptr, expected, desired, success, failure, scope) }
        }

        entry_points!(@rmw BitwiseOps; fetch_and, fetch_or, fetch_xor);
        entry_points!(@rmw NumericValue; fetch_add, fetch_sub, fetch_max, fetch_min);

        /// See [`Dispatcher::fetch_ptr_add`].
        ///
        /// # Safety
        /// See [`Dispatcher`].
        #[inline(always)]
        pub unsafe fn fetch_ptr_add<U, S: ScopeTag>(ptr: *mut *mut U, count: isize, order: MemoryOrder, scope: S) -> *mut U {
            // SAFETY: forwarded to the caller.
            unsafe { D::fetch_ptr_add(ptr, count, order, scope) }
        }

        /// See [`Dispatcher::fetch_ptr_sub`].
        ///
        /// # Safety
        /// See [`Dispatcher`].
        #[inline(always)]
        pub unsafe fn fetch_ptr_sub<U, S: ScopeTag>(ptr: *mut *mut U, count: isize, order: MemoryOrder, scope: S) -> *mut U {
            // SAFETY: forwarded to the caller.
            unsafe { D::fetch_ptr_sub(ptr, count, order, scope) }
        }

        /// See [`Dispatcher::fence`].
        #[inline(always)]
        pub fn fence<S: ScopeTag>(order: MemoryOrder, scope: S) {
            D::fence(order, scope);
        }
    };
}

entry_points!(Plain);

/// The same entry points with volatile accesses on the fallback path.
pub mod volatile {
    use super::{AtomicValue, BitwiseOps, Dispatcher, MemoryOrder, NumericValue, PlatformLocality, ScopeTag, Volatile};

    entry_points!(Volatile);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{Block, Device, System};

    #[test]
    fn add_then_load() {
        let mut x = 10i32;
        // SAFETY: live, aligned local.
        unsafe {
            assert_eq!(fetch_add(&mut x, 5, MemoryOrder::Relaxed, Device), 10);
            assert_eq!(load(&x, MemoryOrder::SeqCst, Device), 15);
        }
    }

    #[test]
    fn volatile_entry_points_agree() {
        let mut a = 0xF0u16;
        let mut b = 0xF0u16;
        // SAFETY: live, aligned locals.
        unsafe {
            assert_eq!(fetch_xor(&mut a, 0xFF, MemoryOrder::AcqRel, Block), 0xF0);
            assert_eq!(volatile::fetch_xor(&mut b, 0xFF, MemoryOrder::AcqRel, Block), 0xF0);
            store(&mut a, 3, MemoryOrder::Release, System);
            volatile::store(&mut b, 3, MemoryOrder::Release, System);
        }
        assert_eq!(a, b);
    }
}
