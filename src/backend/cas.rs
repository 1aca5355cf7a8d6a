//! The generic compare-and-swap loop.
//!
//! Used wherever a backend has no native instruction for an operation:
//! float add/max/min on the host, sub-word integers and float max/min on the
//! device. The loop is lock-free but not wait-free.

use crate::order::MemoryOrder;

/// Something a CAS loop can run against.
pub trait CasCell {
    /// The word being updated.
    type Value: Copy + Eq;

    /// Atomically loads the current value.
    fn load(&self, order: MemoryOrder) -> Self::Value;

    /// Weak compare-exchange with `core` result conventions.
    ///
    /// # Errors
    /// Returns the observed value when it did not match `current` (or on a
    /// spurious failure).
    fn compare_exchange_weak(
        &self,
        current: Self::Value,
        new: Self::Value,
        success: MemoryOrder,
        failure: MemoryOrder,
    ) -> Result<Self::Value, Self::Value>;
}

/// Applies `f` to the current value until the update lands, returning the
/// value it replaced.
///
/// `order` is the ordering of the successful exchange; failed attempts and
/// the initial read use the matching failure ordering.
#[inline]
pub fn fetch_update<C, F>(cell: &C, order: MemoryOrder, mut f: F) -> C::Value
where
    C: CasCell + ?Sized,
    F: FnMut(C::Value) -> C::Value,
{
    let success = order.for_rmw();
    let failure = MemoryOrder::failure_for(order);
    let spin = Spin::new();
    let mut current = cell.load(failure);
    loop {
        let new = f(current);
        match cell.compare_exchange_weak(current, new, success, failure) {
            Ok(prev) => {
                if spin.retried() {
                    trace_op!(retries = spin.count(), "cas loop settled after contention");
                }
                return prev;
            }
            Err(actual) => {
                current = actual;
                spin.spin();
            }
        }
    }
}

/// Per-configuration wait between CAS retries.
struct Spin {
    #[cfg(all(not(target_os = "cuda"), not(loom)))]
    backoff: crossbeam_utils::Backoff,
    retries: core::cell::Cell<u32>,
}

impl Spin {
    #[inline(always)]
    fn new() -> Self {
        Self {
            #[cfg(all(not(target_os = "cuda"), not(loom)))]
            backoff: crossbeam_utils::Backoff::new(),
            retries: core::cell::Cell::new(0),
        }
    }

    #[inline(always)]
    fn spin(&self) {
        self.retries.set(self.retries.get().saturating_add(1));
        #[cfg(all(not(target_os = "cuda"), not(loom)))]
        self.backoff.spin();
        #[cfg(loom)]
        loom::thread::yield_now();
        #[cfg(target_os = "cuda")]
        core::hint::spin_loop();
    }

    #[inline(always)]
    fn retried(&self) -> bool {
        self.retries.get() > 0
    }

    #[inline(always)]
    #[allow(dead_code)]
    fn count(&self) -> u32 {
        self.retries.get()
    }
}

macro_rules! core_cas_cell {
    ($($atomic:ty => $value:ty),* $(,)?) => {
        $(
            impl CasCell for $atomic {
                type Value = $value;

                #[inline(always)]
                fn load(&self, order: MemoryOrder) -> $value {
                    <$atomic>::load(self, order.for_load().into())
                }

                #[inline(always)]
                fn compare_exchange_weak(
                    &self,
                    current: $value,
                    new: $value,
                    success: MemoryOrder,
                    failure: MemoryOrder,
                ) -> Result<$value, $value> {
                    <$atomic>::compare_exchange_weak(
                        self,
                        current,
                        new,
                        success.for_rmw().into(),
                        failure.for_load().into(),
                    )
                }
            }
        )*
    };
}

#[cfg(not(target_os = "cuda"))]
core_cas_cell! {
    core::sync::atomic::AtomicU8 => u8,
    core::sync::atomic::AtomicU16 => u16,
    core::sync::atomic::AtomicU32 => u32,
    core::sync::atomic::AtomicU64 => u64,
    core::sync::atomic::AtomicUsize => usize,
}

#[cfg(loom)]
core_cas_cell! {
    loom::sync::atomic::AtomicU32 => u32,
    loom::sync::atomic::AtomicU64 => u64,
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn returns_the_replaced_value() {
        let cell = AtomicU32::new(40);
        let prev = fetch_update(&cell, MemoryOrder::AcqRel, |v| v + 2);
        assert_eq!(prev, 40);
        assert_eq!(cell.load(Ordering::Relaxed), 42);
    }

    #[test]
    fn accepts_every_ordering() {
        let cell = AtomicU32::new(0);
        for order in MemoryOrder::ALL {
            fetch_update(&cell, order, |v| v + 1);
        }
        assert_eq!(cell.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let cell = AtomicU32::new(0);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        fetch_update(&cell, MemoryOrder::Relaxed, |v| v.wrapping_add(1));
                    }
                });
            }
        });
        assert_eq!(cell.load(Ordering::Relaxed), 4000);
    }
}
