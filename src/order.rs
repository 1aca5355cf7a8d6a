//! Memory orderings accepted by every operation.

use core::fmt;
use core::str::FromStr;
use core::sync::atomic::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::OrderError;

/// The ordering constraint of a single atomic operation.
///
/// This mirrors the six orderings of the C++ memory model rather than
/// [`core::sync::atomic::Ordering`], because device code and foreign callers
/// still pass `consume`. `Consume` is always promoted to `Acquire`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryOrder {
    /// No ordering, only atomicity.
    Relaxed,
    /// Data-dependent acquire. Treated as [`MemoryOrder::Acquire`].
    Consume,
    /// Later accesses cannot move before this load.
    Acquire,
    /// Earlier accesses cannot move after this store.
    Release,
    /// Both acquire and release, for read-modify-write operations.
    AcqRel,
    /// Acquire/release plus a single total order over all `SeqCst` operations.
    SeqCst,
}

impl MemoryOrder {
    /// All orderings, weakest first.
    pub const ALL: [MemoryOrder; 6] = [
        MemoryOrder::Relaxed,
        MemoryOrder::Consume,
        MemoryOrder::Acquire,
        MemoryOrder::Release,
        MemoryOrder::AcqRel,
        MemoryOrder::SeqCst,
    ];

    /// The ordering actually honoured by a load.
    ///
    /// A load has no release half, so `Release` weakens to `Relaxed` and
    /// `AcqRel` to `Acquire`. `Consume` becomes `Acquire`.
    #[inline(always)]
    pub const fn for_load(self) -> MemoryOrder {
        match self {
            MemoryOrder::Relaxed | MemoryOrder::Release => MemoryOrder::Relaxed,
            MemoryOrder::Consume | MemoryOrder::Acquire | MemoryOrder::AcqRel => MemoryOrder::Acquire,
            MemoryOrder::SeqCst => MemoryOrder::SeqCst,
        }
    }

    /// The ordering actually honoured by a store.
    ///
    /// A store has no acquire half, so `Acquire`/`Consume` weaken to `Relaxed`
    /// and `AcqRel` to `Release`.
    #[inline(always)]
    pub const fn for_store(self) -> MemoryOrder {
        match self {
            MemoryOrder::Relaxed | MemoryOrder::Consume | MemoryOrder::Acquire => MemoryOrder::Relaxed,
            MemoryOrder::Release | MemoryOrder::AcqRel => MemoryOrder::Release,
            MemoryOrder::SeqCst => MemoryOrder::SeqCst,
        }
    }

    /// The ordering of a read-modify-write. `Consume` becomes `Acquire`.
    #[inline(always)]
    pub const fn for_rmw(self) -> MemoryOrder {
        match self {
            MemoryOrder::Consume => MemoryOrder::Acquire,
            other => other,
        }
    }

    /// The strongest failure ordering compatible with `success`.
    ///
    /// Taken from the single-ordering `compare_and_swap` rules of `core`.
    #[inline(always)]
    pub const fn failure_for(success: MemoryOrder) -> MemoryOrder {
        success.for_load()
    }

    /// Returns `true` if the ordering has acquire semantics.
    #[inline(always)]
    pub const fn is_acquire(self) -> bool {
        matches!(
            self,
            MemoryOrder::Consume | MemoryOrder::Acquire | MemoryOrder::AcqRel | MemoryOrder::SeqCst
        )
    }

    /// Returns `true` if the ordering has release semantics.
    #[inline(always)]
    pub const fn is_release(self) -> bool {
        matches!(self, MemoryOrder::Release | MemoryOrder::AcqRel | MemoryOrder::SeqCst)
    }

    /// The C ABI value (`__ATOMIC_RELAXED` = 0 .. `__ATOMIC_SEQ_CST` = 5).
    #[inline(always)]
    pub const fn as_c_abi(self) -> i32 {
        self as i32
    }

    /// The canonical lower-case name.
    pub const fn name(self) -> &'static str {
        match self {
            MemoryOrder::Relaxed => "relaxed",
            MemoryOrder::Consume => "consume",
            MemoryOrder::Acquire => "acquire",
            MemoryOrder::Release => "release",
            MemoryOrder::AcqRel => "acq_rel",
            MemoryOrder::SeqCst => "seq_cst",
        }
    }
}

impl From<MemoryOrder> for Ordering {
    #[inline(always)]
    fn from(order: MemoryOrder) -> Self {
        match order {
            MemoryOrder::Relaxed => Ordering::Relaxed,
            MemoryOrder::Consume | MemoryOrder::Acquire => Ordering::Acquire,
            MemoryOrder::Release => Ordering::Release,
            MemoryOrder::AcqRel => Ordering::AcqRel,
            MemoryOrder::SeqCst => Ordering::SeqCst,
        }
    }
}

impl From<Ordering> for MemoryOrder {
    #[inline(always)]
    fn from(order: Ordering) -> Self {
        match order {
            Ordering::Relaxed => MemoryOrder::Relaxed,
            Ordering::Acquire => MemoryOrder::Acquire,
            Ordering::Release => MemoryOrder::Release,
            Ordering::AcqRel => MemoryOrder::AcqRel,
            // `Ordering` is non-exhaustive; anything new is at least as strong.
            _ => MemoryOrder::SeqCst,
        }
    }
}

impl TryFrom<i32> for MemoryOrder {
    type Error = OrderError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MemoryOrder::Relaxed),
            1 => Ok(MemoryOrder::Consume),
            2 => Ok(MemoryOrder::Acquire),
            3 => Ok(MemoryOrder::Release),
            4 => Ok(MemoryOrder::AcqRel),
            5 => Ok(MemoryOrder::SeqCst),
            other => Err(OrderError::OutOfRange(other)),
        }
    }
}

impl FromStr for MemoryOrder {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MemoryOrder::ALL
            .into_iter()
            .find(|order| order.name() == s)
            .ok_or(OrderError::UnknownName)
    }
}

impl fmt::Display for MemoryOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_never_release_and_stores_never_acquire() {
        for order in MemoryOrder::ALL {
            assert!(!order.for_load().is_release() || order.for_load() == MemoryOrder::SeqCst);
            assert!(!order.for_store().is_acquire() || order.for_store() == MemoryOrder::SeqCst);
        }
    }

    #[test]
    fn failure_order_matches_core_rules() {
        assert_eq!(MemoryOrder::failure_for(MemoryOrder::Relaxed), MemoryOrder::Relaxed);
        assert_eq!(MemoryOrder::failure_for(MemoryOrder::Release), MemoryOrder::Relaxed);
        assert_eq!(MemoryOrder::failure_for(MemoryOrder::Acquire), MemoryOrder::Acquire);
        assert_eq!(MemoryOrder::failure_for(MemoryOrder::AcqRel), MemoryOrder::Acquire);
        assert_eq!(MemoryOrder::failure_for(MemoryOrder::SeqCst), MemoryOrder::SeqCst);
    }

    #[test]
    fn consume_is_promoted() {
        assert_eq!(Ordering::from(MemoryOrder::Consume), Ordering::Acquire);
        assert_eq!(MemoryOrder::Consume.for_rmw(), MemoryOrder::Acquire);
        assert_eq!(MemoryOrder::Consume.for_load(), MemoryOrder::Acquire);
    }

    #[test]
    fn c_abi_values_round_trip() {
        for order in MemoryOrder::ALL {
            assert_eq!(MemoryOrder::try_from(order.as_c_abi()), Ok(order));
        }
        assert_eq!(MemoryOrder::try_from(6), Err(OrderError::OutOfRange(6)));
        assert_eq!(MemoryOrder::try_from(-1), Err(OrderError::OutOfRange(-1)));
    }

    #[test]
    fn parses_canonical_names() {
        assert_eq!("acq_rel".parse::<MemoryOrder>(), Ok(MemoryOrder::AcqRel));
        assert_eq!("seq_cst".parse::<MemoryOrder>(), Ok(MemoryOrder::SeqCst));
        assert_eq!("SeqCst".parse::<MemoryOrder>(), Err(OrderError::UnknownName));
        assert_eq!(MemoryOrder::Release.to_string(), "release");
    }
}
