//! `proptest` support for downstream property tests.
//!
//! Enabled by the `proptest` feature.

use proptest::arbitrary::Arbitrary;
use proptest::prelude::*;
use proptest::sample::select;
use proptest::strategy::BoxedStrategy;

use crate::order::MemoryOrder;
use crate::scope::Scope;

/// Any memory order.
pub fn any_order() -> impl Strategy<Value = MemoryOrder> {
    select(MemoryOrder::ALL.to_vec())
}

/// A `(success, failure)` pair for compare-exchange.
///
/// Ill-suited failure orders are included; the dispatcher normalises them.
pub fn any_cas_orders() -> impl Strategy<Value = (MemoryOrder, MemoryOrder)> {
    (any_order(), any_order())
}

/// Any scope.
pub fn any_scope() -> impl Strategy<Value = Scope> {
    select(Scope::ALL.to_vec())
}

/// Any scope a device operation can actually be narrowed to.
pub fn hardware_scope() -> impl Strategy<Value = Scope> {
    select(vec![Scope::Block, Scope::Cluster, Scope::Device, Scope::System])
}

impl Arbitrary for MemoryOrder {
    type Parameters = ();
    type Strategy = BoxedStrategy<MemoryOrder>;

    fn arbitrary_with((): ()) -> Self::Strategy {
        any_order().boxed()
    }
}

impl Arbitrary for Scope {
    type Parameters = ();
    type Strategy = BoxedStrategy<Scope>;

    fn arbitrary_with((): ()) -> Self::Strategy {
        any_scope().boxed()
    }
}
