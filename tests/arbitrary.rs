//! The `proptest` feature's strategies and `Arbitrary` impls.

use hetero_atomic::testing::{any_cas_orders, hardware_scope};
use hetero_atomic::{MemoryOrder, Scope, SystemAtomic};
use proptest::prelude::*;

proptest! {
    #[test]
    fn arbitrary_orders_and_scopes_are_accepted(order: MemoryOrder, scope: Scope) {
        prop_assert!(MemoryOrder::ALL.contains(&order));
        prop_assert!(Scope::System.includes(scope));
    }

    #[test]
    fn every_cas_order_pair_is_accepted((success, failure) in any_cas_orders(), v: u8) {
        let a = SystemAtomic::new(v);
        prop_assert_eq!(a.compare_exchange(v, v.wrapping_add(1), success, failure), Ok(v));
    }

    #[test]
    fn hardware_scopes_exclude_thread(scope in hardware_scope()) {
        prop_assert_ne!(scope, Scope::Thread);
    }
}
