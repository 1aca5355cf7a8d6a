use hetero_atomic::order::MemoryOrder;
use hetero_atomic::scope::{scope_id, Block, Cluster, Device, System, Thread};
use hetero_atomic::{ops, AlwaysPrivate, Dispatcher, NeverPrivate, Plain, Scope, ScopedAtomic, ScopeTag};
use proptest::prelude::*;
use proptest::sample::select;

fn any_order() -> impl Strategy<Value = MemoryOrder> {
    select(MemoryOrder::ALL.to_vec())
}

fn read_your_write<T, S>(init: T, value: T, store: MemoryOrder, load: MemoryOrder) -> T
where
    T: hetero_atomic::AtomicValue,
    S: ScopeTag,
{
    let a = ScopedAtomic::<T, S>::new(init);
    a.store(value, store);
    a.load(load)
}

proptest! {
    #[test]
    fn loads_observe_the_last_store(init: u64, value: u64, store in any_order(), load in any_order()) {
        prop_assert_eq!(read_your_write::<u64, Thread>(init, value, store, load), value);
        prop_assert_eq!(read_your_write::<u64, Block>(init, value, store, load), value);
        prop_assert_eq!(read_your_write::<u64, Cluster>(init, value, store, load), value);
        prop_assert_eq!(read_your_write::<u64, Device>(init, value, store, load), value);
        prop_assert_eq!(read_your_write::<u64, System>(init, value, store, load), value);
    }

    #[test]
    fn small_and_signed_values_survive(a: i8, b: i16, c: i32, d: isize, store in any_order(), load in any_order()) {
        prop_assert_eq!(read_your_write::<i8, Device>(0, a, store, load), a);
        prop_assert_eq!(read_your_write::<i16, Device>(0, b, store, load), b);
        prop_assert_eq!(read_your_write::<i32, Device>(0, c, store, load), c);
        prop_assert_eq!(read_your_write::<isize, Device>(0, d, store, load), d);
    }

    #[test]
    fn float_bits_are_preserved(bits: u32, wide: u64, order in any_order()) {
        let f = f32::from_bits(bits);
        let g = f64::from_bits(wide);
        prop_assert_eq!(read_your_write::<f32, System>(0.0, f, order, order).to_bits(), bits);
        prop_assert_eq!(read_your_write::<f64, System>(0.0, g, order, order).to_bits(), wide);
    }

    #[test]
    fn exchange_returns_the_prior_value(init: u32, value: u32, order in any_order()) {
        let a = ScopedAtomic::<u32>::new(init);
        prop_assert_eq!(a.swap(value, order), init);
        prop_assert_eq!(a.into_inner(), value);
    }

    #[test]
    fn strong_cas_succeeds_on_match_and_reports_on_mismatch(
        current: u16,
        expected: u16,
        desired: u16,
        success in any_order(),
        failure in any_order(),
    ) {
        let mut x = current;
        let mut seen = expected;
        let p = &mut x as *mut u16;
        // SAFETY: `x` is a live, aligned local.
        let swapped = unsafe { ops::compare_exchange_strong(p, &mut seen, desired, success, failure, Device) };
        prop_assert_eq!(swapped, current == expected);
        if swapped {
            prop_assert_eq!(x, desired);
        } else {
            prop_assert_eq!(seen, current);
            prop_assert_eq!(x, current);
        }
    }

    #[test]
    fn sub_is_add_of_wrapping_negation(init: i32, v: i32, order in any_order()) {
        let a = ScopedAtomic::<i32>::new(init);
        let b = ScopedAtomic::<i32>::new(init);
        a.fetch_sub(v, order);
        b.fetch_add(v.wrapping_neg(), order);
        prop_assert_eq!(a.into_inner(), b.into_inner());
        prop_assert_eq!(ScopedAtomic::<u8>::new(3).fetch_sub(5, order), 3);
    }

    #[test]
    fn max_and_min_match_std(init: i64, v: i64, u_init: u32, u: u32) {
        let a = ScopedAtomic::<i64>::new(init);
        prop_assert_eq!(a.fetch_max(v, MemoryOrder::Relaxed), init);
        prop_assert_eq!(a.load(MemoryOrder::Relaxed), init.max(v));
        let b = ScopedAtomic::<u32>::new(u_init);
        prop_assert_eq!(b.fetch_min(u, MemoryOrder::Relaxed), u_init);
        prop_assert_eq!(b.load(MemoryOrder::Relaxed), u_init.min(u));
    }

    #[test]
    fn fallback_and_atomic_paths_agree(init: u32, operand: u32, order in any_order()) {
        let mut fast = init;
        let mut slow = init;
        let (pf, ps) = (&mut fast as *mut u32, &mut slow as *mut u32);
        // SAFETY: both are live, aligned locals.
        let (f, s) = unsafe {
            (
                Dispatcher::<AlwaysPrivate, Plain>::fetch_add(pf, operand, order, Device),
                Dispatcher::<NeverPrivate, Plain>::fetch_add(ps, operand, order, Device),
            )
        };
        prop_assert_eq!(f, s);
        prop_assert_eq!(fast, slow);
    }

    #[test]
    fn normalised_orders_never_carry_the_wrong_half(o in any_order()) {
        prop_assert!(!o.for_load().is_release() || o.for_load() == MemoryOrder::SeqCst);
        prop_assert!(!o.for_store().is_acquire() || o.for_store() == MemoryOrder::SeqCst);
        prop_assert_eq!(MemoryOrder::failure_for(o), o.for_load());
        prop_assert!(o.for_rmw() != MemoryOrder::Consume);
    }

    #[test]
    fn scope_ids_follow_breadth(a in select(Scope::ALL.to_vec()), b in select(Scope::ALL.to_vec())) {
        prop_assert_eq!(a < b, scope_id(a) < scope_id(b));
        prop_assert_eq!(Scope::try_from(scope_id(a)), Ok(a));
    }
}
