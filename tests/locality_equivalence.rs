//! The locality fallback must be indistinguishable from the atomic path for
//! single-threaded access.

use hetero_atomic::scope::Device;
use hetero_atomic::{AlwaysPrivate, Dispatcher, MemoryOrder, NeverPrivate, Plain, Volatile};

type Fallback = Dispatcher<AlwaysPrivate, Plain>;
type VolatileFallback = Dispatcher<AlwaysPrivate, Volatile>;
type Atomic = Dispatcher<NeverPrivate, Plain>;
type VolatileAtomic = Dispatcher<NeverPrivate, Volatile>;

macro_rules! run_program {
    ($d:ty, $init:expr) => {{
        let mut x = $init;
        let p = &mut x as *mut _;
        let mut trace = Vec::new();
        // SAFETY: `p` points at a live, aligned local.
        unsafe {
            trace.push(<$d>::fetch_add(p, 7, MemoryOrder::AcqRel, Device));
            trace.push(<$d>::fetch_sub(p, 3, MemoryOrder::Release, Device));
            trace.push(<$d>::fetch_max(p, 100, MemoryOrder::SeqCst, Device));
            trace.push(<$d>::fetch_min(p, 42, MemoryOrder::Relaxed, Device));
            trace.push(<$d>::fetch_xor(p, 0x0F, MemoryOrder::Acquire, Device));
            trace.push(<$d>::fetch_and(p, 0x3C, MemoryOrder::Consume, Device));
            trace.push(<$d>::fetch_or(p, 0x01, MemoryOrder::Relaxed, Device));
            trace.push(<$d>::exchange(p, 9, MemoryOrder::SeqCst, Device));
            let mut expected = 9;
            let swapped = <$d>::compare_exchange_strong(p, &mut expected, 11, MemoryOrder::SeqCst, MemoryOrder::SeqCst, Device);
            trace.push(if swapped { 1 } else { 0 });
            let mut stale = 9;
            let swapped = <$d>::compare_exchange_strong(p, &mut stale, 12, MemoryOrder::SeqCst, MemoryOrder::SeqCst, Device);
            trace.push(if swapped { 1 } else { 0 });
            trace.push(stale);
            <$d>::store(p, 77, MemoryOrder::Release, Device);
            trace.push(<$d>::load(p, MemoryOrder::Acquire, Device));
        }
        trace.push(x);
        trace
    }};
}

#[test]
fn integer_programs_agree() {
    let reference = run_program!(Atomic, 5u32);
    assert_eq!(run_program!(Fallback, 5u32), reference);
    assert_eq!(run_program!(VolatileFallback, 5u32), reference);
    assert_eq!(run_program!(VolatileAtomic, 5u32), reference);

    let reference = run_program!(Atomic, -5i64);
    assert_eq!(run_program!(Fallback, -5i64), reference);
    assert_eq!(run_program!(VolatileFallback, -5i64), reference);

    let reference = run_program!(Atomic, 200u8);
    assert_eq!(run_program!(Fallback, 200u8), reference);
}

#[test]
fn float_results_are_bit_identical() {
    fn program<L: hetero_atomic::Locality>() -> Vec<u32> {
        let mut x = 0.1f32;
        let p = &mut x as *mut f32;
        let mut bits = Vec::new();
        // SAFETY: `p` points at a live, aligned local.
        unsafe {
            bits.push(Dispatcher::<L, Plain>::fetch_add(p, 0.2, MemoryOrder::Relaxed, Device).to_bits());
            bits.push(Dispatcher::<L, Plain>::fetch_sub(p, -0.0, MemoryOrder::Relaxed, Device).to_bits());
            bits.push(Dispatcher::<L, Plain>::fetch_max(p, f32::NAN, MemoryOrder::Relaxed, Device).to_bits());
            bits.push(Dispatcher::<L, Plain>::fetch_min(p, -0.0, MemoryOrder::Relaxed, Device).to_bits());
        }
        bits.push(x.to_bits());
        bits
    }
    assert_eq!(program::<AlwaysPrivate>(), program::<NeverPrivate>());
}

#[test]
fn pointer_programs_agree() {
    fn program<L: hetero_atomic::Locality>(base: *mut u64) -> Vec<*mut u64> {
        let mut cursor = base;
        let p = &mut cursor as *mut *mut u64;
        let mut seen = Vec::new();
        // SAFETY: `p` points at a live, aligned local.
        unsafe {
            seen.push(Dispatcher::<L, Plain>::fetch_ptr_add(p, 4, MemoryOrder::AcqRel, Device));
            seen.push(Dispatcher::<L, Plain>::fetch_ptr_sub(p, 1, MemoryOrder::AcqRel, Device));
            seen.push(Dispatcher::<L, Plain>::load(p, MemoryOrder::Acquire, Device));
        }
        seen
    }
    let mut buf = [0u64; 8];
    let base = buf.as_mut_ptr();
    assert_eq!(program::<AlwaysPrivate>(base), program::<NeverPrivate>(base));
    assert_eq!(program::<NeverPrivate>(base)[2], base.wrapping_add(3));
}
