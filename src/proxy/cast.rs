//! The single audited bit-reinterpretation primitive.

use core::marker::PhantomData;
use core::mem;

use zerocopy::{AsBytes, FromBytes};

struct SameSize<A, B>(PhantomData<(A, B)>);

impl<A, B> SameSize<A, B> {
    const ASSERT: () = assert!(
        mem::size_of::<A>() == mem::size_of::<B>(),
        "bit_cast between types of different sizes"
    );
}

struct ProxyLayout<T, P>(PhantomData<(T, P)>);

impl<T, P> ProxyLayout<T, P> {
    const ASSERT: () = assert!(
        mem::size_of::<T>() == mem::size_of::<P>() && mem::align_of::<T>() <= mem::align_of::<P>(),
        "proxy word must match the value's size and be at least as aligned"
    );
}

/// Reinterprets the bits of `value` as a `B`.
///
/// The sizes are compared at compile time: instantiating `bit_cast` with
/// differently-sized types fails the build. `A: AsBytes` guarantees every
/// byte of `value` is initialised; `B: FromBytes` guarantees every bit pattern
/// is a valid `B`.
#[inline(always)]
pub fn bit_cast<A: AsBytes, B: FromBytes>(value: A) -> B {
    #[allow(clippy::let_unit_value)]
    let () = SameSize::<A, B>::ASSERT;
    // SAFETY: sizes are equal (asserted above), `A` has no uninitialised
    // bytes and any byte pattern is a valid `B`. `transmute_copy` reads
    // unaligned, so the alignment of `A` is irrelevant.
    let out = unsafe { mem::transmute_copy::<A, B>(&value) };
    mem::forget(value);
    out
}

/// Compile-time check that `P` can stand in for `T` at `T`'s address.
///
/// Used before reinterpreting a target pointer: the proxy must have the
/// same size and the storage must be aligned for the proxy.
#[inline(always)]
pub(crate) const fn assert_proxy_layout<T, P>() {
    #[allow(clippy::let_unit_value)]
    let () = ProxyLayout::<T, P>::ASSERT;
}
