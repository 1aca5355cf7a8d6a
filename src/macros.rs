/// Emits a `tracing` event at trace level when the `tracing` feature is on.
///
/// Expands to nothing otherwise, and always expands to nothing on the device
/// target, so the hot paths carry no logging cost by default.
macro_rules! trace_op {
    ($($arg:tt)*) => {{
        #[cfg(all(feature = "tracing", not(target_os = "cuda")))]
        {
            ::tracing::trace!($($arg)*);
        }
    }};
}

/// Registers a plain-old-data type with the bitwise proxy table.
///
/// The type must derive (or otherwise implement) `zerocopy::AsBytes` and
/// `zerocopy::FromBytes`, which certifies that reinterpreting it as the proxy
/// word and back is lossless. The proxy must have the same size as the type
/// and at least its alignment; a mismatch fails the build where the macro is
/// invoked.
///
/// # Example
///
/// ```rust
/// use hetero_atomic::{impl_atomic_value, ScopedAtomic, MemoryOrder};
/// use zerocopy::{AsBytes, FromBytes, FromZeroes};
///
/// #[derive(Clone, Copy, Debug, PartialEq, AsBytes, FromZeroes, FromBytes)]
/// #[repr(C)]
/// struct Rgba {
///     r: u8,
///     g: u8,
///     b: u8,
///     a: u8,
/// }
///
/// impl_atomic_value!(Rgba => u32);
///
/// let px = ScopedAtomic::<Rgba>::new(Rgba { r: 1, g: 2, b: 3, a: 4 });
/// let old = px.swap(Rgba { r: 9, g: 9, b: 9, a: 9 }, MemoryOrder::AcqRel);
/// assert_eq!(old, Rgba { r: 1, g: 2, b: 3, a: 4 });
/// ```
///
/// A proxy narrower than the type is rejected:
///
/// ```compile_fail
/// use hetero_atomic::impl_atomic_value;
/// use zerocopy::{AsBytes, FromBytes, FromZeroes};
///
/// #[derive(Clone, Copy, AsBytes, FromZeroes, FromBytes)]
/// #[repr(C)]
/// struct Wide([u64; 4]);
///
/// impl_atomic_value!(Wide => u8);
/// ```
#[macro_export]
macro_rules! impl_atomic_value {
    ($($ty:ty => $proxy:ty),* $(,)?) => {
        $(
            const _: () = ::core::assert!(
                ::core::mem::size_of::<$ty>() == ::core::mem::size_of::<$proxy>()
                    && ::core::mem::align_of::<$ty>() <= ::core::mem::align_of::<$proxy>(),
                "proxy word must match the value's size and be at least as aligned"
            );

            // SAFETY: the layout is asserted above, and `bit_cast` requires
            // `AsBytes`/`FromBytes`, so every conversion is a lossless
            // reinterpretation.
            unsafe impl $crate::proxy::AtomicValue for $ty {
                type Bitwise = $proxy;

                #[inline(always)]
                fn into_bits(self) -> $proxy {
                    $crate::proxy::bit_cast(self)
                }

                #[inline(always)]
                fn from_bits(bits: $proxy) -> Self {
                    $crate::proxy::bit_cast(bits)
                }
            }

            // SAFETY: `FromBytes` makes every bit pattern a valid value.
            unsafe impl $crate::proxy::PlainBits for $ty {}
        )*
    };
}
