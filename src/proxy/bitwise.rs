//! The bitwise proxy table.

use super::{bit_cast, AtomicValue, BitwiseOps, BitwiseProxy, OperandKind, PlainBits, ProxyTag};

macro_rules! bitwise_proxy {
    ($($word:ty),* $(,)?) => {
        $(
            impl BitwiseProxy for $word {
                const TAG: ProxyTag = ProxyTag::new(OperandKind::Bitwise, <$word>::BITS);
            }
        )*
    };
}

bitwise_proxy!(u8, u16, u32, u64, usize);

macro_rules! integer_value {
    ($($ty:ty => $word:ty),* $(,)?) => {
        $(
            // SAFETY: same-width integers, converted by `bit_cast`.
            unsafe impl AtomicValue for $ty {
                type Bitwise = $word;

                #[inline(always)]
                fn into_bits(self) -> $word {
                    bit_cast(self)
                }

                #[inline(always)]
                fn from_bits(bits: $word) -> Self {
                    bit_cast(bits)
                }
            }

            // SAFETY: every bit pattern is a valid integer.
            unsafe impl PlainBits for $ty {}

            impl BitwiseOps for $ty {}
        )*
    };
}

integer_value! {
    u8 => u8,
    i8 => u8,
    u16 => u16,
    i16 => u16,
    u32 => u32,
    i32 => u32,
    u64 => u64,
    i64 => u64,
    usize => usize,
    isize => usize,
}

// SAFETY: `u32` has the size and alignment of `f32`; `to_bits`/`from_bits`
// are inverse.
unsafe impl AtomicValue for f32 {
    type Bitwise = u32;

    #[inline(always)]
    fn into_bits(self) -> u32 {
        self.to_bits()
    }

    #[inline(always)]
    fn from_bits(bits: u32) -> Self {
        f32::from_bits(bits)
    }
}

// SAFETY: as for `f32`, with `u64`.
unsafe impl AtomicValue for f64 {
    type Bitwise = u64;

    #[inline(always)]
    fn into_bits(self) -> u64 {
        self.to_bits()
    }

    #[inline(always)]
    fn from_bits(bits: u64) -> Self {
        f64::from_bits(bits)
    }
}

// SAFETY: every bit pattern is a valid float.
unsafe impl PlainBits for f32 {}
// SAFETY: as above.
unsafe impl PlainBits for f64 {}

// Pointers travel through the address-sized word; the address is exposed so
// the pointer read back keeps its provenance. They are not `PlainBits`.
// SAFETY: `usize` has the size and alignment of a thin pointer.
unsafe impl<U> AtomicValue for *mut U {
    type Bitwise = usize;

    #[inline(always)]
    fn into_bits(self) -> usize {
        self as usize
    }

    #[inline(always)]
    fn from_bits(bits: usize) -> Self {
        bits as *mut U
    }
}

// SAFETY: as above.
unsafe impl<U> AtomicValue for *const U {
    type Bitwise = usize;

    #[inline(always)]
    fn into_bits(self) -> usize {
        self as usize
    }

    #[inline(always)]
    fn from_bits(bits: usize) -> Self {
        bits as *const U
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_round_trip_through_their_word() {
        assert_eq!(i8::from_bits((-5i8).into_bits()), -5);
        assert_eq!((-1i32).into_bits(), u32::MAX);
        assert_eq!(isize::from_bits(isize::MIN.into_bits()), isize::MIN);
    }

    #[test]
    fn floats_preserve_signed_zero_and_nan_payloads() {
        assert_eq!((-0.0f64).into_bits(), (-0.0f64).to_bits());
        let payload = f32::from_bits(0x7fc0_1234);
        assert_eq!(f32::from_bits(payload.into_bits()).to_bits(), 0x7fc0_1234);
    }

    #[test]
    fn pointers_round_trip() {
        let mut x = 3u32;
        let p = &mut x as *mut u32;
        assert_eq!(<*mut u32>::from_bits(p.into_bits()), p);
        let c = p as *const u32;
        assert_eq!(<*const u32>::from_bits(c.into_bits()), c);
    }
}
