//! The numeric (ordered / arithmetic) proxy table.

use num_traits::{WrappingAdd, WrappingNeg};

use super::{NumericProxy, NumericValue, OperandKind, ProxyTag};

macro_rules! integer_numeric {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl NumericProxy for $ty {
                const TAG: ProxyTag = ProxyTag::new(OperandKind::$kind, <$ty>::BITS);

                #[inline(always)]
                fn negate(self) -> Self {
                    WrappingNeg::wrapping_neg(&self)
                }

                #[inline(always)]
                fn combine_add(self, rhs: Self) -> Self {
                    WrappingAdd::wrapping_add(&self, &rhs)
                }
            }

            // SAFETY: the numeric proxy is the value type itself.
            unsafe impl NumericValue for $ty {
                type Numeric = $ty;

                #[inline(always)]
                fn into_numeric(self) -> $ty {
                    self
                }

                #[inline(always)]
                fn from_numeric(numeric: $ty) -> Self {
                    numeric
                }
            }
        )*
    };
}

integer_numeric! {
    i8 => Signed,
    i16 => Signed,
    i32 => Signed,
    i64 => Signed,
    isize => Signed,
    u8 => Unsigned,
    u16 => Unsigned,
    u32 => Unsigned,
    u64 => Unsigned,
    usize => Unsigned,
}

macro_rules! float_numeric {
    ($($ty:ty => $bits:literal),* $(,)?) => {
        $(
            impl NumericProxy for $ty {
                const TAG: ProxyTag = ProxyTag::new(OperandKind::Float, $bits);

                #[inline(always)]
                fn negate(self) -> Self {
                    -self
                }

                #[inline(always)]
                fn combine_add(self, rhs: Self) -> Self {
                    self + rhs
                }
            }

            // SAFETY: the numeric proxy is the value type itself.
            unsafe impl NumericValue for $ty {
                type Numeric = $ty;

                #[inline(always)]
                fn into_numeric(self) -> $ty {
                    self
                }

                #[inline(always)]
                fn from_numeric(numeric: $ty) -> Self {
                    numeric
                }
            }
        )*
    };
}

float_numeric!(f32 => 32, f64 => 64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_wraps() {
        assert_eq!(i8::MIN.negate(), i8::MIN);
        assert_eq!(5u32.negate(), u32::MAX - 4);
        assert_eq!(u8::MAX.combine_add(2), 1);
        assert_eq!(i64::MAX.combine_add(1), i64::MIN);
    }

    #[test]
    fn float_negation_flips_the_sign() {
        assert_eq!(2.5f32.negate(), -2.5);
        assert!(0.0f64.negate().is_sign_negative());
        assert_eq!(1.25f64.combine_add(0.5), 1.75);
    }

    #[test]
    fn unsigned_add_of_negation_is_subtraction() {
        assert_eq!(10u16.combine_add(3u16.negate()), 7);
        assert_eq!(10i32.combine_add(3i32.negate()), 7);
    }
}
