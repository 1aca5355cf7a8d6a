//! Proxy type deduction.
//!
//! Hardware atomics operate on a handful of integer and float widths. Every
//! value type that takes part in an atomic operation is mapped onto one of
//! those widths, its *proxy*, and reinterpreted bit-for-bit.
//!
//! There are two tables, because instruction availability differs per
//! family:
//!
//! - the **bitwise** table ([`AtomicValue::Bitwise`]): load, store, exchange,
//!   compare-exchange and, for [`BitwiseOps`] types, and/or/xor. Proxies are
//!   unsigned words of the value's width.
//! - the **numeric** table ([`NumericValue::Numeric`]): add, sub, max and min.
//!   Proxies keep the value's signedness or float-ness, since the ordered
//!   instructions differ per family.
//!
//! A type outside a table simply has no impl, so the corresponding
//! operations fail to compile for it.

mod bitwise;
mod cast;
mod numeric;

use core::ops::{BitAnd, BitOr, BitXor};

use serde::{Deserialize, Serialize};
use zerocopy::{AsBytes, FromBytes};

use crate::backend::{NumericWord, Word};

pub use cast::bit_cast;
pub(crate) use cast::assert_proxy_layout;

/// The family of a proxy word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperandKind {
    /// Raw bits; only bitwise instructions and compare-exchange apply.
    Bitwise,
    /// Two's complement signed integer.
    Signed,
    /// Unsigned integer.
    Unsigned,
    /// IEEE-754 binary float.
    Float,
}

/// Identifies which proxy was chosen for a value: its family and width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProxyTag {
    /// Proxy family.
    pub kind: OperandKind,
    /// Proxy width in bits.
    pub bits: u32,
}

impl ProxyTag {
    /// Creates a tag.
    pub const fn new(kind: OperandKind, bits: u32) -> Self {
        Self { kind, bits }
    }

    /// Width of the proxy in bytes.
    pub const fn bytes(self) -> usize {
        (self.bits / 8) as usize
    }
}

/// A word from the bitwise proxy table.
///
/// Implemented for `u8`, `u16`, `u32`, `u64` and `usize`.
pub trait BitwiseProxy:
    Word
    + AsBytes
    + FromBytes
    + Default
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + sealed::Sealed
{
    /// Which proxy family and width this word is.
    const TAG: ProxyTag;
}

/// A word from the numeric proxy table.
///
/// Implemented for the signed and unsigned integers of every width and for
/// `f32`/`f64`. Integer arithmetic wraps.
pub trait NumericProxy: NumericWord + AsBytes + FromBytes + Default + PartialOrd + sealed::Sealed {
    /// Which proxy family and width this word is.
    const TAG: ProxyTag;

    /// Arithmetic negation, wrapping for integers.
    fn negate(self) -> Self;

    /// Addition, wrapping for integers.
    fn combine_add(self, rhs: Self) -> Self;
}

/// `max(old, op)` with the usual tie rule: `old` unless `old < op`.
///
/// Unlike `f32::max`, a NaN already in `old` is kept, since it never
/// compares less than `op`.
#[inline(always)]
pub fn combine_max<P: PartialOrd>(old: P, op: P) -> P {
    if old < op {
        op
    } else {
        old
    }
}

/// `min(old, op)` with the usual tie rule: `old` unless `op < old`.
///
/// A NaN already in `old` is kept.
#[inline(always)]
pub fn combine_min<P: PartialOrd>(old: P, op: P) -> P {
    if op < old {
        op
    } else {
        old
    }
}

/// A value that can be the target of an atomic operation.
///
/// Use [`impl_atomic_value!`](crate::impl_atomic_value) for custom
/// plain-old-data types; it checks the layout below when the impl is declared.
///
/// # Safety
///
/// `Self::Bitwise` must have the same size as `Self` and at least its
/// alignment. `into_bits` and `from_bits` must be inverse bit
/// reinterpretations. Storage of the proxy word is handed out as `*mut Self`,
/// so a narrower or less aligned proxy is undefined behaviour.
///
/// Implementing it without `unsafe` does not compile:
///
/// ```compile_fail
/// use hetero_atomic::AtomicValue;
///
/// #[derive(Clone, Copy)]
/// struct Big([u64; 4]);
///
/// impl AtomicValue for Big {
///     type Bitwise = u8;
///     fn into_bits(self) -> u8 { 0 }
///     fn from_bits(_: u8) -> Self { Big([0; 4]) }
/// }
/// ```
pub unsafe trait AtomicValue: Copy {
    /// The bitwise proxy word.
    type Bitwise: BitwiseProxy;

    /// Reinterprets the value as its proxy word.
    fn into_bits(self) -> Self::Bitwise;

    /// Reinterprets a proxy word as a value.
    fn from_bits(bits: Self::Bitwise) -> Self;
}

/// A value that can be read in place from its proxy storage.
///
/// Integers, floats and types registered through
/// [`impl_atomic_value!`](crate::impl_atomic_value) qualify. Raw pointers do
/// not: their proxy is an integer, and reading it back as a pointer without
/// [`AtomicValue::from_bits`] loses provenance.
///
/// # Safety
///
/// Every bit pattern stored by `into_bits` must be a valid `Self` when read
/// through a `*const Self` to the proxy word.
pub unsafe trait PlainBits: AtomicValue {}

/// Capability marker: the value supports atomic and/or/xor.
///
/// Implemented for integers only.
pub trait BitwiseOps: AtomicValue {}

/// A value that supports ordered and arithmetic atomics (add, sub, max, min).
///
/// # Safety
///
/// `Self::Numeric` must have the same size as `Self` and at least its
/// alignment, and the conversions must be inverse bit reinterpretations.
pub unsafe trait NumericValue: AtomicValue {
    /// The numeric proxy word.
    type Numeric: NumericProxy;

    /// Reinterprets the value as its numeric proxy.
    fn into_numeric(self) -> Self::Numeric;

    /// Reinterprets a numeric proxy as a value.
    fn from_numeric(numeric: Self::Numeric) -> Self;
}

/// The bitwise proxy tag chosen for `T`.
pub const fn tag_of_bitwise<T: AtomicValue>() -> ProxyTag {
    <T::Bitwise as BitwiseProxy>::TAG
}

/// The numeric proxy tag chosen for `T`.
pub const fn tag_of_numeric<T: NumericValue>() -> ProxyTag {
    <T::Numeric as NumericProxy>::TAG
}

mod sealed {
    pub trait Sealed {}

    macro_rules! sealed {
        ($($ty:ty),*) => {
            $(impl Sealed for $ty {})*
        };
    }

    sealed!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitwise_table_is_width_only() {
        assert_eq!(tag_of_bitwise::<i8>(), ProxyTag::new(OperandKind::Bitwise, 8));
        assert_eq!(tag_of_bitwise::<u16>(), ProxyTag::new(OperandKind::Bitwise, 16));
        assert_eq!(tag_of_bitwise::<f32>(), ProxyTag::new(OperandKind::Bitwise, 32));
        assert_eq!(tag_of_bitwise::<i64>(), ProxyTag::new(OperandKind::Bitwise, 64));
        assert_eq!(tag_of_bitwise::<f64>(), ProxyTag::new(OperandKind::Bitwise, 64));
        assert_eq!(
            tag_of_bitwise::<*mut u8>().bits as usize,
            core::mem::size_of::<usize>() * 8
        );
    }

    #[test]
    fn numeric_table_keeps_family() {
        assert_eq!(tag_of_numeric::<i32>(), ProxyTag::new(OperandKind::Signed, 32));
        assert_eq!(tag_of_numeric::<u32>(), ProxyTag::new(OperandKind::Unsigned, 32));
        assert_eq!(tag_of_numeric::<f32>(), ProxyTag::new(OperandKind::Float, 32));
        assert_eq!(tag_of_numeric::<i8>(), ProxyTag::new(OperandKind::Signed, 8));
        assert_eq!(tag_of_numeric::<f64>(), ProxyTag::new(OperandKind::Float, 64));
    }

    #[test]
    fn ordered_combinators_follow_std_tie_rules() {
        assert_eq!(combine_max(3, 7), 7);
        assert_eq!(combine_max(7, 3), 7);
        assert_eq!(combine_min(3, 7), 3);
        assert_eq!(combine_min(-3, -7), -7);
        // NaN never compares less, so the old value survives.
        assert_eq!(combine_max(1.0f32, f32::NAN), 1.0);
        assert!(combine_min(f32::NAN, 1.0).is_nan());
    }

    #[test]
    fn tag_width_in_bytes() {
        assert_eq!(ProxyTag::new(OperandKind::Float, 64).bytes(), 8);
    }
}
