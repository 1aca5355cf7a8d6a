//! Device backend: PTX memory-model instructions for `sm_70` and newer.
//!
//! Every operation is emitted as `ld`, `st` or `atom` carrying an explicit
//! semantics qualifier (`.relaxed`, `.acquire`, `.release`, `.acq_rel`) and a
//! scope qualifier (`.cta`, `.cluster`, `.gpu`, `.sys`). PTX has no
//! sequentially consistent access, so `SeqCst` is a `fence.sc` at the same
//! scope followed by the acquire form (relaxed form for stores).
//!
//! `.cluster` requires `sm_90`. Scopes are chosen per call, so a kernel that
//! never asks for [`Scope::Cluster`] runs on older architectures.
//!
//! Instruction coverage:
//!
//! | word                 | load/store/exch/cas/and/or/xor | add      | max/min  |
//! |----------------------|--------------------------------|----------|----------|
//! | `u32` `u64` `usize`  | native                         | native   | native   |
//! | `i32` `i64` `isize`  | (bitwise proxy)                | native   | native   |
//! | `f32` `f64`          | (bitwise proxy)                | native   | CAS loop |
//! | 8/16-bit integers    | CAS on enclosing 32-bit word   | CAS loop | CAS loop |

use core::arch::asm;
use core::mem;

use super::cas::{self, CasCell};
use super::{NumericWord, Word};
use crate::order::MemoryOrder;
use crate::proxy::{combine_max, combine_min, NumericProxy};
use crate::scope::Scope;

const _: () = assert!(mem::size_of::<usize>() == mem::size_of::<u64>());

/// Expands `$emit` once per scope qualifier and selects the arm for `$scope`.
///
/// The emitter receives the scope qualifier as its first argument. Thread
/// scope has no PTX counterpart and uses `.cta`.
macro_rules! at_scope {
    ($scope:expr, $emit:ident!($($args:tt)*)) => {
        match $scope {
            Scope::Thread | Scope::Block => $emit!("cta", $($args)*),
            Scope::Cluster => $emit!("cluster", $($args)*),
            Scope::Device => $emit!("gpu", $($args)*),
            Scope::System => $emit!("sys", $($args)*),
        }
    };
}

macro_rules! with_load {
    ($order:expr, $scope:expr, $emit:ident!($($args:tt)*)) => {{
        let scope = $scope;
        match load_sem($order, scope) {
            LoadSem::Relaxed => at_scope!(scope, $emit!("relaxed", $($args)*)),
            LoadSem::Acquire => at_scope!(scope, $emit!("acquire", $($args)*)),
        }
    }};
}

macro_rules! with_store {
    ($order:expr, $scope:expr, $emit:ident!($($args:tt)*)) => {{
        let scope = $scope;
        match store_sem($order, scope) {
            StoreSem::Relaxed => at_scope!(scope, $emit!("relaxed", $($args)*)),
            StoreSem::Release => at_scope!(scope, $emit!("release", $($args)*)),
        }
    }};
}

macro_rules! with_rmw {
    ($order:expr, $scope:expr, $emit:ident!($($args:tt)*)) => {{
        let scope = $scope;
        match rmw_sem($order, scope) {
            RmwSem::Relaxed => at_scope!(scope, $emit!("relaxed", $($args)*)),
            RmwSem::Acquire => at_scope!(scope, $emit!("acquire", $($args)*)),
            RmwSem::Release => at_scope!(scope, $emit!("release", $($args)*)),
            RmwSem::AcqRel => at_scope!(scope, $emit!("acq_rel", $($args)*)),
        }
    }};
}

macro_rules! emit_fence {
    ($scope:literal, $sem:literal) => {
        // SAFETY: a fence has no operands.
        unsafe { asm!(concat!("fence.", $sem, ".", $scope, ";")) }
    };
}

macro_rules! emit_ld {
    ($scope:literal, $sem:literal, $bits:literal, $reg:ident, $out:ident, $ptr:ident) => {
        // SAFETY: the caller upholds the `Word` contract for `$ptr`.
        unsafe {
            asm!(
                concat!("ld.", $sem, ".", $scope, ".b", $bits, " {}, [{}];"),
                out($reg) $out,
                in(reg64) $ptr,
            )
        }
    };
}

macro_rules! emit_st {
    ($scope:literal, $sem:literal, $bits:literal, $reg:ident, $ptr:ident, $val:ident) => {
        // SAFETY: the caller upholds the `Word` contract for `$ptr`.
        unsafe {
            asm!(
                concat!("st.", $sem, ".", $scope, ".b", $bits, " [{}], {};"),
                in(reg64) $ptr,
                in($reg) $val,
            )
        }
    };
}

macro_rules! emit_atom {
    ($scope:literal, $sem:literal, $op:literal, $ty:literal, $reg:ident, $out:ident, $ptr:ident, $val:ident) => {
        // SAFETY: the caller upholds the `Word` contract for `$ptr`.
        unsafe {
            asm!(
                concat!("atom.", $sem, ".", $scope, ".", $op, ".", $ty, " {}, [{}], {};"),
                out($reg) $out,
                in(reg64) $ptr,
                in($reg) $val,
            )
        }
    };
}

macro_rules! emit_cas {
    ($scope:literal, $sem:literal, $bits:literal, $reg:ident, $out:ident, $ptr:ident, $cmp:ident, $new:ident) => {
        // SAFETY: the caller upholds the `Word` contract for `$ptr`.
        unsafe {
            asm!(
                concat!("atom.", $sem, ".", $scope, ".cas.b", $bits, " {}, [{}], {}, {};"),
                out($reg) $out,
                in(reg64) $ptr,
                in($reg) $cmp,
                in($reg) $new,
            )
        }
    };
}

enum LoadSem {
    Relaxed,
    Acquire,
}

enum StoreSem {
    Relaxed,
    Release,
}

enum RmwSem {
    Relaxed,
    Acquire,
    Release,
    AcqRel,
}

#[inline(always)]
fn fence_sc(scope: Scope) {
    at_scope!(scope, emit_fence!("sc"));
}

#[inline(always)]
fn load_sem(order: MemoryOrder, scope: Scope) -> LoadSem {
    match order.for_load() {
        MemoryOrder::Relaxed => LoadSem::Relaxed,
        MemoryOrder::SeqCst => {
            fence_sc(scope);
            LoadSem::Acquire
        }
        _ => LoadSem::Acquire,
    }
}

#[inline(always)]
fn store_sem(order: MemoryOrder, scope: Scope) -> StoreSem {
    match order.for_store() {
        MemoryOrder::Release => StoreSem::Release,
        MemoryOrder::SeqCst => {
            fence_sc(scope);
            StoreSem::Relaxed
        }
        _ => StoreSem::Relaxed,
    }
}

#[inline(always)]
fn rmw_sem(order: MemoryOrder, scope: Scope) -> RmwSem {
    match order.for_rmw() {
        MemoryOrder::Relaxed => RmwSem::Relaxed,
        MemoryOrder::Release => RmwSem::Release,
        MemoryOrder::AcqRel => RmwSem::AcqRel,
        MemoryOrder::SeqCst => {
            fence_sc(scope);
            RmwSem::Acquire
        }
        _ => RmwSem::Acquire,
    }
}

/// A single `atom.cas` carries one ordering, so it takes the stronger of the
/// success and failure orderings.
#[inline(always)]
const fn cas_order(success: MemoryOrder, failure: MemoryOrder) -> MemoryOrder {
    match (success.for_rmw(), failure.for_load()) {
        (_, MemoryOrder::SeqCst) => MemoryOrder::SeqCst,
        (MemoryOrder::Relaxed, MemoryOrder::Acquire) => MemoryOrder::Acquire,
        (MemoryOrder::Release, MemoryOrder::Acquire) => MemoryOrder::AcqRel,
        (success, _) => success,
    }
}

/// A hardware fence at `scope`.
///
/// `SeqCst` emits `fence.sc`, everything else stronger than `Relaxed` emits
/// `fence.acq_rel`.
#[inline(always)]
pub fn fence(order: MemoryOrder, scope: Scope) {
    match order {
        MemoryOrder::Relaxed => {}
        MemoryOrder::SeqCst => fence_sc(scope),
        _ => at_scope!(scope, emit_fence!("acq_rel")),
    }
}

/// Returns `true` if `addr` lies in the calling thread's local state space.
#[inline(always)]
pub fn is_local(addr: *const u8) -> bool {
    let ret: u32;
    // SAFETY: `isspacep` only inspects the address; it never dereferences it.
    unsafe {
        asm!(
            "{{ .reg .pred %p; isspacep.local %p, {}; selp.u32 {}, 1, 0, %p; }}",
            in(reg64) addr,
            out(reg32) ret,
        );
    }
    ret != 0
}

/// A device word as a [`CasCell`], for the shared CAS loop.
struct DeviceCell<W> {
    ptr: *mut W,
    scope: Scope,
}

impl<W: Word> DeviceCell<W> {
    /// # Safety
    /// `ptr` must satisfy the [`Word`] contract for as long as the cell lives.
    #[inline(always)]
    unsafe fn new(ptr: *mut W, scope: Scope) -> Self {
        Self { ptr, scope }
    }
}

impl<W: Word> CasCell for DeviceCell<W> {
    type Value = W;

    #[inline(always)]
    fn load(&self, order: MemoryOrder) -> W {
        // SAFETY: guaranteed by the constructor's contract.
        unsafe { W::load(self.ptr, order, self.scope) }
    }

    #[inline(always)]
    fn compare_exchange_weak(&self, current: W, new: W, success: MemoryOrder, failure: MemoryOrder) -> Result<W, W> {
        let mut observed = current;
        // SAFETY: guaranteed by the constructor's contract.
        if unsafe { W::compare_exchange(self.ptr, &mut observed, new, false, success, failure, self.scope) } {
            Ok(current)
        } else {
            Err(observed)
        }
    }
}

macro_rules! device_word {
    ($($word:ty => $bits:literal, $bty:literal, $reg:ident);* $(;)?) => {
        $(
            // SAFETY: every method is one `ld`/`st`/`atom` instruction with
            // the mapped semantics and scope.
            unsafe impl Word for $word {
                type AlignAs = $word;

                #[inline(always)]
                unsafe fn load(ptr: *const Self, order: MemoryOrder, scope: Scope) -> Self {
                    let out: $word;
                    with_load!(order, scope, emit_ld!($bits, $reg, out, ptr));
                    out
                }

                #[inline(always)]
                unsafe fn store(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) {
                    with_store!(order, scope, emit_st!($bits, $reg, ptr, val));
                }

                #[inline(always)]
                unsafe fn exchange(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
                    let out: $word;
                    with_rmw!(order, scope, emit_atom!("exch", $bty, $reg, out, ptr, val));
                    out
                }

                #[inline(always)]
                unsafe fn compare_exchange(
                    ptr: *mut Self,
                    expected: &mut Self,
                    desired: Self,
                    _weak: bool,
                    success: MemoryOrder,
                    failure: MemoryOrder,
                    scope: Scope,
                ) -> bool {
                    let cmp = *expected;
                    let old: $word;
                    with_rmw!(cas_order(success, failure), scope, emit_cas!($bits, $reg, old, ptr, cmp, desired));
                    if old == cmp {
                        true
                    } else {
                        *expected = old;
                        false
                    }
                }

                #[inline(always)]
                unsafe fn fetch_and(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
                    let out: $word;
                    with_rmw!(order, scope, emit_atom!("and", $bty, $reg, out, ptr, val));
                    out
                }

                #[inline(always)]
                unsafe fn fetch_or(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
                    let out: $word;
                    with_rmw!(order, scope, emit_atom!("or", $bty, $reg, out, ptr, val));
                    out
                }

                #[inline(always)]
                unsafe fn fetch_xor(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
                    let out: $word;
                    with_rmw!(order, scope, emit_atom!("xor", $bty, $reg, out, ptr, val));
                    out
                }
            }
        )*
    };
}

device_word! {
    u32 => 32, "b32", reg32;
    u64 => 64, "b64", reg64;
}

macro_rules! device_native_numeric {
    ($($word:ty => $add:literal, $ordered:literal, $reg:ident);* $(;)?) => {
        $(
            // SAFETY: one `atom` instruction per operation.
            unsafe impl NumericWord for $word {
                #[inline(always)]
                unsafe fn fetch_add(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
                    let out: $word;
                    with_rmw!(order, scope, emit_atom!("add", $add, $reg, out, ptr, val));
                    out
                }

                #[inline(always)]
                unsafe fn fetch_max(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
                    let out: $word;
                    with_rmw!(order, scope, emit_atom!("max", $ordered, $reg, out, ptr, val));
                    out
                }

                #[inline(always)]
                unsafe fn fetch_min(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
                    let out: $word;
                    with_rmw!(order, scope, emit_atom!("min", $ordered, $reg, out, ptr, val));
                    out
                }
            }
        )*
    };
}

// `atom.add` has no `.s64`; two's complement addition is the same bits.
device_native_numeric! {
    u32 => "u32", "u32", reg32;
    i32 => "s32", "s32", reg32;
    u64 => "u64", "u64", reg64;
    i64 => "u64", "s64", reg64;
}

macro_rules! device_float {
    ($($float:ty => $bits:ty, $add:literal, $reg:ident);* $(;)?) => {
        $(
            // SAFETY: native `atom.add`; max/min are a CAS loop of atomic
            // read-modify-writes on the bit pattern.
            unsafe impl NumericWord for $float {
                #[inline(always)]
                unsafe fn fetch_add(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
                    let out: $float;
                    with_rmw!(order, scope, emit_atom!("add", $add, $reg, out, ptr, val));
                    out
                }

                #[inline(always)]
                unsafe fn fetch_max(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
                    // SAFETY: same size and alignment as the float.
                    let cell = unsafe { DeviceCell::new(ptr.cast::<$bits>(), scope) };
                    <$float>::from_bits(cas::fetch_update(&cell, order, |bits| {
                        combine_max(<$float>::from_bits(bits), val).to_bits()
                    }))
                }

                #[inline(always)]
                unsafe fn fetch_min(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
                    // SAFETY: see `fetch_max`.
                    let cell = unsafe { DeviceCell::new(ptr.cast::<$bits>(), scope) };
                    <$float>::from_bits(cas::fetch_update(&cell, order, |bits| {
                        combine_min(<$float>::from_bits(bits), val).to_bits()
                    }))
                }
            }
        )*
    };
}

device_float! {
    f32 => u32, "f32", reg32;
    f64 => u64, "f64", reg64;
}

macro_rules! device_address_sized {
    ($($word:ty => $wide:ty),* $(,)?) => {
        $(
            // SAFETY: `$word` and `$wide` are the same 64-bit type on nvptx64.
            unsafe impl NumericWord for $word {
                #[inline(always)]
                unsafe fn fetch_add(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
                    // SAFETY: same size and alignment.
                    unsafe { <$wide as NumericWord>::fetch_add(ptr.cast(), val as $wide, order, scope) as $word }
                }

                #[inline(always)]
                unsafe fn fetch_max(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
                    // SAFETY: same size and alignment.
                    unsafe { <$wide as NumericWord>::fetch_max(ptr.cast(), val as $wide, order, scope) as $word }
                }

                #[inline(always)]
                unsafe fn fetch_min(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
                    // SAFETY: same size and alignment.
                    unsafe { <$wide as NumericWord>::fetch_min(ptr.cast(), val as $wide, order, scope) as $word }
                }
            }
        )*
    };
}

device_address_sized!(usize => u64, isize => i64);

// SAFETY: forwards to the `u64` instructions; the sizes match.
unsafe impl Word for usize {
    type AlignAs = u64;

    #[inline(always)]
    unsafe fn load(ptr: *const Self, order: MemoryOrder, scope: Scope) -> Self {
        // SAFETY: same size and alignment.
        unsafe { <u64 as Word>::load(ptr.cast(), order, scope) as usize }
    }

    #[inline(always)]
    unsafe fn store(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) {
        // SAFETY: same size and alignment.
        unsafe { <u64 as Word>::store(ptr.cast(), val as u64, order, scope) }
    }

    #[inline(always)]
    unsafe fn exchange(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
        // SAFETY: same size and alignment.
        unsafe { <u64 as Word>::exchange(ptr.cast(), val as u64, order, scope) as usize }
    }

    #[inline(always)]
    unsafe fn compare_exchange(
        ptr: *mut Self,
        expected: &mut Self,
        desired: Self,
        weak: bool,
        success: MemoryOrder,
        failure: MemoryOrder,
        scope: Scope,
    ) -> bool {
        let mut wide = *expected as u64;
        // SAFETY: same size and alignment.
        let swapped =
            unsafe { <u64 as Word>::compare_exchange(ptr.cast(), &mut wide, desired as u64, weak, success, failure, scope) };
        *expected = wide as usize;
        swapped
    }

    #[inline(always)]
    unsafe fn fetch_and(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
        // SAFETY: same size and alignment.
        unsafe { <u64 as Word>::fetch_and(ptr.cast(), val as u64, order, scope) as usize }
    }

    #[inline(always)]
    unsafe fn fetch_or(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
        // SAFETY: same size and alignment.
        unsafe { <u64 as Word>::fetch_or(ptr.cast(), val as u64, order, scope) as usize }
    }

    #[inline(always)]
    unsafe fn fetch_xor(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
        // SAFETY: same size and alignment.
        unsafe { <u64 as Word>::fetch_xor(ptr.cast(), val as u64, order, scope) as usize }
    }
}

/// An 8- or 16-bit integer living inside an aligned 32-bit word.
trait SubWord: Copy + Eq {
    fn widen(self) -> u32;
    fn narrow(word: u32) -> Self;
}

macro_rules! sub_word {
    ($($ty:ty => $unsigned:ty),* $(,)?) => {
        $(
            impl SubWord for $ty {
                #[inline(always)]
                fn widen(self) -> u32 {
                    u32::from(self as $unsigned)
                }

                #[inline(always)]
                fn narrow(word: u32) -> Self {
                    word as $unsigned as $ty
                }
            }
        )*
    };
}

sub_word!(u8 => u8, i8 => u8, u16 => u16, i16 => u16);

/// Position of a sub-word inside its enclosing 32-bit word. Little-endian.
struct Enclosing {
    word: *mut u32,
    shift: u32,
    mask: u32,
}

impl Enclosing {
    #[inline(always)]
    fn of<W: SubWord>(ptr: *const W) -> Self {
        let offset = ptr as usize & (mem::align_of::<u32>() - 1);
        let shift = (offset * 8) as u32;
        let width = (mem::size_of::<W>() * 8) as u32;
        Self {
            word: ptr.cast::<u8>().wrapping_sub(offset).cast_mut().cast::<u32>(),
            shift,
            mask: (u32::MAX >> (32 - width)) << shift,
        }
    }

    #[inline(always)]
    fn extract<W: SubWord>(&self, word: u32) -> W {
        W::narrow((word & self.mask) >> self.shift)
    }

    #[inline(always)]
    fn insert<W: SubWord>(&self, word: u32, part: W) -> u32 {
        (word & !self.mask) | ((part.widen() << self.shift) & self.mask)
    }
}

/// Runs `f` on a sub-word through a CAS loop on its enclosing word.
///
/// # Safety
/// `ptr` must satisfy the [`Word`] contract; the enclosing word is then in
/// bounds of the same allocation's aligned storage.
#[inline(always)]
unsafe fn sub_word_update<W: SubWord>(ptr: *mut W, order: MemoryOrder, scope: Scope, mut f: impl FnMut(W) -> W) -> W {
    let enclosing = Enclosing::of(ptr);
    // SAFETY: see the function contract.
    let cell = unsafe { DeviceCell::new(enclosing.word, scope) };
    let prev = cas::fetch_update(&cell, order, |word| enclosing.insert(word, f(enclosing.extract(word))));
    enclosing.extract(prev)
}

macro_rules! device_sub_word {
    ($($word:ty),* $(,)?) => {
        $(
            // SAFETY: loads read the enclosing word atomically; everything
            // else is a CAS loop on it that leaves neighbouring bytes intact.
            unsafe impl Word for $word {
                type AlignAs = $word;

                #[inline(always)]
                unsafe fn load(ptr: *const Self, order: MemoryOrder, scope: Scope) -> Self {
                    let enclosing = Enclosing::of(ptr);
                    // SAFETY: see `sub_word_update`.
                    enclosing.extract(unsafe { <u32 as Word>::load(enclosing.word, order, scope) })
                }

                #[inline(always)]
                unsafe fn store(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) {
                    // SAFETY: forwarded contract.
                    unsafe { sub_word_update(ptr, order.for_store(), scope, |_| val) };
                }

                #[inline(always)]
                unsafe fn exchange(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
                    // SAFETY: forwarded contract.
                    unsafe { sub_word_update(ptr, order, scope, |_| val) }
                }

                #[inline(always)]
                unsafe fn compare_exchange(
                    ptr: *mut Self,
                    expected: &mut Self,
                    desired: Self,
                    _weak: bool,
                    success: MemoryOrder,
                    failure: MemoryOrder,
                    scope: Scope,
                ) -> bool {
                    let enclosing = Enclosing::of(ptr);
                    let order = cas_order(success, failure);
                    // SAFETY: see `sub_word_update`.
                    let mut word = unsafe { <u32 as Word>::load(enclosing.word, failure, scope) };
                    loop {
                        let current: $word = enclosing.extract(word);
                        if current != *expected {
                            *expected = current;
                            return false;
                        }
                        let new = enclosing.insert(word, desired);
                        // Retry only when a neighbouring sub-word changed.
                        // SAFETY: see `sub_word_update`.
                        if unsafe { <u32 as Word>::compare_exchange(enclosing.word, &mut word, new, false, order, failure, scope) } {
                            return true;
                        }
                    }
                }

                #[inline(always)]
                unsafe fn fetch_and(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
                    // SAFETY: forwarded contract.
                    unsafe { sub_word_update(ptr, order, scope, |old| old & val) }
                }

                #[inline(always)]
                unsafe fn fetch_or(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
                    // SAFETY: forwarded contract.
                    unsafe { sub_word_update(ptr, order, scope, |old| old | val) }
                }

                #[inline(always)]
                unsafe fn fetch_xor(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
                    // SAFETY: forwarded contract.
                    unsafe { sub_word_update(ptr, order, scope, |old| old ^ val) }
                }
            }
        )*
    };
}

device_sub_word!(u8, u16);

macro_rules! device_sub_word_numeric {
    ($($word:ty),* $(,)?) => {
        $(
            // SAFETY: CAS loops on the enclosing word.
            unsafe impl NumericWord for $word {
                #[inline(always)]
                unsafe fn fetch_add(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
                    // SAFETY: forwarded contract.
                    unsafe { sub_word_update(ptr, order, scope, |old| old.combine_add(val)) }
                }

                #[inline(always)]
                unsafe fn fetch_max(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
                    // SAFETY: forwarded contract.
                    unsafe { sub_word_update(ptr, order, scope, |old| combine_max(old, val)) }
                }

                #[inline(always)]
                unsafe fn fetch_min(ptr: *mut Self, val: Self, order: MemoryOrder, scope: Scope) -> Self {
                    // SAFETY: forwarded contract.
                    unsafe { sub_word_update(ptr, order, scope, |old| combine_min(old, val)) }
                }
            }
        )*
    };
}

device_sub_word_numeric!(u8, i8, u16, i16);
