//! `ScopedAtomic`: owned atomic storage at a fixed scope.

use core::cell::UnsafeCell;
use core::fmt;
use core::marker::PhantomData;

use crate::backend::Word;
use crate::dispatch::Dispatcher;
use crate::order::MemoryOrder;
use crate::proxy::{assert_proxy_layout, AtomicValue, BitwiseOps, BitwiseProxy, NumericValue, PlainBits};
use crate::scope::{Block, Device, ScopeTag, System};

/// Storage for one proxy word, aligned for the backend's atomic access.
#[repr(C)]
struct Slot<P: BitwiseProxy> {
    _align: [<P as Word>::AlignAs; 0],
    bits: UnsafeCell<P>,
}

/// An atomic `T` whose operations are performed at scope `S`.
///
/// The value is held as its bitwise proxy word in storage aligned for the
/// active backend, so every dispatcher precondition holds by construction
/// and all methods are safe.
///
/// ```rust
/// use hetero_atomic::{BlockAtomic, MemoryOrder};
///
/// let hits = BlockAtomic::new(0u32);
/// hits.fetch_add(3, MemoryOrder::Relaxed);
/// assert_eq!(hits.load(MemoryOrder::Acquire), 3);
/// ```
#[repr(transparent)]
pub struct ScopedAtomic<T: AtomicValue, S: ScopeTag = Device> {
    slot: Slot<T::Bitwise>,
    _marker: PhantomData<(T, S)>,
}

/// A [`ScopedAtomic`] at block scope.
pub type BlockAtomic<T> = ScopedAtomic<T, Block>;
/// A [`ScopedAtomic`] at device scope.
pub type DeviceAtomic<T> = ScopedAtomic<T, Device>;
/// A [`ScopedAtomic`] at system scope.
pub type SystemAtomic<T> = ScopedAtomic<T, System>;

type D = Dispatcher;

impl<T: AtomicValue, S: ScopeTag> ScopedAtomic<T, S> {
    /// Creates a new atomic holding `value`.
    #[inline(always)]
    pub fn new(value: T) -> Self {
        assert_proxy_layout::<T, T::Bitwise>();
        Self {
            slot: Slot {
                _align: [],
                bits: UnsafeCell::new(value.into_bits()),
            },
            _marker: PhantomData,
        }
    }

    /// Consumes the atomic and returns the contained value.
    #[inline(always)]
    pub fn into_inner(self) -> T {
        T::from_bits(self.slot.bits.into_inner())
    }

    /// Returns a mutable reference to the value.
    ///
    /// Exclusive access means no atomic operation is needed. Pointer atomics
    /// use [`with_mut`](Self::with_mut) instead.
    #[inline(always)]
    pub fn get_mut(&mut self) -> &mut T
    where
        T: PlainBits,
    {
        assert_proxy_layout::<T, T::Bitwise>();
        // SAFETY: the layout assertion gives equal size and an alignment at
        // least `T`'s. The slot only holds bits produced by `into_bits`, and
        // `PlainBits` makes those readable in place as a `T`.
        unsafe { &mut *self.as_ptr() }
    }

    /// Runs `f` on the value with exclusive access.
    ///
    /// The value is taken out through [`AtomicValue::from_bits`] and written
    /// back through [`AtomicValue::into_bits`], so pointers keep their
    /// provenance.
    #[inline(always)]
    pub fn with_mut<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let bits = self.slot.bits.get_mut();
        let mut value = T::from_bits(*bits);
        let out = f(&mut value);
        *bits = value.into_bits();
        out
    }

    /// A raw pointer to the value, suitable for [`ops`](crate::ops).
    #[inline(always)]
    pub const fn as_ptr(&self) -> *mut T {
        assert_proxy_layout::<T, T::Bitwise>();
        self.slot.bits.get().cast()
    }

    /// Loads the value.
    #[inline(always)]
    pub fn load(&self, order: MemoryOrder) -> T {
        // SAFETY: the slot is valid and aligned for the proxy word.
        unsafe { D::load(self.as_ptr(), order, S::default()) }
    }

    /// Stores `value`.
    #[inline(always)]
    pub fn store(&self, value: T, order: MemoryOrder) {
        // SAFETY: see `load`.
        unsafe { D::store(self.as_ptr(), value, order, S::default()) }
    }

    /// Stores `value`, returning the previous value.
    #[inline(always)]
    pub fn swap(&self, value: T, order: MemoryOrder) -> T {
        // SAFETY: see `load`.
        unsafe { D::exchange(self.as_ptr(), value, order, S::default()) }
    }

    /// Stores `new` if the current value is bit-identical to `current`.
    ///
    /// # Errors
    /// Returns the observed value when it differs from `current`.
    #[inline(always)]
    pub fn compare_exchange(&self, current: T, new: T, success: MemoryOrder, failure: MemoryOrder) -> Result<T, T> {
        let mut observed = current;
        // SAFETY: see `load`.
        if unsafe { D::compare_exchange_strong(self.as_ptr(), &mut observed, new, success, failure, S::default()) } {
            Ok(current)
        } else {
            Err(observed)
        }
    }

    /// Like [`compare_exchange`](Self::compare_exchange), but may fail
    /// spuriously.
    ///
    /// # Errors
    /// Returns the observed value on failure, which may equal `current`.
    #[inline(always)]
    pub fn compare_exchange_weak(&self, current: T, new: T, success: MemoryOrder, failure: MemoryOrder) -> Result<T, T> {
        let mut observed = current;
        // SAFETY: see `load`.
        if unsafe { D::compare_exchange_weak(self.as_ptr(), &mut observed, new, success, failure, S::default()) } {
            Ok(current)
        } else {
            Err(observed)
        }
    }

    /// Applies `f` until it returns `None` or the update lands.
    ///
    /// # Errors
    /// Returns the last observed value if `f` returned `None`.
    pub fn fetch_update<F>(&self, set_order: MemoryOrder, fetch_order: MemoryOrder, mut f: F) -> Result<T, T>
    where
        F: FnMut(T) -> Option<T>,
    {
        let mut prev = self.load(fetch_order);
        while let Some(next) = f(prev) {
            match self.compare_exchange_weak(prev, next, set_order, fetch_order) {
                Ok(prev) => return Ok(prev),
                Err(observed) => prev = observed,
            }
        }
        Err(prev)
    }
}

impl<T: BitwiseOps, S: ScopeTag> ScopedAtomic<T, S> {
    /// Bitwise and, returning the previous value.
    #[inline(always)]
    pub fn fetch_and(&self, value: T, order: MemoryOrder) -> T {
        // SAFETY: see `load`.
        unsafe { D::fetch_and(self.as_ptr(), value, order, S::default()) }
    }

    /// Bitwise or, returning the previous value.
    #[inline(always)]
    pub fn fetch_or(&self, value: T, order: MemoryOrder) -> T {
        // SAFETY: see `load`.
        unsafe { D::fetch_or(self.as_ptr(), value, order, S::default()) }
    }

    /// Bitwise xor, returning the previous value.
    #[inline(always)]
    pub fn fetch_xor(&self, value: T, order: MemoryOrder) -> T {
        // SAFETY: see `load`.
        unsafe { D::fetch_xor(self.as_ptr(), value, order, S::default()) }
    }
}

impl<T: NumericValue, S: ScopeTag> ScopedAtomic<T, S> {
    /// Adds `value`, returning the previous value. Integers wrap.
    #[inline(always)]
    pub fn fetch_add(&self, value: T, order: MemoryOrder) -> T {
        // SAFETY: see `load`.
        unsafe { D::fetch_add(self.as_ptr(), value, order, S::default()) }
    }

    /// Subtracts `value`, returning the previous value. Integers wrap.
    #[inline(always)]
    pub fn fetch_sub(&self, value: T, order: MemoryOrder) -> T {
        // SAFETY: see `load`.
        unsafe { D::fetch_sub(self.as_ptr(), value, order, S::default()) }
    }

    /// Stores the maximum of the current value and `value`, returning the
    /// previous value.
    #[inline(always)]
    pub fn fetch_max(&self, value: T, order: MemoryOrder) -> T {
        // SAFETY: see `load`.
        unsafe { D::fetch_max(self.as_ptr(), value, order, S::default()) }
    }

    /// Stores the minimum of the current value and `value`, returning the
    /// previous value.
    #[inline(always)]
    pub fn fetch_min(&self, value: T, order: MemoryOrder) -> T {
        // SAFETY: see `load`.
        unsafe { D::fetch_min(self.as_ptr(), value, order, S::default()) }
    }
}

impl<U, S: ScopeTag> ScopedAtomic<*mut U, S> {
    /// Advances the pointer by `count` elements, returning the previous one.
    #[inline(always)]
    pub fn fetch_ptr_add(&self, count: isize, order: MemoryOrder) -> *mut U {
        // SAFETY: see `load`.
        unsafe { D::fetch_ptr_add(self.as_ptr(), count, order, S::default()) }
    }

    /// Moves the pointer back by `count` elements, returning the previous one.
    #[inline(always)]
    pub fn fetch_ptr_sub(&self, count: isize, order: MemoryOrder) -> *mut U {
        // SAFETY: see `load`.
        unsafe { D::fetch_ptr_sub(self.as_ptr(), count, order, S::default()) }
    }
}

impl<T: AtomicValue + Default, S: ScopeTag> Default for ScopedAtomic<T, S> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: AtomicValue, S: ScopeTag> From<T> for ScopedAtomic<T, S> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: AtomicValue + fmt::Debug, S: ScopeTag> fmt::Debug for ScopedAtomic<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScopedAtomic")
            .field(&self.load(MemoryOrder::Relaxed))
            .field(&S::SCOPE)
            .finish()
    }
}

// SAFETY: all shared access goes through atomic operations, like `AtomicPtr`.
unsafe impl<T: AtomicValue, S: ScopeTag> Send for ScopedAtomic<T, S> {}
// SAFETY: see `Send`.
unsafe impl<T: AtomicValue, S: ScopeTag> Sync for ScopedAtomic<T, S> {}
