//! # `hetero-atomic` - Scoped Atomics for Host and Device
//!
//! One atomic interface that runs on host CPUs and on CUDA devices. Every
//! operation names a [`MemoryOrder`] and a visibility [`Scope`], and is lowered
//! onto whatever primitive the active backend actually has:
//!
//! - a native device instruction (`ld`/`st`/`atom` with a scope qualifier),
//! - a compare-and-swap loop where no native instruction exists
//!   (sub-word integers on the device, float add/min/max on the host),
//! - a host atomic from `core::sync::atomic`.
//!
//! ## Architecture
//!
//! The layer is stratified leaf-first:
//!
//! 1. **Proxy deduction** ([`proxy`]): a value type `T` is reinterpreted as a
//!    same-size proxy word. There are two tables: the *bitwise* table
//!    (load, store, exchange, compare-exchange, and/or/xor) and the *numeric*
//!    table (add, sub, max, min). Capability traits gate which operations a
//!    type can reach, so an unsupported combination does not compile.
//! 2. **Scope mapping** ([`scope`]): a closed [`Scope`] enum with zero-sized
//!    marker types, mapped to instruction-level identifiers by total `const fn`s.
//! 3. **Locality fallback** ([`locality`]): a pluggable predicate decides
//!    whether the target is private to the executing unit, in which case the
//!    operation is served by plain memory accesses.
//! 4. **Dispatch** ([`dispatch`], [`ops`]): reinterpret, try the fallback,
//!    otherwise call the backend with the mapped order and scope.
//!
//! The backend ([`backend`]) is selected at build configuration time:
//! `target_os = "cuda"` builds the PTX backend, every other target builds the
//! host backend. Both implement the same word-level interface.
//!
//! ## Example
//!
//! ```rust
//! use hetero_atomic::{ops, scope::Device, MemoryOrder};
//!
//! let mut x: i32 = 10;
//! let p = &mut x as *mut i32;
//!
//! // SAFETY: `p` is valid, aligned, and only accessed through this layer.
//! unsafe {
//!     assert_eq!(ops::fetch_add(p, 5, MemoryOrder::Relaxed, Device), 10);
//!     assert_eq!(ops::load(p, MemoryOrder::SeqCst, Device), 15);
//! }
//! ```
//!
//! Operations outside a type's capabilities are rejected at build time:
//!
//! ```compile_fail
//! use hetero_atomic::{ops, scope::Device, MemoryOrder};
//!
//! let mut p: *mut u8 = core::ptr::null_mut();
//! // Raw pointers have no numeric proxy, so there is no `fetch_max` for them.
//! unsafe { ops::fetch_max(&mut p as *mut *mut u8, core::ptr::null_mut(), MemoryOrder::Relaxed, Device) };
//! ```

#![cfg_attr(target_os = "cuda", no_std)]
#![cfg_attr(target_os = "cuda", feature(asm_experimental_arch))]
#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::inline_always)]

#[macro_use]
mod macros;

pub mod atomic;
pub mod backend;
pub mod dispatch;
pub mod error;
pub mod locality;
pub mod ops;
pub mod order;
pub mod proxy;
#[cfg(not(target_os = "cuda"))]
pub mod report;
pub mod scope;
#[cfg(all(feature = "proptest", not(target_os = "cuda")))]
pub mod testing;

pub use atomic::{BlockAtomic, DeviceAtomic, ScopedAtomic, SystemAtomic};
pub use dispatch::{Dispatcher, OpKind};
pub use error::{OrderError, ScopeError};
pub use locality::{AlwaysPrivate, Locality, NeverPrivate, PlatformLocality, Plain, Qualifier, Volatile};
pub use order::MemoryOrder;
pub use proxy::{
    bit_cast, AtomicValue, BitwiseOps, BitwiseProxy, NumericProxy, NumericValue, OperandKind, PlainBits, ProxyTag,
};
pub use scope::{Scope, ScopeTag};

// Compile-time assertions for the proxy tables.
const _: () = {
    use core::mem;

    // Scope markers are ZSTs so they vanish from generated code.
    assert!(mem::size_of::<scope::Thread>() == 0);
    assert!(mem::size_of::<scope::System>() == 0);

    // Bitwise proxies are exactly as wide as the values they stand in for.
    assert!(mem::size_of::<<f32 as AtomicValue>::Bitwise>() == mem::size_of::<f32>());
    assert!(mem::size_of::<<f64 as AtomicValue>::Bitwise>() == mem::size_of::<f64>());
    assert!(mem::size_of::<<*mut u8 as AtomicValue>::Bitwise>() == mem::size_of::<*mut u8>());

    // A scoped atomic is its proxy word and nothing more.
    assert!(mem::size_of::<ScopedAtomic<u32>>() == mem::size_of::<u32>());
    assert!(mem::size_of::<ScopedAtomic<f64, scope::Block>>() == mem::size_of::<f64>());
};
