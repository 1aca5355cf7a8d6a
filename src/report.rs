//! A serializable description of the proxy tables and the active backend.

use core::any::type_name;
use core::mem;

use serde::{Deserialize, Serialize};

use crate::backend::{self, BackendKind};
use crate::dispatch::OpKind;
use crate::order::MemoryOrder;
use crate::proxy::{tag_of_bitwise, tag_of_numeric, AtomicValue, NumericValue, ProxyTag};
use crate::scope::{scope_id, Scope};

/// What one built-in value type supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCapability {
    /// The Rust type name.
    pub name: String,
    /// `size_of` the type in bytes.
    pub size: usize,
    /// The bitwise proxy.
    pub bitwise: ProxyTag,
    /// The numeric proxy, if the type has one.
    pub numeric: Option<ProxyTag>,
    /// Whether and/or/xor are available.
    pub bitwise_ops: bool,
    /// The operations the type can be used with.
    pub ops: Vec<OpKind>,
}

impl TypeCapability {
    fn new<T: AtomicValue>(numeric: Option<ProxyTag>, bitwise_ops: bool) -> Self {
        let ops = OpKind::ALL
            .into_iter()
            .filter(|op| (!op.is_bitwise() || bitwise_ops) && (!op.is_numeric() || numeric.is_some()))
            .collect();
        Self {
            name: type_name::<T>().to_owned(),
            size: mem::size_of::<T>(),
            bitwise: tag_of_bitwise::<T>(),
            numeric,
            bitwise_ops,
            ops,
        }
    }

    fn integer<T: NumericValue>() -> Self {
        Self::new::<T>(Some(tag_of_numeric::<T>()), true)
    }

    fn float<T: NumericValue>() -> Self {
        Self::new::<T>(Some(tag_of_numeric::<T>()), false)
    }

    fn pointer<T: AtomicValue>() -> Self {
        Self::new::<T>(None, false)
    }
}

/// One scope and the identifier it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeMapping {
    /// The scope.
    pub scope: Scope,
    /// Its instruction-level identifier.
    pub id: u32,
}

/// The full capability report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityReport {
    /// Crate version that produced the report.
    pub version: String,
    /// The backend this build dispatches to.
    pub backend: BackendKind,
    /// Every accepted memory order.
    pub orders: Vec<MemoryOrder>,
    /// Every scope and its identifier.
    pub scopes: Vec<ScopeMapping>,
    /// Per-type capabilities.
    pub types: Vec<TypeCapability>,
}

impl CapabilityReport {
    /// Looks up a type by its Rust name.
    pub fn get(&self, name: &str) -> Option<&TypeCapability> {
        self.types.iter().find(|t| t.name == name)
    }
}

/// Builds the report for the built-in value types.
pub fn capabilities() -> CapabilityReport {
    CapabilityReport {
        version: env!("CARGO_PKG_VERSION").to_owned(),
        backend: backend::ACTIVE,
        orders: MemoryOrder::ALL.to_vec(),
        scopes: Scope::ALL
            .into_iter()
            .map(|scope| ScopeMapping {
                scope,
                id: scope_id(scope),
            })
            .collect(),
        types: vec![
            TypeCapability::integer::<i8>(),
            TypeCapability::integer::<i16>(),
            TypeCapability::integer::<i32>(),
            TypeCapability::integer::<i64>(),
            TypeCapability::integer::<isize>(),
            TypeCapability::integer::<u8>(),
            TypeCapability::integer::<u16>(),
            TypeCapability::integer::<u32>(),
            TypeCapability::integer::<u64>(),
            TypeCapability::integer::<usize>(),
            TypeCapability::float::<f32>(),
            TypeCapability::float::<f64>(),
            TypeCapability::pointer::<*mut u8>(),
            TypeCapability::pointer::<*const u8>(),
        ],
    }
}
