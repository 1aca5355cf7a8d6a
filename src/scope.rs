//! Visibility scopes and their mapping onto instruction-level identifiers.
//!
//! A scope names the set of concurrent execution units across which an
//! atomic effect is ordered and visible. A write performed at scope `S` is
//! ordered with respect to other participants at `S` or any broader scope; it
//! carries no guarantee for threads outside `S` unless a fence widens it.
//!
//! Scopes come in two forms: the closed [`Scope`] enum for runtime values and
//! the zero-sized marker types ([`Thread`], [`Block`], [`Cluster`], [`Device`],
//! [`System`]) for generic code, where `S::SCOPE` folds to a constant.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::backend;
use crate::error::ScopeError;
use crate::order::MemoryOrder;

/// A memory visibility scope, narrowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// The calling thread only.
    Thread,
    /// All threads of one thread block (CTA).
    Block,
    /// All blocks of one thread-block cluster.
    Cluster,
    /// All threads of one device.
    Device,
    /// Every device and host thread in the system.
    System,
}

impl Scope {
    /// All scopes, narrowest first.
    pub const ALL: [Scope; 5] = [Scope::Thread, Scope::Block, Scope::Cluster, Scope::Device, Scope::System];

    /// Returns `true` if participants at `other` are covered by `self`.
    #[inline(always)]
    pub const fn includes(self, other: Scope) -> bool {
        scope_id(self) >= scope_id(other)
    }

    /// The canonical lower-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Scope::Thread => "thread",
            Scope::Block => "block",
            Scope::Cluster => "cluster",
            Scope::Device => "device",
            Scope::System => "system",
        }
    }
}

/// Maps a scope to the integer identifier used by the instruction layer.
///
/// Identifiers grow with breadth: `Thread` = 0 up to `System` = 4.
#[inline(always)]
pub const fn scope_id(scope: Scope) -> u32 {
    match scope {
        Scope::Thread => 0,
        Scope::Block => 1,
        Scope::Cluster => 2,
        Scope::Device => 3,
        Scope::System => 4,
    }
}

/// The PTX scope qualifier an operation at `scope` is emitted with.
///
/// PTX has no thread scope; thread-scoped operations use the narrowest
/// hardware scope, `.cta`.
#[inline(always)]
pub const fn ptx_qualifier(scope: Scope) -> &'static str {
    match scope {
        Scope::Thread | Scope::Block => ".cta",
        Scope::Cluster => ".cluster",
        Scope::Device => ".gpu",
        Scope::System => ".sys",
    }
}

impl TryFrom<u32> for Scope {
    type Error = ScopeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Scope::ALL
            .into_iter()
            .find(|scope| scope_id(*scope) == value)
            .ok_or(ScopeError::OutOfRange(value))
    }
}

impl FromStr for Scope {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scope::ALL
            .into_iter()
            .find(|scope| scope.name() == s)
            .ok_or(ScopeError::UnknownName)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A zero-sized marker naming a scope at the type level.
pub trait ScopeTag: Copy + Default + Send + Sync + 'static + sealed::Sealed {
    /// The scope this marker stands for.
    const SCOPE: Scope;
}

mod sealed {
    pub trait Sealed {}
}

macro_rules! scope_tags {
    ($($(#[$doc:meta])* $name:ident => $scope:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
            pub struct $name;

            impl sealed::Sealed for $name {}

            impl ScopeTag for $name {
                const SCOPE: Scope = Scope::$scope;
            }
        )*
    };
}

scope_tags! {
    /// Marker for [`Scope::Thread`].
    Thread => Thread,
    /// Marker for [`Scope::Block`].
    Block => Block,
    /// Marker for [`Scope::Cluster`].
    Cluster => Cluster,
    /// Marker for [`Scope::Device`].
    Device => Device,
    /// Marker for [`Scope::System`].
    System => System,
}

/// What a fence at a given order and scope lowers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FenceKind {
    /// Nothing is emitted.
    None,
    /// Only compiler reordering is restricted; no instruction is emitted.
    Compiler,
    /// A hardware fence at the mapped scope.
    Hardware,
}

/// Decides how a fence is lowered.
///
/// `Relaxed` fences are no-ops. A thread-scoped fence never needs a
/// cross-thread barrier, so it degenerates to a compiler fence.
#[inline(always)]
pub const fn fence_kind(order: MemoryOrder, scope: Scope) -> FenceKind {
    match (order, scope) {
        (MemoryOrder::Relaxed, _) => FenceKind::None,
        (_, Scope::Thread) => FenceKind::Compiler,
        _ => FenceKind::Hardware,
    }
}

/// Issues a memory fence with the given order at the given scope.
#[inline(always)]
pub fn fence(order: MemoryOrder, scope: Scope) {
    match fence_kind(order, scope) {
        FenceKind::None => {}
        FenceKind::Compiler => core::sync::atomic::compiler_fence(order.into()),
        FenceKind::Hardware => backend::fence(order, scope),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_ids_are_total_and_ordered_by_breadth() {
        let ids: Vec<u32> = Scope::ALL.iter().map(|s| scope_id(*s)).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        for pair in Scope::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[1].includes(pair[0]));
            assert!(!pair[0].includes(pair[1]));
        }
    }

    #[test]
    fn markers_fold_to_their_scope() {
        fn scope_of<S: ScopeTag>(_: S) -> Scope {
            S::SCOPE
        }
        assert_eq!(scope_of(Thread), Scope::Thread);
        assert_eq!(scope_of(Block), Scope::Block);
        assert_eq!(scope_of(Cluster), Scope::Cluster);
        assert_eq!(scope_of(Device), Scope::Device);
        assert_eq!(scope_of(System), Scope::System);
    }

    #[test]
    fn ptx_qualifiers() {
        assert_eq!(ptx_qualifier(Scope::Thread), ".cta");
        assert_eq!(ptx_qualifier(Scope::Block), ".cta");
        assert_eq!(ptx_qualifier(Scope::Cluster), ".cluster");
        assert_eq!(ptx_qualifier(Scope::Device), ".gpu");
        assert_eq!(ptx_qualifier(Scope::System), ".sys");
    }

    #[test]
    fn thread_scope_fences_emit_no_hardware_fence() {
        for order in MemoryOrder::ALL {
            assert_ne!(fence_kind(order, Scope::Thread), FenceKind::Hardware);
        }
        assert_eq!(fence_kind(MemoryOrder::Relaxed, Scope::System), FenceKind::None);
        assert_eq!(fence_kind(MemoryOrder::SeqCst, Scope::Block), FenceKind::Hardware);
        assert_eq!(fence_kind(MemoryOrder::AcqRel, Scope::Thread), FenceKind::Compiler);
    }

    #[test]
    fn fences_run_for_every_combination() {
        for order in MemoryOrder::ALL {
            for scope in Scope::ALL {
                fence(order, scope);
            }
        }
    }

    #[test]
    fn decodes_ids_and_names() {
        assert_eq!(Scope::try_from(3), Ok(Scope::Device));
        assert_eq!(Scope::try_from(5), Err(ScopeError::OutOfRange(5)));
        assert_eq!("cluster".parse::<Scope>(), Ok(Scope::Cluster));
        assert_eq!("gpu".parse::<Scope>(), Err(ScopeError::UnknownName));
    }
}
