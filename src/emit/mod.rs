//! The table-building backend dispatch emitters write against.
//!
//! Generation does not emit loadable code; it fills a [`DispatchTable`] with
//! trampolines chosen per member at generation time. [`TableBuilder`] is the
//! emission surface handed to each strategy emitter, and [`EmitContext`]
//! carries the per-generation facts emitters consult: the member-to-slot
//! assignment and whether construction-time interception is suppressed.

mod strategies;

pub(crate) use strategies::emitter_for;

use rustc_hash::FxHashMap;

use proxyforge_core::model::OriginalFn;
use proxyforge_core::runtime::{CompiledMethod, DispatchTable, MethodThunk};
use proxyforge_core::TypeHash;

use crate::collect::CollectedMember;

/// Per-generation facts shared by all emitters.
pub(crate) struct EmitContext {
    slot_of: FxHashMap<TypeHash, usize>,
    intercept_during_construction: bool,
}

impl EmitContext {
    pub(crate) fn new(slot_of: FxHashMap<TypeHash, usize>, intercept_during_construction: bool) -> Self {
        Self {
            slot_of,
            intercept_during_construction,
        }
    }

    /// The callback slot assigned to a member.
    pub(crate) fn slot(&self, hash: TypeHash) -> usize {
        self.slot_of.get(&hash).copied().unwrap_or(0)
    }

    /// Finish an override: apply the construction-time guard prologue when
    /// interception is suppressed during construction, and carry the
    /// member's declaration facts onto the table entry.
    ///
    /// The prologue dispatches to the original implementation while the
    /// instance's constructor has not completed; interception activates only
    /// once the generated constructor marks the instance constructed.
    pub(crate) fn finish_method(&self, member: &CollectedMember, body: MethodThunk) -> CompiledMethod {
        let sig = member.info.sig.clone();
        let slot = self.slot(sig.hash());
        let thunk: MethodThunk = if !self.intercept_during_construction && !member.info.is_abstract()
        {
            let original: Option<OriginalFn> = member.body.clone();
            Box::new(move |instance, args| {
                if !instance.is_constructed() {
                    if let Some(f) = &original {
                        return instance.apply_original(f, args);
                    }
                }
                body(instance, args)
            })
        } else {
            body
        };

        let mut compiled = CompiledMethod::new(sig, slot, thunk);
        if member.force_public {
            compiled = compiled.force_public();
        }
        if member.info.is_abstract() {
            compiled = compiled.abstract_member();
        }
        compiled
    }
}

/// Accumulates the table entries and original-implementation siblings one
/// generation produces.
#[derive(Default)]
pub(crate) struct TableBuilder {
    table: DispatchTable,
    originals: FxHashMap<TypeHash, OriginalFn>,
}

impl TableBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a compiled override.
    pub(crate) fn declare_override(&mut self, method: CompiledMethod) {
        self.table.insert(method);
    }

    /// Record a member's original-implementation sibling.
    pub(crate) fn declare_original(&mut self, hash: TypeHash, original: OriginalFn) {
        self.originals.entry(hash).or_insert(original);
    }

    pub(crate) fn finish(self) -> (DispatchTable, FxHashMap<TypeHash, OriginalFn>) {
        (self.table, self.originals)
    }
}
