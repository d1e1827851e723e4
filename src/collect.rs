//! Member collection over the base chain and interface hierarchies.
//!
//! Walk order matters and matches subclass semantics: the base type first,
//! then its ancestor chain, then each interface and its parent interfaces.
//! Filters are applied in a fixed order: statics are dropped, then members
//! not visible from a subclass-generation context, then duplicate
//! signatures (the first occurrence across the walk wins), then final
//! members; final members cannot be overridden, so they are silently
//! excluded rather than raising an error.

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use proxyforge_core::model::{ClassModel, InterfaceModel, OriginalFn};
use proxyforge_core::runtime::factory_capability_hash;
use proxyforge_core::{MemberInfo, MemberModifiers, MemberSig, TypeHash, Visibility};

/// A member that survived collection, ready for classification.
pub(crate) struct CollectedMember {
    pub(crate) info: MemberInfo,
    /// Original-implementation trampoline, if one exists on the base chain.
    pub(crate) body: Option<OriginalFn>,
    /// Whether the override must be declared public because the member is
    /// declared by an interface.
    pub(crate) force_public: bool,
}

/// Collect the members a generated subclass would override.
///
/// `package` is the package the generated type is considered to live in,
/// which decides whether package-visible members are reachable.
pub(crate) fn collect_members(
    superclass: Option<&Arc<ClassModel>>,
    interfaces: &[Arc<InterfaceModel>],
    package: &str,
) -> Vec<CollectedMember> {
    let mut seen: FxHashSet<TypeHash> = FxHashSet::default();
    let mut members = Vec::new();

    // Base chain first; the first occurrence of a signature wins.
    let mut current = superclass;
    while let Some(model) = current {
        for method in model.methods() {
            if method.modifiers.contains(MemberModifiers::STATIC) {
                continue;
            }
            let same_package = model.package() == package;
            if !method.visibility.visible_to_subclass(same_package) {
                continue;
            }
            let hash = method.sig.hash();
            if !seen.insert(hash) {
                continue;
            }
            if method.modifiers.contains(MemberModifiers::FINAL) {
                continue;
            }
            members.push(CollectedMember {
                info: MemberInfo {
                    sig: method.sig.clone(),
                    visibility: method.visibility,
                    modifiers: method.modifiers,
                    declared_by: model.type_hash(),
                },
                body: method.body.clone(),
                force_public: false,
            });
        }
        current = model.parent();
    }

    // Interfaces and their parents. Interface members are abstract and
    // public; overrides for members that only exist here are forced public.
    let interface_sigs = interface_signatures(interfaces);
    for (sig, declared_by) in &interface_sigs {
        let hash = sig.hash();
        if !seen.insert(hash) {
            continue;
        }
        members.push(CollectedMember {
            info: MemberInfo {
                sig: sig.clone(),
                visibility: Visibility::Public,
                modifiers: MemberModifiers::ABSTRACT,
                declared_by: *declared_by,
            },
            body: None,
            force_public: true,
        });
    }

    // A base-declared member that an interface also declares still gets a
    // forced-public override.
    let interface_hashes: FxHashSet<TypeHash> =
        interface_sigs.iter().map(|(sig, _)| sig.hash()).collect();
    for member in &mut members {
        if interface_hashes.contains(&member.info.sig.hash()) {
            member.force_public = true;
        }
    }

    members
}

fn interface_signatures(interfaces: &[Arc<InterfaceModel>]) -> Vec<(MemberSig, TypeHash)> {
    let mut out = Vec::new();
    let mut visited: FxHashSet<TypeHash> = FxHashSet::default();
    let mut queue: VecDeque<&Arc<InterfaceModel>> = interfaces.iter().collect();
    while let Some(iface) = queue.pop_front() {
        if iface.type_hash() == factory_capability_hash() {
            continue;
        }
        if !visited.insert(iface.type_hash()) {
            continue;
        }
        for sig in iface.methods() {
            out.push((sig.clone(), iface.type_hash()));
        }
        queue.extend(iface.parents().iter());
    }
    out
}

/// List the members a generated class over this configuration would
/// override, post-filtering, in collection order.
///
/// Useful for building callback tables up front: the returned members are
/// exactly those the filter will be consulted for, in the same order.
pub fn collect_methods(
    superclass: Option<&Arc<ClassModel>>,
    interfaces: &[Arc<InterfaceModel>],
) -> Vec<MemberInfo> {
    let package = superclass.map(|m| m.package()).unwrap_or("");
    collect_members(superclass, interfaces, package)
        .into_iter()
        .map(|m| m.info)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxyforge_core::model::MethodModel;
    use proxyforge_core::{Value, ValueKind};

    fn sig(name: &str) -> MemberSig {
        MemberSig::new(name, vec![], ValueKind::Int)
    }

    fn concrete(name: &str) -> MethodModel {
        MethodModel::new(sig(name), |_, _| Ok(Value::Int(0)))
    }

    #[test]
    fn statics_finals_and_privates_are_dropped() {
        let base = Arc::new(
            ClassModel::new("t.Base", "t", || Box::new(()))
                .with_method(concrete("keep"))
                .with_method(concrete("skip_static").with_modifiers(MemberModifiers::STATIC))
                .with_method(concrete("skip_final").with_modifiers(MemberModifiers::FINAL))
                .with_method(concrete("skip_private").with_visibility(Visibility::Private)),
        );
        let names: Vec<String> = collect_methods(Some(&base), &[])
            .into_iter()
            .map(|m| m.sig.name().to_string())
            .collect();
        assert_eq!(names, vec!["keep"]);
    }

    #[test]
    fn first_occurrence_wins_across_ancestors() {
        let parent = Arc::new(
            ClassModel::new("t.Parent", "t", || Box::new(()))
                .with_method(concrete("get"))
                .with_method(concrete("only_parent")),
        );
        let base = Arc::new(
            ClassModel::new("t.Base", "t", || Box::new(()))
                .with_parent(Arc::clone(&parent))
                .with_method(concrete("get")),
        );
        let members = collect_methods(Some(&base), &[]);
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].sig.name(), "get");
        assert_eq!(members[0].declared_by, base.type_hash());
        assert_eq!(members[1].sig.name(), "only_parent");
    }

    #[test]
    fn package_visibility_requires_same_package() {
        let foreign = Arc::new(
            ClassModel::new("other.Base", "other", || Box::new(()))
                .with_method(concrete("hidden").with_visibility(Visibility::Package)),
        );
        // The generated type lives in the superclass's package, so its own
        // package members stay visible; a foreign parent's do not.
        let base = Arc::new(
            ClassModel::new("t.Base", "t", || Box::new(()))
                .with_parent(foreign)
                .with_method(concrete("visible").with_visibility(Visibility::Package)),
        );
        let names: Vec<String> = collect_methods(Some(&base), &[])
            .into_iter()
            .map(|m| m.sig.name().to_string())
            .collect();
        assert_eq!(names, vec!["visible"]);
    }

    #[test]
    fn interface_only_members_are_forced_public_and_abstract() {
        let cap = Arc::new(InterfaceModel::new("t.Cap").with_method(sig("render")));
        let base = Arc::new(ClassModel::new("t.Base", "t", || Box::new(())));
        let members = collect_members(Some(&base), &[cap], "t");
        assert_eq!(members.len(), 1);
        assert!(members[0].force_public);
        assert!(members[0].info.is_abstract());
        assert!(members[0].body.is_none());
    }

    #[test]
    fn base_implementation_satisfies_interface_member() {
        let cap = Arc::new(InterfaceModel::new("t.Cap").with_method(sig("render")));
        let base =
            Arc::new(ClassModel::new("t.Base", "t", || Box::new(())).with_method(concrete("render")));
        let members = collect_members(Some(&base), &[cap], "t");
        assert_eq!(members.len(), 1);
        // Base body wins, but the override is still forced public.
        assert!(members[0].body.is_some());
        assert!(members[0].force_public);
    }

    #[test]
    fn factory_capability_interface_is_skipped() {
        let factory_like = Arc::new(InterfaceModel::new("proxyforge.Factory").with_method(sig("x")));
        let members = collect_members(None, &[factory_like], "");
        assert!(members.is_empty());
    }

    #[test]
    fn parent_interfaces_are_walked() {
        let grandparent = Arc::new(InterfaceModel::new("t.A").with_method(sig("a")));
        let parent = Arc::new(
            InterfaceModel::new("t.B")
                .with_parent(grandparent)
                .with_method(sig("b")),
        );
        let members = collect_members(None, &[parent], "");
        let names: Vec<&str> = members.iter().map(|m| m.info.sig.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
