//! Override slots and `base` dispatch target resolution.
//!
//! The script runtime has no virtual-call syntax: an ordinary `this.F`
//! member access already reaches the most-derived implementation because an
//! override shares its slot's emitted name. A `base.F` reference instead has
//! to name the ancestor whose implementation is in effect one level above
//! the current type. This module finds that ancestor.
//!
//! All walks are iterative over the index's base references. Each step
//! carries the substitution that expresses the ancestor through the
//! *current* type's own type parameters, so `class D<T2> : B<T2>` sees its
//! parent as `B<T2>` rather than as some closed instantiation.

use crate::index::{MethodId, TypeDefId, TypeIndex, Virtuality};
use crate::ty::{Subst, Ty};

/// The ancestor implementation a `base`-qualified reference binds to.
#[derive(Clone, Debug, PartialEq)]
pub struct BaseTarget {
    /// The ancestor type, in terms of the current type's type parameters.
    pub ty: Ty,
    /// The declaration or override supplying the implementation.
    pub method: MethodId,
}

/// Lookups the lowering stage needs from the member index.
///
/// Implementations must be pure: the same input yields the same answer for
/// the whole compilation.
pub trait MemberResolution {
    /// The method that introduced the override slot `method` belongs to.
    fn slot_root(&self, method: MethodId) -> MethodId;

    /// The ancestor a `base.M` reference from within `current` dispatches
    /// to, or `None` when no ancestor supplies the member.
    fn resolve_base_target(&self, current: TypeDefId, method: MethodId) -> Option<BaseTarget>;
}

/// Iterator over the strict ancestors of a type, nearest first.
///
/// Yields each ancestor's definition together with its use expressed in
/// the starting type's type parameters.
pub struct Ancestors<'a> {
    index: &'a TypeIndex,
    current: Option<Ty>,
}

impl Iterator for Ancestors<'_> {
    type Item = (TypeDefId, Ty);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        let id = self.index.def_of(&current)?;
        let (_, args) = current.head()?;
        let base = self.index.type_def(id).base.as_ref()?;
        let next = base.subst(&self.index.type_subst(id, args));
        let next_id = self.index.def_of(&next)?;
        self.current = Some(next.clone());
        Some((next_id, next))
    }
}

impl TypeIndex {
    /// Walk the ancestors of `ty`, starting at its immediate base.
    pub fn ancestors(&self, ty: TypeDefId) -> Ancestors<'_> {
        Ancestors {
            index: self,
            current: Some(self.self_ty(ty)),
        }
    }

    /// `ancestor` as seen from `current` (`B<T2>` from `class D<T2> : B<T2>`).
    /// A type is its own ancestor here, seen as its open form.
    pub fn ancestor_use(&self, current: TypeDefId, ancestor: TypeDefId) -> Option<Ty> {
        if current == ancestor {
            return Some(self.self_ty(current));
        }
        self.ancestors(current)
            .find(|(id, _)| *id == ancestor)
            .map(|(_, ty)| ty)
    }

    /// Whether two methods have the same name, generic arity and parameter
    /// types once each side's declaring-type parameters are substituted.
    fn signatures_match(&self, a: MethodId, a_subst: &Subst, b: MethodId, b_subst: &Subst) -> bool {
        let (ma, mb) = (self.method(a), self.method(b));
        ma.name == mb.name
            && ma.type_params.len() == mb.type_params.len()
            && ma.params.len() == mb.params.len()
            && ma
                .params
                .iter()
                .zip(&mb.params)
                .all(|(pa, pb)| pa.ty.subst(a_subst) == pb.ty.subst(b_subst))
    }

    /// The nearest ancestor declaration that `method` overrides, if any.
    fn overridden(&self, method: MethodId) -> Option<MethodId> {
        let m = self.method(method);
        let own = Subst::default();
        for (ancestor, ty) in self.ancestors(m.declaring) {
            let (_, args) = ty.head()?;
            let subst = self.type_subst(ancestor, args);
            let found = self.methods_named(ancestor, &m.name).find(|cand| {
                !cand.is_static
                    && cand.virtuality.is_overridable()
                    && self.signatures_match(method, &own, cand.id, &subst)
            });
            if let Some(cand) = found {
                return Some(cand.id);
            }
        }
        None
    }
}

impl MemberResolution for TypeIndex {
    fn slot_root(&self, method: MethodId) -> MethodId {
        let mut current = method;
        while self.method(current).virtuality == Virtuality::Override {
            match self.overridden(current) {
                Some(next) => current = next,
                // An override with nothing to override; treat it as the root.
                None => break,
            }
        }
        current
    }

    fn resolve_base_target(&self, current: TypeDefId, method: MethodId) -> Option<BaseTarget> {
        let m = self.method(method);

        if !m.virtuality.is_overridable() {
            // No slot to consult: the declaring type supplies the body.
            let ty = self.ancestor_use(current, m.declaring)?;
            return Some(BaseTarget { ty, method });
        }

        let root = self.slot_root(method);
        for (ancestor, ty) in self.ancestors(current) {
            let supplier = self.methods_named(ancestor, &m.name).find(|cand| {
                !cand.is_static
                    && cand.virtuality.is_overridable()
                    && self.slot_root(cand.id) == root
            });
            if let Some(cand) = supplier {
                tracing::debug!(
                    current = %self.qualified_name(current),
                    member = %m.name,
                    ancestor = %ty,
                    "resolved base dispatch target"
                );
                return Some(BaseTarget {
                    ty,
                    method: cand.id,
                });
            }
        }
        None
    }
}
