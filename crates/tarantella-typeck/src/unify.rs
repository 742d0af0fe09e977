//! Unification engine for method type-argument inference.
//!
//! Implements structural unification over `Ty` using `ena`'s union-find
//! table. Only the first-order matching needed to bind method type
//! parameters against delegate parameter types is supported: no variance,
//! no subtyping, one consistent binding per variable.

use ena::unify::InPlaceUnificationTable;

use crate::error::InferError;
use crate::ty::{Ty, TyVar};

/// The inference context -- owns the unification table.
pub struct InferCtx {
    table: InPlaceUnificationTable<TyVar>,
}

impl Default for InferCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl InferCtx {
    /// Create a new, empty inference context.
    pub fn new() -> Self {
        InferCtx {
            table: InPlaceUnificationTable::new(),
        }
    }

    /// Create a fresh, unbound type variable.
    pub fn fresh_var(&mut self) -> Ty {
        Ty::Var(self.table.new_key(None))
    }

    // ── Resolution ──────────────────────────────────────────────────────

    /// Resolve a type by following union-find indirection.
    ///
    /// Bound variables are replaced by their values, recursively; unbound
    /// variables are normalized to the root of their equivalence class.
    pub fn resolve(&mut self, ty: Ty) -> Ty {
        match ty {
            Ty::Var(v) => match self.table.probe_value(v) {
                Some(inner) => self.resolve(inner),
                None => Ty::Var(self.table.find(v)),
            },
            Ty::App(con, args) => {
                let con = Box::new(self.resolve(*con));
                let args = args.into_iter().map(|a| self.resolve(a)).collect();
                Ty::App(con, args)
            }
            Ty::Array(elem) => Ty::Array(Box::new(self.resolve(*elem))),
            other => other,
        }
    }

    // ── Occurs Check ────────────────────────────────────────────────────

    /// Check if a type variable occurs anywhere within a type.
    pub fn occurs_in(&mut self, var: TyVar, ty: &Ty) -> bool {
        match ty {
            Ty::Var(v) => {
                if self.table.find(*v) == self.table.find(var) {
                    return true;
                }
                match self.table.probe_value(*v) {
                    Some(inner) => self.occurs_in(var, &inner),
                    None => false,
                }
            }
            Ty::App(con, args) => {
                self.occurs_in(var, con) || args.iter().any(|a| self.occurs_in(var, a))
            }
            Ty::Array(elem) => self.occurs_in(var, elem),
            Ty::Con(_) | Ty::Param(_) => false,
        }
    }

    // ── Unification ─────────────────────────────────────────────────────

    /// Unify two types, making them equal.
    ///
    /// Both types are resolved through the table first, then compared
    /// structurally. Type parameters only unify with themselves: they are
    /// rigid, since they belong to the enclosing class or method.
    pub fn unify(&mut self, a: Ty, b: Ty) -> Result<(), InferError> {
        let a = self.resolve(a);
        let b = self.resolve(b);

        match (a, b) {
            (Ty::Var(v1), Ty::Var(v2)) if v1 == v2 => Ok(()),

            (Ty::Var(v1), Ty::Var(v2)) => {
                self.table
                    .unify_var_var(v1, v2)
                    .map_err(|(expected, found)| InferError::Mismatch { expected, found })
            }

            (Ty::Var(v), ty) | (ty, Ty::Var(v)) => {
                if self.occurs_in(v, &ty) {
                    Err(InferError::InfiniteType { var: v, ty })
                } else {
                    self.table
                        .unify_var_value(v, Some(ty.clone()))
                        .map_err(|_| InferError::Mismatch {
                            expected: Ty::Var(v),
                            found: ty,
                        })
                }
            }

            (Ty::Con(c1), Ty::Con(c2)) if c1 == c2 => Ok(()),

            (Ty::Param(p1), Ty::Param(p2)) if p1 == p2 => Ok(()),

            (Ty::App(c1, a1), Ty::App(c2, a2)) => {
                self.unify(*c1, *c2)?;
                if a1.len() != a2.len() {
                    return Err(InferError::ArityMismatch {
                        expected: a1.len(),
                        found: a2.len(),
                    });
                }
                for (a, b) in a1.into_iter().zip(a2) {
                    self.unify(a, b)?;
                }
                Ok(())
            }

            (Ty::Array(e1), Ty::Array(e2)) => self.unify(*e1, *e2),

            (expected, found) => Err(InferError::Mismatch { expected, found }),
        }
    }
}
