//! Type representation for the source object language.
//!
//! Defines the core `Ty` enum, named type constructors (`TyCon`), type
//! parameters (`TyParam`) and inference variables (`TyVar`). Types are plain
//! values: generic types are an `App` of a constructor to arguments, and
//! type parameters refer back to their owner by id rather than by pointer.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::index::TypeDefId;

/// A type variable, identified by a `u32` index into the unification table.
///
/// Variables only exist while inferring method type arguments. The `ena`
/// crate handles the union-find mechanics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TyVar(pub u32);

/// A named type constructor such as `System.Int32` or `B`.
///
/// Identity is the qualified name; the display form omits the namespace
/// when printing source-style types.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TyCon {
    pub namespace: String,
    pub name: String,
}

impl TyCon {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TyCon {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// `Namespace.Name`, or just `Name` for types in the root namespace.
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

impl fmt::Display for TyCon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Who declares a type parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ParamOwner {
    /// A class or delegate type parameter (`T` in `class B<T>`).
    Type(TypeDefId),
    /// A method type parameter (`U` in `void F<U>(U x)`).
    ///
    /// Method parameters are identified by position only, since a single
    /// signature never mentions the parameters of two different methods.
    Method,
}

/// A reference to a declared type parameter.
///
/// The `name` field is used ONLY for display. It is excluded from
/// `PartialEq` and `Hash` so that `F<T>(T x)` and `F<U>(U x)` have equal
/// parameter types.
#[derive(Clone, Debug, Serialize)]
pub struct TyParam {
    pub owner: ParamOwner,
    pub index: u32,
    pub name: String,
}

impl PartialEq for TyParam {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.index == other.index // name intentionally excluded
    }
}

impl Eq for TyParam {}

impl std::hash::Hash for TyParam {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
        self.index.hash(state);
    }
}

/// A source-language type.
///
/// - `Var`: an inference variable (to be resolved by unification)
/// - `Con`: a non-generic named type (`Int32`, `String`, `C`)
/// - `App`: a generic type applied to arguments (`B<String>`, `Action<Int32>`)
/// - `Param`: a type parameter of a class or method
/// - `Array`: a single-dimensional array (`Int32[]`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Ty {
    Var(TyVar),
    Con(TyCon),
    App(Box<Ty>, Vec<Ty>),
    Param(TyParam),
    Array(Box<Ty>),
}

/// A type-parameter substitution.
pub type Subst = FxHashMap<TyParam, Ty>;

impl Ty {
    pub fn con(namespace: &str, name: &str) -> Ty {
        Ty::Con(TyCon::new(namespace, name))
    }

    /// Apply a constructor to arguments. An empty argument list yields the
    /// bare constructor so that non-generic types have a single form.
    pub fn app(con: TyCon, args: Vec<Ty>) -> Ty {
        if args.is_empty() {
            Ty::Con(con)
        } else {
            Ty::App(Box::new(Ty::Con(con)), args)
        }
    }

    /// The `index`-th type parameter of the method being described.
    pub fn method_param(index: u32, name: &str) -> Ty {
        Ty::Param(TyParam {
            owner: ParamOwner::Method,
            index,
            name: name.to_string(),
        })
    }

    pub fn array(elem: Ty) -> Ty {
        Ty::Array(Box::new(elem))
    }

    pub fn int32() -> Ty {
        Ty::con("System", "Int32")
    }

    pub fn string() -> Ty {
        Ty::con("System", "String")
    }

    pub fn boolean() -> Ty {
        Ty::con("System", "Boolean")
    }

    pub fn object() -> Ty {
        Ty::con("System", "Object")
    }

    /// The constructor of a named type, with its arguments.
    pub fn head(&self) -> Option<(&TyCon, &[Ty])> {
        match self {
            Ty::Con(con) => Some((con, &[])),
            Ty::App(con, args) => match con.as_ref() {
                Ty::Con(con) => Some((con, args.as_slice())),
                _ => None,
            },
            _ => None,
        }
    }

    /// Replace every type parameter that has an entry in `subst`.
    pub fn subst(&self, subst: &Subst) -> Ty {
        match self {
            Ty::Param(p) => subst.get(p).cloned().unwrap_or_else(|| self.clone()),
            Ty::App(con, args) => Ty::App(
                Box::new(con.subst(subst)),
                args.iter().map(|a| a.subst(subst)).collect(),
            ),
            Ty::Array(elem) => Ty::Array(Box::new(elem.subst(subst))),
            Ty::Var(_) | Ty::Con(_) => self.clone(),
        }
    }

    /// Whether any method type parameter occurs in this type.
    pub fn mentions_method_params(&self) -> bool {
        match self {
            Ty::Param(p) => p.owner == ParamOwner::Method,
            Ty::App(con, args) => {
                con.mentions_method_params() || args.iter().any(Ty::mentions_method_params)
            }
            Ty::Array(elem) => elem.mentions_method_params(),
            Ty::Var(_) | Ty::Con(_) => false,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Var(v) => write!(f, "?{}", v.0),
            Ty::Con(c) => write!(f, "{}", c),
            Ty::App(con, args) => {
                write!(f, "{}<", con)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ">")
            }
            Ty::Param(p) => write!(f, "{}", p.name),
            Ty::Array(elem) => write!(f, "{}[]", elem),
        }
    }
}

// ── ena trait implementations ──────────────────────────────────────────

impl ena::unify::UnifyKey for TyVar {
    type Value = Option<Ty>;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        TyVar(u)
    }

    fn tag() -> &'static str {
        "TyVar"
    }
}

impl ena::unify::EqUnifyValue for Ty {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_params_compare_by_position() {
        assert_eq!(Ty::method_param(0, "T"), Ty::method_param(0, "U"));
        assert_ne!(Ty::method_param(0, "T"), Ty::method_param(1, "T"));
    }

    #[test]
    fn display_uses_source_syntax() {
        let b = TyCon::new("", "B");
        let ty = Ty::app(b, vec![Ty::string(), Ty::array(Ty::int32())]);
        assert_eq!(ty.to_string(), "B<String, Int32[]>");
        assert_eq!(Ty::method_param(0, "T").to_string(), "T");
    }

    #[test]
    fn app_without_args_is_a_bare_constructor() {
        let ty = Ty::app(TyCon::new("", "C"), vec![]);
        assert_eq!(ty, Ty::con("", "C"));
    }

    #[test]
    fn subst_replaces_nested_params() {
        let t = TyParam {
            owner: ParamOwner::Method,
            index: 0,
            name: "T".to_string(),
        };
        let mut subst = Subst::default();
        subst.insert(t.clone(), Ty::int32());
        let list = Ty::app(TyCon::new("", "List"), vec![Ty::array(Ty::Param(t))]);
        assert_eq!(list.subst(&subst).to_string(), "List<Int32[]>");
    }

    #[test]
    fn qualified_name_skips_root_namespace() {
        assert_eq!(TyCon::new("System", "Action").qualified_name(), "System.Action");
        assert_eq!(TyCon::new("", "C1").qualified_name(), "C1");
    }
}
