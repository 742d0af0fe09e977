//! The type and method index.
//!
//! Holds every type and method definition the lowering stage can refer to.
//! Definitions are stored in dense vectors and referenced by id; a type's
//! base class is a `Ty` expressed through the deriving type's own type
//! parameters, never a pointer to another definition. This keeps the
//! inheritance hierarchy an explicit acyclic structure that member
//! resolution walks iteratively.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::ty::{ParamOwner, Ty, TyCon, TyParam};

/// A unique identifier for a type definition within an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeDefId(pub u32);

/// A unique identifier for a method definition within an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MethodId(pub u32);

/// How a method participates in virtual dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Virtuality {
    /// Non-virtual (including static methods).
    None,
    /// Introduces a new overridable slot (`virtual`).
    Virtual,
    /// Introduces a new slot without an implementation (`abstract`).
    Abstract,
    /// Replaces the implementation of an inherited slot (`override`).
    Override,
}

impl Virtuality {
    pub fn is_overridable(self) -> bool {
        !matches!(self, Virtuality::None)
    }
}

/// A formal parameter of a method or delegate.
#[derive(Debug, Clone, Serialize)]
pub struct ParamDef {
    pub name: String,
    pub ty: Ty,
    /// Whether this is a trailing `params` array parameter.
    pub is_params_array: bool,
}

impl ParamDef {
    pub fn new(name: impl Into<String>, ty: Ty) -> Self {
        ParamDef {
            name: name.into(),
            ty,
            is_params_array: false,
        }
    }

    pub fn params_array(name: impl Into<String>, ty: Ty) -> Self {
        ParamDef {
            name: name.into(),
            ty,
            is_params_array: true,
        }
    }
}

/// What kind of type a definition describes.
#[derive(Debug, Clone, Serialize)]
pub enum TypeKind {
    Class,
    /// A delegate type with its invoke signature, expressed through the
    /// delegate's own type parameters.
    Delegate { params: Vec<Ty>, ret: Ty },
}

/// A type definition.
#[derive(Debug, Clone, Serialize)]
pub struct TypeDef {
    pub id: TypeDefId,
    pub namespace: String,
    pub name: String,
    pub type_params: Vec<String>,
    /// The base class, in terms of this type's own type parameters.
    pub base: Option<Ty>,
    pub kind: TypeKind,
    /// Methods declared directly on this type, in declaration order.
    pub methods: Vec<MethodId>,
}

impl TypeDef {
    pub fn con(&self) -> TyCon {
        TyCon::new(self.namespace.clone(), self.name.clone())
    }

    pub fn qualified_name(&self) -> String {
        self.con().qualified_name()
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

/// A method definition as produced by overload resolution.
#[derive(Debug, Clone, Serialize)]
pub struct MethodDef {
    pub id: MethodId,
    pub declaring: TypeDefId,
    pub name: String,
    pub type_params: Vec<String>,
    pub params: Vec<ParamDef>,
    pub ret: Ty,
    pub is_static: bool,
    pub virtuality: Virtuality,
}

impl MethodDef {
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    /// Whether the final formal parameter is a `params` array.
    pub fn has_params_array(&self) -> bool {
        self.params.last().is_some_and(|p| p.is_params_array)
    }
}

/// Description of a method to add to the index.
#[derive(Debug, Clone)]
pub struct MethodSig {
    pub name: String,
    pub type_params: Vec<String>,
    pub params: Vec<ParamDef>,
    pub ret: Ty,
    pub is_static: bool,
    pub virtuality: Virtuality,
}

impl MethodSig {
    /// A non-generic, non-virtual instance method returning `void`.
    pub fn new(name: impl Into<String>) -> Self {
        MethodSig {
            name: name.into(),
            type_params: Vec::new(),
            params: Vec::new(),
            ret: Ty::con("System", "Void"),
            is_static: false,
            virtuality: Virtuality::None,
        }
    }

    pub fn type_params(mut self, names: &[&str]) -> Self {
        self.type_params = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn param(mut self, name: &str, ty: Ty) -> Self {
        self.params.push(ParamDef::new(name, ty));
        self
    }

    pub fn params_array(mut self, name: &str, ty: Ty) -> Self {
        self.params.push(ParamDef::params_array(name, ty));
        self
    }

    pub fn returns(mut self, ret: Ty) -> Self {
        self.ret = ret;
        self
    }

    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn virtuality(mut self, virtuality: Virtuality) -> Self {
        self.virtuality = virtuality;
        self
    }
}

/// Errors raised while building an index.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexError {
    /// Setting the base would make a type its own ancestor.
    InheritanceCycle { type_name: String },
    /// The base type does not name a class in this index.
    UnknownBase { type_name: String, base: String },
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::InheritanceCycle { type_name } => {
                write!(f, "inheritance cycle through `{}`", type_name)
            }
            IndexError::UnknownBase { type_name, base } => {
                write!(f, "base type `{}` of `{}` is not a known class", base, type_name)
            }
        }
    }
}

impl std::error::Error for IndexError {}

/// The index of all known types and methods.
///
/// Types and methods are stored in insertion order and identified by
/// [`TypeDefId`] / [`MethodId`]. Qualified-name lookup is provided via an
/// internal hash map.
#[derive(Debug, Default)]
pub struct TypeIndex {
    types: Vec<TypeDef>,
    methods: Vec<MethodDef>,
    by_name: FxHashMap<String, TypeDefId>,
}

impl TypeIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index seeded with the core library types used by method
    /// group conversions: `System.Object`, the primitive types, and the
    /// generic `System.Action` / `System.Func` delegate families.
    pub fn with_core_types() -> Self {
        let mut index = TypeIndex::new();
        for name in ["Object", "Void", "Int32", "String", "Boolean"] {
            index.add_class("System", name, &[]);
        }

        // Action, Action<T1>, ... Action<T1, T2, T3, T4>
        for arity in 0..=4u32 {
            let names: Vec<String> = (1..=arity).map(|i| format!("T{}", i)).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let id = index.reserve_type("System", "Action", &refs);
            let params: Vec<Ty> = (0..arity).map(|i| index.type_param_ty(id, i)).collect();
            index.types[id.0 as usize].kind = TypeKind::Delegate {
                params,
                ret: Ty::con("System", "Void"),
            };
        }

        // Func<TResult>, Func<T1, TResult>, ... Func<T1, T2, T3, T4, TResult>
        for arity in 0..=4u32 {
            let mut names: Vec<String> = (1..=arity).map(|i| format!("T{}", i)).collect();
            names.push("TResult".to_string());
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let id = index.reserve_type("System", "Func", &refs);
            let params: Vec<Ty> = (0..arity).map(|i| index.type_param_ty(id, i)).collect();
            let ret = index.type_param_ty(id, arity);
            index.types[id.0 as usize].kind = TypeKind::Delegate { params, ret };
        }

        index
    }

    /// Lookup key for a type: generic types are keyed with their arity
    /// (`System.Action`2`) so that same-named families can coexist.
    fn key(namespace: &str, name: &str, arity: usize) -> String {
        let qualified = TyCon::new(namespace, name).qualified_name();
        if arity == 0 {
            qualified
        } else {
            format!("{}`{}", qualified, arity)
        }
    }

    fn reserve_type(&mut self, namespace: &str, name: &str, type_params: &[&str]) -> TypeDefId {
        let id = TypeDefId(self.types.len() as u32);
        self.by_name
            .insert(Self::key(namespace, name, type_params.len()), id);
        self.types.push(TypeDef {
            id,
            namespace: namespace.to_string(),
            name: name.to_string(),
            type_params: type_params.iter().map(|p| p.to_string()).collect(),
            base: None,
            kind: TypeKind::Class,
            methods: Vec::new(),
        });
        id
    }

    /// Add a class and return its id. The base defaults to `System.Object`
    /// when the index knows it.
    pub fn add_class(&mut self, namespace: &str, name: &str, type_params: &[&str]) -> TypeDefId {
        let object = self.find_type("System.Object");
        let id = self.reserve_type(namespace, name, type_params);
        if object.is_some() && object != Some(id) {
            self.types[id.0 as usize].base = Some(Ty::object());
        }
        id
    }

    /// Add a delegate type. `signature` receives the new type's id so the
    /// invoke signature can mention its own type parameters.
    pub fn add_delegate(
        &mut self,
        namespace: &str,
        name: &str,
        type_params: &[&str],
        signature: impl FnOnce(&TypeIndex, TypeDefId) -> (Vec<Ty>, Ty),
    ) -> TypeDefId {
        let id = self.reserve_type(namespace, name, type_params);
        let (params, ret) = signature(self, id);
        self.types[id.0 as usize].kind = TypeKind::Delegate { params, ret };
        id
    }

    /// Set the base class of `id`. `base` is expressed through `id`'s own
    /// type parameters (see [`TypeIndex::type_param_ty`]).
    pub fn set_base(&mut self, id: TypeDefId, base: Ty) -> Result<(), IndexError> {
        let base_id = self.def_of(&base).ok_or_else(|| IndexError::UnknownBase {
            type_name: self.type_def(id).qualified_name(),
            base: base.to_string(),
        })?;

        // Walk the prospective base chain; reaching `id` means a cycle.
        let mut cursor = Some(base_id);
        while let Some(current) = cursor {
            if current == id {
                return Err(IndexError::InheritanceCycle {
                    type_name: self.type_def(id).qualified_name(),
                });
            }
            cursor = self
                .type_def(current)
                .base
                .as_ref()
                .and_then(|b| self.def_of(b));
        }

        self.types[id.0 as usize].base = Some(base);
        Ok(())
    }

    /// Add a method to `declaring` and return its id.
    pub fn add_method(&mut self, declaring: TypeDefId, sig: MethodSig) -> MethodId {
        let id = MethodId(self.methods.len() as u32);
        self.methods.push(MethodDef {
            id,
            declaring,
            name: sig.name,
            type_params: sig.type_params,
            params: sig.params,
            ret: sig.ret,
            is_static: sig.is_static,
            virtuality: sig.virtuality,
        });
        self.types[declaring.0 as usize].methods.push(id);
        id
    }

    // ── Lookup ──────────────────────────────────────────────────────────

    pub fn type_def(&self, id: TypeDefId) -> &TypeDef {
        &self.types[id.0 as usize]
    }

    pub fn method(&self, id: MethodId) -> &MethodDef {
        &self.methods[id.0 as usize]
    }

    /// Like [`type_def`](Self::type_def), but `None` for an id this index
    /// never handed out.
    pub fn get_type_def(&self, id: TypeDefId) -> Option<&TypeDef> {
        self.types.get(id.0 as usize)
    }

    /// Like [`method`](Self::method), but `None` for an id this index never
    /// handed out.
    pub fn get_method(&self, id: MethodId) -> Option<&MethodDef> {
        self.methods.get(id.0 as usize)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.iter()
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDef> {
        self.methods.iter()
    }

    /// Find a non-generic type by qualified name (`System.Object`, `C`), or a
    /// generic one by name with arity suffix (`System.Action`1`).
    pub fn find_type(&self, qualified: &str) -> Option<TypeDefId> {
        self.by_name.get(qualified).copied()
    }

    /// Find a generic type by qualified name and arity.
    pub fn find_generic_type(&self, qualified: &str, arity: usize) -> Option<TypeDefId> {
        if arity == 0 {
            self.find_type(qualified)
        } else {
            self.find_type(&format!("{}`{}", qualified, arity))
        }
    }

    /// Methods named `name` declared directly on `ty`.
    pub fn methods_named<'a>(
        &'a self,
        ty: TypeDefId,
        name: &'a str,
    ) -> impl Iterator<Item = &'a MethodDef> + 'a {
        self.type_def(ty)
            .methods
            .iter()
            .map(|m| self.method(*m))
            .filter(move |m| m.name == name)
    }

    /// The definition a named type refers to.
    pub fn def_of(&self, ty: &Ty) -> Option<TypeDefId> {
        let (con, args) = ty.head()?;
        self.find_generic_type(&con.qualified_name(), args.len())
    }

    /// `Namespace.Type` for a definition.
    pub fn qualified_name(&self, id: TypeDefId) -> String {
        self.type_def(id).qualified_name()
    }

    /// `Namespace.Type.Member` for a method, as shown in diagnostics.
    pub fn qualified_member_name(&self, method: MethodId) -> String {
        let m = self.method(method);
        format!("{}.{}", self.qualified_name(m.declaring), m.name)
    }

    /// The `Ty` for the `index`-th type parameter of type `owner`.
    pub fn type_param_ty(&self, owner: TypeDefId, index: u32) -> Ty {
        Ty::Param(TyParam {
            owner: ParamOwner::Type(owner),
            index,
            name: self.type_def(owner).type_params[index as usize].clone(),
        })
    }

    /// The `Ty` for the `index`-th type parameter of a method.
    pub fn method_param_ty(&self, method: MethodId, index: u32) -> Ty {
        Ty::Param(TyParam {
            owner: ParamOwner::Method,
            index,
            name: self.method(method).type_params[index as usize].clone(),
        })
    }

    /// The open form of a type: the definition applied to its own type
    /// parameters (`B<T>` for `class B<T>`).
    pub fn self_ty(&self, id: TypeDefId) -> Ty {
        let def = self.type_def(id);
        let args = (0..def.type_params.len() as u32)
            .map(|i| self.type_param_ty(id, i))
            .collect();
        Ty::app(def.con(), args)
    }

    /// A use of generic definition `id` with `args`.
    pub fn instantiate(&self, id: TypeDefId, args: Vec<Ty>) -> Ty {
        Ty::app(self.type_def(id).con(), args)
    }

    /// The substitution mapping `id`'s type parameters to `args`.
    pub fn type_subst(&self, id: TypeDefId, args: &[Ty]) -> crate::ty::Subst {
        let mut subst = crate::ty::Subst::default();
        for (i, (name, arg)) in self.type_def(id).type_params.iter().zip(args).enumerate() {
            let param = TyParam {
                owner: ParamOwner::Type(id),
                index: i as u32,
                name: name.clone(),
            };
            subst.insert(param, arg.clone());
        }
        subst
    }
}
