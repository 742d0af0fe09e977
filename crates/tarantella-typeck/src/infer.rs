//! Method type-argument inference from a target delegate type.
//!
//! When a generic method group is converted without explicit type
//! arguments, the instantiation is read off the delegate: each formal
//! parameter that mentions a method type parameter is unified with the
//! delegate parameter at the same position. Nothing is inferred from return
//! types.

use crate::error::InferError;
use crate::index::{MethodId, TypeIndex, TypeKind};
use crate::ty::{ParamOwner, Subst, Ty, TyParam};
use crate::unify::InferCtx;

/// The invoke signature of a delegate type use, with the delegate's own
/// type parameters replaced by the use's arguments.
///
/// `Action<Int32, String>` yields `([Int32, String], Void)`.
pub fn delegate_signature(index: &TypeIndex, delegate: &Ty) -> Result<(Vec<Ty>, Ty), InferError> {
    let not_a_delegate = || InferError::NotADelegate { ty: delegate.clone() };
    let id = index.def_of(delegate).ok_or_else(not_a_delegate)?;
    let (_, args) = delegate.head().ok_or_else(not_a_delegate)?;
    match &index.type_def(id).kind {
        TypeKind::Delegate { params, ret } => {
            let subst = index.type_subst(id, args);
            Ok((
                params.iter().map(|p| p.subst(&subst)).collect(),
                ret.subst(&subst),
            ))
        }
        TypeKind::Class => Err(not_a_delegate()),
    }
}

/// The formal parameter types of `method` as seen through a use of its
/// declaring type (`B<String>.F` has `String` where `B<T>.F` has `T`).
pub fn method_param_types(index: &TypeIndex, method: MethodId, declaring_args: &[Ty]) -> Vec<Ty> {
    let def = index.method(method);
    let subst = index.type_subst(def.declaring, declaring_args);
    def.params.iter().map(|p| p.ty.subst(&subst)).collect()
}

/// Infer the type arguments of generic `method` from the delegate type it
/// is converted to.
///
/// Returns one type per method type parameter, in declaration order. A
/// non-generic method yields an empty list.
pub fn infer_method_type_args(
    index: &TypeIndex,
    method: MethodId,
    declaring_args: &[Ty],
    delegate: &Ty,
) -> Result<Vec<Ty>, InferError> {
    let def = index.method(method);
    if def.type_params.is_empty() {
        return Ok(Vec::new());
    }

    let formals = method_param_types(index, method, declaring_args);
    let (delegate_params, _) = delegate_signature(index, delegate)?;
    if formals.len() != delegate_params.len() {
        return Err(InferError::ParameterCountMismatch {
            method: formals.len(),
            delegate: delegate_params.len(),
        });
    }

    let mut ctx = InferCtx::new();
    let mut vars = Vec::with_capacity(def.type_params.len());
    let mut subst = Subst::default();
    for (i, name) in def.type_params.iter().enumerate() {
        let var = ctx.fresh_var();
        subst.insert(
            TyParam {
                owner: ParamOwner::Method,
                index: i as u32,
                name: name.clone(),
            },
            var.clone(),
        );
        vars.push(var);
    }

    for (formal, actual) in formals.iter().zip(delegate_params) {
        if formal.mentions_method_params() {
            ctx.unify(formal.subst(&subst), actual)?;
        }
    }

    let mut resolved = Vec::with_capacity(vars.len());
    for (var, name) in vars.into_iter().zip(&def.type_params) {
        let ty = ctx.resolve(var);
        if contains_var(&ty) {
            return Err(InferError::Unbound {
                type_param: name.clone(),
            });
        }
        resolved.push(ty);
    }

    tracing::trace!(
        method = %index.qualified_member_name(method),
        args = ?resolved.iter().map(|t| t.to_string()).collect::<Vec<_>>(),
        "inferred method type arguments"
    );
    Ok(resolved)
}

fn contains_var(ty: &Ty) -> bool {
    match ty {
        Ty::Var(_) => true,
        Ty::App(con, args) => contains_var(con) || args.iter().any(contains_var),
        Ty::Array(elem) => contains_var(elem),
        Ty::Con(_) | Ty::Param(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MethodSig;

    fn action(index: &TypeIndex, args: Vec<Ty>) -> Ty {
        let id = index.find_generic_type("System.Action", args.len()).unwrap();
        index.instantiate(id, args)
    }

    #[test]
    fn non_generic_method_infers_nothing() {
        let mut index = TypeIndex::with_core_types();
        let c = index.add_class("", "C", &[]);
        let f = index.add_method(c, MethodSig::new("F").param("x", Ty::int32()));
        let delegate = action(&index, vec![Ty::int32()]);
        assert_eq!(infer_method_type_args(&index, f, &[], &delegate), Ok(vec![]));
    }

    #[test]
    fn infers_from_matching_position() {
        let mut index = TypeIndex::with_core_types();
        let c = index.add_class("", "C", &[]);
        let f = index.add_method(
            c,
            MethodSig::new("F")
                .type_params(&["T"])
                .param("x", Ty::method_param(0, "T"))
                .param("y", Ty::int32()),
        );
        let delegate = action(&index, vec![Ty::string(), Ty::int32()]);
        assert_eq!(
            infer_method_type_args(&index, f, &[], &delegate),
            Ok(vec![Ty::string()])
        );
    }

    #[test]
    fn infers_through_arrays() {
        let mut index = TypeIndex::with_core_types();
        let c = index.add_class("", "C", &[]);
        let f = index.add_method(
            c,
            MethodSig::new("F")
                .type_params(&["T"])
                .params_array("xs", Ty::array(Ty::method_param(0, "T"))),
        );
        let delegate = action(&index, vec![Ty::array(Ty::int32())]);
        assert_eq!(
            infer_method_type_args(&index, f, &[], &delegate),
            Ok(vec![Ty::int32()])
        );
    }

    #[test]
    fn repeated_parameter_must_bind_consistently() {
        let mut index = TypeIndex::with_core_types();
        let c = index.add_class("", "C", &[]);
        let f = index.add_method(
            c,
            MethodSig::new("F")
                .type_params(&["T"])
                .param("a", Ty::method_param(0, "T"))
                .param("b", Ty::method_param(0, "T")),
        );
        let delegate = action(&index, vec![Ty::int32(), Ty::string()]);
        assert!(matches!(
            infer_method_type_args(&index, f, &[], &delegate),
            Err(InferError::Mismatch { .. })
        ));
    }

    #[test]
    fn declaring_type_arguments_are_substituted_first() {
        let mut index = TypeIndex::with_core_types();
        let b = index.add_class("", "B", &["T"]);
        let t = index.type_param_ty(b, 0);
        let f = index.add_method(
            b,
            MethodSig::new("F")
                .type_params(&["U"])
                .param("x", t)
                .param("y", Ty::method_param(0, "U")),
        );
        let delegate = action(&index, vec![Ty::string(), Ty::int32()]);
        assert_eq!(
            infer_method_type_args(&index, f, &[Ty::string()], &delegate),
            Ok(vec![Ty::int32()])
        );
    }

    #[test]
    fn unconstrained_parameter_is_reported() {
        let mut index = TypeIndex::with_core_types();
        let c = index.add_class("", "C", &[]);
        let f = index.add_method(
            c,
            MethodSig::new("F").type_params(&["T"]).param("x", Ty::int32()),
        );
        let delegate = action(&index, vec![Ty::int32()]);
        assert_eq!(
            infer_method_type_args(&index, f, &[], &delegate),
            Err(InferError::Unbound {
                type_param: "T".to_string()
            })
        );
    }

    #[test]
    fn parameter_count_mismatch_is_reported() {
        let mut index = TypeIndex::with_core_types();
        let c = index.add_class("", "C", &[]);
        let f = index.add_method(c, MethodSig::new("F").type_params(&["T"]));
        let delegate = action(&index, vec![Ty::int32()]);
        assert_eq!(
            infer_method_type_args(&index, f, &[], &delegate),
            Err(InferError::ParameterCountMismatch {
                method: 0,
                delegate: 1
            })
        );
    }

    #[test]
    fn delegate_signature_substitutes_arguments() {
        let index = TypeIndex::with_core_types();
        let func = index.find_generic_type("System.Func", 3).unwrap();
        let use_ = index.instantiate(func, vec![Ty::int32(), Ty::string(), Ty::boolean()]);
        let (params, ret) = delegate_signature(&index, &use_).unwrap();
        assert_eq!(params, vec![Ty::int32(), Ty::string()]);
        assert_eq!(ret, Ty::boolean());
    }

    #[test]
    fn classes_are_not_delegates() {
        let index = TypeIndex::with_core_types();
        let err = delegate_signature(&index, &Ty::int32()).unwrap_err();
        assert_eq!(err, InferError::NotADelegate { ty: Ty::int32() });
    }
}
