//! Integration tests for `base` dispatch target resolution.
//!
//! These exercise:
//! - Overrides directly on the parent and further up the chain
//! - Re-declared virtual slots hiding an older slot
//! - Generic ancestors closed over concrete arguments or the current
//!   type's own type parameters
//! - Generic overridden methods
//! - Deep chains that skip levels and override again

use tarantella_typeck::ty::Ty;
use tarantella_typeck::{MemberResolution, MethodId, MethodSig, TypeDefId, TypeIndex, Virtuality};

// ── Helpers ────────────────────────────────────────────────────────────

/// `F(<first>, Int32)` with the given virtuality.
fn f_with(first: Ty, virtuality: Virtuality) -> MethodSig {
    MethodSig::new("F")
        .param("x", first)
        .param("y", Ty::int32())
        .virtuality(virtuality)
}

/// Add class `name : base` to the index.
fn class(index: &mut TypeIndex, name: &str, type_params: &[&str], base: Option<Ty>) -> TypeDefId {
    let id = index.add_class("", name, type_params);
    if let Some(base) = base {
        index.set_base(id, base).unwrap();
    }
    id
}

fn target_of(index: &TypeIndex, current: TypeDefId, method: MethodId) -> (String, MethodId) {
    let target = index
        .resolve_base_target(current, method)
        .expect("expected a base target");
    (target.ty.to_string(), target.method)
}

// ── Tests ──────────────────────────────────────────────────────────────

#[test]
fn override_of_parent_method_targets_parent() {
    let mut index = TypeIndex::with_core_types();
    let b = class(&mut index, "B", &[], None);
    let d = class(&mut index, "D", &[], Some(Ty::con("", "B")));
    let bf = index.add_method(b, f_with(Ty::int32(), Virtuality::Virtual));
    let df = index.add_method(d, f_with(Ty::int32(), Virtuality::Override));

    assert_eq!(target_of(&index, d, df), ("B".to_string(), bf));
    // The front end may hand over the overridden declaration instead.
    assert_eq!(target_of(&index, d, bf), ("B".to_string(), bf));
}

#[test]
fn method_inherited_from_grandparent_targets_grandparent() {
    let mut index = TypeIndex::with_core_types();
    let b = class(&mut index, "B", &[], None);
    class(&mut index, "D", &[], Some(Ty::con("", "B")));
    let d2 = class(&mut index, "D2", &[], Some(Ty::con("", "D")));
    let bf = index.add_method(b, f_with(Ty::int32(), Virtuality::Virtual));
    let d2f = index.add_method(d2, f_with(Ty::int32(), Virtuality::Override));

    assert_eq!(target_of(&index, d2, d2f), ("B".to_string(), bf));
}

#[test]
fn method_redeclared_in_parent_targets_parent() {
    let mut index = TypeIndex::with_core_types();
    let b = class(&mut index, "B", &[], None);
    let d = class(&mut index, "D", &[], Some(Ty::con("", "B")));
    let d2 = class(&mut index, "D2", &[], Some(Ty::con("", "D")));
    index.add_method(b, f_with(Ty::int32(), Virtuality::Virtual));
    let df = index.add_method(d, f_with(Ty::int32(), Virtuality::Virtual));
    let d2f = index.add_method(d2, f_with(Ty::int32(), Virtuality::Override));

    assert_eq!(target_of(&index, d2, d2f), ("D".to_string(), df));
}

#[test]
fn override_skipping_levels_then_overriding_again() {
    // A declares, B overrides, C inherits, D overrides, E inherits, F overrides.
    let mut index = TypeIndex::with_core_types();
    let a = class(&mut index, "A", &[], None);
    let b = class(&mut index, "B", &[], Some(Ty::con("", "A")));
    class(&mut index, "C", &[], Some(Ty::con("", "B")));
    let d = class(&mut index, "D", &[], Some(Ty::con("", "C")));
    let e = class(&mut index, "E", &[], Some(Ty::con("", "D")));
    let f = class(&mut index, "F", &[], Some(Ty::con("", "E")));
    index.add_method(a, f_with(Ty::int32(), Virtuality::Virtual));
    let bf = index.add_method(b, f_with(Ty::int32(), Virtuality::Override));
    let df = index.add_method(d, f_with(Ty::int32(), Virtuality::Override));
    let ff = index.add_method(f, f_with(Ty::int32(), Virtuality::Override));

    assert_eq!(target_of(&index, f, ff), ("D".to_string(), df));
    assert_eq!(target_of(&index, e, df), ("D".to_string(), df));
    assert_eq!(target_of(&index, d, df), ("B".to_string(), bf));
}

#[test]
fn override_from_closed_generic_class() {
    let mut index = TypeIndex::with_core_types();
    let b = class(&mut index, "B", &["T"], None);
    let t = index.type_param_ty(b, 0);
    let base = index.instantiate(b, vec![Ty::string()]);
    let d = class(&mut index, "D", &[], Some(base));
    let bf = index.add_method(b, f_with(t, Virtuality::Virtual));
    let df = index.add_method(d, f_with(Ty::string(), Virtuality::Override));

    assert_eq!(index.slot_root(df), bf);
    assert_eq!(target_of(&index, d, df), ("B<String>".to_string(), bf));
}

#[test]
fn override_from_generic_class_through_own_type_parameter() {
    let mut index = TypeIndex::with_core_types();
    let b = class(&mut index, "B", &["T"], None);
    let t = index.type_param_ty(b, 0);
    let d = class(&mut index, "D", &["T2"], None);
    let t2 = index.type_param_ty(d, 0);
    let base = index.instantiate(b, vec![t2.clone()]);
    index.set_base(d, base).unwrap();
    let bf = index.add_method(b, f_with(t, Virtuality::Virtual));
    let df = index.add_method(d, f_with(t2.clone(), Virtuality::Override));

    let target = index.resolve_base_target(d, df).unwrap();
    assert_eq!(target.method, bf);
    // Expressed through D's own parameter, not a closed instantiation.
    assert_eq!(target.ty, index.instantiate(b, vec![t2]));
}

#[test]
fn substitution_is_rederived_through_intermediate_generic_levels() {
    // class A<X>; class B<Y> : A<Y[]>; class C<Z> : B<Z>; C sees A as A<Z[]>.
    let mut index = TypeIndex::with_core_types();
    let a = class(&mut index, "A", &["X"], None);
    let b = class(&mut index, "B", &["Y"], None);
    let y = index.type_param_ty(b, 0);
    let b_base = index.instantiate(a, vec![Ty::array(y)]);
    index.set_base(b, b_base).unwrap();
    let c = class(&mut index, "C", &["Z"], None);
    let z = index.type_param_ty(c, 0);
    let c_base = index.instantiate(b, vec![z]);
    index.set_base(c, c_base).unwrap();

    let x = index.type_param_ty(a, 0);
    let af = index.add_method(a, f_with(x, Virtuality::Virtual));
    let cf = index.add_method(
        c,
        f_with(Ty::array(index.type_param_ty(c, 0)), Virtuality::Override),
    );

    assert_eq!(index.slot_root(cf), af);
    assert_eq!(target_of(&index, c, cf), ("A<Z[]>".to_string(), af));
}

#[test]
fn generic_overridden_method() {
    let mut index = TypeIndex::with_core_types();
    let b = class(&mut index, "B", &[], None);
    let d = class(&mut index, "D", &[], Some(Ty::con("", "B")));
    let bf = index.add_method(
        b,
        f_with(Ty::method_param(0, "T"), Virtuality::Virtual).type_params(&["T"]),
    );
    let df = index.add_method(
        d,
        f_with(Ty::method_param(0, "U"), Virtuality::Override).type_params(&["U"]),
    );

    assert_eq!(target_of(&index, d, df), ("B".to_string(), bf));
}

#[test]
fn abstract_slot_is_a_valid_root() {
    let mut index = TypeIndex::with_core_types();
    let b = class(&mut index, "B", &[], None);
    let d = class(&mut index, "D", &[], Some(Ty::con("", "B")));
    let e = class(&mut index, "E", &[], Some(Ty::con("", "D")));
    let bf = index.add_method(b, f_with(Ty::int32(), Virtuality::Abstract));
    let df = index.add_method(d, f_with(Ty::int32(), Virtuality::Override));
    let ef = index.add_method(e, f_with(Ty::int32(), Virtuality::Override));

    assert_eq!(index.slot_root(ef), bf);
    assert_eq!(target_of(&index, e, ef), ("D".to_string(), df));
}

#[test]
fn no_ancestor_supplies_the_member() {
    let mut index = TypeIndex::with_core_types();
    let d = class(&mut index, "D", &[], None);
    let df = index.add_method(d, f_with(Ty::int32(), Virtuality::Virtual));

    assert_eq!(index.resolve_base_target(d, df), None);
}
