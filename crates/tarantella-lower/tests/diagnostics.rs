//! Rendering tests for lowering diagnostics.
//!
//! Each test provokes a failed conversion through the engine, collects it
//! in a sink and renders it through the ariadne pipeline with colorless
//! output.

use rowan::{TextRange, TextSize};
use tarantella_lower::diagnostics::render_diagnostic;
use tarantella_lower::semantics::MethodSemantics;
use tarantella_lower::{
    CompiledTarget, DiagnosticOptions, Diagnostics, LowerConfig, MethodGroupConversion,
    MethodGroupLowerer, Receiver, SemanticsTable, TargetEvaluator,
};
use tarantella_typeck::ty::Ty;
use tarantella_typeck::{MethodSig, TypeIndex};

// ── Helpers ────────────────────────────────────────────────────────────

/// Colorless options for deterministic output.
fn opts() -> DiagnosticOptions {
    DiagnosticOptions::colorless()
}

/// An evaluator for conversions that never have an expression receiver.
struct NoTargets;

impl TargetEvaluator for NoTargets {
    type Expr = ();

    fn compile_target(&mut self, _: &()) -> CompiledTarget {
        unreachable!("no expression receivers in these tests")
    }

    fn allocate_temporary(&mut self) -> String {
        unreachable!("no expression receivers in these tests")
    }
}

/// Span of the first occurrence of `needle` in `src`.
fn span_of(src: &str, needle: &str) -> TextRange {
    let start = src.find(needle).expect("needle should occur in source");
    TextRange::at(TextSize::from(start as u32), TextSize::from(needle.len() as u32))
}

const UNUSABLE_SRC: &str = "class Class { int UnusableMethod() {} void M() { System.Func<int> f; f = UnusableMethod; } }";
const PARAMS_SRC: &str = "class C1 { void F(int x, int y, params int[] args) {} void M() { System.Action<int, int, int[]> a = F; } }";

/// Convert `UnusableMethod` to `Func<Int32>` and collect the failure.
fn unusable_diagnostics() -> Diagnostics {
    let mut index = TypeIndex::with_core_types();
    let class = index.add_class("", "Class", &[]);
    let m = index.add_method(class, MethodSig::new("UnusableMethod").returns(Ty::int32()));
    let config = LowerConfig::default();
    let table = SemanticsTable::builder(&index, &config)
        .method(m, MethodSemantics::not_usable_from_script())
        .build();
    let func_id = index.find_generic_type("System.Func", 1).unwrap();
    let func = index.instantiate(func_id, vec![Ty::int32()]);

    let lowerer = MethodGroupLowerer::new(&index, &table, &table, &config);
    let request = MethodGroupConversion::new(m, func, Receiver::ImplicitThis, class)
        .at(span_of(UNUSABLE_SRC, "UnusableMethod; }"));
    let mut sink = Diagnostics::new();
    assert!(lowerer.convert_reporting(&request, &mut NoTargets, &mut sink).is_none());
    sink
}

/// Convert the expanding `F` to a non-expanding `Action` and collect the failure.
fn params_diagnostics() -> Diagnostics {
    let mut index = TypeIndex::with_core_types();
    let c1 = index.add_class("", "C1", &[]);
    let f = index.add_method(
        c1,
        MethodSig::new("F")
            .param("x", Ty::int32())
            .param("y", Ty::int32())
            .params_array("args", Ty::array(Ty::int32())),
    );
    let config = LowerConfig::default();
    let table = SemanticsTable::builder(&index, &config)
        .method_rule(|_, _, default| default.with_expanded_params())
        .build();
    let action_id = index.find_generic_type("System.Action", 3).unwrap();
    let action = index.instantiate(
        action_id,
        vec![Ty::int32(), Ty::int32(), Ty::array(Ty::int32())],
    );

    let lowerer = MethodGroupLowerer::new(&index, &table, &table, &config);
    let request = MethodGroupConversion::new(f, action, Receiver::ImplicitThis, c1)
        .at(span_of(PARAMS_SRC, "F; }"));
    let mut sink = Diagnostics::new();
    assert!(lowerer.convert_reporting(&request, &mut NoTargets, &mut sink).is_none());
    sink
}

// ── Rendering ──────────────────────────────────────────────────────────

#[test]
fn not_usable_from_script_renders_code_and_member() {
    let sink = unusable_diagnostics();
    let diag = sink.iter().next().unwrap();
    let output = render_diagnostic(diag, UNUSABLE_SRC, "test.cs", &opts());
    assert!(output.contains("L0001"), "{}", output);
    assert!(output.contains("Class.UnusableMethod"), "{}", output);
    assert!(output.contains("has no script counterpart"), "{}", output);
}

#[test]
fn params_mismatch_renders_code_delegate_and_help() {
    let sink = params_diagnostics();
    let diag = sink.iter().next().unwrap();
    let output = render_diagnostic(diag, PARAMS_SRC, "test.cs", &opts());
    assert!(output.contains("L0002"), "{}", output);
    assert!(output.contains("C1.F"), "{}", output);
    assert!(output.contains("System.Action"), "{}", output);
    assert!(output.contains("param array"), "{}", output);
    assert!(output.contains("wrapping lambda"), "{}", output);
}

#[test]
fn colorless_output_has_no_escape_codes() {
    let sink = unusable_diagnostics();
    for output in sink.render_all(UNUSABLE_SRC, "test.cs", &opts()) {
        assert!(!output.contains('\u{1b}'), "{:?}", output);
    }
}

#[test]
fn json_mode_carries_code_and_span() {
    let sink = params_diagnostics();
    let rendered = sink.render_all(PARAMS_SRC, "test.cs", &DiagnosticOptions::json_mode());
    assert_eq!(rendered.len(), 1);
    let value: serde_json::Value = serde_json::from_str(&rendered[0]).unwrap();
    let span = span_of(PARAMS_SRC, "F; }");
    assert_eq!(value["code"], "L0002");
    assert_eq!(value["file"], "test.cs");
    assert_eq!(value["start"], u32::from(span.start()));
    assert_eq!(value["end"], u32::from(span.end()));
}
