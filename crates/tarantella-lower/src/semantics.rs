//! Emission and binding policies.
//!
//! Every method has a [`MethodSemantics`] deciding what it is called in
//! script and how it is invoked; every delegate type has a
//! [`DelegateSemantics`] deciding how a function value stored in it is
//! called. The lowering engine reads policies through the two lookup
//! traits. [`SemanticsTable`] is the stock implementation: tables computed
//! once from the index and read-only afterwards, so one table can be shared
//! by any number of conversions.

use rustc_hash::FxHashMap;
use serde::Serialize;
use tarantella_typeck::index::TypeKind;
use tarantella_typeck::{MethodDef, MethodId, TypeDef, TypeDefId, TypeIndex};

use crate::config::LowerConfig;

/// Whether a method can be referenced from script at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MethodKind {
    Normal,
    NotUsableFromScript,
}

/// How a method is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSemantics {
    pub kind: MethodKind,
    /// The member name in script. Overrides share their slot's name.
    pub name: String,
    pub is_static: bool,
    /// Generic arguments are erased: the method is referenced uninstantiated.
    pub ignore_generic_arguments: bool,
    /// The trailing `params` array is passed as individual arguments.
    pub expand_params: bool,
}

impl MethodSemantics {
    pub fn normal(name: impl Into<String>, is_static: bool) -> Self {
        MethodSemantics {
            kind: MethodKind::Normal,
            name: name.into(),
            is_static,
            ignore_generic_arguments: false,
            expand_params: false,
        }
    }

    pub fn not_usable_from_script() -> Self {
        MethodSemantics {
            kind: MethodKind::NotUsableFromScript,
            name: String::new(),
            is_static: false,
            ignore_generic_arguments: false,
            expand_params: false,
        }
    }

    pub fn with_ignored_generic_arguments(mut self) -> Self {
        self.ignore_generic_arguments = true;
        self
    }

    pub fn with_expanded_params(mut self) -> Self {
        self.expand_params = true;
        self
    }

    pub fn is_usable(&self) -> bool {
        self.kind == MethodKind::Normal
    }
}

/// How values of a delegate type are invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DelegateSemantics {
    /// Callers pass a trailing `params` array as individual arguments.
    pub expand_params: bool,
    /// The script `this` of the call is passed as the first argument.
    pub bind_this_to_first_parameter: bool,
}

impl DelegateSemantics {
    pub fn with_expanded_params(mut self) -> Self {
        self.expand_params = true;
        self
    }

    pub fn with_this_as_first_parameter(mut self) -> Self {
        self.bind_this_to_first_parameter = true;
        self
    }
}

/// Method policy lookup. Must be pure and total.
pub trait MethodSemanticsLookup {
    fn method_semantics(&self, method: MethodId) -> &MethodSemantics;
}

/// Delegate policy lookup. Must be pure and total.
pub trait DelegateSemanticsLookup {
    fn delegate_semantics(&self, delegate: TypeDefId) -> &DelegateSemantics;
}

// ── Table ──────────────────────────────────────────────────────────────

type MethodRule<'a> = Box<dyn Fn(&TypeIndex, &MethodDef, MethodSemantics) -> MethodSemantics + 'a>;
type DelegateRule<'a> = Box<dyn Fn(&TypeDef) -> DelegateSemantics + 'a>;

/// Precomputed policies for every method and delegate in an index.
#[derive(Debug, Clone)]
pub struct SemanticsTable {
    methods: FxHashMap<MethodId, MethodSemantics>,
    delegates: FxHashMap<TypeDefId, DelegateSemantics>,
    /// Answer for ids the index did not contain when the table was built.
    unknown_method: MethodSemantics,
    unknown_delegate: DelegateSemantics,
}

impl SemanticsTable {
    /// Default policies: every method is normal and named by the
    /// configured prefix plus its source name; delegates neither expand
    /// params nor rebind `this`.
    pub fn build(index: &TypeIndex, config: &LowerConfig) -> Self {
        Self::builder(index, config).build()
    }

    pub fn builder<'a>(index: &'a TypeIndex, config: &'a LowerConfig) -> SemanticsTableBuilder<'a> {
        SemanticsTableBuilder {
            index,
            config,
            method_rule: None,
            delegate_rule: None,
            method_overrides: FxHashMap::default(),
            delegate_overrides: FxHashMap::default(),
        }
    }
}

impl MethodSemanticsLookup for SemanticsTable {
    fn method_semantics(&self, method: MethodId) -> &MethodSemantics {
        self.methods.get(&method).unwrap_or(&self.unknown_method)
    }
}

impl DelegateSemanticsLookup for SemanticsTable {
    fn delegate_semantics(&self, delegate: TypeDefId) -> &DelegateSemantics {
        self.delegates.get(&delegate).unwrap_or(&self.unknown_delegate)
    }
}

/// Assembles a [`SemanticsTable`].
///
/// Precedence, highest first: per-id overrides, rules, defaults. A method
/// rule receives the default policy and returns the one to use.
pub struct SemanticsTableBuilder<'a> {
    index: &'a TypeIndex,
    config: &'a LowerConfig,
    method_rule: Option<MethodRule<'a>>,
    delegate_rule: Option<DelegateRule<'a>>,
    method_overrides: FxHashMap<MethodId, MethodSemantics>,
    delegate_overrides: FxHashMap<TypeDefId, DelegateSemantics>,
}

impl<'a> SemanticsTableBuilder<'a> {
    pub fn method_rule(
        mut self,
        rule: impl Fn(&TypeIndex, &MethodDef, MethodSemantics) -> MethodSemantics + 'a,
    ) -> Self {
        self.method_rule = Some(Box::new(rule));
        self
    }

    pub fn delegate_rule(mut self, rule: impl Fn(&TypeDef) -> DelegateSemantics + 'a) -> Self {
        self.delegate_rule = Some(Box::new(rule));
        self
    }

    pub fn method(mut self, id: MethodId, semantics: MethodSemantics) -> Self {
        self.method_overrides.insert(id, semantics);
        self
    }

    pub fn delegate(mut self, id: TypeDefId, semantics: DelegateSemantics) -> Self {
        self.delegate_overrides.insert(id, semantics);
        self
    }

    pub fn build(mut self) -> SemanticsTable {
        let index = self.index;
        let mut methods = FxHashMap::default();
        for m in index.methods() {
            let semantics = match self.method_overrides.remove(&m.id) {
                Some(semantics) => semantics,
                None => {
                    let default = MethodSemantics::normal(
                        format!("{}{}", self.config.default_method_prefix, m.name),
                        m.is_static,
                    );
                    match &self.method_rule {
                        Some(rule) => rule(index, m, default),
                        None => default,
                    }
                }
            };
            methods.insert(m.id, semantics);
        }

        let mut delegates = FxHashMap::default();
        for def in index.types() {
            if !matches!(def.kind, TypeKind::Delegate { .. }) {
                continue;
            }
            let semantics = match self.delegate_overrides.remove(&def.id) {
                Some(semantics) => semantics,
                None => match &self.delegate_rule {
                    Some(rule) => rule(def),
                    None => DelegateSemantics::default(),
                },
            };
            delegates.insert(def.id, semantics);
        }

        tracing::debug!(
            methods = methods.len(),
            delegates = delegates.len(),
            "built semantics table"
        );

        SemanticsTable {
            methods,
            delegates,
            unknown_method: MethodSemantics::not_usable_from_script(),
            unknown_delegate: DelegateSemantics::default(),
        }
    }
}
