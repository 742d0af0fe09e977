//! Method group to delegate conversion.
//!
//! Given a method chosen by overload resolution, the way the source reached
//! it, and the delegate type it is stored into, produce the script
//! expression that yields an equivalent function value at runtime.
//!
//! The conversion runs in a fixed order:
//!
//! 1. usability gate (method policy)
//! 2. params-expansion gate (method policy against delegate policy)
//! 3. method type arguments: explicit, inferred from the delegate, or none
//! 4. one of four shapes: static reference, generic static instantiation,
//!    receiver bind, `base` bind
//! 5. first-parameter rebinding (delegate policy)
//!
//! Both gates run before the receiver is compiled, so a failed conversion
//! never leaves behind half-built output or a declared temporary.

use rowan::TextRange;
use tarantella_typeck::infer::infer_method_type_args;
use tarantella_typeck::ty::Ty;
use tarantella_typeck::{MemberResolution, MethodDef, MethodId, TypeDefId, TypeIndex};

use crate::config::LowerConfig;
use crate::diagnostics::Diagnostics;
use crate::error::LowerError;
use crate::js::{ScriptExpr, ScriptStmt, ScriptType, TypeName};
use crate::receiver::{plan_receiver, Receiver, TargetEvaluator};
use crate::semantics::{DelegateSemanticsLookup, MethodSemantics, MethodSemanticsLookup};

// ── Request / Result ───────────────────────────────────────────────────

/// One method group conversion, as handed over by the expression compiler.
#[derive(Debug)]
pub struct MethodGroupConversion<'a, E> {
    pub method: MethodId,
    /// Arguments of the declaring type when reached through a closed use
    /// (`x.F` with `x: X<Int32>`). Empty means "as seen from the current type".
    pub declaring_type_args: Vec<Ty>,
    /// Use-site method type arguments (`F<int>`). Empty means infer.
    pub explicit_type_args: Vec<Ty>,
    /// The delegate type the method group is converted to.
    pub delegate: Ty,
    pub receiver: Receiver<'a, E>,
    /// The type whose member contains the conversion.
    pub current_type: TypeDefId,
    pub span: TextRange,
}

impl<'a, E> MethodGroupConversion<'a, E> {
    pub fn new(method: MethodId, delegate: Ty, receiver: Receiver<'a, E>, current_type: TypeDefId) -> Self {
        MethodGroupConversion {
            method,
            declaring_type_args: Vec::new(),
            explicit_type_args: Vec::new(),
            delegate,
            receiver,
            current_type,
            span: TextRange::default(),
        }
    }

    pub fn with_type_args(mut self, args: Vec<Ty>) -> Self {
        self.explicit_type_args = args;
        self
    }

    pub fn with_declaring_type_args(mut self, args: Vec<Ty>) -> Self {
        self.declaring_type_args = args;
        self
    }

    pub fn at(mut self, span: TextRange) -> Self {
        self.span = span;
        self
    }
}

/// A successful conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Lowered {
    /// Temporary declarations to emit before the containing statement.
    pub prerequisites: Vec<ScriptStmt>,
    pub expr: ScriptExpr,
}

impl Lowered {
    pub fn new(expr: ScriptExpr) -> Self {
        Lowered {
            prerequisites: Vec::new(),
            expr,
        }
    }

    /// Stands in for a conversion that was reported as an error.
    pub fn placeholder() -> Self {
        Lowered::new(ScriptExpr::Null)
    }

    fn map(self, f: impl FnOnce(ScriptExpr) -> ScriptExpr) -> Self {
        Lowered {
            prerequisites: self.prerequisites,
            expr: f(self.expr),
        }
    }

    /// The prerequisites followed by the statement `wrap` builds around the
    /// expression, e.g. an assignment or a `var` declaration.
    pub fn into_statements(self, wrap: impl FnOnce(ScriptExpr) -> ScriptStmt) -> Vec<ScriptStmt> {
        let mut stmts = self.prerequisites;
        stmts.push(wrap(self.expr));
        stmts
    }
}

// ── Engine ─────────────────────────────────────────────────────────────

/// Converts method groups against a fixed index and policy set.
///
/// Holds only shared references, so independent conversions may run
/// concurrently over one lowerer.
pub struct MethodGroupLowerer<'a, M, D> {
    index: &'a TypeIndex,
    methods: &'a M,
    delegates: &'a D,
    config: &'a LowerConfig,
}

impl<'a, M, D> MethodGroupLowerer<'a, M, D>
where
    M: MethodSemanticsLookup,
    D: DelegateSemanticsLookup,
{
    pub fn new(index: &'a TypeIndex, methods: &'a M, delegates: &'a D, config: &'a LowerConfig) -> Self {
        MethodGroupLowerer {
            index,
            methods,
            delegates,
            config,
        }
    }

    pub fn config(&self) -> &LowerConfig {
        self.config
    }

    /// Convert a method group, or explain why it cannot be converted.
    #[tracing::instrument(skip_all, fields(method = request.method.0, current = request.current_type.0))]
    pub fn convert<V: TargetEvaluator>(
        &self,
        request: &MethodGroupConversion<'_, V::Expr>,
        evaluator: &mut V,
    ) -> Result<Lowered, LowerError> {
        let index = self.index;
        let method = index.get_method(request.method).ok_or_else(|| {
            internal(request.span, format!("method #{} is not in the type index", request.method.0))
        })?;
        if index.get_type_def(request.current_type).is_none() {
            return Err(internal(
                request.span,
                format!("type #{} is not in the type index", request.current_type.0),
            ));
        }
        let semantics = self.methods.method_semantics(request.method);

        if !semantics.is_usable() {
            return Err(LowerError::NotUsableFromScript {
                member: index.qualified_member_name(request.method),
                span: request.span,
            });
        }

        let delegate_id = index.def_of(&request.delegate).ok_or_else(|| {
            internal(request.span, format!("`{}` is not a known type", request.delegate))
        })?;
        let delegate = self.delegates.delegate_semantics(delegate_id);
        if semantics.expand_params && !delegate.expand_params {
            return Err(LowerError::IncompatibleParamsExpansion {
                member: index.qualified_member_name(request.method),
                delegate: index.qualified_name(delegate_id),
                span: request.span,
            });
        }

        let declaring = self.declaring_use(request, method)?;
        let type_args = self.method_type_args(request, method, semantics, &declaring)?;

        let lowered = if semantics.is_static {
            self.lower_static(semantics, &declaring, type_args, request.span)?
        } else if let Receiver::Base = request.receiver {
            self.lower_base(request, semantics, type_args)?
        } else {
            self.lower_bound(request, semantics, type_args, evaluator)?
        };

        if delegate.bind_this_to_first_parameter {
            tracing::debug!("rebinding first parameter to this");
            Ok(lowered.map(|expr| ScriptExpr::BindFirstParameterToThis(Box::new(expr))))
        } else {
            Ok(lowered)
        }
    }

    /// Like [`convert`](Self::convert), but failures go to `sink` and the
    /// caller continues with [`Lowered::placeholder`] or its own stand-in.
    pub fn convert_reporting<V: TargetEvaluator>(
        &self,
        request: &MethodGroupConversion<'_, V::Expr>,
        evaluator: &mut V,
        sink: &mut Diagnostics,
    ) -> Option<Lowered> {
        match self.convert(request, evaluator) {
            Ok(lowered) => Some(lowered),
            Err(err) => {
                sink.report(err);
                None
            }
        }
    }

    /// The declaring type as used by this conversion, in terms the current
    /// type can express (`B<T2>` from inside `class D<T2> : B<T2>`).
    fn declaring_use<E>(
        &self,
        request: &MethodGroupConversion<'_, E>,
        method: &MethodDef,
    ) -> Result<Ty, LowerError> {
        if !request.declaring_type_args.is_empty() {
            let expected = self.index.type_def(method.declaring).type_params.len();
            if request.declaring_type_args.len() != expected {
                return Err(internal(
                    request.span,
                    format!(
                        "`{}` takes {} type arguments but {} were given",
                        self.index.qualified_name(method.declaring),
                        expected,
                        request.declaring_type_args.len()
                    ),
                ));
            }
            return Ok(self
                .index
                .instantiate(method.declaring, request.declaring_type_args.clone()));
        }
        Ok(self
            .index
            .ancestor_use(request.current_type, method.declaring)
            .unwrap_or_else(|| self.index.self_ty(method.declaring)))
    }

    fn method_type_args<E>(
        &self,
        request: &MethodGroupConversion<'_, E>,
        method: &MethodDef,
        semantics: &MethodSemantics,
        declaring: &Ty,
    ) -> Result<Vec<ScriptType>, LowerError> {
        if !method.is_generic() || semantics.ignore_generic_arguments {
            return Ok(Vec::new());
        }

        let args = if request.explicit_type_args.is_empty() {
            let declaring_args = declaring.head().map(|(_, a)| a.to_vec()).unwrap_or_default();
            infer_method_type_args(self.index, request.method, &declaring_args, &request.delegate)
                .map_err(|e| internal(request.span, e.to_string()))?
        } else if request.explicit_type_args.len() != method.type_params.len() {
            return Err(internal(
                request.span,
                format!(
                    "`{}` takes {} type arguments but {} were given",
                    self.index.qualified_member_name(request.method),
                    method.type_params.len(),
                    request.explicit_type_args.len()
                ),
            ));
        } else {
            request.explicit_type_args.clone()
        };

        args.iter().map(|ty| script_type(ty, request.span)).collect()
    }

    fn lower_static(
        &self,
        semantics: &MethodSemantics,
        declaring: &Ty,
        type_args: Vec<ScriptType>,
        span: TextRange,
    ) -> Result<Lowered, LowerError> {
        let owner = ScriptExpr::TypeRef(script_type(declaring, span)?);
        let member = ScriptExpr::member(owner, semantics.name.clone());
        tracing::debug!(branch = "static", generic = !type_args.is_empty(), "lowered method group");
        Ok(Lowered::new(instantiate_method(member, type_args)))
    }

    fn lower_base<E>(
        &self,
        request: &MethodGroupConversion<'_, E>,
        semantics: &MethodSemantics,
        type_args: Vec<ScriptType>,
    ) -> Result<Lowered, LowerError> {
        let target = self
            .index
            .resolve_base_target(request.current_type, request.method)
            .ok_or_else(|| {
                internal(
                    request.span,
                    format!(
                        "no ancestor of `{}` supplies `{}`",
                        self.index.qualified_name(request.current_type),
                        self.index.qualified_member_name(request.method)
                    ),
                )
            })?;
        tracing::debug!(branch = "base", ancestor = %target.ty, "lowered method group");
        Ok(Lowered::new(ScriptExpr::BindBaseCall {
            ty: script_type(&target.ty, request.span)?,
            name: semantics.name.clone(),
            type_args,
            receiver: Box::new(ScriptExpr::This),
        }))
    }

    fn lower_bound<V: TargetEvaluator>(
        &self,
        request: &MethodGroupConversion<'_, V::Expr>,
        semantics: &MethodSemantics,
        type_args: Vec<ScriptType>,
        evaluator: &mut V,
    ) -> Result<Lowered, LowerError> {
        if let Receiver::Static = request.receiver {
            return Err(internal(
                request.span,
                format!(
                    "instance method `{}` referenced without a receiver",
                    self.index.qualified_member_name(request.method)
                ),
            ));
        }

        let plan = plan_receiver(&request.receiver, evaluator);
        let receiver = plan.value().unwrap_or(ScriptExpr::This);
        let prerequisites = plan.into_prerequisites();
        let member = ScriptExpr::member(receiver.clone(), semantics.name.clone());
        tracing::debug!(
            branch = "bind",
            prerequisites = prerequisites.len(),
            "lowered method group"
        );
        Ok(Lowered {
            prerequisites,
            expr: ScriptExpr::Bind {
                method: Box::new(instantiate_method(member, type_args)),
                receiver: Box::new(receiver),
            },
        })
    }
}

// ── Helpers ────────────────────────────────────────────────────────────

fn internal(span: TextRange, message: impl Into<String>) -> LowerError {
    LowerError::Internal {
        message: message.into(),
        span,
    }
}

fn instantiate_method(member: ScriptExpr, type_args: Vec<ScriptType>) -> ScriptExpr {
    if type_args.is_empty() {
        member
    } else {
        ScriptExpr::InstantiateGenericMethod {
            method: Box::new(member),
            type_args,
        }
    }
}

/// The runtime form of a source type.
fn script_type(ty: &Ty, span: TextRange) -> Result<ScriptType, LowerError> {
    match ty {
        Ty::Con(con) => Ok(ScriptType::Named(TypeName::new(
            con.namespace.clone(),
            con.name.clone(),
        ))),
        Ty::App(_, args) => {
            let (con, _) = ty
                .head()
                .ok_or_else(|| internal(span, format!("`{}` has no type constructor", ty)))?;
            let args = args
                .iter()
                .map(|arg| script_type(arg, span))
                .collect::<Result<_, _>>()?;
            Ok(ScriptType::Instantiated {
                def: TypeName::new(con.namespace.clone(), con.name.clone()),
                args,
            })
        }
        Ty::Param(param) => Ok(ScriptType::Param(param.name.clone())),
        Ty::Array(_) => Ok(ScriptType::Array),
        Ty::Var(_) => Err(internal(span, format!("unresolved type `{}`", ty))),
    }
}
