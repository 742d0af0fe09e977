//! Receivers of instance method groups and exactly-once evaluation.
//!
//! A bound method group mentions its receiver twice: once to read the
//! member and once as the `this` to bind. An arbitrary receiver expression
//! is compiled a single time; when the compiled value is not a pure
//! reference it is stored in a temporary that both mentions read.

use crate::config::LowerConfig;
use crate::js::{ScriptExpr, ScriptStmt};

/// How the source reached the method group.
#[derive(Debug)]
pub enum Receiver<'a, E> {
    /// A static method, referenced unqualified or through its type.
    Static,
    /// `F` inside an instance member.
    ImplicitThis,
    /// `this.F`
    ExplicitThis,
    /// `base.F`
    Base,
    /// `expr.F` for any other receiver expression.
    Expression(&'a E),
}

/// A receiver expression compiled to script.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTarget {
    /// Statements that must run before the value is read.
    pub prerequisites: Vec<ScriptStmt>,
    pub value: ScriptExpr,
}

impl CompiledTarget {
    pub fn new(value: ScriptExpr) -> Self {
        CompiledTarget {
            prerequisites: Vec::new(),
            value,
        }
    }
}

/// Compiles receiver sub-expressions for the lowering engine.
///
/// Implemented by the general expression compiler that drives lowering.
pub trait TargetEvaluator {
    /// The source expression type.
    type Expr;

    /// Compile `expr` once. Called at most once per conversion.
    fn compile_target(&mut self, expr: &Self::Expr) -> CompiledTarget;

    /// A fresh temporary name, unique within the enclosing function.
    fn allocate_temporary(&mut self) -> String;
}

/// Sequential temporary names: `$tmp1`, `$tmp2`, ...
#[derive(Debug, Clone)]
pub struct Temporaries {
    prefix: String,
    next: u32,
}

impl Temporaries {
    pub fn new(prefix: impl Into<String>) -> Self {
        Temporaries {
            prefix: prefix.into(),
            next: 1,
        }
    }

    pub fn from_config(config: &LowerConfig) -> Self {
        Self::new(config.temporary_prefix.clone())
    }

    pub fn allocate(&mut self) -> String {
        let name = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        name
    }
}

/// What a conversion binds as `this`.
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiverPlan {
    /// Static: nothing is bound.
    None,
    /// The current instance, `this`.
    CurrentInstance,
    /// A compiled receiver, safe to mention any number of times.
    Expression {
        prerequisites: Vec<ScriptStmt>,
        value: ScriptExpr,
    },
}

impl ReceiverPlan {
    /// The expression to mention wherever the receiver is needed.
    pub fn value(&self) -> Option<ScriptExpr> {
        match self {
            ReceiverPlan::None => None,
            ReceiverPlan::CurrentInstance => Some(ScriptExpr::This),
            ReceiverPlan::Expression { value, .. } => Some(value.clone()),
        }
    }

    pub fn into_prerequisites(self) -> Vec<ScriptStmt> {
        match self {
            ReceiverPlan::Expression { prerequisites, .. } => prerequisites,
            ReceiverPlan::None | ReceiverPlan::CurrentInstance => Vec::new(),
        }
    }
}

/// Decide how the receiver is evaluated. `base` binds the current instance.
pub fn plan_receiver<V: TargetEvaluator>(
    receiver: &Receiver<'_, V::Expr>,
    evaluator: &mut V,
) -> ReceiverPlan {
    match receiver {
        Receiver::Static => ReceiverPlan::None,
        Receiver::ImplicitThis | Receiver::ExplicitThis | Receiver::Base => {
            ReceiverPlan::CurrentInstance
        }
        Receiver::Expression(expr) => {
            let CompiledTarget {
                mut prerequisites,
                value,
            } = evaluator.compile_target(expr);
            if value.is_pure_reference() {
                return ReceiverPlan::Expression {
                    prerequisites,
                    value,
                };
            }
            let temp = evaluator.allocate_temporary();
            tracing::trace!(%temp, "receiver stored in temporary");
            prerequisites.push(ScriptStmt::var(temp.clone(), value));
            ReceiverPlan::Expression {
                prerequisites,
                value: ScriptExpr::Identifier(temp),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source receivers are already script expressions here.
    struct Echo {
        temps: Temporaries,
        compiled: usize,
    }

    impl TargetEvaluator for Echo {
        type Expr = ScriptExpr;

        fn compile_target(&mut self, expr: &ScriptExpr) -> CompiledTarget {
            self.compiled += 1;
            CompiledTarget::new(expr.clone())
        }

        fn allocate_temporary(&mut self) -> String {
            self.temps.allocate()
        }
    }

    fn echo() -> Echo {
        Echo {
            temps: Temporaries::from_config(&LowerConfig::default()),
            compiled: 0,
        }
    }

    #[test]
    fn temporaries_count_from_one() {
        let mut temps = Temporaries::new("$tmp");
        assert_eq!(temps.allocate(), "$tmp1");
        assert_eq!(temps.allocate(), "$tmp2");
    }

    #[test]
    fn identifier_receiver_is_reused() {
        let mut ev = echo();
        let x = ScriptExpr::ident("$x");
        let plan = plan_receiver(&Receiver::Expression(&x), &mut ev);
        assert_eq!(plan.value(), Some(ScriptExpr::ident("$x")));
        assert!(plan.into_prerequisites().is_empty());
        assert_eq!(ev.compiled, 1);
    }

    #[test]
    fn call_receiver_goes_through_a_temporary() {
        let mut ev = echo();
        let call = ScriptExpr::invoke(ScriptExpr::member(ScriptExpr::This, "F2"), vec![]);
        let plan = plan_receiver(&Receiver::Expression(&call), &mut ev);
        assert_eq!(plan.value(), Some(ScriptExpr::ident("$tmp1")));
        assert_eq!(
            plan.into_prerequisites(),
            vec![ScriptStmt::var("$tmp1", call)]
        );
        assert_eq!(ev.compiled, 1);
    }

    #[test]
    fn this_and_base_bind_the_current_instance() {
        let mut ev = echo();
        for receiver in [Receiver::ImplicitThis, Receiver::ExplicitThis, Receiver::Base] {
            let plan = plan_receiver(&receiver, &mut ev);
            assert_eq!(plan, ReceiverPlan::CurrentInstance);
        }
        assert_eq!(plan_receiver(&Receiver::Static, &mut ev), ReceiverPlan::None);
        assert_eq!(ev.compiled, 0);
    }
}
