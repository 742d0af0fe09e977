//! The script-language output tree.
//!
//! Only the shapes the method-group lowering produces or consumes are
//! modelled here. Runtime helpers (`$Bind`, `$BindBaseCall`, ...) are
//! first-class variants rather than generic invocations so the printer can
//! take their names from the configuration and tests can match on them.

use serde::Serialize;

/// A type name as the script runtime knows it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TypeName {
    pub namespace: String,
    pub name: String,
}

impl TypeName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TypeName {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn qualified(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

/// A type reference in script output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ScriptType {
    /// A non-generic type: `{C}`.
    Named(TypeName),
    /// A generic type applied to arguments at runtime:
    /// `$InstantiateGenericType({B}, {String})`.
    Instantiated { def: TypeName, args: Vec<ScriptType> },
    /// A class type parameter, available as a runtime variable: `$T2`.
    Param(String),
    /// Arrays erase to the runtime array type.
    Array,
}

/// A script expression.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ScriptExpr {
    This,
    Null,
    Identifier(String),
    TypeRef(ScriptType),
    Member {
        target: Box<ScriptExpr>,
        name: String,
    },
    StringLiteral(String),
    Array(Vec<ScriptExpr>),
    Invoke {
        callee: Box<ScriptExpr>,
        args: Vec<ScriptExpr>,
    },
    Assign {
        target: Box<ScriptExpr>,
        value: Box<ScriptExpr>,
    },
    /// `$InstantiateGenericMethod(method, type-args...)`
    InstantiateGenericMethod {
        method: Box<ScriptExpr>,
        type_args: Vec<ScriptType>,
    },
    /// `$Bind(method, receiver)`
    Bind {
        method: Box<ScriptExpr>,
        receiver: Box<ScriptExpr>,
    },
    /// `$BindBaseCall(type, 'name', [type-args], receiver)`
    BindBaseCall {
        ty: ScriptType,
        name: String,
        type_args: Vec<ScriptType>,
        receiver: Box<ScriptExpr>,
    },
    /// `$BindFirstParameterToThis(inner)`
    BindFirstParameterToThis(Box<ScriptExpr>),
}

impl ScriptExpr {
    pub fn ident(name: impl Into<String>) -> ScriptExpr {
        ScriptExpr::Identifier(name.into())
    }

    pub fn member(target: ScriptExpr, name: impl Into<String>) -> ScriptExpr {
        ScriptExpr::Member {
            target: Box::new(target),
            name: name.into(),
        }
    }

    pub fn invoke(callee: ScriptExpr, args: Vec<ScriptExpr>) -> ScriptExpr {
        ScriptExpr::Invoke {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn assign(target: ScriptExpr, value: ScriptExpr) -> ScriptExpr {
        ScriptExpr::Assign {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    /// Whether reading this expression twice is the same as reading it
    /// once: no calls, no member reads, no assignments.
    pub fn is_pure_reference(&self) -> bool {
        matches!(
            self,
            ScriptExpr::This
                | ScriptExpr::Null
                | ScriptExpr::Identifier(_)
                | ScriptExpr::TypeRef(_)
                | ScriptExpr::StringLiteral(_)
        )
    }
}

/// A script statement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ScriptStmt {
    /// `var name;` or `var name = init;`
    Var {
        name: String,
        init: Option<ScriptExpr>,
    },
    /// An expression statement.
    Expr(ScriptExpr),
}

impl ScriptStmt {
    pub fn var(name: impl Into<String>, init: ScriptExpr) -> ScriptStmt {
        ScriptStmt::Var {
            name: name.into(),
            init: Some(init),
        }
    }

    /// `target = value;`
    pub fn assign(target: ScriptExpr, value: ScriptExpr) -> ScriptStmt {
        ScriptStmt::Expr(ScriptExpr::assign(target, value))
    }
}
