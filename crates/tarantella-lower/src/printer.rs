//! Text rendering of script trees.
//!
//! Output is deterministic: the same tree and configuration always print
//! the same bytes. Statements print one per line, each indented by tabs and
//! terminated by `;\n`.

use std::fmt::Write;

use crate::config::LowerConfig;
use crate::js::{ScriptExpr, ScriptStmt, ScriptType};

/// Render a single expression.
pub fn print_expr(expr: &ScriptExpr, config: &LowerConfig) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr, config);
    out
}

/// Render a type reference.
pub fn print_type(ty: &ScriptType, config: &LowerConfig) -> String {
    let mut out = String::new();
    write_type(&mut out, ty, config);
    out
}

/// Render statements at the given indentation depth.
pub fn print_statements(stmts: &[ScriptStmt], indent: usize, config: &LowerConfig) -> String {
    let mut out = String::new();
    for stmt in stmts {
        for _ in 0..indent {
            out.push('\t');
        }
        match stmt {
            ScriptStmt::Var { name, init: None } => {
                let _ = write!(out, "var {}", name);
            }
            ScriptStmt::Var {
                name,
                init: Some(init),
            } => {
                let _ = write!(out, "var {} = ", name);
                write_expr(&mut out, init, config);
            }
            ScriptStmt::Expr(expr) => write_expr(&mut out, expr, config),
        }
        out.push_str(";\n");
    }
    out
}

fn write_list<T>(out: &mut String, items: &[T], mut each: impl FnMut(&mut String, &T)) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        each(out, item);
    }
}

fn write_type(out: &mut String, ty: &ScriptType, config: &LowerConfig) {
    let type_name = |name: &crate::js::TypeName| {
        if config.qualify_type_names {
            format!("{{{}}}", name.qualified())
        } else {
            format!("{{{}}}", name.name)
        }
    };
    match ty {
        ScriptType::Named(name) => out.push_str(&type_name(name)),
        ScriptType::Instantiated { def, args } => {
            let _ = write!(
                out,
                "{}({}",
                config.runtime.instantiate_generic_type,
                type_name(def)
            );
            for arg in args {
                out.push_str(", ");
                write_type(out, arg, config);
            }
            out.push(')');
        }
        ScriptType::Param(name) => {
            let _ = write!(out, "{}{}", config.type_parameter_prefix, name);
        }
        ScriptType::Array => out.push_str("{Array}"),
    }
}

fn write_expr(out: &mut String, expr: &ScriptExpr, config: &LowerConfig) {
    let runtime = &config.runtime;
    match expr {
        ScriptExpr::This => out.push_str("this"),
        ScriptExpr::Null => out.push_str("null"),
        ScriptExpr::Identifier(name) => out.push_str(name),
        ScriptExpr::TypeRef(ty) => write_type(out, ty, config),
        ScriptExpr::Member { target, name } => {
            write_expr(out, target, config);
            out.push('.');
            out.push_str(name);
        }
        ScriptExpr::StringLiteral(value) => {
            out.push('\'');
            for c in value.chars() {
                match c {
                    '\'' => out.push_str("\\'"),
                    '\\' => out.push_str("\\\\"),
                    '\n' => out.push_str("\\n"),
                    c => out.push(c),
                }
            }
            out.push('\'');
        }
        ScriptExpr::Array(items) => {
            out.push('[');
            write_list(out, items, |out, item| write_expr(out, item, config));
            out.push(']');
        }
        ScriptExpr::Invoke { callee, args } => {
            write_expr(out, callee, config);
            out.push('(');
            write_list(out, args, |out, arg| write_expr(out, arg, config));
            out.push(')');
        }
        ScriptExpr::Assign { target, value } => {
            write_expr(out, target, config);
            out.push_str(" = ");
            write_expr(out, value, config);
        }
        ScriptExpr::InstantiateGenericMethod { method, type_args } => {
            let _ = write!(out, "{}(", runtime.instantiate_generic_method);
            write_expr(out, method, config);
            for arg in type_args {
                out.push_str(", ");
                write_type(out, arg, config);
            }
            out.push(')');
        }
        ScriptExpr::Bind { method, receiver } => {
            let _ = write!(out, "{}(", runtime.bind);
            write_expr(out, method, config);
            out.push_str(", ");
            write_expr(out, receiver, config);
            out.push(')');
        }
        ScriptExpr::BindBaseCall {
            ty,
            name,
            type_args,
            receiver,
        } => {
            let _ = write!(out, "{}(", runtime.bind_base_call);
            write_type(out, ty, config);
            out.push_str(", ");
            write_expr(out, &ScriptExpr::StringLiteral(name.clone()), config);
            out.push_str(", [");
            write_list(out, type_args, |out, arg| write_type(out, arg, config));
            out.push_str("], ");
            write_expr(out, receiver, config);
            out.push(')');
        }
        ScriptExpr::BindFirstParameterToThis(inner) => {
            let _ = write!(out, "{}(", runtime.bind_first_parameter_to_this);
            write_expr(out, inner, config);
            out.push(')');
        }
    }
}
