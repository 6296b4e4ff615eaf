//! Rhai bindings for building expressions
//!
//! There are two main ways to use these bindings.
//!
//! The simplest option is to call [`eval`], which evaluates a single
//! expression in terms of the given variable names:
//!
//! ```
//! use enclose::{eval::eval_eq, var::Domain};
//!
//! let tree = enclose::rhai::eval("x * x - 2 * x + y", &["x", "y"])?;
//! let d = Domain::from([("x", (1.0, 2.0)), ("y", (1.0, 2.0))]);
//! assert_eq!(eval_eq(&tree, &d)?, [-2.0, 4.0].into());
//! # Ok::<(), enclose::Error>(())
//! ```
//!
//! To evaluate a full script, construct an [`Engine`] then call
//! [`Engine::run`].  Within the script, `var(name, lo, hi)` declares a
//! variable and its interval, and `bound(expr)` records an expression to be
//! bounded:
//!
//! ```
//! use enclose::{bound::BoundConfig, rhai::Engine};
//!
//! let mut engine = Engine::new();
//! let out = engine.run(
//!     "
//!     let x = var(\"x\", 0, 1);
//!     bound(x - x);
//!     ",
//! )?;
//! assert_eq!(out.exprs.len(), 1);
//! let r = BoundConfig::default().bound(&out.exprs[0], &out.domain)?;
//! assert!(r.contains(0.0) && r.width() < 0.01);
//! # Ok::<(), enclose::Error>(())
//! ```
use std::sync::{Arc, Mutex};

use crate::{Error, context::Tree, types::Interval, var::Domain};
use rhai::{Dynamic, EvalAltResult, NativeCallContext};

/// Engine for evaluating a Rhai script with expression bindings
pub struct Engine {
    engine: rhai::Engine,
    context: Arc<Mutex<ScriptContext>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Constructs a script evaluation engine
    ///
    /// Arithmetic operators, `**`, and the usual elementary functions are
    /// overloaded to build [`Tree`] handles; numbers mixed with trees become
    /// constants.
    pub fn new() -> Self {
        let mut engine = rhai::Engine::new();
        engine.register_type_with_name::<Tree>("Tree");
        engine.register_fn("var", var);
        engine.register_fn("var", var_bounded);
        engine.register_fn("bound", bound);

        macro_rules! register_binary_fns {
            ($op:literal, $name:ident, $engine:ident) => {
                $engine.register_fn($op, $name::node_dyn);
                $engine.register_fn($op, $name::dyn_node);
            };
        }
        macro_rules! register_unary_fns {
            ($op:literal, $name:ident, $engine:ident) => {
                $engine.register_fn($op, $name::node);
            };
        }

        register_binary_fns!("+", add, engine);
        register_binary_fns!("-", sub, engine);
        register_binary_fns!("*", mul, engine);
        register_binary_fns!("/", div, engine);
        register_binary_fns!("**", pow, engine);
        register_binary_fns!("pow", pow, engine);
        register_binary_fns!("min", min, engine);
        register_binary_fns!("max", max, engine);
        register_unary_fns!("abs", abs, engine);
        register_unary_fns!("sqrt", sqrt, engine);
        register_unary_fns!("square", square, engine);
        register_unary_fns!("recip", recip, engine);
        register_unary_fns!("sin", sin, engine);
        register_unary_fns!("cos", cos, engine);
        register_unary_fns!("tan", tan, engine);
        register_unary_fns!("exp", exp, engine);
        register_unary_fns!("ln", ln, engine);
        register_unary_fns!("-", neg, engine);

        engine.set_fast_operators(false);

        let context = Arc::new(Mutex::new(ScriptContext::new()));
        engine.set_default_tag(Dynamic::from(context.clone()));
        engine.set_max_expr_depths(64, 32);

        Self { engine, context }
    }

    /// Executes a full script, returning the declared domain and expressions
    pub fn run(&mut self, script: &str) -> Result<ScriptContext, Error> {
        self.context.lock().unwrap().clear();

        let ast = self.engine.compile(script)?;
        let mut scope = rhai::Scope::new();
        self.engine.run_ast_with_scope(&mut scope, &ast)?;

        let mut lock = self.context.lock().unwrap();
        Ok(std::mem::take(&mut lock))
    }

    /// Evaluates a single expression, with `vars` bound in scope
    pub fn eval(&mut self, script: &str, vars: &[&str]) -> Result<Tree, Error> {
        self.context.lock().unwrap().clear();

        let mut scope = rhai::Scope::new();
        for v in vars {
            scope.push(*v, Tree::var(v));
        }
        let ast = self.engine.compile_expression_with_scope(&scope, script)?;
        let out = self.engine.eval_ast_with_scope::<Tree>(&mut scope, &ast)?;
        Ok(out)
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Output of a script
///
/// Populated by calls to `var(name, lo, hi)` and `bound(expr)`
#[derive(Debug, Default)]
pub struct ScriptContext {
    /// Variables declared with bounds
    pub domain: Domain,
    /// Expressions to be bounded, in call order
    pub exprs: Vec<Tree>,
}

impl ScriptContext {
    /// Builds a new empty script context
    pub fn new() -> Self {
        Self::default()
    }
    /// Resets the script context
    pub fn clear(&mut self) {
        self.domain = Domain::new();
        self.exprs.clear();
    }
}

////////////////////////////////////////////////////////////////////////////////
// Functions injected into the Rhai context

fn script_context(
    ctx: &NativeCallContext,
) -> Result<Arc<Mutex<ScriptContext>>, Box<EvalAltResult>> {
    ctx.tag()
        .map(|t| t.clone_cast::<Arc<Mutex<ScriptContext>>>())
        .ok_or_else(|| "missing script context".into())
}

fn number(v: Dynamic, f: &str) -> Result<f64, Box<EvalAltResult>> {
    if let Some(v) = v.clone().try_cast::<f64>() {
        Ok(v)
    } else if let Some(v) = v.clone().try_cast::<i64>() {
        Ok(v as f64)
    } else {
        Err(format!("invalid type for {f}: {}", v.type_name()).into())
    }
}

fn tree(v: Dynamic, f: &str) -> Result<Tree, Box<EvalAltResult>> {
    match v.clone().try_cast::<Tree>() {
        Some(t) => Ok(t),
        None => number(v, f).map(Tree::constant),
    }
}

fn var(_ctx: NativeCallContext, name: &str) -> Tree {
    Tree::var(name)
}

fn var_bounded(
    ctx: NativeCallContext,
    name: &str,
    lo: Dynamic,
    hi: Dynamic,
) -> Result<Tree, Box<EvalAltResult>> {
    let lo = number(lo, "var(name, lo, hi)")?;
    let hi = number(hi, "var(name, lo, hi)")?;
    let i = Interval::try_new(lo, hi).map_err(|e| e.to_string())?;
    script_context(&ctx)?.lock().unwrap().domain.insert(name, i);
    Ok(Tree::var(name))
}

fn bound(ctx: NativeCallContext, t: Dynamic) -> Result<(), Box<EvalAltResult>> {
    let t = tree(t, "bound(expr)")?;
    script_context(&ctx)?.lock().unwrap().exprs.push(t);
    Ok(())
}

macro_rules! define_binary_fns {
    ($name:ident $(, $op:ident)?) => {
        mod $name {
            use super::*;
            $(
            use std::ops::$op;
            )?
            pub fn node_dyn(
                _ctx: NativeCallContext,
                a: Tree,
                b: Dynamic,
            ) -> Result<Tree, Box<EvalAltResult>> {
                let b = tree(b, concat!(stringify!($name), "(Tree, rhs)"))?;
                Ok(a.$name(b))
            }
            pub fn dyn_node(
                _ctx: NativeCallContext,
                a: Dynamic,
                b: Tree,
            ) -> Result<Tree, Box<EvalAltResult>> {
                let a = tree(a, concat!(stringify!($name), "(lhs, Tree)"))?;
                Ok(a.$name(b))
            }
        }
    };
}

macro_rules! define_unary_fns {
    ($name:ident) => {
        mod $name {
            use super::*;
            pub fn node(_ctx: NativeCallContext, a: Tree) -> Tree {
                a.$name()
            }
        }
    };
}

define_binary_fns!(add, Add);
define_binary_fns!(sub, Sub);
define_binary_fns!(mul, Mul);
define_binary_fns!(div, Div);
define_binary_fns!(pow);
define_binary_fns!(min);
define_binary_fns!(max);
define_unary_fns!(abs);
define_unary_fns!(sqrt);
define_unary_fns!(square);
define_unary_fns!(recip);
define_unary_fns!(sin);
define_unary_fns!(cos);
define_unary_fns!(tan);
define_unary_fns!(exp);
define_unary_fns!(ln);
define_unary_fns!(neg);

////////////////////////////////////////////////////////////////////////////////

/// One-shot evaluation of a single expression in terms of `vars`
pub fn eval(s: &str, vars: &[&str]) -> Result<Tree, Error> {
    let mut engine = Engine::new();
    engine.eval(s, vars)
}

////////////////////////////////////////////////////////////////////////////////
