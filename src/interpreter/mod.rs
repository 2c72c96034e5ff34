// File: src/interpreter/mod.rs
//
// Tree-walking interpreter for P-Logo.
// Executes a parsed Program against a Machine by traversing the AST.
//
// Evaluation is single-step: `evaluate` returns an expression's value directly,
// and every statement returns the value of the last call it executed so that
// a user function used inside an expression yields something meaningful.
//
// Scoping is flat. A user function call pushes one frame holding its
// parameters; the body sees only that frame. Top-level code runs in the root
// frame, which is where slider variables live.

mod environment;
mod native_functions;
mod value;

pub use environment::{Environment, Frame};
pub use value::Value;

use crate::ast::{BinaryOpKind, Builtin, Call, CallTarget, Expr, Program, Stmt};
use crate::errors::{find_closest_match, ErrorKind, LogoError, SourceLocation};
use crate::stack::ensure_sufficient_stack;
use crate::vm::Machine;
use std::time::Instant;

/// Nested user calls allowed before a run is aborted with RecursionLimit
pub const MAX_CALL_DEPTH: usize = 256;

/// Largest loop count; above 2^53 an f64 no longer holds every integer
pub const MAX_LOOP_COUNT: f64 = 9_007_199_254_740_992.0;

pub struct Interpreter<'m> {
    machine: &'m mut Machine,
    call_stack: Vec<String>, // active user functions, innermost last
}

impl<'m> Interpreter<'m> {
    pub fn new(machine: &'m mut Machine) -> Self {
        Interpreter { machine, call_stack: Vec::new() }
    }

    /// Execute every top-level statement in order, stopping at the first error.
    /// Whatever the executed prefix did to the machine is kept.
    pub fn run(&mut self, program: &Program) -> Result<(), LogoError> {
        let start = Instant::now();
        let result = self.exec_block(&program.statements);
        tracing::debug!(
            statements = program.statements.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            ok = result.is_ok(),
            "program executed"
        );
        result.map(|_| ())
    }

    pub fn call_stack(&self) -> &[String] {
        &self.call_stack
    }

    fn exec_block(&mut self, stmts: &[Stmt]) -> Result<Value, LogoError> {
        let mut last = Value::Undefined;
        for stmt in stmts {
            last = self.exec_stmt(stmt)?;
        }
        Ok(last)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Value, LogoError> {
        ensure_sufficient_stack(|| self.exec_stmt_inner(stmt))
    }

    fn exec_stmt_inner(&mut self, stmt: &Stmt) -> Result<Value, LogoError> {
        match stmt {
            Stmt::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.machine.env.define(name.clone(), value);
                Ok(Value::Undefined)
            }

            Stmt::Loop { count, body, location } => {
                let count = match self.evaluate(count)? {
                    Value::Number(n) => n,
                    other => {
                        return Err(LogoError::type_error(
                            format!("loop count must be a number, got {}", other.kind_name()),
                            *location,
                        ))
                    }
                };
                if count > MAX_LOOP_COUNT {
                    return Err(LogoError::type_error(
                        format!("loop count {} is too large", count),
                        *location,
                    )
                    .with_help(format!("Loop counts are limited to {}", MAX_LOOP_COUNT)));
                }
                // NaN.max(0.0) is 0.0, so a NaN count runs zero times
                let times = count.max(0.0).floor() as u64;

                let counter = self.machine.env.enter_loop();
                let result = self.exec_loop(&counter, times, body);
                self.machine.env.exit_loop();
                result
            }

            Stmt::If { condition, then_branch, else_branch, location } => {
                match self.evaluate(condition)? {
                    Value::Boolean(true) => self.exec_block(then_branch),
                    Value::Boolean(false) => self.exec_block(else_branch),
                    other => Err(LogoError::type_error(
                        format!("if condition must be a boolean, got {}", other.kind_name()),
                        *location,
                    )),
                }
            }

            Stmt::FuncDef(def) => {
                self.machine.define_function(def.clone());
                Ok(Value::Undefined)
            }

            Stmt::Call(call) => self.eval_call(call),
        }
    }

    fn exec_loop(&mut self, counter: &str, times: u64, body: &[Stmt]) -> Result<Value, LogoError> {
        let mut last = Value::Undefined;
        for i in 0..times {
            self.machine.env.define(counter.to_string(), Value::Number(i as f64));
            last = self.exec_block(body)?;
        }
        Ok(last)
    }

    /// Evaluate an expression to its value in the current frame
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, LogoError> {
        ensure_sufficient_stack(|| self.evaluate_inner(expr))
    }

    fn evaluate_inner(&mut self, expr: &Expr) -> Result<Value, LogoError> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::String(s) => Ok(Value::Str(s.clone())),

            Expr::Name { name, location } => match self.machine.env.get(name) {
                Some(value) => Ok(value),
                None => {
                    let mut err = LogoError::undefined_variable(name, *location);
                    if let Some(close) = find_closest_match(name, self.machine.env.visible_names()) {
                        err = err.with_suggestion(close);
                    }
                    Err(err)
                }
            },

            Expr::BinaryOp { op, left, right, location } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                let result = match op {
                    BinaryOpKind::Add => left.add(&right),
                    BinaryOpKind::Sub => left.sub(&right),
                    BinaryOpKind::Mul => left.mul(&right),
                    BinaryOpKind::Div => left.div(&right),
                    BinaryOpKind::Mod => left.rem(&right),
                    BinaryOpKind::Lt => left.lt(&right),
                    BinaryOpKind::Lte => left.lte(&right),
                    // a > b is b < a
                    BinaryOpKind::Gt => right.lt(&left),
                    BinaryOpKind::Gte => right.lte(&left),
                    BinaryOpKind::Eq => left.eq(&right),
                };
                result.map_err(|e| e.or_at(*location))
            }

            Expr::Call(call) => self.eval_call(call),
        }
    }

    fn eval_call(&mut self, call: &Call) -> Result<Value, LogoError> {
        match &call.target {
            CallTarget::Builtin(builtin) => {
                let args = self.evaluate_args(&call.args)?;
                native_functions::call_native_function(&mut *self.machine, *builtin, &args, call.location)
            }
            CallTarget::User(name) => self.call_user_function(name, &call.args, call.location),
        }
    }

    fn evaluate_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, LogoError> {
        args.iter().map(|arg| self.evaluate(arg)).collect()
    }

    fn call_user_function(
        &mut self,
        name: &str,
        args: &[Expr],
        location: SourceLocation,
    ) -> Result<Value, LogoError> {
        let def = match self.machine.function(name) {
            Some(def) => def,
            None => return Err(self.unknown_function(name, location)),
        };
        if args.len() != def.params.len() {
            return Err(LogoError::arity(name, def.params.len(), args.len(), location));
        }

        // Arguments are evaluated in the caller's frame
        let values = self.evaluate_args(args)?;

        if self.call_stack.len() >= MAX_CALL_DEPTH {
            return Err(LogoError::new(
                ErrorKind::RecursionLimit,
                format!("'{}' exceeded {} nested calls", name, MAX_CALL_DEPTH),
                location,
            )
            .with_help("Guard recursive calls with an if that eventually stops recursing")
            .with_call_stack(self.call_stack.clone()));
        }

        let frame = Frame::with_bindings(def.params.iter().cloned().zip(values));
        self.machine.env.push_frame(frame);
        self.call_stack.push(def.name.clone());

        let result = self
            .exec_block(&def.body)
            .map_err(|e| e.with_call_stack(self.call_stack.clone()));

        self.call_stack.pop();
        self.machine.env.pop_frame();
        result
    }

    fn unknown_function(&self, name: &str, location: SourceLocation) -> LogoError {
        let user_names = self.machine.function_names();
        let mut candidates: Vec<&str> = Builtin::ALL.iter().map(|b| b.name()).collect();
        candidates.extend(user_names.iter().map(String::as_str));

        let mut err = LogoError::undefined_function(name, location);
        if let Some(close) = find_closest_match(name, candidates) {
            err = err.with_suggestion(close);
        }
        err
    }
}
