// File: src/lib.rs
//
// Library interface for the P-Logo turtle-graphics language.
// Exposes the compiler pipeline, the machine, and the host/REPL front ends.

pub mod ast;
pub mod builtins;
pub mod config;
pub mod errors;
pub mod host;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod stack;
pub mod vm;

use std::time::Instant;

/// Every failure surfaced by `compile_and_run`
pub type CompileError = errors::LogoError;

/// Lex, parse and execute `source` against `machine`.
///
/// A failure aborts the rest of the run but keeps whatever the executed
/// prefix did to the machine; the machine stays usable for the next run.
pub fn compile_and_run(source: &str, machine: &mut vm::Machine) -> Result<(), CompileError> {
    let start = Instant::now();
    tracing::debug!(bytes = source.len(), "compiling");

    let program = parser::parse_source(source)?;
    tracing::debug!(
        statements = program.statements.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "parsed"
    );

    let result = interpreter::Interpreter::new(machine).run(&program);
    tracing::debug!(elapsed_us = start.elapsed().as_micros() as u64, "compile_and_run finished");
    result
}
