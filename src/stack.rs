// File: src/stack.rs
//
// Stack growth for the recursive parser and interpreter paths.
// Nested blocks and user calls recurse on the native stack; wrapping those
// entry points keeps a deep program from overflowing whatever thread it runs
// on. `MAX_CALL_DEPTH` stays the semantic limit on user recursion.

/// Grow when less than this much stack remains
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated stack segment
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first moving to a fresh stack segment if the current one is
/// nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
