// File: src/interpreter/environment.rs
//
// Frame stack for variable storage in P-Logo.
//
// Unlike a lexically scoped environment, lookups never walk outward: a
// function body sees only its own frame. Frame 0 (the root frame) lives for
// the whole session and holds the variables exposed to slider UIs.

use super::value::Value;
use std::collections::HashMap;

/// One scope: the root frame or a single user function call
#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub variables: HashMap<String, Value>,
    /// Number of loops currently executing in this frame
    loop_depth: usize,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame for a function call with its parameters already bound
    pub fn with_bindings<I>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        Frame { variables: bindings.into_iter().collect(), loop_depth: 0 }
    }
}

/// Ordered stack of frames; index 0 is the root frame
///
/// # Examples
///
/// ```ignore
/// let mut env = Environment::new();
/// env.define("x".to_string(), Value::Number(10.0));   // root frame
///
/// env.push_frame(Frame::new());                       // enter a call
/// assert_eq!(env.get("x"), None);                     // caller's x is invisible
///
/// env.pop_frame();
/// assert_eq!(env.get("x"), Some(Value::Number(10.0)));
/// ```
#[derive(Clone, Debug)]
pub struct Environment {
    frames: Vec<Frame>,
}

impl Environment {
    pub fn new() -> Self {
        Environment { frames: vec![Frame::new()] }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Pop the innermost frame. The root frame is never popped.
    pub fn pop_frame(&mut self) -> Option<Frame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    fn top(&self) -> &Frame {
        &self.frames[self.frames.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Read a variable from the top-of-stack frame only
    pub fn get(&self, name: &str) -> Option<Value> {
        self.top().variables.get(name).cloned()
    }

    /// Names readable from the current frame
    pub fn visible_names(&self) -> impl Iterator<Item = &str> {
        self.top().variables.keys().map(String::as_str)
    }

    /// Write a variable into the top-of-stack frame
    pub fn define(&mut self, name: String, value: Value) {
        self.top_mut().variables.insert(name, value);
    }

    pub fn root(&self) -> &Frame {
        &self.frames[0]
    }

    pub fn root_mut(&mut self) -> &mut Frame {
        &mut self.frames[0]
    }

    /// Drop every frame above the root
    pub fn truncate_to_root(&mut self) {
        self.frames.truncate(1);
        self.frames[0].loop_depth = 0;
    }

    pub fn clear_root(&mut self) {
        self.frames[0] = Frame::new();
    }

    /// Enter a loop in the current frame, returning the counter variable
    /// name for that nesting depth (`_i0`, `_i1`, ...)
    pub fn enter_loop(&mut self) -> String {
        let frame = self.top_mut();
        let name = format!("_i{}", frame.loop_depth);
        frame.loop_depth += 1;
        name
    }

    pub fn exit_loop(&mut self) {
        let frame = self.top_mut();
        frame.loop_depth = frame.loop_depth.saturating_sub(1);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
