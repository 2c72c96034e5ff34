// File: src/vm.rs
//
// The turtle machine that P-Logo programs drive.
// Holds the turtle pose and pen, the drawing history, the user-function
// table, the frame stack, the slider-bindable variable declarations and the
// small value stack used by push/pop.
//
// Hosts read the machine through the accessors at the bottom of this file;
// script code only reaches it through the interpreter.

use crate::ast::FunctionDef;
use crate::builtins::{normalize_angle, to_radians};
use crate::interpreter::{Environment, Value};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// One drawn segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Line {
    pub from: Point,
    pub to: Point,
    pub thickness: f64,
    pub color: Color,
}

/// Turtle position and heading (degrees, clockwise from "up")
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

/// Slider range for a variable declared with `intvar`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntVar {
    pub min: i64,
    pub max: i64,
}

/// Slider range for a variable declared with `floatvar`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FloatVar {
    pub min: f64,
    pub max: f64,
}

/// A declared slider variable together with its current root-frame value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarBinding<R> {
    pub name: String,
    pub range: R,
    pub value: Value,
}

/// Window dimensions, owned by whatever window the host manages
pub trait Viewport: Send {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedViewport {
    pub width: f64,
    pub height: f64,
}

impl FixedViewport {
    pub fn new(width: f64, height: f64) -> Self {
        FixedViewport { width, height }
    }
}

impl Default for FixedViewport {
    fn default() -> Self {
        FixedViewport::new(1024.0, 768.0)
    }
}

impl Viewport for FixedViewport {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }
}

pub struct Machine {
    pos: Point,
    angle: f64,
    pen_down: bool,
    thickness: f64,
    color: Color,

    history: Vec<Line>,
    functions: HashMap<String, Arc<FunctionDef>>,
    pub(crate) env: Environment,

    int_vars: BTreeMap<String, IntVar>,
    float_vars: BTreeMap<String, FloatVar>,
    stack: Vec<Value>,

    viewport: Box<dyn Viewport>,
    origin: Pose,
    messages: Vec<String>,
}

impl Machine {
    /// Machine whose start origin is the viewport centre
    pub fn new(viewport: Box<dyn Viewport>) -> Self {
        let origin = Pose {
            x: (viewport.width() / 2.0).floor(),
            y: (viewport.height() / 2.0).floor(),
            angle: 0.0,
        };
        Machine::with_origin(viewport, origin)
    }

    pub fn with_origin(viewport: Box<dyn Viewport>, origin: Pose) -> Self {
        Machine {
            pos: Point::new(origin.x, origin.y),
            angle: normalize_angle(origin.angle),
            pen_down: true,
            thickness: 1.0,
            color: Color::default(),
            history: Vec::new(),
            functions: HashMap::new(),
            env: Environment::new(),
            int_vars: BTreeMap::new(),
            float_vars: BTreeMap::new(),
            stack: Vec::new(),
            viewport,
            origin,
            messages: Vec::new(),
        }
    }

    // --- turtle operations ---

    /// Move along the heading; records a segment when the pen is down.
    /// Heading 0 points up the screen (negative y).
    pub fn forward(&mut self, distance: f64) {
        let from = self.pos;
        let rad = to_radians(self.angle);
        self.pos.x += rad.sin() * distance;
        self.pos.y -= rad.cos() * distance;

        if self.pen_down {
            self.history.push(Line {
                from,
                to: self.pos,
                thickness: self.thickness,
                color: self.color,
            });
        }
    }

    pub fn backward(&mut self, distance: f64) {
        self.forward(-distance);
    }

    pub fn left(&mut self, degrees: f64) {
        self.angle = normalize_angle(self.angle - degrees);
    }

    pub fn right(&mut self, degrees: f64) {
        self.left(-degrees);
    }

    pub fn set_pen_down(&mut self, down: bool) {
        self.pen_down = down;
    }

    /// Teleport without drawing
    pub fn set_pos(&mut self, x: f64, y: f64) {
        self.pos = Point::new(x, y);
    }

    pub fn set_angle(&mut self, degrees: f64) {
        self.angle = normalize_angle(degrees);
    }

    pub fn set_thickness(&mut self, thickness: f64) {
        self.thickness = thickness;
    }

    /// Record an explicit segment independent of the turtle pose
    pub fn push_line(&mut self, from: Point, to: Point) {
        self.history.push(Line { from, to, thickness: self.thickness, color: self.color });
    }

    // --- function table, slider vars, value stack ---

    /// Install a function; redefinition replaces the previous one
    pub fn define_function(&mut self, def: Arc<FunctionDef>) {
        self.functions.insert(def.name.clone(), def);
    }

    pub fn function(&self, name: &str) -> Option<Arc<FunctionDef>> {
        self.functions.get(name).cloned()
    }

    pub fn declare_int_var(&mut self, name: &str, range: IntVar, default: Value) {
        self.int_vars.insert(name.to_string(), range);
        self.seed_root_variable(name, default);
    }

    pub fn declare_float_var(&mut self, name: &str, range: FloatVar, default: Value) {
        self.float_vars.insert(name.to_string(), range);
        self.seed_root_variable(name, default);
    }

    fn seed_root_variable(&mut self, name: &str, default: Value) {
        self.env.root_mut().variables.entry(name.to_string()).or_insert(default);
    }

    pub fn push_value(&mut self, value: Value) {
        self.stack.push(value);
    }

    pub fn pop_value(&mut self) -> Option<Value> {
        self.stack.pop()
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    pub(crate) fn log_message(&mut self, message: String) {
        self.messages.push(message);
    }

    // --- resets ---

    /// Clear history, function table, declared vars and value stack.
    /// `full` also wipes the root frame; `keep_state` leaves the pose alone,
    /// otherwise the pose is re-seeded from the origin and the pen put down.
    pub fn reset(&mut self, full: bool, keep_state: bool) {
        self.env.truncate_to_root();
        if full {
            self.env.clear_root();
        }
        self.messages.clear();
        self.clear_state(keep_state);
    }

    /// Drop all frames including the root frame and re-seed the pose
    pub fn hard_reset(&mut self) {
        self.reset(true, false);
    }

    /// Keep root-frame values so slider-adjusted variables survive a re-run
    pub fn soft_reset(&mut self) {
        self.reset(false, false);
    }

    /// Everything `reset` clears except the frame stack
    pub(crate) fn clear_state(&mut self, keep_state: bool) {
        self.history.clear();
        self.functions.clear();
        self.int_vars.clear();
        self.float_vars.clear();
        self.stack.clear();

        if !keep_state {
            self.pos = Point::new(self.origin.x, self.origin.y);
            self.angle = normalize_angle(self.origin.angle);
            self.pen_down = true;
        }
    }

    // --- host-facing accessors ---

    pub fn pose(&self) -> Pose {
        Pose { x: self.pos.x, y: self.pos.y, angle: self.angle }
    }

    pub fn position(&self) -> Point {
        self.pos
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn is_pen_down(&self) -> bool {
        self.pen_down
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn history(&self) -> &[Line] {
        &self.history
    }

    /// Hand the recorded segments to the host, leaving history empty
    pub fn take_history(&mut self) -> Vec<Line> {
        std::mem::take(&mut self.history)
    }

    /// Lines logged by the `debug` built-in since the last reset
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Host-only pose override ("click to set start position")
    pub fn set_pose(&mut self, pose: Pose) {
        self.pos = Point::new(pose.x, pose.y);
        self.angle = normalize_angle(pose.angle);
    }

    pub fn origin(&self) -> Pose {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Pose) {
        self.origin = origin;
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn viewport_width(&self) -> f64 {
        self.viewport.width()
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport.height()
    }

    pub fn set_viewport(&mut self, viewport: Box<dyn Viewport>) {
        self.viewport = viewport;
    }

    /// Sorted names of user-defined functions
    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn root_variable(&self, name: &str) -> Option<&Value> {
        self.env.root().variables.get(name)
    }

    /// Root-frame variables sorted by name
    pub fn root_variables(&self) -> BTreeMap<String, Value> {
        self.env.root().variables.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    pub fn int_var_bindings(&self) -> Vec<VarBinding<IntVar>> {
        self.int_vars
            .iter()
            .map(|(name, range)| VarBinding {
                name: name.clone(),
                range: *range,
                value: self.root_variable(name).cloned().unwrap_or(Value::Undefined),
            })
            .collect()
    }

    pub fn float_var_bindings(&self) -> Vec<VarBinding<FloatVar>> {
        self.float_vars
            .iter()
            .map(|(name, range)| VarBinding {
                name: name.clone(),
                range: *range,
                value: self.root_variable(name).cloned().unwrap_or(Value::Undefined),
            })
            .collect()
    }

    /// Write a slider value into the root frame, clamped to the declared
    /// range. Returns false when `name` is not a declared slider variable.
    pub fn set_root_variable(&mut self, name: &str, value: f64) -> bool {
        let clamped = if let Some(range) = self.int_vars.get(name) {
            value.round().max(range.min as f64).min(range.max as f64)
        } else if let Some(range) = self.float_vars.get(name) {
            // Ranges declared directly through the machine may be unordered
            value.max(range.min).min(range.max)
        } else {
            return false;
        };
        self.env.root_mut().variables.insert(name.to_string(), Value::Number(clamped));
        true
    }

    pub fn frame_depth(&self) -> usize {
        self.env.depth()
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot {
            pose: self.pose(),
            pen_down: self.pen_down,
            thickness: self.thickness,
            color: self.color,
            lines: self.history.clone(),
            root_variables: self.root_variables(),
            int_vars: self.int_var_bindings(),
            float_vars: self.float_var_bindings(),
            functions: self.function_names(),
            messages: self.messages.clone(),
        }
    }
}

impl Default for Machine {
    fn default() -> Self {
        Machine::new(Box::new(FixedViewport::default()))
    }
}

/// Owned copy of everything a renderer or UI panel reads
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineSnapshot {
    pub pose: Pose,
    pub pen_down: bool,
    pub thickness: f64,
    pub color: Color,
    pub lines: Vec<Line>,
    pub root_variables: BTreeMap<String, Value>,
    pub int_vars: Vec<VarBinding<IntVar>>,
    pub float_vars: Vec<VarBinding<FloatVar>>,
    pub functions: Vec<String>,
    pub messages: Vec<String>,
}
