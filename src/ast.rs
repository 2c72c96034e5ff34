// File: src/ast.rs
//
// Abstract Syntax Tree (AST) definitions for P-Logo.
//
// Statements (Stmt) are executed for their effect on the machine; expressions
// (Expr) evaluate to a Value. A call is both: it may appear as a statement
// (drawing) or inside an expression (rand, pop, getx, ...).

use crate::errors::SourceLocation;
use std::fmt;
use std::sync::Arc;

/// A parsed script: an ordered list of top-level statements
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Program { statements }
    }
}

/// Binary operators, from weakest (comparisons) to strongest (multiplicative)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Gt,
    Lte,
    Gte,
    Eq,
}

impl BinaryOpKind {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => BinaryOpKind::Add,
            "-" => BinaryOpKind::Sub,
            "*" => BinaryOpKind::Mul,
            "/" => BinaryOpKind::Div,
            "%" => BinaryOpKind::Mod,
            "<" => BinaryOpKind::Lt,
            ">" => BinaryOpKind::Gt,
            "<=" => BinaryOpKind::Lte,
            ">=" => BinaryOpKind::Gte,
            "==" => BinaryOpKind::Eq,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOpKind::Add => "+",
            BinaryOpKind::Sub => "-",
            BinaryOpKind::Mul => "*",
            BinaryOpKind::Div => "/",
            BinaryOpKind::Mod => "%",
            BinaryOpKind::Lt => "<",
            BinaryOpKind::Gt => ">",
            BinaryOpKind::Lte => "<=",
            BinaryOpKind::Gte => ">=",
            BinaryOpKind::Eq => "==",
        }
    }

    /// Binding strength; higher binds tighter
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOpKind::Lt
            | BinaryOpKind::Gt
            | BinaryOpKind::Lte
            | BinaryOpKind::Gte
            | BinaryOpKind::Eq => 1,
            BinaryOpKind::Add | BinaryOpKind::Sub => 2,
            BinaryOpKind::Mul | BinaryOpKind::Div | BinaryOpKind::Mod => 3,
        }
    }
}

impl fmt::Display for BinaryOpKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The closed catalogue of native functions.
///
/// Short aliases (`f`, `r`, ...) are resolved when the call node is built, so
/// the evaluator only ever dispatches on the canonical variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
    Pos,
    Angle,
    Thickness,
    Rand,
    Clear,
    IntVar,
    FloatVar,
    GetX,
    GetY,
    GetAngle,
    WinW,
    WinH,
    MidX,
    MidY,
    Push,
    Pop,
    Line,
    Debug,
}

impl Builtin {
    pub const ALL: [Builtin; 24] = [
        Builtin::Forward,
        Builtin::Backward,
        Builtin::Left,
        Builtin::Right,
        Builtin::Up,
        Builtin::Down,
        Builtin::Pos,
        Builtin::Angle,
        Builtin::Thickness,
        Builtin::Rand,
        Builtin::Clear,
        Builtin::IntVar,
        Builtin::FloatVar,
        Builtin::GetX,
        Builtin::GetY,
        Builtin::GetAngle,
        Builtin::WinW,
        Builtin::WinH,
        Builtin::MidX,
        Builtin::MidY,
        Builtin::Push,
        Builtin::Pop,
        Builtin::Line,
        Builtin::Debug,
    ];

    /// Resolve a call name (canonical or alias) to a built-in
    pub fn from_name(name: &str) -> Option<Self> {
        let builtin = match name {
            "forward" | "f" => Builtin::Forward,
            "backward" | "b" => Builtin::Backward,
            "left" | "l" => Builtin::Left,
            "right" | "r" => Builtin::Right,
            "up" | "u" => Builtin::Up,
            "down" | "d" => Builtin::Down,
            "pos" | "p" => Builtin::Pos,
            "angle" | "a" => Builtin::Angle,
            "thickness" | "t" => Builtin::Thickness,
            "rand" => Builtin::Rand,
            "clear" | "c" => Builtin::Clear,
            "intvar" => Builtin::IntVar,
            "floatvar" => Builtin::FloatVar,
            "getx" => Builtin::GetX,
            "gety" => Builtin::GetY,
            "getangle" => Builtin::GetAngle,
            "winw" => Builtin::WinW,
            "winh" => Builtin::WinH,
            "midx" => Builtin::MidX,
            "midy" => Builtin::MidY,
            "push" => Builtin::Push,
            "pop" => Builtin::Pop,
            "line" => Builtin::Line,
            "debug" => Builtin::Debug,
            _ => return None,
        };
        Some(builtin)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Forward => "forward",
            Builtin::Backward => "backward",
            Builtin::Left => "left",
            Builtin::Right => "right",
            Builtin::Up => "up",
            Builtin::Down => "down",
            Builtin::Pos => "pos",
            Builtin::Angle => "angle",
            Builtin::Thickness => "thickness",
            Builtin::Rand => "rand",
            Builtin::Clear => "clear",
            Builtin::IntVar => "intvar",
            Builtin::FloatVar => "floatvar",
            Builtin::GetX => "getx",
            Builtin::GetY => "gety",
            Builtin::GetAngle => "getangle",
            Builtin::WinW => "winw",
            Builtin::WinH => "winh",
            Builtin::MidX => "midx",
            Builtin::MidY => "midy",
            Builtin::Push => "push",
            Builtin::Pop => "pop",
            Builtin::Line => "line",
            Builtin::Debug => "debug",
        }
    }

    pub fn alias(&self) -> Option<&'static str> {
        match self {
            Builtin::Forward => Some("f"),
            Builtin::Backward => Some("b"),
            Builtin::Left => Some("l"),
            Builtin::Right => Some("r"),
            Builtin::Up => Some("u"),
            Builtin::Down => Some("d"),
            Builtin::Pos => Some("p"),
            Builtin::Angle => Some("a"),
            Builtin::Thickness => Some("t"),
            Builtin::Clear => Some("c"),
            _ => None,
        }
    }

    /// Help-panel entries such as `forward [f]`
    pub fn catalogue() -> Vec<String> {
        Builtin::ALL
            .iter()
            .map(|b| match b.alias() {
                Some(alias) => format!("{} [{}]", b.name(), alias),
                None => b.name().to_string(),
            })
            .collect()
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Who a call dispatches to, decided once at parse time
#[derive(Debug, Clone, PartialEq)]
pub enum CallTarget {
    Builtin(Builtin),
    User(String),
}

#[derive(Debug, Clone)]
pub struct Call {
    pub target: CallTarget,
    pub args: Vec<Expr>,
    pub location: SourceLocation,
}

impl Call {
    pub fn new(name: &str, args: Vec<Expr>, location: SourceLocation) -> Self {
        let target = match Builtin::from_name(name) {
            Some(builtin) => CallTarget::Builtin(builtin),
            None => CallTarget::User(name.to_string()),
        };
        Call { target, args, location }
    }

    pub fn name(&self) -> &str {
        match &self.target {
            CallTarget::Builtin(builtin) => builtin.name(),
            CallTarget::User(name) => name,
        }
    }
}

/// Represents an expression - something that evaluates to a value
#[derive(Debug, Clone)]
pub enum Expr {
    Number(f64),
    String(String),
    Name {
        name: String,
        location: SourceLocation,
    },
    BinaryOp {
        op: BinaryOpKind,
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
    Call(Call),
}

/// A user-defined function. Shared between the AST and the machine's
/// function table, and never mutated after parsing.
#[derive(Debug)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

/// Represents a statement - an action on the machine
#[derive(Debug, Clone)]
pub enum Stmt {
    Assign {
        name: String,
        value: Expr,
    },
    Loop {
        count: Expr,
        body: Vec<Stmt>,
        location: SourceLocation,
    },
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
        location: SourceLocation,
    },
    FuncDef(Arc<FunctionDef>),
    Call(Call),
}
