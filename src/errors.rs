// File: src/errors.rs
//
// Error handling and reporting for P-Logo.
// Every stage of the pipeline (lexer, parser, evaluator) reports failures
// through LogoError, which carries the error kind, the source location and
// optional hints, and pretty-prints itself for terminals.

use colored::Colorize;
use std::fmt;

/// Source location information for tracking where code appears in a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub fn unknown() -> Self {
        Self { line: 0, column: 0 }
    }

    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_known() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "<unknown>")
        }
    }
}

/// Kinds of errors a script run can produce.
///
/// None of them are fatal: a failure aborts the current run and leaves the
/// machine in whatever state the executed prefix produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LexError,
    ParseError,
    NameError,
    ArityError,
    TypeError,
    StackUnderflow,
    RecursionLimit,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::LexError => write!(f, "Lex Error"),
            ErrorKind::ParseError => write!(f, "Parse Error"),
            ErrorKind::NameError => write!(f, "Name Error"),
            ErrorKind::ArityError => write!(f, "Arity Error"),
            ErrorKind::TypeError => write!(f, "Type Error"),
            ErrorKind::StackUnderflow => write!(f, "Stack Underflow"),
            ErrorKind::RecursionLimit => write!(f, "Recursion Limit"),
        }
    }
}

/// A structured error with location information
#[derive(Debug, Clone, PartialEq)]
pub struct LogoError {
    pub kind: ErrorKind,
    pub message: String,
    pub location: SourceLocation,
    pub suggestion: Option<String>,
    pub help: Option<String>,
    pub call_stack: Vec<String>,
}

impl LogoError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
            suggestion: None,
            help: None,
            call_stack: Vec::new(),
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Attach the user functions that were active when the error fired.
    /// The innermost call stack wins; outer frames never overwrite it.
    pub fn with_call_stack(mut self, call_stack: Vec<String>) -> Self {
        if self.call_stack.is_empty() {
            self.call_stack = call_stack;
        }
        self
    }

    /// Attach a location if the error does not carry one yet
    pub fn or_at(mut self, location: SourceLocation) -> Self {
        if !self.location.is_known() {
            self.location = location;
        }
        self
    }

    pub fn lex_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::LexError, message, location)
    }

    pub fn parse_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::ParseError, message, location)
    }

    /// Grammar mismatch: the parser wanted `expected` but saw `found`
    pub fn unexpected(expected: &str, found: &str, location: SourceLocation) -> Self {
        Self::parse_error(format!("Expected {} but found {}", expected, found), location)
    }

    pub fn undefined_variable(name: &str, location: SourceLocation) -> Self {
        Self::new(
            ErrorKind::NameError,
            format!("Variable '{}' is not defined in the current frame", name),
            location,
        )
    }

    pub fn undefined_function(name: &str, location: SourceLocation) -> Self {
        Self::new(ErrorKind::NameError, format!("Function '{}' is not defined", name), location)
    }

    pub fn arity(name: &str, expected: usize, got: usize, location: SourceLocation) -> Self {
        let plural = if expected == 1 { "" } else { "s" };
        Self::new(
            ErrorKind::ArityError,
            format!("'{}' expects {} argument{} but got {}", name, expected, plural, got),
            location,
        )
    }

    pub fn type_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::TypeError, message, location)
    }

    pub fn stack_underflow(location: SourceLocation) -> Self {
        Self::new(ErrorKind::StackUnderflow, "'pop' called on an empty value stack", location)
    }
}

impl fmt::Display for LogoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind_str = format!("{}", self.kind);
        writeln!(f, "{}: {}", kind_str.red().bold(), self.message.bold())?;

        if self.location.is_known() {
            let location_str = format!("  --> {}", self.location);
            writeln!(f, "{}", location_str.bright_blue())?;
        }

        if !self.call_stack.is_empty() {
            let trace = self.call_stack.join(" -> ");
            writeln!(f, "   {} {}", "=".bright_cyan(), format!("in: {}", trace).bright_cyan())?;
        }

        if let Some(ref help) = self.help {
            writeln!(
                f,
                "   {} {}",
                "=".bright_yellow(),
                format!("help: {}", help).bright_yellow()
            )?;
        }

        if let Some(ref suggestion) = self.suggestion {
            writeln!(
                f,
                "   {} {}",
                "=".bright_green(),
                format!("Did you mean '{}'?", suggestion).bright_green()
            )?;
        }

        Ok(())
    }
}

impl std::error::Error for LogoError {}

/// Computes the Levenshtein distance between two strings
/// Used for "Did you mean?" suggestions
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let (len1, len2) = (s1_chars.len(), s2_chars.len());

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] { 0 } else { 1 };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[len1][len2]
}

/// Find the closest match from a list of candidates using Levenshtein distance
/// Returns None if no good match is found (distance > 3)
pub fn find_closest_match<'a, I>(target: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best_match = None;
    let mut best_distance = usize::MAX;

    for candidate in candidates {
        let distance = levenshtein_distance(target, candidate);
        if distance <= 3 && distance < best_distance {
            best_distance = distance;
            best_match = Some(candidate);
        }
    }

    best_match
}
