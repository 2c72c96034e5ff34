// File: src/parser.rs
//
// Recursive descent parser for P-Logo.
// Transforms a sequence of lexemes into a Program.
//
// Statements are parsed by recursive descent with one or two lexemes of
// lookahead. Expressions use an explicit shift-reduce pass: operands go on an
// operand stack, operators on an operator stack, and pending operators that
// bind at least as tightly as the incoming one are reduced first.
//
// Grammar:
//   program    = statement*
//   statement  = loop | fndef | if | assignment | fncall
//   loop       = 'loop' '(' expr ')' '{' statement* '}'
//   fndef      = 'fn' name '(' (name (',' name)*)? ')' '{' statement* '}'
//   if         = 'if' '(' expr ')' '{' statement* '}' ('else' '{' statement* '}')?
//   assignment = name '=' expr
//   fncall     = name '(' (expr (',' expr)*)? ')'
//   expr       = operand (op operand)*
//   operand    = number | string | fncall | name

use crate::ast::{BinaryOpKind, Call, Expr, FunctionDef, Program, Stmt};
use crate::errors::{LogoError, SourceLocation};
use crate::lexer::{LexemeKind, Token};
use crate::stack::ensure_sufficient_stack;
use std::sync::Arc;

/// Parser maintains position in the lexeme stream
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    /// Peek at the current token without consuming it
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn peek_kind(&self) -> Option<LexemeKind> {
        self.peek().map(|t| t.kind)
    }

    fn is_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Location of the current token, or just past the last one at EOF
    fn location(&self) -> SourceLocation {
        match self.peek().or_else(|| self.tokens.last()) {
            Some(token) => token.location(),
            None => SourceLocation::new(1, 1),
        }
    }

    /// Consume and return the current token, failing at end of input
    fn advance(&mut self, expected: &str) -> Result<Token, LogoError> {
        match self.tokens.get(self.pos) {
            Some(token) => {
                self.pos += 1;
                Ok(token.clone())
            }
            None => Err(LogoError::unexpected(expected, "end of input", self.location())),
        }
    }

    /// Consume a token of the given kind
    fn expect(&mut self, kind: LexemeKind) -> Result<Token, LogoError> {
        let expected = kind.to_string();
        let token = self.advance(&expected)?;
        if token.kind != kind {
            return Err(LogoError::unexpected(&expected, &token.describe(), token.location()));
        }
        Ok(token)
    }

    /// Consume a keyword with the given text
    fn expect_keyword(&mut self, keyword: &str) -> Result<Token, LogoError> {
        let expected = format!("keyword '{}'", keyword);
        let token = self.advance(&expected)?;
        if token.kind != LexemeKind::Keyword || token.text != keyword {
            return Err(LogoError::unexpected(&expected, &token.describe(), token.location()));
        }
        Ok(token)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(t) if t.kind == LexemeKind::Keyword && t.text == keyword)
    }

    /// Parse the entire token stream into a program
    pub fn parse(&mut self) -> Result<Program, LogoError> {
        let mut statements = Vec::new();
        while !self.is_end() {
            statements.push(self.parse_statement()?);
        }
        Ok(Program::new(statements))
    }

    fn parse_statement(&mut self) -> Result<Stmt, LogoError> {
        ensure_sufficient_stack(|| self.parse_statement_inner())
    }

    fn parse_statement_inner(&mut self) -> Result<Stmt, LogoError> {
        let Some(token) = self.peek().cloned() else {
            return Err(LogoError::unexpected("a statement", "end of input", self.location()));
        };

        match token.kind {
            LexemeKind::Keyword => match token.text.as_str() {
                "loop" => self.parse_loop(),
                "fn" => self.parse_fndef(),
                "if" => self.parse_if(),
                _ => Err(LogoError::unexpected("a statement", &token.describe(), token.location())),
            },
            LexemeKind::Name => {
                if self.peek_at(1).map(|t| t.kind) == Some(LexemeKind::Assignment) {
                    self.parse_assignment()
                } else {
                    self.parse_call().map(Stmt::Call)
                }
            }
            _ => Err(LogoError::unexpected("a statement", &token.describe(), token.location())),
        }
    }

    /// Parse statements up to and including the closing brace
    fn parse_block(&mut self) -> Result<Vec<Stmt>, LogoError> {
        self.expect(LexemeKind::BraceOpen)?;
        let mut statements = Vec::new();
        loop {
            match self.peek_kind() {
                Some(LexemeKind::BraceClose) => break,
                Some(_) => statements.push(self.parse_statement()?),
                None => {
                    return Err(LogoError::unexpected("'}'", "end of input", self.location()));
                }
            }
        }
        self.expect(LexemeKind::BraceClose)?;
        Ok(statements)
    }

    /// Parse `'(' expr ')'` as used by loop and if headers
    fn parse_paren_expr(&mut self) -> Result<Expr, LogoError> {
        self.expect(LexemeKind::ParenOpen)?;
        let expr = self.parse_expr()?;
        self.expect(LexemeKind::ParenClose)?;
        Ok(expr)
    }

    fn parse_assignment(&mut self) -> Result<Stmt, LogoError> {
        let name = self.expect(LexemeKind::Name)?.text;
        self.expect(LexemeKind::Assignment)?;
        let value = self.parse_expr()?;
        Ok(Stmt::Assign { name, value })
    }

    fn parse_loop(&mut self) -> Result<Stmt, LogoError> {
        let location = self.expect_keyword("loop")?.location();
        let count = self.parse_paren_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::Loop { count, body, location })
    }

    fn parse_if(&mut self) -> Result<Stmt, LogoError> {
        let location = self.expect_keyword("if")?.location();
        let condition = self.parse_paren_expr()?;
        let then_branch = self.parse_block()?;

        let else_branch = if self.at_keyword("else") {
            self.advance("keyword 'else'")?;
            self.parse_block()?
        } else {
            Vec::new()
        };

        Ok(Stmt::If { condition, then_branch, else_branch, location })
    }

    fn parse_fndef(&mut self) -> Result<Stmt, LogoError> {
        self.expect_keyword("fn")?;
        let name = self.expect(LexemeKind::Name)?.text;
        self.expect(LexemeKind::ParenOpen)?;

        let mut params = Vec::new();
        if self.peek_kind() != Some(LexemeKind::ParenClose) {
            loop {
                params.push(self.expect(LexemeKind::Name)?.text);
                if self.peek_kind() != Some(LexemeKind::Comma) {
                    break;
                }
                self.advance("','")?;
            }
        }
        self.expect(LexemeKind::ParenClose)?;

        let body = self.parse_block()?;
        Ok(Stmt::FuncDef(Arc::new(FunctionDef { name, params, body })))
    }

    fn parse_call(&mut self) -> Result<Call, LogoError> {
        let name_token = self.expect(LexemeKind::Name)?;
        self.expect(LexemeKind::ParenOpen)?;

        let mut args = Vec::new();
        if self.peek_kind() != Some(LexemeKind::ParenClose) {
            loop {
                args.push(self.parse_expr()?);
                if self.peek_kind() != Some(LexemeKind::Comma) {
                    break;
                }
                self.advance("','")?;
            }
        }
        self.expect(LexemeKind::ParenClose)?;

        Ok(Call::new(&name_token.text, args, name_token.location()))
    }

    fn parse_operand(&mut self) -> Result<Expr, LogoError> {
        let token = self.advance("an expression")?;
        match token.kind {
            LexemeKind::Number => {
                let value = token.text.parse::<f64>().map_err(|_| {
                    LogoError::parse_error(
                        format!("Invalid number literal '{}'", token.text),
                        token.location(),
                    )
                })?;
                Ok(Expr::Number(value))
            }
            LexemeKind::String => Ok(Expr::String(token.text)),
            LexemeKind::Name => {
                if self.peek_kind() == Some(LexemeKind::ParenOpen) {
                    self.pos -= 1;
                    self.parse_call().map(Expr::Call)
                } else {
                    let location = token.location();
                    Ok(Expr::Name { name: token.text, location })
                }
            }
            _ => Err(LogoError::unexpected("an expression", &token.describe(), token.location())),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, LogoError> {
        ensure_sufficient_stack(|| self.parse_expr_inner())
    }

    fn parse_expr_inner(&mut self) -> Result<Expr, LogoError> {
        let mut operands: Vec<Expr> = Vec::new();
        let mut operators: Vec<(BinaryOpKind, SourceLocation)> = Vec::new();

        loop {
            operands.push(self.parse_operand()?);

            let Some(token) = self.peek() else { break };
            if token.kind != LexemeKind::Op {
                break;
            }
            let location = token.location();
            let op = BinaryOpKind::from_symbol(&token.text).ok_or_else(|| {
                LogoError::parse_error(format!("Unknown operator '{}'", token.text), location)
            })?;
            self.pos += 1;

            // Ties reduce too, so equal-precedence operators group left to right
            while let Some((pending, _)) = operators.last() {
                if pending.precedence() < op.precedence() {
                    break;
                }
                reduce(&mut operands, &mut operators)?;
            }
            operators.push((op, location));
        }

        while !operators.is_empty() {
            reduce(&mut operands, &mut operators)?;
        }

        match (operands.pop(), operands.is_empty()) {
            (Some(expr), true) => Ok(expr),
            _ => Err(LogoError::parse_error(
                "Operator and operand counts do not align",
                self.location(),
            )),
        }
    }
}

/// Pop two operands and one operator, push the combined BinaryOp
fn reduce(
    operands: &mut Vec<Expr>,
    operators: &mut Vec<(BinaryOpKind, SourceLocation)>,
) -> Result<(), LogoError> {
    let (op, location) = operators.pop().ok_or_else(|| {
        LogoError::parse_error("Operator stack is empty", SourceLocation::unknown())
    })?;
    let (Some(right), Some(left)) = (operands.pop(), operands.pop()) else {
        return Err(LogoError::parse_error(
            format!("Operator '{}' is missing an operand", op),
            location,
        ));
    };
    operands.push(Expr::BinaryOp { op, left: Box::new(left), right: Box::new(right), location });
    Ok(())
}

/// Convenience: lex and parse a whole script
pub fn parse_source(source: &str) -> Result<Program, LogoError> {
    let tokens = crate::lexer::tokenize(source)?;
    Parser::new(tokens).parse()
}
