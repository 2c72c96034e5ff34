// File: src/lexer.rs
//
// Lexical analyzer (tokenizer) for P-Logo.
// Converts script text into a flat vector of lexemes for the parser.
//
// Supports:
// - Keywords: fn, if, else, loop
// - Names: [A-Za-z_][A-Za-z0-9_]*
// - Numbers, with a leading '-' when the minus cannot be a binary operator
// - String literals delimited by '"' with \n \t \\ \" escapes
// - Operators: + - * / % < > <= >= ==, and '=' for assignment
// - Punctuation: ( ) { } ,
// - Comments starting with # and running to end of line

use crate::errors::{LogoError, SourceLocation};
use std::fmt;

pub const KEYWORDS: [&str; 4] = ["fn", "if", "else", "loop"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexemeKind {
    Keyword,
    Name,
    Number,
    String,
    ParenOpen,
    ParenClose,
    BraceOpen,
    BraceClose,
    Comma,
    Op,
    Assignment,
}

impl fmt::Display for LexemeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            LexemeKind::Keyword => "keyword",
            LexemeKind::Name => "name",
            LexemeKind::Number => "number",
            LexemeKind::String => "string",
            LexemeKind::ParenOpen => "'('",
            LexemeKind::ParenClose => "')'",
            LexemeKind::BraceOpen => "'{'",
            LexemeKind::BraceClose => "'}'",
            LexemeKind::Comma => "','",
            LexemeKind::Op => "operator",
            LexemeKind::Assignment => "'='",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: LexemeKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }

    /// Human readable form used in parse errors, e.g. `name 'foo'`
    pub fn describe(&self) -> String {
        match self.kind {
            LexemeKind::Keyword | LexemeKind::Name | LexemeKind::Number | LexemeKind::Op => {
                format!("{} '{}'", self.kind, self.text)
            }
            LexemeKind::String => format!("string \"{}\"", self.text),
            _ => self.kind.to_string(),
        }
    }

    /// True when this lexeme can close an operand, so a following '-' is binary
    fn ends_operand(&self) -> bool {
        matches!(
            self.kind,
            LexemeKind::Number | LexemeKind::String | LexemeKind::Name | LexemeKind::ParenClose
        )
    }
}

/// Tokenizes P-Logo source code into a vector of tokens.
///
/// Whitespace is skipped and `#` comments run to the end of the line. Fails
/// on an unrecognized character, an unterminated string or a malformed number.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LogoError> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line = 1;
    let mut col = 1;

    while let Some(&c) = chars.peek() {
        let start_col = col;
        match c {
            '\n' => {
                chars.next();
                line += 1;
                col = 1;
            }
            c if c.is_whitespace() => {
                chars.next();
                col += 1;
            }
            '#' => {
                while let Some(&ch) = chars.peek() {
                    if ch == '\n' {
                        break;
                    }
                    chars.next();
                    col += 1;
                }
            }
            '"' => {
                let start_line = line;
                chars.next();
                col += 1;
                let mut s = String::new();
                let mut terminated = false;
                while let Some(ch) = chars.next() {
                    col += 1;
                    match ch {
                        '"' => {
                            terminated = true;
                            break;
                        }
                        '\\' => {
                            let Some(esc) = chars.next() else { break };
                            col += 1;
                            match esc {
                                'n' => s.push('\n'),
                                't' => s.push('\t'),
                                '\\' => s.push('\\'),
                                '"' => s.push('"'),
                                other => {
                                    s.push('\\');
                                    s.push(other);
                                }
                            }
                        }
                        '\n' => {
                            s.push('\n');
                            line += 1;
                            col = 1;
                        }
                        other => s.push(other),
                    }
                }
                if !terminated {
                    return Err(LogoError::lex_error(
                        "Unterminated string literal",
                        SourceLocation::new(start_line, start_col),
                    ));
                }
                tokens.push(Token {
                    kind: LexemeKind::String,
                    text: s,
                    line: start_line,
                    column: start_col,
                });
            }
            '0'..='9' => {
                let text = read_number(&mut chars, &mut col, String::new());
                tokens.push(number_token(text, line, start_col)?);
            }
            '-' => {
                chars.next();
                col += 1;
                let binary_position = tokens.last().map(Token::ends_operand).unwrap_or(false);
                let digit_follows = chars.peek().map(|ch| ch.is_ascii_digit()).unwrap_or(false);
                if digit_follows && !binary_position {
                    let text = read_number(&mut chars, &mut col, String::from("-"));
                    tokens.push(number_token(text, line, start_col)?);
                } else {
                    tokens.push(simple(LexemeKind::Op, "-", line, start_col));
                }
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let mut word = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_alphanumeric() || ch == '_' {
                        word.push(ch);
                        chars.next();
                        col += 1;
                    } else {
                        break;
                    }
                }
                let kind = if KEYWORDS.contains(&word.as_str()) {
                    LexemeKind::Keyword
                } else {
                    LexemeKind::Name
                };
                tokens.push(Token { kind, text: word, line, column: start_col });
            }
            '<' | '>' | '=' => {
                chars.next();
                col += 1;
                if chars.peek() == Some(&'=') {
                    chars.next();
                    col += 1;
                    let op = format!("{}=", c);
                    tokens.push(simple(LexemeKind::Op, &op, line, start_col));
                } else if c == '=' {
                    tokens.push(simple(LexemeKind::Assignment, "=", line, start_col));
                } else {
                    tokens.push(simple(LexemeKind::Op, &c.to_string(), line, start_col));
                }
            }
            '+' | '*' | '/' | '%' => {
                chars.next();
                col += 1;
                tokens.push(simple(LexemeKind::Op, &c.to_string(), line, start_col));
            }
            '(' | ')' | '{' | '}' | ',' => {
                chars.next();
                col += 1;
                let kind = match c {
                    '(' => LexemeKind::ParenOpen,
                    ')' => LexemeKind::ParenClose,
                    '{' => LexemeKind::BraceOpen,
                    '}' => LexemeKind::BraceClose,
                    _ => LexemeKind::Comma,
                };
                tokens.push(Token { kind, text: String::new(), line, column: start_col });
            }
            other => {
                return Err(LogoError::lex_error(
                    format!("Unknown character '{}'", other),
                    SourceLocation::new(line, start_col),
                ));
            }
        }
    }

    Ok(tokens)
}

fn simple(kind: LexemeKind, text: &str, line: usize, column: usize) -> Token {
    Token { kind, text: text.to_string(), line, column }
}

fn read_number<I>(chars: &mut std::iter::Peekable<I>, col: &mut usize, mut num: String) -> String
where
    I: Iterator<Item = char>,
{
    while let Some(&ch) = chars.peek() {
        if ch.is_ascii_digit() || ch == '.' {
            num.push(ch);
            chars.next();
            *col += 1;
        } else {
            break;
        }
    }
    num
}

fn number_token(text: String, line: usize, column: usize) -> Result<Token, LogoError> {
    if text.parse::<f64>().is_err() {
        return Err(LogoError::lex_error(
            format!("Malformed number '{}'", text),
            SourceLocation::new(line, column),
        ));
    }
    Ok(Token { kind: LexemeKind::Number, text, line, column })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use pretty_assertions::assert_eq;

    fn kinds_and_text(code: &str) -> Vec<(LexemeKind, String)> {
        tokenize(code)
            .expect("code should tokenize")
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    fn lx(kind: LexemeKind, text: &str) -> (LexemeKind, String) {
        (kind, text.to_string())
    }

    #[test]
    fn test_simple_call() {
        assert_eq!(
            kinds_and_text("forward(10)"),
            vec![
                lx(LexemeKind::Name, "forward"),
                lx(LexemeKind::ParenOpen, ""),
                lx(LexemeKind::Number, "10"),
                lx(LexemeKind::ParenClose, ""),
            ]
        );
    }

    #[test]
    fn test_loop_block() {
        assert_eq!(
            kinds_and_text("loop(12) { b(10.5) }"),
            vec![
                lx(LexemeKind::Keyword, "loop"),
                lx(LexemeKind::ParenOpen, ""),
                lx(LexemeKind::Number, "12"),
                lx(LexemeKind::ParenClose, ""),
                lx(LexemeKind::BraceOpen, ""),
                lx(LexemeKind::Name, "b"),
                lx(LexemeKind::ParenOpen, ""),
                lx(LexemeKind::Number, "10.5"),
                lx(LexemeKind::ParenClose, ""),
                lx(LexemeKind::BraceClose, ""),
            ]
        );
    }

    #[test]
    fn test_function_definition() {
        let tokens = kinds_and_text("fn circle(iter, size) { f(size) r(360 / iter) }");
        assert_eq!(tokens.len(), 19);
        assert_eq!(tokens[0], lx(LexemeKind::Keyword, "fn"));
        assert_eq!(tokens[4], lx(LexemeKind::Comma, ""));
        assert_eq!(tokens[15], lx(LexemeKind::Op, "/"));
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds_and_text("+ - * / % < > <= >= =="),
            vec![
                lx(LexemeKind::Op, "+"),
                lx(LexemeKind::Op, "-"),
                lx(LexemeKind::Op, "*"),
                lx(LexemeKind::Op, "/"),
                lx(LexemeKind::Op, "%"),
                lx(LexemeKind::Op, "<"),
                lx(LexemeKind::Op, ">"),
                lx(LexemeKind::Op, "<="),
                lx(LexemeKind::Op, ">="),
                lx(LexemeKind::Op, "=="),
            ]
        );
    }

    #[test]
    fn test_assignment_and_names() {
        assert_eq!(
            kinds_and_text("__abc_1 = 1"),
            vec![
                lx(LexemeKind::Name, "__abc_1"),
                lx(LexemeKind::Assignment, "="),
                lx(LexemeKind::Number, "1"),
            ]
        );
    }

    #[test]
    fn test_string_literal_with_escapes() {
        assert_eq!(kinds_and_text(r#""abc""#), vec![lx(LexemeKind::String, "abc")]);
        assert_eq!(kinds_and_text(r#""a\"b\n""#), vec![lx(LexemeKind::String, "a\"b\n")]);
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds_and_text("# heading\nup() # lift\n"),
            vec![
                lx(LexemeKind::Name, "up"),
                lx(LexemeKind::ParenOpen, ""),
                lx(LexemeKind::ParenClose, ""),
            ]
        );
    }

    #[test]
    fn test_negative_literal_only_where_minus_cannot_be_binary() {
        assert_eq!(
            kinds_and_text("f(-5)"),
            vec![
                lx(LexemeKind::Name, "f"),
                lx(LexemeKind::ParenOpen, ""),
                lx(LexemeKind::Number, "-5"),
                lx(LexemeKind::ParenClose, ""),
            ]
        );
        assert_eq!(
            kinds_and_text("20-5"),
            vec![lx(LexemeKind::Number, "20"), lx(LexemeKind::Op, "-"), lx(LexemeKind::Number, "5")]
        );
        assert_eq!(
            kinds_and_text("a - -5"),
            vec![lx(LexemeKind::Name, "a"), lx(LexemeKind::Op, "-"), lx(LexemeKind::Number, "-5")]
        );
    }

    #[test]
    fn test_token_locations() {
        let tokens = tokenize("up()\n  f(1)").expect("code should tokenize");
        assert_eq!((tokens[3].line, tokens[3].column), (2, 3));
    }

    #[test]
    fn test_lex_errors() {
        let unknown = tokenize("f(1) $").unwrap_err();
        assert_eq!(unknown.kind, ErrorKind::LexError);
        assert_eq!(unknown.location, SourceLocation::new(1, 6));

        let unterminated = tokenize("debug(\"abc").unwrap_err();
        assert_eq!(unterminated.kind, ErrorKind::LexError);

        let malformed = tokenize("f(1.2.3)").unwrap_err();
        assert_eq!(malformed.kind, ErrorKind::LexError);
    }
}
