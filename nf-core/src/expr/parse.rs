//! Text to [`Expr`].
//!
//! The grammar follows Python's arithmetic precedence, since that is how users tend to write
//! these (`z**3 - 1`):
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary (('**' | '^') unary)?
//! primary := number | name | name '(' expr ')' | '(' expr ')'
//! ```

use std::f64::consts::{E, PI};

use num::complex::Complex64;

use super::{Expr, Func};

/// The text could not be parsed into an expression.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{message} (at offset {offset})")]
pub struct ParseError {
    /// Byte offset into the input where the problem was found.
    pub offset: usize,
    pub message: String,
}

/// Parse `text` into an expression in `z`.
pub fn parse(text: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: text.len(),
        depth: 0,
    };
    if parser.tokens.is_empty() {
        return Err(ParseError {
            offset: 0,
            message: "empty expression".to_owned(),
        });
    }
    let expr = parser.expr()?.expr;
    match parser.peek() {
        None => Ok(expr),
        Some(tok) => Err(parser.error_at(tok.offset, format!("unexpected {}", tok.kind))),
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Kind {
    Number(f64),
    Imaginary(f64),
    Name(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Open,
    Close,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Number(v) => write!(f, "number {}", v),
            Kind::Imaginary(v) => write!(f, "number {}j", v),
            Kind::Name(n) => write!(f, "name '{}'", n),
            Kind::Plus => write!(f, "'+'"),
            Kind::Minus => write!(f, "'-'"),
            Kind::Star => write!(f, "'*'"),
            Kind::Slash => write!(f, "'/'"),
            Kind::Caret => write!(f, "'**'"),
            Kind::Open => write!(f, "'('"),
            Kind::Close => write!(f, "')'"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Token {
    kind: Kind,
    offset: usize,
}

fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        let c = bytes[i];
        let kind = match c {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'+' => Kind::Plus,
            b'-' => Kind::Minus,
            b'*' if bytes.get(i + 1) == Some(&b'*') => {
                i += 1;
                Kind::Caret
            }
            b'*' => Kind::Star,
            b'/' => Kind::Slash,
            b'^' => Kind::Caret,
            b'(' => Kind::Open,
            b')' => Kind::Close,
            b'0'..=b'9' | b'.' => {
                i = scan_number(bytes, i);
                let value: f64 = text[start..i].parse().map_err(|_| ParseError {
                    offset: start,
                    message: format!("malformed number '{}'", &text[start..i]),
                })?;
                // Python-style imaginary literal: 2j
                if matches!(bytes.get(i), Some(b'j') | Some(b'J'))
                    && !bytes
                        .get(i + 1)
                        .map_or(false, |b| b.is_ascii_alphanumeric() || *b == b'_')
                {
                    i += 1;
                    tokens.push(Token {
                        kind: Kind::Imaginary(value),
                        offset: start,
                    });
                } else {
                    tokens.push(Token {
                        kind: Kind::Number(value),
                        offset: start,
                    });
                }
                continue;
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_')
                {
                    i += 1;
                }
                tokens.push(Token {
                    kind: Kind::Name(text[start..i].to_owned()),
                    offset: start,
                });
                continue;
            }
            _ => {
                let ch = text[start..].chars().next().unwrap_or('?');
                return Err(ParseError {
                    offset: start,
                    message: format!("unexpected character '{}'", ch),
                });
            }
        };
        i += 1;
        tokens.push(Token {
            kind,
            offset: start,
        });
    }
    Ok(tokens)
}

/// Returns the end of the number starting at `i`: digits, fraction, exponent.
fn scan_number(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
        i += 1;
    }
    if matches!(bytes.get(i), Some(b'e') | Some(b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        // Only an exponent if digits follow; otherwise `e` is left for the next token.
        if bytes.get(j).map_or(false, |b| b.is_ascii_digit()) {
            i = j;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
    }
    i
}

/// Deepest expression tree the parser builds. Parentheses and unary signs count toward
/// the same limit while parsing, so every later pass over the tree stays shallow.
pub const MAX_DEPTH: usize = 256;

/// A parsed sub-expression and the height of its tree.
struct Node {
    expr: Expr,
    height: usize,
}

impl Node {
    fn leaf(expr: Expr) -> Node {
        Node { expr, height: 1 }
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: usize,
    /// Current nesting of parentheses, calls, signs and exponents.
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: &Kind) -> bool {
        if self.peek().map(|t| &t.kind) == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error_at(&self, offset: usize, message: String) -> ParseError {
        ParseError { offset, message }
    }

    fn too_deep(&self, offset: usize) -> ParseError {
        self.error_at(offset, "expression nested too deeply".to_owned())
    }

    /// Step one level into a nested construct starting at `offset`.
    fn enter(&mut self, offset: usize) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            Err(self.too_deep(offset))
        } else {
            Ok(())
        }
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Wrap `expr` in a node one above its tallest child.
    fn join(&self, offset: usize, child_height: usize, expr: Expr) -> Result<Node, ParseError> {
        let height = child_height + 1;
        if height > MAX_DEPTH {
            return Err(self.too_deep(offset));
        }
        Ok(Node { expr, height })
    }

    fn expr(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.term()?;
        loop {
            let Some(tok) = self.peek() else {
                return Ok(lhs);
            };
            let offset = tok.offset;
            let op: fn(Box<Expr>, Box<Expr>) -> Expr = match tok.kind {
                Kind::Plus => Expr::Add,
                Kind::Minus => Expr::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            let height = lhs.height.max(rhs.height);
            lhs = self.join(offset, height, op(Box::new(lhs.expr), Box::new(rhs.expr)))?;
        }
    }

    fn term(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.unary()?;
        loop {
            let Some(tok) = self.peek() else {
                return Ok(lhs);
            };
            let offset = tok.offset;
            let op: fn(Box<Expr>, Box<Expr>) -> Expr = match tok.kind {
                Kind::Star => Expr::Mul,
                Kind::Slash => Expr::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            let height = lhs.height.max(rhs.height);
            lhs = self.join(offset, height, op(Box::new(lhs.expr), Box::new(rhs.expr)))?;
        }
    }

    fn unary(&mut self) -> Result<Node, ParseError> {
        let (offset, negate) = match self.peek() {
            Some(Token {
                kind: Kind::Minus,
                offset,
            }) => (*offset, true),
            Some(Token {
                kind: Kind::Plus,
                offset,
            }) => (*offset, false),
            _ => return self.power(),
        };
        self.pos += 1;
        self.enter(offset)?;
        let inner = self.unary()?;
        self.leave();
        if negate {
            self.join(offset, inner.height, Expr::Neg(Box::new(inner.expr)))
        } else {
            Ok(inner)
        }
    }

    fn power(&mut self) -> Result<Node, ParseError> {
        let base = self.primary()?;
        let Some(offset) = self
            .peek()
            .filter(|t| t.kind == Kind::Caret)
            .map(|t| t.offset)
        else {
            return Ok(base);
        };
        self.pos += 1;
        // Right-associative: the exponent is itself a unary, which may contain a power.
        self.enter(offset)?;
        let exponent = self.unary()?;
        self.leave();
        let height = base.height.max(exponent.height);
        self.join(
            offset,
            height,
            Expr::Pow(Box::new(base.expr), Box::new(exponent.expr)),
        )
    }

    fn primary(&mut self) -> Result<Node, ParseError> {
        let Some(tok) = self.next() else {
            return Err(self.error_at(self.end, "unexpected end of expression".to_owned()));
        };
        match tok.kind {
            Kind::Number(v) => Ok(Node::leaf(Expr::real(v))),
            Kind::Imaginary(v) => Ok(Node::leaf(Expr::Const(Complex64::new(0.0, v)))),
            Kind::Open => {
                self.enter(tok.offset)?;
                let inner = self.expr()?;
                self.close(tok.offset)?;
                self.leave();
                Ok(inner)
            }
            Kind::Name(name) => self.name(name, tok.offset),
            other => Err(self.error_at(tok.offset, format!("unexpected {}", other))),
        }
    }

    fn name(&mut self, name: String, offset: usize) -> Result<Node, ParseError> {
        if let Some(func) = Func::from_name(&name) {
            if !self.eat(&Kind::Open) {
                return Err(self.error_at(offset, format!("function '{}' needs an argument", name)));
            }
            self.enter(offset)?;
            let arg = self.expr()?;
            self.close(offset)?;
            self.leave();
            return self.join(offset, arg.height, Expr::Call(func, Box::new(arg.expr)));
        }
        let expr = match name.as_str() {
            "z" => Expr::Var,
            "i" | "I" | "j" => Expr::Const(Complex64::new(0.0, 1.0)),
            "pi" => Expr::real(PI),
            "e" | "E" => Expr::real(E),
            _ => return Err(self.error_at(offset, format!("unknown name '{}'", name))),
        };
        Ok(Node::leaf(expr))
    }

    fn close(&mut self, open_offset: usize) -> Result<(), ParseError> {
        if self.eat(&Kind::Close) {
            Ok(())
        } else {
            let offset = self.peek().map_or(self.end, |t| t.offset);
            Err(self.error_at(
                offset,
                format!("missing ')' to match '(' at offset {}", open_offset),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var() -> Box<Expr> {
        Box::new(Expr::Var)
    }

    fn num(v: f64) -> Box<Expr> {
        Box::new(Expr::real(v))
    }

    #[test]
    fn parses_cubic() {
        assert_eq!(
            parse("z**3 - 1").unwrap(),
            Expr::Sub(Box::new(Expr::Pow(var(), num(3.0))), num(1.0))
        );
        assert_eq!(parse("z^3 - 1").unwrap(), parse("z**3-1").unwrap());
    }

    #[test]
    fn unary_minus_binds_looser_than_power() {
        assert_eq!(
            parse("-z**2").unwrap(),
            Expr::Neg(Box::new(Expr::Pow(var(), num(2.0))))
        );
        assert_eq!(
            parse("z**-2").unwrap(),
            Expr::Pow(var(), Box::new(Expr::Neg(num(2.0))))
        );
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(
            parse("2**z**2").unwrap(),
            Expr::Pow(num(2.0), Box::new(Expr::Pow(var(), num(2.0))))
        );
    }

    #[test]
    fn left_associative_arithmetic() {
        assert_eq!(
            parse("z - 1 - 2").unwrap(),
            Expr::Sub(Box::new(Expr::Sub(var(), num(1.0))), num(2.0))
        );
        assert_eq!(
            parse("z / 2 * 3").unwrap(),
            Expr::Mul(Box::new(Expr::Div(var(), num(2.0))), num(3.0))
        );
    }

    #[test]
    fn numbers_constants_and_functions() {
        assert_eq!(parse("1.5e-3").unwrap(), Expr::real(1.5e-3));
        assert_eq!(parse(".5").unwrap(), Expr::real(0.5));
        assert_eq!(parse("2j").unwrap(), Expr::Const(Complex64::new(0.0, 2.0)));
        assert_eq!(parse("I").unwrap(), Expr::Const(Complex64::new(0.0, 1.0)));
        assert_eq!(parse("pi").unwrap(), Expr::real(PI));
        assert_eq!(
            parse("2*e").unwrap(),
            Expr::Mul(num(2.0), Box::new(Expr::real(E)))
        );
        assert_eq!(
            parse("ln(z)").unwrap(),
            Expr::Call(Func::Log, var())
        );
        assert_eq!(
            parse(" sin( z ) ").unwrap(),
            Expr::Call(Func::Sin, var())
        );
    }

    #[test]
    fn rejects_malformed_text() {
        for text in [
            "", "   ", "z**", "z +* 1", "(z - 1", "z - 1)", "sin z", "foo(z)", "x + 1", "z $ 2",
            "1.2.3", "z z",
        ] {
            assert!(parse(text).is_err(), "{:?} should not parse", text);
        }
    }

    #[test]
    fn error_reports_offset() {
        let err = parse("z**3 + w").unwrap_err();
        assert_eq!(err.offset, 7);
        assert!(err.message.contains("'w'"), "{}", err.message);

        let err = parse("(z - 1").unwrap_err();
        assert_eq!(err.offset, 6);
    }

    fn assert_too_deep(text: &str) {
        let err = parse(text).unwrap_err();
        assert_eq!(err.message, "expression nested too deeply");
    }

    #[test]
    fn rejects_runaway_nesting() {
        assert_too_deep(&format!("{}z", "-".repeat(100_000)));
        assert_too_deep(&format!("{}z", "(".repeat(100_000)));
        assert_too_deep(&format!("{}z{}", "sin(".repeat(10_000), ")".repeat(10_000)));
        assert_too_deep(&format!("z{}", "**z".repeat(10_000)));
    }

    #[test]
    fn rejects_runaway_chains() {
        assert_too_deep(&format!("z{}", " + z".repeat(100_000)));
        assert_too_deep(&format!("z{}", " * z".repeat(100_000)));
    }

    #[test]
    fn moderate_nesting_is_fine() {
        let text = format!("{}z{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse(&text).unwrap(), Expr::Var);
        let signs = format!("{}z", "-".repeat(100));
        assert_eq!(parse(&signs).unwrap().eval(Complex64::new(2.0, 0.0)), Complex64::new(2.0, 0.0));
        let sum = format!("z{}", " + 1".repeat(200));
        let value = parse(&sum).unwrap().eval(Complex64::new(0.0, 0.0));
        assert_eq!(value, Complex64::new(200.0, 0.0));
    }

    #[test]
    fn deepest_tree_survives_later_passes() {
        let text = format!("{}z{}", "sin(".repeat(MAX_DEPTH - 1), ")".repeat(MAX_DEPTH - 1));
        let expr = parse(&text).unwrap();
        let z = Complex64::new(0.1, 0.2);
        let derivative = expr.derive();
        assert!(derivative.compile().eval(z).is_finite());
        assert_eq!(parse(&expr.to_string()).unwrap(), expr);
        assert!(expr.to_polynomial().is_none());
    }
}
