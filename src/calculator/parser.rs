//! Recursive-descent parser and tree evaluator for canonical expressions.
//!
//! Precedence, lowest to highest:
//! 1. `+` `-` (left-associative)
//! 2. `*` `/` (left-associative)
//! 3. unary `-` `+`
//! 4. `^` (right-associative; its right operand may itself be unary, so
//!    `2^-1` parses and `-2^2` is `-(2^2)`)
//! 5. numbers, constants, function calls, parentheses

use super::error::EvaluationError;
use super::lexer::Token;

/// Longest token stream accepted. Bounds the depth of left-leaning chains
/// such as `1+1+1+...`, which the parser builds without recursing.
const MAX_TOKENS: usize = 1024;

/// Deepest nesting of parentheses, calls, signs and exponents accepted.
const MAX_DEPTH: usize = 256;

/// Functions callable from an expression, by canonical name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Sqrt,
    Log10,
    Ln,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Self::Sin),
            "cos" => Some(Self::Cos),
            "tan" => Some(Self::Tan),
            "sqrt" => Some(Self::Sqrt),
            "log10" => Some(Self::Log10),
            "ln" => Some(Self::Ln),
            _ => None,
        }
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Sqrt => x.sqrt(),
            Self::Log10 => x.log10(),
            Self::Ln => x.ln(),
        }
    }
}

fn constant(name: &str) -> Option<f64> {
    match name {
        "e" => Some(std::f64::consts::E),
        "pi" => Some(std::f64::consts::PI),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(Function, Box<Expr>),
}

impl Expr {
    /// Evaluate the tree in double precision. Non-finite values are
    /// propagated; classification happens at the top level.
    pub fn eval(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Neg(inner) => -inner.eval(),
            Self::Binary(op, lhs, rhs) => {
                let (a, b) = (lhs.eval(), rhs.eval());
                match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    BinaryOp::Pow => a.powf(b),
                }
            }
            Self::Call(func, arg) => func.apply(arg.eval()),
        }
    }
}

/// Parse a token stream into an expression tree.
pub fn parse(tokens: &[Token]) -> Result<Expr, EvaluationError> {
    if tokens.len() > MAX_TOKENS {
        return Err(EvaluationError::new(format!(
            "expression has more than {} tokens",
            MAX_TOKENS
        )));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(tok) => Err(EvaluationError::new(format!(
            "unexpected {:?} after complete expression",
            tok
        ))),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<Expr, EvaluationError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn term(&mut self) -> Result<Expr, EvaluationError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    /// Every recursive path of the grammar passes through here, so this is
    /// where nesting is counted.
    fn unary(&mut self) -> Result<Expr, EvaluationError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvaluationError::new("expression nested too deeply"));
        }
        self.depth += 1;
        let expr = self.signed();
        self.depth -= 1;
        expr
    }

    fn signed(&mut self) -> Result<Expr, EvaluationError> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        if self.eat(&Token::Plus) {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr, EvaluationError> {
        let base = self.primary()?;
        if self.eat(&Token::Caret) {
            let exponent = self.unary()?;
            return Ok(Expr::Binary(
                BinaryOp::Pow,
                Box::new(base),
                Box::new(exponent),
            ));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, EvaluationError> {
        match self.bump() {
            Some(Token::Number(n)) => Ok(Expr::Number(*n)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                if !self.eat(&Token::RParen) {
                    return Err(EvaluationError::new("missing closing parenthesis"));
                }
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                if let Some(func) = Function::from_name(name) {
                    if !self.eat(&Token::LParen) {
                        return Err(EvaluationError::new(format!(
                            "function '{}' must be followed by '('",
                            name
                        )));
                    }
                    let arg = self.expr()?;
                    if !self.eat(&Token::RParen) {
                        return Err(EvaluationError::new(format!(
                            "missing ')' after argument of '{}'",
                            name
                        )));
                    }
                    return Ok(Expr::Call(func, Box::new(arg)));
                }
                constant(name)
                    .map(Expr::Number)
                    .ok_or_else(|| EvaluationError::new(format!("unknown name '{}'", name)))
            }
            Some(tok) => Err(EvaluationError::new(format!("unexpected {:?}", tok))),
            None => Err(EvaluationError::new("unexpected end of expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::lexer::tokenize;

    fn eval(input: &str) -> Result<f64, EvaluationError> {
        let tokens = tokenize(input)?;
        Ok(parse(&tokens)?.eval())
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2+3*4").unwrap(), 14.0);
        assert_eq!(eval("(2+3)*4").unwrap(), 20.0);
        assert_eq!(eval("10-4-3").unwrap(), 3.0);
        assert_eq!(eval("16/4/2").unwrap(), 2.0);
        assert_eq!(eval("2*3^2").unwrap(), 18.0);
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(eval("2^3^2").unwrap(), 512.0);
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(eval("-2^2").unwrap(), -4.0);
        assert_eq!(eval("(-2)^2").unwrap(), 4.0);
        assert_eq!(eval("2^-1").unwrap(), 0.5);
        assert_eq!(eval("3--2").unwrap(), 5.0);
        assert_eq!(eval("-3*-2").unwrap(), 6.0);
        assert_eq!(eval("+4").unwrap(), 4.0);
    }

    #[test]
    fn test_functions_and_constants() {
        assert_eq!(eval("sqrt(16)").unwrap(), 4.0);
        assert_eq!(eval("log10(1000)").unwrap(), 3.0);
        assert_eq!(eval("ln(e)").unwrap(), 1.0);
        assert_eq!(eval("sin(0)").unwrap(), 0.0);
        assert_eq!(eval("cos(0)").unwrap(), 1.0);
        assert!((eval("cos(pi)").unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_malformed_expressions() {
        assert!(eval("(2+3").is_err());
        assert!(eval("2+3)").is_err());
        assert!(eval("2+").is_err());
        assert!(eval("*2").is_err());
        assert!(eval("2 3").is_err());
        assert!(eval("2(3)").is_err());
        assert!(eval("sqrt 4").is_err());
        assert!(eval("foo(1)").is_err());
        assert!(eval("()").is_err());
    }

    #[test]
    fn test_deep_nesting_is_error() {
        let shallow = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(eval(&shallow).unwrap(), 1.0);

        for n in [300, 2000, 50_000] {
            let nested = format!("{}1{}", "(".repeat(n), ")".repeat(n));
            assert!(eval(&nested).is_err(), "depth {n}");
        }
        assert!(eval(&format!("{}1", "-".repeat(300))).is_err());
        assert!(eval(&format!("{}1", "-".repeat(200_000))).is_err());
        assert!(eval(&format!("{}2", "2^".repeat(300))).is_err());
        let calls = format!("{}4{}", "sqrt(".repeat(300), ")".repeat(300));
        assert!(eval(&calls).is_err());
    }

    #[test]
    fn test_long_chains() {
        let sum = format!("{}1", "1+".repeat(500));
        assert_eq!(eval(&sum).unwrap(), 501.0);
        assert!(eval(&format!("{}1", "1+".repeat(100_000))).is_err());
    }

    #[test]
    fn test_non_finite_values_propagate() {
        assert!(eval("5/0").unwrap().is_infinite());
        assert!(eval("sqrt(-1)").unwrap().is_nan());
    }
}
