//! The expression of the default rule.
//!
//! ```text
//! x                // the current state
//! 42               // integer literals
//! a + b, a - b     // lowest precedence, left-associative
//! a * b, a / b     // left-associative, `/` truncates toward zero
//! -a, (a)
//! ```

use crate::{
    cells::State,
    error::{EvalError, ExprError},
};
use std::fmt::{self, Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    fn symbol(self) -> char {
        match self {
            BinOp::Add => '+',
            BinOp::Sub => '-',
            BinOp::Mul => '*',
            BinOp::Div => '/',
        }
    }

    fn apply(self, lhs: i64, rhs: i64) -> Result<i64, EvalError> {
        let result = match self {
            BinOp::Add => lhs.checked_add(rhs),
            BinOp::Sub => lhs.checked_sub(rhs),
            BinOp::Mul => lhs.checked_mul(rhs),
            BinOp::Div => {
                if rhs == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                lhs.checked_div(rhs)
            }
        };
        result.ok_or(EvalError::Overflow)
    }
}

/// An expression tree over the current state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    /// An integer literal.
    Num(i64),
    /// The current state, written `x`.
    Var,
    /// Negation.
    Neg(Box<Expr>),
    /// A binary operation.
    BinOp(BinOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Parses an expression.
    pub fn parse(input: &str) -> Result<Self, ExprError> {
        let mut parser = Parser::new(input)?;
        let expr = parser.parse_add_sub()?;
        match parser.current {
            Token::Eof => Ok(expr),
            token => Err(ExprError::UnexpectedToken(token.to_string())),
        }
    }

    /// Evaluates the expression with `x` bound to `state`.
    pub fn eval(&self, state: State) -> Result<i64, EvalError> {
        match self {
            Expr::Num(n) => Ok(*n),
            Expr::Var => Ok(state.0 as i64),
            Expr::Neg(inner) => inner.eval(state)?.checked_neg().ok_or(EvalError::Overflow),
            Expr::BinOp(op, lhs, rhs) => op.apply(lhs.eval(state)?, rhs.eval(state)?),
        }
    }

    /// Evaluates the expression and converts the result to a state.
    pub fn eval_state(&self, state: State) -> Result<State, EvalError> {
        let value = self.eval(state)?;
        i32::try_from(value)
            .map(State)
            .map_err(|_| EvalError::Overflow)
    }
}

/// Prints binary operations fully parenthesized,
/// so that the output parses back to the same tree.
impl Display for Expr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Expr::Num(n) => write!(f, "{}", n),
            Expr::Var => write!(f, "x"),
            Expr::Neg(inner) => write!(f, "-{}", inner),
            Expr::BinOp(op, lhs, rhs) => write!(f, "({} {} {})", lhs, op.symbol(), rhs),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
    Number(i64),
    Var,
    Op(BinOp),
    LParen,
    RParen,
    Eof,
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Var => write!(f, "x"),
            Token::Op(op) => write!(f, "{}", op.symbol()),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Eof => write!(f, "end of expression"),
        }
    }
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_while<P: Fn(char) -> bool>(&mut self, pred: P) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek_char().filter(|&c| pred(c)) {
            self.pos += c.len_utf8();
        }
        &self.input[start..self.pos]
    }

    fn next_token(&mut self) -> Result<Token, ExprError> {
        self.skip_while(char::is_whitespace);

        let Some(c) = self.peek_char() else {
            return Ok(Token::Eof);
        };

        let token = match c {
            '+' => Token::Op(BinOp::Add),
            '-' => Token::Op(BinOp::Sub),
            '*' => Token::Op(BinOp::Mul),
            '/' => Token::Op(BinOp::Div),
            '(' => Token::LParen,
            ')' => Token::RParen,
            '0'..='9' => {
                let digits = self.skip_while(|c| c.is_ascii_digit());
                let n = digits
                    .parse()
                    .map_err(|_| ExprError::InvalidNumber(digits.to_string()))?;
                return Ok(Token::Number(n));
            }
            c if c.is_alphabetic() || c == '_' => {
                let ident = self.skip_while(|c| c.is_alphanumeric() || c == '_');
                if ident.eq_ignore_ascii_case("x") {
                    return Ok(Token::Var);
                }
                return Err(ExprError::UnknownVariable(ident.to_string()));
            }
            c => return Err(ExprError::UnexpectedChar(c)),
        };
        self.pos += c.len_utf8();
        Ok(token)
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self, ExprError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Parser { lexer, current })
    }

    fn advance(&mut self) -> Result<(), ExprError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn parse_add_sub(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_mul_div()?;
        while let Token::Op(op @ (BinOp::Add | BinOp::Sub)) = self.current {
            self.advance()?;
            let right = self.parse_mul_div()?;
            left = Expr::BinOp(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_mul_div(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_unary()?;
        while let Token::Op(op @ (BinOp::Mul | BinOp::Div)) = self.current {
            self.advance()?;
            let right = self.parse_unary()?;
            left = Expr::BinOp(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if self.current == Token::Op(BinOp::Sub) {
            self.advance()?;
            // Negative literals are stored as literals.
            return match self.parse_unary()? {
                Expr::Num(n) => n
                    .checked_neg()
                    .map(Expr::Num)
                    .ok_or_else(|| ExprError::InvalidNumber(format!("-{}", n))),
                inner => Ok(Expr::Neg(Box::new(inner))),
            };
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        match self.current {
            Token::Number(n) => {
                self.advance()?;
                Ok(Expr::Num(n))
            }
            Token::Var => {
                self.advance()?;
                Ok(Expr::Var)
            }
            Token::LParen => {
                self.advance()?;
                let inner = self.parse_add_sub()?;
                if self.current != Token::RParen {
                    return Err(match self.current {
                        Token::Eof => ExprError::UnexpectedEnd,
                        token => ExprError::UnexpectedToken(token.to_string()),
                    });
                }
                self.advance()?;
                Ok(inner)
            }
            Token::Eof => Err(ExprError::UnexpectedEnd),
            token => Err(ExprError::UnexpectedToken(token.to_string())),
        }
    }
}
