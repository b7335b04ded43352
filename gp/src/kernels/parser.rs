//! Recursive descent parser of kernel expressions.
//!
//! ```text
//! expr  := ident | ident '(' expr (',' expr)* ')'
//! ident := [A-Za-z0-9_]+
//! ```
//!
//! The parser only checks the syntax, name resolution and arity are the
//! factory concern.
use crate::errors::{GpError, Result};

/// Parsed kernel expression, borrowing its identifiers from the source text
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum KernelExpr<'a> {
    Name(&'a str),
    Call(&'a str, Vec<KernelExpr<'a>>),
}

pub(crate) fn parse_kernel_expression(src: &str) -> Result<KernelExpr<'_>> {
    let mut parser = Parser { src, pos: 0 };
    let expr = parser.expr()?;
    parser.skip_whitespace();
    if parser.pos != src.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(expr)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn expr(&mut self) -> Result<KernelExpr<'a>> {
        self.skip_whitespace();
        let name = self.ident()?;
        self.skip_whitespace();
        if !self.eat(b'(') {
            return Ok(KernelExpr::Name(name));
        }
        let mut args = vec![self.expr()?];
        loop {
            self.skip_whitespace();
            if self.eat(b',') {
                args.push(self.expr()?);
            } else if self.eat(b')') {
                return Ok(KernelExpr::Call(name, args));
            } else {
                return Err(self.error("expected ',' or ')'"));
            }
        }
    }

    fn ident(&mut self) -> Result<&'a str> {
        let start = self.pos;
        while self
            .peek()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected a kernel name"));
        }
        Ok(&self.src[start..self.pos])
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, |c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn error(&self, msg: &str) -> GpError {
        GpError::StructureError(format!(
            "{} at position {} in '{}'",
            msg, self.pos, self.src
        ))
    }
}
