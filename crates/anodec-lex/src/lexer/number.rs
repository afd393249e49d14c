//! Numeric literals.
//!
//! A number is an optional leading `-` (only when directly followed by a
//! digit), then digits and dots. Containing a `.` makes it a float,
//! otherwise an int. Values that do not fit the literal's type are
//! reported and replaced by an `Unexpected` token.

use anodec_util::ErrorKind;

use super::Lexer;
use crate::token::{Token, TokenKind};

impl Lexer<'_, '_> {
    pub(crate) fn extract_number(&mut self) -> Token {
        let mut number = String::new();
        number.push(self.reader.next().unwrap());
        while matches!(self.reader.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            number.push(self.reader.next().unwrap());
        }

        if !number.contains('.') {
            if number.parse::<i32>().is_err() {
                let span = self.span_for_current_token();
                self.errors.error(
                    ErrorKind::InvalidLiteralInt32,
                    span,
                    format!("Invalid literal int '{}'", number),
                );
                return self.token(TokenKind::Unexpected, &number);
            }
            self.token(TokenKind::LiteralInt, &number)
        } else {
            match number.parse::<f32>() {
                Ok(value) if value.is_finite() => self.token(TokenKind::LiteralFloat, &number),
                _ => {
                    let span = self.span_for_current_token();
                    self.errors.error(
                        ErrorKind::InvalidLiteralFloat,
                        span,
                        format!("Invalid literal float '{}'", number),
                    );
                    self.token(TokenKind::Unexpected, &number)
                }
            }
        }
    }
}
