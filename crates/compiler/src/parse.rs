// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Recursive descent from lock text to a [`LockExpr`].
//!
//! ```text
//! Expr     := AndExpr ('|' AndExpr)*
//! AndExpr  := Atom ('&' Atom)*
//! Atom     := '(' Expr ')' | '!' Atom | '@' Indirect | ['=' | '+']? Primary
//! Indirect := '(' ObjRef ('=' AttrPattern)? ')' | ObjRef
//! Primary  := digits | AttrPattern | ObjRef
//! ```
//!
//! Parsing never fails. A `)` with no open group is skipped, and the first thing that is not an
//! operator where one is expected ends the expression; whatever follows is ignored. Operator
//! chains are collected in a loop; only `(` and `!` nest, and past [`MAX_NESTING`] of them the
//! rest of the text is dropped in favour of a [`LockExpr::TooDeep`] leaf.

use crate::ast::{LockExpr, RefKind};
use crate::lexer::{AND_TOKEN, AT_TOKEN, CARRY_TOKEN, Cursor, IS_TOKEN, NOT_TOKEN, OR_TOKEN};
use muse_common::util::leading_int;

/// How many `(` and `!` may enclose one another.
pub const MAX_NESTING: usize = 64;

struct Parser<'a> {
    cursor: Cursor<'a>,
    groups: usize,
    nesting: usize,
}

/// Parse lock text (with any `[...]` calls already expanded).
#[must_use]
pub fn parse_lock(text: &str) -> LockExpr {
    let mut parser = Parser {
        cursor: Cursor::new(text),
        groups: 0,
        nesting: 0,
    };
    parser.or_expr()
}

impl Parser<'_> {
    fn or_expr(&mut self) -> LockExpr {
        let mut terms = vec![self.and_expr()];
        while self.operator(OR_TOKEN) {
            terms.push(self.and_expr());
        }
        LockExpr::or(terms)
    }

    fn and_expr(&mut self) -> LockExpr {
        let mut terms = vec![self.atom()];
        while self.operator(AND_TOKEN) {
            terms.push(self.atom());
        }
        LockExpr::and(terms)
    }

    fn operator(&mut self, op: char) -> bool {
        self.cursor.skip_whitespace();
        if self.groups == 0 {
            while self.cursor.eat(')') {
                self.cursor.skip_whitespace();
            }
        }
        self.cursor.eat(op)
    }

    fn atom(&mut self) -> LockExpr {
        self.cursor.skip_whitespace();
        match self.cursor.peek() {
            Some('(' | NOT_TOKEN) if self.nesting >= MAX_NESTING => {
                self.cursor.skip_to_end();
                LockExpr::TooDeep
            }
            Some('(') => {
                self.cursor.bump();
                self.groups += 1;
                self.nesting += 1;
                let inner = self.or_expr();
                self.cursor.skip_whitespace();
                self.cursor.eat(')');
                self.groups -= 1;
                self.nesting -= 1;
                inner
            }
            Some(NOT_TOKEN) => {
                self.cursor.bump();
                self.nesting += 1;
                let inner = self.atom();
                self.nesting -= 1;
                LockExpr::not(inner)
            }
            Some(AT_TOKEN) => {
                self.cursor.bump();
                self.indirect()
            }
            _ => self.primary(),
        }
    }

    fn indirect(&mut self) -> LockExpr {
        self.cursor.skip_whitespace();
        if !self.cursor.eat('(') {
            return LockExpr::Indirect(self.reference());
        }
        let target = self.reference();
        let expr = if self.cursor.eat(IS_TOKEN) {
            self.cursor.skip_whitespace();
            let test = self
                .cursor
                .attr_test()
                .map(|(name, pattern)| (name.trim().to_string(), pattern.trim().to_string()));
            LockExpr::IndirectAttr { target, test }
        } else {
            LockExpr::IndirectLock(target)
        };
        self.cursor.skip_whitespace();
        self.cursor.eat(')');
        expr
    }

    fn primary(&mut self) -> LockExpr {
        let kind = if self.cursor.eat(IS_TOKEN) {
            RefKind::Is
        } else if self.cursor.eat(CARRY_TOKEN) {
            RefKind::Carry
        } else {
            RefKind::Any
        };
        self.cursor.skip_whitespace();

        if self.cursor.peek().is_some_and(|c| c.is_ascii_digit()) {
            return LockExpr::Number(leading_int(self.cursor.digits()));
        }
        if let Some((name, pattern)) = self.cursor.attr_test() {
            return LockExpr::AttrTest {
                name: name.trim().to_string(),
                pattern: pattern.trim().to_string(),
            };
        }
        LockExpr::Ref {
            kind,
            name: self.reference(),
        }
    }

    fn reference(&mut self) -> String {
        self.cursor.skip_whitespace();
        self.cursor.reference().trim_end().to_string()
    }
}
