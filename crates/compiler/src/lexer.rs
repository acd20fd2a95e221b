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

//! Tokenizing lock text.
//!
//! What a character means depends on where it appears: `.` ends an object name but is part of
//! an attribute name being tested, and an attribute pattern runs on through `:`, `.` and `=`.
//! So rather than split the whole text up front, the [`Cursor`] hands out one token at a time
//! and the caller says what kind of token it expects next.

pub const AND_TOKEN: char = '&';
pub const OR_TOKEN: char = '|';
pub const NOT_TOKEN: char = '!';
pub const AT_TOKEN: char = '@';
pub const IS_TOKEN: char = '=';
pub const CARRY_TOKEN: char = '+';

/// Ends a word. `None` is the end of the text.
#[must_use]
pub fn is_right_delimiter(c: Option<char>) -> bool {
    matches!(c, None | Some(AND_TOKEN | OR_TOKEN | ':' | '.' | ')' | '='))
}

/// Prefixes a word.
#[must_use]
pub fn is_left_delimiter(c: char) -> bool {
    matches!(c, NOT_TOKEN | '(' | AT_TOKEN | IS_TOKEN | CARRY_TOKEN)
}

/// A run of text between delimiters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Word<'a> {
    pub text: &'a str,
    /// Contains a `[...]` function call, and so must be left exactly as written.
    pub is_function: bool,
}

/// A position in an immutable lock text.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume `c` if it is next.
    pub fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    #[must_use]
    pub fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// Give up on the rest of the text.
    pub fn skip_to_end(&mut self) {
        self.pos = self.text.len();
    }

    pub fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn take_while(&mut self, mut pred: impl FnMut(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(_, c)| !pred(*c))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += len;
        &rest[..len]
    }

    /// Consume a run of `! ( @ = +`.
    pub fn left_delimiters(&mut self) -> &'a str {
        self.take_while(is_left_delimiter)
    }

    /// Consume a run of `& | : . ) =`.
    pub fn right_delimiters(&mut self) -> &'a str {
        self.take_while(|c| is_right_delimiter(Some(c)))
    }

    /// Consume up to the next right delimiter. A `[` swallows everything up to its `]`,
    /// delimiters included.
    pub fn word(&mut self) -> Word<'a> {
        let start = self.pos;
        let mut is_function = false;
        while !is_right_delimiter(self.peek()) {
            if self.peek() == Some('[') {
                is_function = true;
                self.take_while(|c| c != ']');
            } else {
                self.bump();
            }
        }
        Word {
            text: &self.text[start..self.pos],
            is_function,
        }
    }

    /// An object name: up to the next right delimiter, not trimmed.
    pub fn reference(&mut self) -> &'a str {
        self.take_while(|c| !is_right_delimiter(Some(c)))
    }

    /// A run of ASCII digits.
    pub fn digits(&mut self) -> &'a str {
        self.take_while(|c| c.is_ascii_digit())
    }

    /// `name:pattern`, where the name may contain dots and the pattern runs to `&`, `|`, `)` or
    /// the end. Nothing is consumed unless a colon ends the name.
    pub fn attr_test(&mut self) -> Option<(&'a str, &'a str)> {
        let rest = self.rest();
        let name_len = rest
            .char_indices()
            .find(|(_, c)| *c != '.' && is_right_delimiter(Some(*c)))
            .map_or(rest.len(), |(i, _)| i);
        if !rest[name_len..].starts_with(':') {
            return None;
        }
        let name = &rest[..name_len];
        self.pos += name_len + 1;
        let pattern = self.take_while(|c| !matches!(c, AND_TOKEN | OR_TOKEN | ')'));
        Some((name, pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_words_stop_at_right_delimiters() {
        let mut cursor = Cursor::new("foo bar&baz");
        assert_eq!(
            cursor.word(),
            Word {
                text: "foo bar",
                is_function: false
            }
        );
        assert_eq!(cursor.right_delimiters(), "&");
        assert_eq!(cursor.word().text, "baz");
        assert!(cursor.at_end());
    }

    #[test]
    fn test_function_words_swallow_delimiters() {
        let mut cursor = Cursor::new("[get(me,sex)]x|y");
        let word = cursor.word();
        assert_eq!(word.text, "[get(me,sex)]x");
        assert!(word.is_function);
        assert_eq!(cursor.peek(), Some('|'));
    }

    #[test]
    fn test_left_delimiters() {
        let mut cursor = Cursor::new("!(@(me)");
        assert_eq!(cursor.left_delimiters(), "!(@(");
        assert_eq!(cursor.word().text, "me");
        assert_eq!(cursor.right_delimiters(), ")");
    }

    #[test]
    fn test_attr_test_needs_colon() {
        let mut cursor = Cursor::new("#5.color:re*d&#3");
        assert_eq!(cursor.attr_test(), Some(("#5.color", "re*d")));
        assert_eq!(cursor.rest(), "&#3");

        let mut cursor = Cursor::new("#5.color&#3");
        assert_eq!(cursor.attr_test(), None);
        assert_eq!(cursor.rest(), "#5.color&#3");
    }

    #[test]
    fn test_pattern_runs_through_colons_and_equals() {
        let mut cursor = Cursor::new("desc:a=b:c.d)|1");
        assert_eq!(cursor.attr_test(), Some(("desc", "a=b:c.d")));
        assert_eq!(cursor.rest(), ")|1");
    }

    #[test]
    fn test_reference_and_digits() {
        let mut cursor = Cursor::new("12x");
        assert_eq!(cursor.digits(), "12");
        assert_eq!(cursor.rest(), "x");

        let mut cursor = Cursor::new("#12=foo");
        assert_eq!(cursor.reference(), "#12");
        assert!(cursor.eat('='));
    }
}
