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

//! Turning the lock text a player types into the stored form, with object names replaced by
//! `#n` so the lock keeps working when names change or the player is elsewhere.

use crate::errors::CompileError;
use crate::lexer::Cursor;
use muse_common::matching::{MatchResult, ObjectNameMatcher};
use muse_db::{World, builtin_def};
use muse_var::Obj;
use tracing::{error, warn};

/// A compiled lock and the warnings raised while compiling it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompiledLock {
    pub text: String,
    pub warnings: Vec<String>,
}

/// Text that refuses to grow past a fixed number of bytes, cutting on a character boundary.
pub(crate) struct BoundedText {
    text: String,
    limit: usize,
}

impl BoundedText {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            text: String::new(),
            limit,
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.text.len() >= self.limit
    }

    pub(crate) fn push_str(&mut self, s: &str) {
        let room = self.limit.saturating_sub(self.text.len());
        if s.len() <= room {
            self.text.push_str(s);
            return;
        }
        let cut = (0..=room).rev().find(|i| s.is_char_boundary(*i)).unwrap_or(0);
        self.text.push_str(&s[..cut]);
    }

    pub(crate) fn push(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.push_str(c.encode_utf8(&mut buf));
    }

    pub(crate) fn into_string(self) -> String {
        self.text
    }
}

fn match_word(
    matcher: &dyn ObjectNameMatcher,
    actor: Obj,
    word: &str,
) -> Result<Obj, CompileError> {
    let name = word.trim();
    match matcher.match_object(actor, name) {
        Ok(MatchResult::Found(obj)) => Ok(obj),
        Ok(MatchResult::Ambiguous(_)) => Err(CompileError::AmbiguousMatch(name.to_string())),
        Ok(MatchResult::NotFound) | Err(_) => Err(CompileError::NoMatch(name.to_string())),
    }
}

/// Compile `text` on behalf of `actor`. The result is at most `buffer_len - 1` bytes.
///
/// - `attr:pattern` is kept as written; an attribute name that means nothing gets a warning.
/// - `obj.attr:pattern` has `obj` replaced by its number. The colon is required.
/// - Any other word is an object, replaced by its number, unless it holds a `[...]` call.
pub fn compile(
    world: &World,
    matcher: &dyn ObjectNameMatcher,
    actor: Obj,
    text: &str,
    buffer_len: usize,
) -> Result<CompiledLock, CompileError> {
    if !world.valid(actor) {
        error!(?actor, "lock compiled for invalid object");
        return Err(CompileError::InvalidActor(actor));
    }

    let mut out = BoundedText::new(buffer_len.saturating_sub(1));
    let mut warnings = vec![];
    let mut cursor = Cursor::new(text);

    while !cursor.at_end() && !out.is_full() {
        out.push_str(cursor.left_delimiters());
        if out.is_full() {
            break;
        }
        let word = cursor.word();
        match cursor.peek() {
            Some(':') => {
                let name = word.text.trim();
                if !word.is_function
                    && builtin_def(name).is_none()
                    && world.find_def(actor, name).is_none()
                {
                    warnings.push(format!("Warning: no such built in attribute '{name}'"));
                }
                out.push_str(word.text);
                cursor.bump();
                out.push(':');
                out.push_str(cursor.word().text);
            }
            Some('.') => {
                let thing = match_word(matcher, actor, word.text)?;
                out.push_str(&thing.to_literal());
                cursor.bump();
                out.push('.');
                let attr = cursor.word();
                let attr_name = attr.text.trim();
                if !attr.is_function && world.defined_on(thing, attr_name).is_none() {
                    warnings.push(format!("Warning: no such attribute '{attr_name}' on {thing}"));
                }
                out.push_str(attr.text);
                if !cursor.eat(':') {
                    return Err(CompileError::MissingColon);
                }
                out.push(':');
                out.push_str(cursor.word().text);
            }
            _ if word.is_function => out.push_str(word.text),
            _ => {
                let thing = match_word(matcher, actor, word.text)?;
                out.push_str(&thing.to_literal());
            }
        }
        out.push_str(cursor.right_delimiters());
    }

    for warning in &warnings {
        warn!(?actor, text, "{warning}");
    }
    Ok(CompiledLock {
        text: out.into_string(),
        warnings,
    })
}
