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

//! Turning a stored lock back into something a player can read and edit.

use crate::compile::BoundedText;
use crate::lexer::{Cursor, is_left_delimiter, is_right_delimiter};
use muse_common::matching::{MatchEnvironment, MatchResult, ObjectNameMatcher};
use muse_db::World;
use muse_var::{NOTHING, Obj};

/// Whether `name` would come through the tokenizer as a single plain word.
fn is_plain_word(name: &str) -> bool {
    !name.is_empty()
        && name.trim() == name
        && !name.starts_with(['#', '*'])
        && !name
            .chars()
            .any(|c| is_left_delimiter(c) || is_right_delimiter(Some(c)) || c == '[' || c == ']')
}

/// How `obj` is shown to `viewer`: its name when typing that name back would find the same
/// object again, `#n` otherwise.
fn render_object(world: &World, matcher: &dyn ObjectNameMatcher, viewer: Obj, obj: Obj) -> String {
    if world.record_any(obj).is_err() {
        return world.unparse_object(viewer, NOTHING);
    }
    let name = world
        .get_names(&obj)
        .ok()
        .and_then(|names| names.into_iter().next())
        .map(|n| n.trim().to_string())
        .unwrap_or_default();
    let round_trips = is_plain_word(&name)
        && matches!(matcher.match_object(viewer, &name), Ok(MatchResult::Found(found)) if found == obj);
    if round_trips {
        name
    } else {
        obj.to_literal()
    }
}

fn render_word(world: &World, matcher: &dyn ObjectNameMatcher, viewer: Obj, word: &str) -> String {
    match parse_dbref(word.trim()) {
        Some(obj) => render_object(world, matcher, viewer, obj),
        None => word.to_string(),
    }
}

/// `#digits`, with nothing else.
fn parse_dbref(word: &str) -> Option<Obj> {
    let digits = word.strip_prefix('#')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse::<i32>().map_or(NOTHING, Obj::mk_id))
}

/// Render a compiled lock for `viewer`. Object numbers in object position become names where
/// that is unambiguous; numbers past the end of the world become `*NOTHING*`. Attribute names,
/// patterns and `[...]` calls are copied as they are.
#[must_use]
pub fn decompile(
    world: &World,
    matcher: &dyn ObjectNameMatcher,
    viewer: Obj,
    text: &str,
    buffer_len: usize,
) -> String {
    let mut out = BoundedText::new(buffer_len.saturating_sub(1));
    let mut cursor = Cursor::new(text);

    while !cursor.at_end() && !out.is_full() {
        out.push_str(cursor.left_delimiters());
        let word = cursor.word();
        match cursor.peek() {
            Some(':') => {
                out.push_str(word.text);
                cursor.bump();
                out.push(':');
                out.push_str(cursor.word().text);
            }
            Some('.') => {
                out.push_str(&render_word(world, matcher, viewer, word.text));
                cursor.bump();
                out.push('.');
                out.push_str(cursor.word().text);
                if cursor.eat(':') {
                    out.push(':');
                    out.push_str(cursor.word().text);
                }
            }
            _ if word.is_function => out.push_str(word.text),
            _ => out.push_str(&render_word(world, matcher, viewer, word.text)),
        }
        out.push_str(cursor.right_delimiters());
    }
    out.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;
    use crate::compile::tests::setup;
    use muse_common::matching::DefaultObjectNameMatcher;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_numbers_become_names() {
        let s = setup();
        let matcher = DefaultObjectNameMatcher::new(&s.world);
        let text = format!("{}|+{}&{}.color:#9", s.bob, s.lamp, s.lamp);
        assert_eq!(
            decompile(&s.world, &matcher, s.alice, &text, 8192),
            "Bob|+lamp&lamp.color:#9"
        );
    }

    #[test]
    fn test_out_of_range_is_nothing() {
        let s = setup();
        let matcher = DefaultObjectNameMatcher::new(&s.world);
        assert_eq!(
            decompile(&s.world, &matcher, s.alice, "#999|#-1", 8192),
            "*NOTHING*|#-1"
        );
    }

    #[test]
    fn test_unreachable_objects_stay_numeric() {
        let s = setup();
        let matcher = DefaultObjectNameMatcher::new(&s.world);
        // Bob cannot see the lamp Alice is carrying, so the name would not find it again.
        let text = s.lamp.to_literal();
        assert_eq!(decompile(&s.world, &matcher, s.bob, &text, 8192), text);
    }

    #[test]
    fn test_functions_and_patterns_copied() {
        let s = setup();
        let matcher = DefaultObjectNameMatcher::new(&s.world);
        assert_eq!(
            decompile(&s.world, &matcher, s.alice, "[name(#1)]|sex:#2*", 8192),
            "[name(#1)]|sex:#2*"
        );
    }

    #[test]
    fn test_round_trip() {
        let s = setup();
        let matcher = DefaultObjectNameMatcher::new(&s.world);
        for human in [
            "me|bob",
            "!(=bob|+lamp)&@here",
            "lamp.color:red*|sex:m*",
            "@(lamp=color:blue)",
            "[get(me,sex)]&me",
        ] {
            let compiled = compile(&s.world, &matcher, s.alice, human, 8192)
                .unwrap()
                .text;
            let shown = decompile(&s.world, &matcher, s.alice, &compiled, 8192);
            let again = compile(&s.world, &matcher, s.alice, &shown, 8192)
                .unwrap()
                .text;
            assert_eq!(again, compiled, "via {shown:?}");
        }
    }
}
