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

use crate::env::FunctionEvaluator;
use muse_var::Obj;
use tracing::trace;

/// Cut `text` to at most `limit` bytes without splitting a character.
pub(crate) fn truncate_to(text: &mut String, limit: usize) {
    if text.len() <= limit {
        return;
    }
    let cut = (0..=limit)
        .rev()
        .find(|i| text.is_char_boundary(*i))
        .unwrap_or(0);
    text.truncate(cut);
}

/// Replace every `[...]` call in `text` with what `functions` makes of it. `actor` is the doer;
/// `privs` is the object whose privileges the calls run with. The result is held under
/// `buffer_len` bytes.
#[must_use]
pub fn expand(
    functions: &dyn FunctionEvaluator,
    text: &str,
    actor: Obj,
    privs: Obj,
    buffer_len: usize,
) -> String {
    let limit = buffer_len.saturating_sub(1);
    let mut out = String::with_capacity(text.len().min(limit));
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        if out.len() >= limit {
            break;
        }
        let call = &rest[open + 1..];
        let result = functions.evaluate(call, actor, privs);
        trace!(?actor, ?privs, call, output = %result.output, "expanded function call");
        out.push_str(&result.output);

        let mut consumed = result.consumed.min(call.len());
        while !call.is_char_boundary(consumed) {
            consumed += 1;
        }
        rest = &call[consumed..];
        rest = rest.strip_prefix(']').unwrap_or(rest);
    }
    out.push_str(rest);
    truncate_to(&mut out, limit);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{FunctionOutput, PassthroughEvaluator};
    use muse_var::NOTHING;
    use pretty_assertions::assert_eq;

    /// Answers `[me]` with the actor's number and `[priv]` with the privileged object's.
    struct Identity;

    impl FunctionEvaluator for Identity {
        fn evaluate(&self, text: &str, actor: Obj, privs: Obj) -> FunctionOutput {
            let (output, consumed) = if text.starts_with("me") {
                (actor.to_literal(), 2)
            } else if text.starts_with("priv") {
                (privs.to_literal(), 4)
            } else {
                (String::new(), text.find(']').unwrap_or(text.len()))
            };
            FunctionOutput { output, consumed }
        }
    }

    #[test]
    fn test_calls_are_replaced() {
        let actor = Obj::mk_id(4);
        let privs = Obj::mk_id(7);
        assert_eq!(
            expand(&Identity, "=[me]|@[priv]", actor, privs, 8192),
            "=#4|@#7"
        );
        assert_eq!(expand(&Identity, "[junk]1", actor, privs, 8192), "1");
    }

    #[test]
    fn test_text_without_calls_is_unchanged() {
        assert_eq!(
            expand(&PassthroughEvaluator, "#1&sex:m*", NOTHING, NOTHING, 8192),
            "#1&sex:m*"
        );
    }

    #[test]
    fn test_passthrough_strips_brackets() {
        assert_eq!(
            expand(&PassthroughEvaluator, "[a[b]]&1", NOTHING, NOTHING, 8192),
            "a[b]&1"
        );
    }

    #[test]
    fn test_unterminated_call() {
        assert_eq!(
            expand(&PassthroughEvaluator, "1|[open", NOTHING, NOTHING, 8192),
            "1|open"
        );
    }

    #[test]
    fn test_output_is_bounded() {
        let text = "[me]".repeat(100);
        let expanded = expand(&Identity, &text, Obj::mk_id(12345), NOTHING, 32);
        assert!(expanded.len() <= 31);
        assert!(expanded.starts_with("#12345#12345"));
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        let mut text = "ééé".to_string();
        truncate_to(&mut text, 3);
        assert_eq!(text, "é");
    }
}
