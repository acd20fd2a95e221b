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

//! What the lock code needs from the rest of the server: a way to run `[...]` function calls,
//! and a way to tell players things.

use muse_var::Obj;
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Result of running one function call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FunctionOutput {
    pub output: String,
    /// Bytes of input used, not counting the closing `]`.
    pub consumed: usize,
}

/// Runs the function calls embedded in lock text.
pub trait FunctionEvaluator {
    /// `text` is everything after a `[`. Evaluate the call it starts with `actor` as the doer and
    /// `privs` as the object whose privileges apply.
    fn evaluate(&self, text: &str, actor: Obj, privs: Obj) -> FunctionOutput;
}

/// Leaves calls unevaluated: `[text]` expands to `text`. Nested brackets are balanced.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassthroughEvaluator;

impl FunctionEvaluator for PassthroughEvaluator {
    fn evaluate(&self, text: &str, _actor: Obj, _privs: Obj) -> FunctionOutput {
        let mut depth = 0usize;
        let end = text
            .char_indices()
            .find(|(_, c)| match c {
                '[' => {
                    depth += 1;
                    false
                }
                ']' if depth == 0 => true,
                ']' => {
                    depth -= 1;
                    false
                }
                _ => false,
            })
            .map_or(text.len(), |(i, _)| i);
        FunctionOutput {
            output: text[..end].to_string(),
            consumed: end,
        }
    }
}

/// Delivers messages to players.
pub trait Notifier {
    fn notify(&self, player: Obj, message: &str);
}

/// Sends every message to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, player: Obj, message: &str) {
        info!(?player, message, "notify");
    }
}

/// Keeps every message, for inspection later.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(Obj, String)>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<(Obj, String)> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages sent to `player`, oldest first.
    #[must_use]
    pub fn messages_for(&self, player: Obj) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(p, _)| *p == player)
            .map(|(_, m)| m)
            .collect()
    }

    pub fn clear(&self) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, player: Obj, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((player, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muse_var::NOTHING;
    use test_case::test_case;

    #[test_case("get(me,sex)]rest", "get(me,sex)", 11; "simple")]
    #[test_case("a[b]c]d", "a[b]c", 5; "nested")]
    #[test_case("unterminated", "unterminated", 12; "no close")]
    #[test_case("]", "", 0; "empty call")]
    fn test_passthrough(text: &str, output: &str, consumed: usize) {
        assert_eq!(
            PassthroughEvaluator.evaluate(text, NOTHING, NOTHING),
            FunctionOutput {
                output: output.to_string(),
                consumed
            }
        );
    }

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Obj::mk_id(1), "one");
        notifier.notify(Obj::mk_id(2), "two");
        notifier.notify(Obj::mk_id(1), "three");
        assert_eq!(notifier.messages_for(Obj::mk_id(1)), vec!["one", "three"]);
        notifier.clear();
        assert!(notifier.messages().is_empty());
    }
}
