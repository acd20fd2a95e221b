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

mod bitenum;

pub use bitenum::BitEnum;

use std::cmp::Ordering;

/// Match `data` against a lock/attribute pattern.
///
/// - `>x` is true when `data` sorts after `x`, numerically if `x` starts with a digit or `-`,
///   byte-wise otherwise. `<x` is the mirror image.
/// - Otherwise it is a case-insensitive glob: `*` matches any run of characters, `?` matches a
///   single character (or nothing at the very end of `data`). A doubled `**` never matches.
#[must_use]
pub fn wild_match(pattern: &str, data: &str) -> bool {
    if let Some(bound) = pattern.strip_prefix('>') {
        return compare_bound(bound, data) == Ordering::Less;
    }
    if let Some(bound) = pattern.strip_prefix('<') {
        return compare_bound(bound, data) == Ordering::Greater;
    }
    if pattern.contains("**") {
        return false;
    }
    glob(pattern, data)
}

/// Compare the bound from a `>`/`<` pattern against the value.
fn compare_bound(bound: &str, data: &str) -> Ordering {
    if bound.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
        leading_int(bound).cmp(&leading_int(data))
    } else {
        bound.as_bytes().cmp(data.as_bytes())
    }
}

/// Parse the integer prefix of `s` the way C's `atol` does: leading whitespace, optional sign,
/// then digits. Anything unparseable is zero.
#[must_use]
pub fn leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });
    if negative { -value } else { value }
}

fn glob(pattern: &str, data: &str) -> bool {
    let p: Vec<char> = pattern.chars().map(|c| c.to_ascii_uppercase()).collect();
    let d: Vec<char> = data.chars().map(|c| c.to_ascii_uppercase()).collect();

    let (mut pi, mut di) = (0, 0);
    // Position of the last star seen, and the data position it is currently absorbing up to.
    let mut backtrack: Option<(usize, usize)> = None;
    while di < d.len() {
        match p.get(pi) {
            Some('*') => {
                backtrack = Some((pi, di));
                pi += 1;
            }
            Some(c) if *c == '?' || *c == d[di] => {
                pi += 1;
                di += 1;
            }
            _ => match backtrack {
                Some((star_pi, star_di)) => {
                    pi = star_pi + 1;
                    di = star_di + 1;
                    backtrack = Some((star_pi, star_di + 1));
                }
                None => return false,
            },
        }
    }
    p[pi..].iter().all(|c| *c == '*' || *c == '?')
}

#[cfg(test)]
mod tests {
    use super::{leading_int, wild_match};
    use test_case::test_case;

    #[test_case("hello*", "hello world", true; "trailing star")]
    #[test_case("bye*", "hello world", false; "prefix mismatch")]
    #[test_case("*world", "hello world", true; "leading star")]
    #[test_case("h*o w*d", "hello world", true; "inner stars")]
    #[test_case("HELLO", "hello", true; "case insensitive")]
    #[test_case("h?llo", "hallo", true; "single char")]
    #[test_case("hell?", "hell", true; "question at end matches nothing")]
    #[test_case("h?llo", "hllo", false; "question consumes a char")]
    #[test_case("*", "", true; "star matches empty")]
    #[test_case("", "", true; "empty matches empty")]
    #[test_case("", "x", false; "empty pattern")]
    #[test_case("a**", "abc", false; "double star")]
    #[test_case("*b*", "aaabaaa", true; "backtracking")]
    #[test_case("a*b*c", "axxbyyc", true; "multiple segments")]
    #[test_case("a*b*c", "axxbyy", false; "missing tail")]
    fn test_glob(pattern: &str, data: &str, expected: bool) {
        assert_eq!(wild_match(pattern, data), expected);
    }

    #[test_case(">10", "11", true; "gt numeric")]
    #[test_case(">10", "10", false; "gt numeric equal")]
    #[test_case(">10", "9", false; "gt numeric not lexical")]
    #[test_case("<10", "9", true; "lt numeric")]
    #[test_case(">-5", "0", true; "gt negative bound")]
    #[test_case(">m", "z", true; "gt lexical")]
    #[test_case("<m", "a", true; "lt lexical")]
    #[test_case("<m", "z", false; "lt lexical fails")]
    fn test_comparisons(pattern: &str, data: &str, expected: bool) {
        assert_eq!(wild_match(pattern, data), expected);
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("42abc"), 42);
        assert_eq!(leading_int("  -7"), -7);
        assert_eq!(leading_int("abc"), 0);
        assert_eq!(leading_int(""), 0);
    }
}
