//! `*` and `?` wildcard matching for file listings.

use crate::types::NameComparer;

/// Match `name` against a wildcard `pattern` under `comparer`.
///
/// `*` matches any run of characters, `?` exactly one. `*` and `*.*` match
/// every name.
pub fn matches(name: &str, pattern: &str, comparer: NameComparer) -> bool {
    if pattern.is_empty() || pattern == "*" || pattern == "*.*" {
        return true;
    }

    let fold = |s: &str| -> Vec<char> { s.chars().map(|c| comparer.fold(c)).collect() };
    let name = fold(name);
    let pattern = fold(pattern);

    let (mut n, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, n));
                p += 1;
            }
            Some(&c) if c == '?' || c == name[n] => {
                n += 1;
                p += 1;
            }
            _ => match backtrack {
                Some((star, consumed)) => {
                    p = star + 1;
                    n = consumed + 1;
                    backtrack = Some((star, consumed + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}
