//! String utility functions shared by the descriptor and requirements parsers.

/// Strip the first matching prefix from a string.
///
/// Iterates through the provided prefixes and returns the string with
/// the first matching prefix removed. If no prefix matches, returns the
/// original string unchanged.
///
/// # Example
///
/// ```
/// use setuplens::string_utils::strip_any_prefix;
///
/// const OPTIONS: &[&str] = &["--requirement=", "--requirement", "-r"];
/// assert_eq!(strip_any_prefix("-r base.txt", OPTIONS), " base.txt");
/// assert_eq!(strip_any_prefix("--requirement=base.txt", OPTIONS), "base.txt");
/// assert_eq!(strip_any_prefix("requests", OPTIONS), "requests");
/// ```
pub fn strip_any_prefix<'a>(s: &'a str, prefixes: &[&str]) -> &'a str {
    for prefix in prefixes {
        if let Some(stripped) = s.strip_prefix(prefix) {
            return stripped;
        }
    }
    s
}

/// Cut a trailing `# ...` comment from a requirement line.
///
/// A `#` starts a comment only at the beginning of the text or after
/// whitespace, so URL fragments such as `pkg @ https://host/x.whl#sha256=...`
/// survive.
///
/// ```
/// use setuplens::string_utils::strip_comment;
///
/// assert_eq!(strip_comment("numpy>=1.14.5  # arrays"), "numpy>=1.14.5  ");
/// assert_eq!(strip_comment("# only a comment"), "");
/// assert_eq!(strip_comment("pkg@https://h/p.whl#egg=pkg"), "pkg@https://h/p.whl#egg=pkg");
/// ```
pub fn strip_comment(s: &str) -> &str {
    let mut prev_is_space = true;
    for (i, ch) in s.char_indices() {
        if ch == '#' && prev_is_space {
            return &s[..i];
        }
        prev_is_space = ch.is_whitespace();
    }
    s
}

/// Collapse every run of whitespace into a single space.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
