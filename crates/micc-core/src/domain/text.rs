//! Line-oriented text edits used on project source and docs files.
//!
//! These are the pure halves of the file utilities in
//! [`crate::application::paths`]; each returns `None` when the edit has no
//! anchor in the text.

/// Where [`insert_lines`] places the new lines relative to the anchor line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

/// Replace every occurrence of `old` by `new`; `None` if `old` does not occur.
pub fn replace_all(text: &str, old: &str, new: &str) -> Option<String> {
    if old.is_empty() || !text.contains(old) {
        return None;
    }
    Some(text.replace(old, new))
}

/// Insert `lines` before or after the first line starting with `startswith`.
///
/// A line that does not end in a newline gets one.
pub fn insert_lines(
    text: &str,
    lines: &[&str],
    placement: Placement,
    startswith: &str,
) -> Option<String> {
    let existing: Vec<&str> = text.split_inclusive('\n').collect();
    let anchor = existing.iter().position(|l| l.starts_with(startswith))?;
    let at = match placement {
        Placement::Before => anchor,
        Placement::After => anchor + 1,
    };

    let mut out = String::with_capacity(text.len() + lines.iter().map(|l| l.len() + 1).sum::<usize>());
    for line in &existing[..at] {
        out.push_str(line);
    }
    if at > 0 && !out.ends_with('\n') {
        out.push('\n');
    }
    for line in lines {
        out.push_str(line);
        if !line.ends_with('\n') {
            out.push('\n');
        }
    }
    for line in &existing[at..] {
        out.push_str(line);
    }
    Some(out)
}

/// `true` if some line starts with `prefix`.
pub fn has_line_starting_with(text: &str, prefix: &str) -> bool {
    text.lines().any(|l| l.starts_with(prefix))
}

/// Rewrite the `__version__ = "..."` assignment to `version`.
///
/// Only the first assignment at column zero is touched.
pub fn set_version_assignment(text: &str, version: &str) -> Option<String> {
    let mut done = false;
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if !done && is_version_assignment(line) {
            let newline = if line.ends_with("\r\n") {
                "\r\n"
            } else if line.ends_with('\n') {
                "\n"
            } else {
                ""
            };
            out.push_str(&format!("__version__ = \"{version}\"{newline}"));
            done = true;
        } else {
            out.push_str(line);
        }
    }
    done.then_some(out)
}

/// The version literal of the first `__version__` assignment, if any.
pub fn version_assignment(text: &str) -> Option<String> {
    let line = text.lines().find(|l| is_version_assignment(l))?;
    let (_, value) = line.split_once('=')?;
    Some(value.trim().trim_matches(|c| c == '"' || c == '\'').to_owned())
}

fn is_version_assignment(line: &str) -> bool {
    line.strip_prefix("__version__")
        .is_some_and(|rest| rest.trim_start().starts_with('='))
}
