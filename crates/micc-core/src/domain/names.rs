//! Name derivation for projects, packages and artifacts.

/// Derive the canonical package name from a free-form project name.
///
/// All lowercase; spaces and dashes (and any other character that cannot
/// appear in a Python identifier) become underscores; a leading digit gets an
/// underscore prepended.
///
/// ```
/// use micc_core::domain::canonicalize;
/// assert_eq!(canonicalize("Foo-Bar"), "foo_bar");
/// assert_eq!(canonicalize("2fast"), "_2fast");
/// ```
pub fn canonicalize(name: &str) -> String {
    let mut canonical: String = name
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if canonical.starts_with(|c: char| c.is_ascii_digit()) {
        canonical.insert(0, '_');
    }
    canonical
}

/// `true` iff `name` matches `[A-Za-z][A-Za-z0-9_-]*`.
pub fn verify_project_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        _ => false,
    }
}

/// Module names must be valid project names that are already canonical.
pub fn verify_module_name(name: &str) -> bool {
    verify_project_name(name) && canonicalize(name) == name
}

/// Name of the source module that implements application `app`.
pub fn cli_app_name(app: &str) -> String {
    format!("cli_{}", canonicalize(app))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_identifier(s: &str) -> bool {
        let mut chars = s.chars();
        match chars.next() {
            Some(c) if c == '_' || c.is_ascii_lowercase() => chars
                .all(|c| c == '_' || c.is_ascii_lowercase() || c.is_ascii_digit()),
            _ => false,
        }
    }

    #[test]
    fn lowercases_and_maps_separators() {
        assert_eq!(canonicalize("Foo Bar-Baz"), "foo_bar_baz");
        assert_eq!(canonicalize("foo_bar"), "foo_bar");
    }

    #[test]
    fn leading_digit_gets_underscore() {
        assert_eq!(canonicalize("1st-project"), "_1st_project");
    }

    #[test]
    fn canonicalize_is_idempotent_and_yields_identifiers() {
        for name in [
            "foo-bar",
            "Foo Bar",
            "9lives",
            "__init__",
            "ÄÖÜ-x",
            "a.b.c",
            "ET-micc",
            "x",
        ] {
            let once = canonicalize(name);
            assert_eq!(canonicalize(&once), once, "not idempotent for {name:?}");
            assert!(is_identifier(&once), "{once:?} is not an identifier");
        }
    }

    #[test]
    fn project_names() {
        assert!(verify_project_name("foo-bar"));
        assert!(verify_project_name("Foo_Bar2"));
        assert!(!verify_project_name(""));
        assert!(!verify_project_name("2foo"));
        assert!(!verify_project_name("_foo"));
        assert!(!verify_project_name("foo bar"));
        assert!(!verify_project_name("foo.bar"));
    }

    #[test]
    fn module_names_must_be_canonical() {
        assert!(verify_module_name("mod_1"));
        assert!(!verify_module_name("Mod"));
        assert!(!verify_module_name("my-mod"));
    }

    #[test]
    fn cli_names() {
        assert_eq!(cli_app_name("greet"), "cli_greet");
        assert_eq!(cli_app_name("my-app"), "cli_my_app");
    }
}
