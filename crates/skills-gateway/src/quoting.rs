//! Per-slot quoting (spec §4.1 step 4). A conservative *path-safe* regex
//! selects verbatim passthrough; everything else gets the host shell's
//! literal-quote form. This is the fix for the bug class named in spec §9:
//! POSIX-style single-quoting corrupts Windows-native paths, so quoting
//! must be native to the host shell, never hardcoded to one style.

use std::sync::OnceLock;

use regex::Regex;

fn path_safe_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_./:\\-]+$").expect("static regex is valid"))
}

/// True if `value` contains no character a shell would treat specially,
/// so it can be interpolated into the command template verbatim.
pub fn is_path_safe(value: &str) -> bool {
    !value.is_empty() && path_safe_regex().is_match(value)
}

#[cfg(unix)]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(windows)]
pub fn shell_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Quote `value` for safe interpolation unless it is already path-safe.
pub fn quote_slot(value: &str) -> String {
    if is_path_safe(value) {
        value.to_string()
    } else {
        shell_quote(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_path_safe() {
        assert!(is_path_safe("skills/ects_skill/tmp/output.json"));
        assert!(is_path_safe(r"skills\ects_skill\tmp\output.json"));
        assert!(is_path_safe("C:/Users/name/file.txt"));
    }

    #[test]
    fn shell_metacharacters_are_not_path_safe() {
        for value in [
            "foo; rm -rf /",
            "foo | sh",
            "foo `whoami`",
            "foo && echo pwned",
            "foo $(whoami)",
            "has space.txt",
            "quote\".txt",
        ] {
            assert!(!is_path_safe(value), "{value:?} should not be path-safe");
        }
    }

    #[test]
    fn quote_slot_passes_path_safe_values_through_verbatim() {
        assert_eq!(quote_slot("out.txt"), "out.txt");
    }

    #[test]
    fn quote_slot_quotes_unsafe_values() {
        let quoted = quote_slot("foo; rm -rf /");
        assert_ne!(quoted, "foo; rm -rf /");
        assert!(quoted.starts_with('\'') || quoted.starts_with('"'));
    }

    #[test]
    fn empty_value_is_not_path_safe() {
        assert!(!is_path_safe(""));
    }
}
