//! Path-separator normalization shared by the Planner (post-processing step
//! instructions) and the Security Gateway (validate-and-build step 3). Both
//! callers need the same idempotent transform so that P7 holds regardless of
//! which side runs it first.

#[cfg(windows)]
const NATIVE_SEPARATOR: char = '\\';
#[cfg(not(windows))]
const NATIVE_SEPARATOR: char = '/';

/// Rewrite every `/` and `\` in `input` to the host's native path separator.
///
/// Idempotent: `normalize_path_separators(normalize_path_separators(p)) ==
/// normalize_path_separators(p)` for any `p` (P7).
pub fn normalize_path_separators(input: &str) -> String {
    input
        .chars()
        .map(|c| if c == '/' || c == '\\' { NATIVE_SEPARATOR } else { c })
        .collect()
}
