const REPLACEMENT: char = '_';

/// Makes a string safe to use as a single path component.
///
/// Anything outside alphanumerics, `.`, `_` and `-` is replaced, one character
/// for one character, so equal-length inputs stay aligned.
pub fn sanitize_filename_component(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                REPLACEMENT
            }
        })
        .collect()
}
