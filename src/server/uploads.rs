//! Upload filename rules

use unicode_normalization::UnicodeNormalization;

/// Extensions accepted by `/upload`
pub const ALLOWED_EXTENSIONS: &[&str] = &["csv"];

/// True when the name has an extension and it is one of [`ALLOWED_EXTENSIONS`] (case-insensitive).
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS
            .iter()
            .any(|allowed| ext.eq_ignore_ascii_case(allowed)),
        None => false,
    }
}

/// Reduce a client-supplied name to a safe single path component.
///
/// The name is NFKD-decomposed and reduced to ASCII, so accented letters
/// keep their base letter. Path separators and whitespace become `_`,
/// anything outside ASCII letters, digits, `_`, `.` and `-` is dropped,
/// and leading or trailing `.`/`_` are stripped. May return an empty string.
pub fn secure_filename(filename: &str) -> String {
    let spaced: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}
