use crate::error::AppError;

const MAX_FILENAME_CHARS: usize = 200;

const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Reduce a client-supplied filename to a single safe path component.
///
/// Directory prefixes are stripped (`dir/a.txt` -> `a.txt`), but any `..`
/// segment fails the whole name. The result holds only ASCII alphanumerics,
/// `.`, `-` and `_`, never starts or ends with `.` or `_`, and is never empty
/// or a reserved device name.
pub fn secure_filename(raw: &str) -> Result<String, AppError> {
    let reject = || AppError::InvalidFilename(raw.to_string());

    if raw.split(['/', '\\']).any(|seg| seg.trim() == "..") {
        return Err(reject());
    }

    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let joined = base.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    let cleaned = kept.trim_matches(|c| c == '.' || c == '_');

    if cleaned.is_empty() || cleaned.len() > MAX_FILENAME_CHARS {
        return Err(reject());
    }
    let stem = cleaned.split('.').next().unwrap_or_default();
    if RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(stem)) {
        return Err(reject());
    }

    Ok(cleaned.to_string())
}
