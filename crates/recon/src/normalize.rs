/// Clean a special-substitution code (CEST) as it arrives from spreadsheets
/// or legacy store files.
///
/// Missing or blank values become `"0"`. A trailing `.0` left behind by
/// float coercion is stripped, and anything that parses as an integer is
/// re-rendered in canonical decimal form (`"0041"` → `"41"`). Other text is
/// kept as-is. The function is idempotent.
pub fn normalize_special_code(value: Option<&str>) -> String {
    let Some(value) = value else {
        return "0".into();
    };

    // Repeated so that "1.0.0" and "7 .0" settle in one pass.
    let mut stripped = value.trim();
    while let Some(rest) = stripped.strip_suffix(".0") {
        stripped = rest.trim();
    }

    if let Ok(n) = stripped.parse::<i128>() {
        return n.to_string();
    }

    if stripped.is_empty() {
        "0".into()
    } else {
        stripped.to_string()
    }
}

/// Trim a free-text field; used for tax code, rate, and regime.
pub fn normalize_field(value: &str) -> String {
    value.trim().to_string()
}

/// Normalized form of a description for case-insensitive comparison.
pub fn normalize_description(value: &str) -> String {
    value.trim().to_lowercase()
}
