/// Converts a display name or URL path segment into a lowercase,
/// dash-separated slug.
///
/// Whitespace, `-` and `_` runs become a single `-`; any other punctuation is
/// dropped without inserting a separator. Unicode letters and digits are kept
/// (lowercased) so Cyrillic catalog names still produce a usable key.
#[must_use]
pub fn slugify(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_dash = false;

    for c in raw.trim().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }

    out
}
