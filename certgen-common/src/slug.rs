//! URL-safe slug derivation for event names
//!
//! Slugs are lower-case, contain only word characters and hyphens, and are
//! unique across all stored events. Uniqueness probing lives in the event
//! store (`certgen-server`); this module holds the pure text transform.

/// Derive a URL-safe slug from a display name.
///
/// Lower-cases the input, strips everything outside word characters,
/// whitespace, and hyphens, collapses whitespace/hyphen runs into a single
/// hyphen, and trims leading/trailing hyphens. Returns an empty string for
/// names with no usable characters; callers must reject that upstream as a
/// validation failure rather than store an empty slug.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.trim().chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else if c.is_whitespace() || c == '-' {
            pending_separator = true;
        }
        // Anything else is stripped without acting as a separator
    }

    slug
}

/// Candidate slug for the nth collision: `base-1`, `base-2`, ...
pub fn suffixed(base: &str, n: u32) -> String {
    format!("{}-{}", base, n)
}
