//! Slug generation for published file names.
//!
//! ## Summary
//! Generates stable, URL-safe slugs from operator-entered identifiers such as
//! property numbers. Slugs are lowercase, alphanumeric with hyphens.

/// Generate a URL-safe slug from a name.
///
/// Converts to lowercase, replaces spaces and special characters with hyphens,
/// collapses multiple hyphens, and trims edge hyphens.
///
/// Examples:
/// - "VL 042" -> "vl-042"
/// - "Baan Suan #7" -> "baan-suan-7"
#[must_use]
pub fn generate_slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// ## Summary
/// File name of the outbound calendar feed of a property.
///
/// The property id is always part of the name: slugging is lossy, so two
/// property numbers such as `VL-7` and `vl 7` share a slug.
#[must_use]
pub fn feed_filename(property_number: &str, property_id: uuid::Uuid) -> String {
    let slug = generate_slug(property_number);
    if slug.is_empty() {
        format!("property-{}.ics", property_id.simple())
    } else {
        format!("property-{slug}-{}.ics", property_id.simple())
    }
}
