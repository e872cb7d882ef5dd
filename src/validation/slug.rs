/// Derives the URL slug for an event title.
///
/// Lower-cases and trims the title, drops everything that is not an ASCII
/// letter, digit, underscore, hyphen or whitespace, turns whitespace runs
/// into a hyphen, collapses repeated hyphens and strips hyphens at both ends.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut last_was_dash = false;

    for ch in lowered.trim().chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            slug.push(ch);
            last_was_dash = false;
        } else if ch == '-' || ch.is_whitespace() {
            if !last_was_dash {
                slug.push('-');
                last_was_dash = true;
            }
        }
    }

    slug.trim_matches('-').to_string()
}
