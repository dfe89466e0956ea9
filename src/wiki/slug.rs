//! URL-safe slugs derived from titles

/// Slug used when a title has nothing slug-worthy in it
pub const FALLBACK_SLUG: &str = "untitled";

/// Turn a title into a URL-safe slug
///
/// ASCII letters and digits survive (lowercased), spaces become hyphens,
/// everything else is dropped. Hyphen runs collapse and edge hyphens are
/// trimmed.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        let c = c.to_ascii_lowercase();
        let mapped = match c {
            'a'..='z' | '0'..='9' => c,
            ' ' | '-' => '-',
            _ => continue,
        };
        if mapped == '-' && (slug.is_empty() || slug.ends_with('-')) {
            continue;
        }
        slug.push(mapped);
    }
    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Check a caller-supplied slug
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_title() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Chapter 42"), "chapter-42");
        assert_eq!(slugify("already-valid-slug"), "already-valid-slug");
    }

    #[test]
    fn test_special_characters_dropped() {
        assert_eq!(slugify("Hello@World!"), "helloworld");
        assert_eq!(slugify("Name & Title"), "name-title");
        assert_eq!(slugify("C++ Programming"), "c-programming");
        assert_eq!(slugify("It's a Test"), "its-a-test");
        assert_eq!(slugify("Title (Subtitle)"), "title-subtitle");
    }

    #[test]
    fn test_whitespace_and_hyphens() {
        assert_eq!(slugify("   Hello    World   "), "hello-world");
        assert_eq!(slugify("Hello\tWorld\nTest"), "helloworldtest");
        assert_eq!(slugify("---hello-----world---"), "hello-world");
    }

    #[test]
    fn test_nothing_left_falls_back() {
        assert_eq!(slugify(""), FALLBACK_SLUG);
        assert_eq!(slugify("   "), FALLBACK_SLUG);
        assert_eq!(slugify("!@#$%^&*()"), FALLBACK_SLUG);
        assert_eq!(slugify("-----"), FALLBACK_SLUG);
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("root-article"));
        assert!(is_valid_slug("session-12"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Root"));
        assert!(!is_valid_slug("-root"));
        assert!(!is_valid_slug("root-"));
        assert!(!is_valid_slug("root--article"));
        assert!(!is_valid_slug("root article"));
    }
}
