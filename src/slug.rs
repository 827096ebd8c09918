//! URL-safe slugs for catalog products.

/// Turn a product name into a lowercase hyphen-separated slug.
///
/// Runs of non-alphanumeric characters collapse into a single hyphen and
/// leading/trailing hyphens are dropped. Names with no usable characters get
/// a fixed stand-in so the unique-slug loop still has something to suffix.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("product");
    }
    slug
}

/// Candidate slugs for a base: the base itself, then `base-1`, `base-2`, ...
pub fn with_suffix(base: &str, counter: u32) -> String {
    if counter == 0 {
        base.to_string()
    } else {
        format!("{base}-{counter}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Blue Suede Shoes"), "blue-suede-shoes");
    }

    #[test]
    fn collapses_punctuation_runs() {
        assert_eq!(slugify("50\" TV -- (4K)!"), "50-tv-4k");
    }

    #[test]
    fn empty_names_get_a_stand_in() {
        assert_eq!(slugify("!!!"), "product");
        assert_eq!(slugify(""), "product");
    }

    #[test]
    fn suffixing() {
        assert_eq!(with_suffix("tv", 0), "tv");
        assert_eq!(with_suffix("tv", 2), "tv-2");
    }
}
