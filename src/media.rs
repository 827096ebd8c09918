//! Resolution of stored media references into fetchable CDN URLs.
//!
//! Product rows keep an opaque image reference; the CDN in front of the object
//! store turns `<base>/<reference>` into a servable URL. Anything without a
//! reference falls back to a fixed placeholder.

/// Served when a product carries no image reference.
pub const FALLBACK_IMAGE_URL: &str =
    "https://res.cloudinary.com/shopnow/image/upload/placeholder.png";

#[derive(Debug, Clone)]
pub struct MediaResolver {
    base_url: String,
}

impl MediaResolver {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve an opaque image reference to a fetchable URL.
    ///
    /// References that already look absolute are passed through untouched so
    /// rows imported with full URLs keep working.
    pub fn url(&self, reference: Option<&str>) -> String {
        match reference {
            Some(r) if r.starts_with("http://") || r.starts_with("https://") => r.to_string(),
            Some(r) if !r.is_empty() => format!("{}/{}", self.base_url, r.trim_start_matches('/')),
            _ => FALLBACK_IMAGE_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_reference_against_base() {
        let media = MediaResolver::new("https://cdn.example.com/img/");
        assert_eq!(
            media.url(Some("products/shoe.png")),
            "https://cdn.example.com/img/products/shoe.png"
        );
    }

    #[test]
    fn passes_absolute_urls_through() {
        let media = MediaResolver::new("https://cdn.example.com");
        assert_eq!(
            media.url(Some("https://elsewhere.net/a.jpg")),
            "https://elsewhere.net/a.jpg"
        );
    }

    #[test]
    fn missing_reference_falls_back() {
        let media = MediaResolver::new("https://cdn.example.com");
        assert_eq!(media.url(None), FALLBACK_IMAGE_URL);
        assert_eq!(media.url(Some("")), FALLBACK_IMAGE_URL);
    }
}
