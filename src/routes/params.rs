use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self.page_size.unwrap_or(10).clamp(1, 100);
        let offset = (page - 1) * page_size;
        (page, page_size, offset)
    }
}

// Not flattened into Pagination: serde_urlencoded cannot deserialize numeric
// fields through #[serde(flatten)].
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// Substring match against name, description and category.
    pub q: Option<String>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_ten_per_page() {
        let p = Pagination {
            page: None,
            page_size: None,
        };
        assert_eq!(p.normalize(), (1, 10, 0));
    }

    #[test]
    fn caps_page_size_and_floors_page() {
        let p = Pagination {
            page: Some(0),
            page_size: Some(1000),
        };
        assert_eq!(p.normalize(), (1, 100, 0));

        let p = Pagination {
            page: Some(3),
            page_size: Some(25),
        };
        assert_eq!(p.normalize(), (3, 25, 50));
    }
}
