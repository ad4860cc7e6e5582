//! Page-based pagination over an already ordered result list.

use serde::{Deserialize, Serialize};

use crate::errors::{MfcError, MfcResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// 1-based page number; anything unparseable falls back to the first page.
    pub fn number(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .unwrap_or(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: usize,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

/// A paginated page, or the full list when pagination is disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page(Page<T>),
    All(Vec<T>),
}

impl<T> Listing<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        match self {
            Listing::Page(page) => Listing::Page(Page {
                count: page.count,
                next: page.next,
                previous: page.previous,
                results: page.results.into_iter().map(f).collect(),
            }),
            Listing::All(items) => Listing::All(items.into_iter().map(f).collect()),
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            Listing::Page(page) => &page.results,
            Listing::All(items) => items,
        }
    }
}

/// Slices `items` into the requested page. `page_size` of `None` (or zero)
/// disables pagination. A page past the end is an error, except page 1 of an
/// empty list.
pub fn paginate<T>(items: Vec<T>, page_size: Option<u32>, page: u32) -> MfcResult<Listing<T>> {
    let Some(page_size) = page_size.filter(|size| *size > 0) else {
        return Ok(Listing::All(items));
    };

    let count = items.len();
    let size = page_size as usize;
    let pages = count.div_ceil(size).max(1);
    let page = page.max(1);

    if page as usize > pages {
        return Err(MfcError::NotFound("Invalid page".to_string()));
    }

    let start = (page as usize - 1) * size;
    let results = items.into_iter().skip(start).take(size).collect();

    Ok(Listing::Page(Page {
        count,
        next: ((page as usize) < pages).then_some(page + 1),
        previous: (page > 1).then(|| page - 1),
        results,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_pagination_returns_everything() {
        let listing = paginate(vec![1, 2, 3], None, 4).unwrap();
        assert_eq!(listing, Listing::All(vec![1, 2, 3]));
    }

    #[test]
    fn middle_page_links_both_ways() {
        let listing = paginate((1..=7).collect(), Some(3), 2).unwrap();
        assert_eq!(
            listing,
            Listing::Page(Page {
                count: 7,
                next: Some(3),
                previous: Some(1),
                results: vec![4, 5, 6],
            })
        );
    }

    #[test]
    fn page_past_the_end_is_not_found() {
        let err = paginate(vec![1, 2], Some(2), 2).unwrap_err();
        assert!(matches!(err, MfcError::NotFound(_)));
    }

    #[test]
    fn empty_list_has_a_first_page() {
        let listing = paginate(Vec::<i32>::new(), Some(10), 1).unwrap();
        assert_eq!(listing.items().len(), 0);
    }

    #[test]
    fn garbage_page_number_means_first_page() {
        let query = PageQuery {
            page: Some("abc".to_string()),
        };
        assert_eq!(query.number(), 1);
    }
}
