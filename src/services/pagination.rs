use serde::Serialize;

/// Fixed number of posts per feed page.
pub const PAGE_SIZE: u64 = 10;

/// One slice of an ordered listing. `number` is 1-indexed.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub num_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Limit/offset for the requested page. Numbers below 1 mean the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u64,
}

impl PageRequest {
    pub fn new(requested: i64) -> Self {
        Self {
            number: requested.max(1) as u64,
        }
    }

    pub fn limit(&self) -> u64 {
        PAGE_SIZE
    }

    pub fn offset(&self) -> u64 {
        (self.number - 1).saturating_mul(PAGE_SIZE)
    }

    /// Wraps an already-sliced result. Past the last page `items` is empty.
    pub fn into_page<T>(self, items: Vec<T>, total_items: u64) -> Page<T> {
        let num_pages = total_items.div_ceil(PAGE_SIZE).max(1);
        Page {
            items,
            number: self.number,
            per_page: PAGE_SIZE,
            total_items,
            num_pages,
            has_previous: self.number > 1,
            has_next: self.number < num_pages,
        }
    }
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_one_indexed() {
        assert_eq!(PageRequest::new(1).offset(), 0);
        assert_eq!(PageRequest::new(2).offset(), 10);
        assert_eq!(PageRequest::new(0).number, 1);
        assert_eq!(PageRequest::new(-5).offset(), 0);
    }

    #[test]
    fn page_metadata() {
        let page = PageRequest::new(2).into_page(vec![11, 12], 12);
        assert_eq!(page.num_pages, 2);
        assert!(page.has_previous);
        assert!(!page.has_next);

        let empty = PageRequest::new(1).into_page(Vec::<i32>::new(), 0);
        assert_eq!(empty.num_pages, 1);
        assert!(!empty.has_next);
    }

    #[test]
    fn out_of_range_page_is_empty_not_an_error() {
        let page = PageRequest::new(7).into_page(Vec::<i32>::new(), 12);
        assert!(page.is_empty());
        assert_eq!(page.number, 7);
        assert!(!page.has_next);
    }
}
