/// Width of the page-number window shown to clients.
const PAGE_WINDOW: u32 = 10;

/// One page of results plus navigation metadata. `start`/`end` bound
/// the window of page numbers around the current page, clamped to the
/// total page count; `prev`/`next` point one page outside the window.
#[derive(Debug, Clone)]
pub(crate) struct Page<T> {
    pub(crate) content: Vec<T>,
    pub(crate) page: u32,
    pub(crate) size: u32,
    pub(crate) total_count: i64,
    pub(crate) start: u32,
    pub(crate) end: u32,
    pub(crate) prev: bool,
    pub(crate) next: bool,
    pub(crate) prev_page: Option<u32>,
    pub(crate) next_page: Option<u32>,
}

impl<T> Page<T> {
    /// `page` is 1-based and `size` must be > 0; both are validated at
    /// the edge before this runs.
    pub(crate) fn new(content: Vec<T>, page: u32, size: u32, total_count: i64) -> Self {
        let total = total_count.max(0) as u64;
        let total_pages = (total.div_ceil(size.max(1) as u64) as u32).max(1);

        let page = page.max(1);
        // Requests past the end fall back to the last valid window.
        let window_page = page.min(total_pages);
        let start = ((window_page - 1) / PAGE_WINDOW) * PAGE_WINDOW + 1;
        let end = (start + PAGE_WINDOW - 1).min(total_pages);

        let prev_page = (start > 1).then(|| start - 1);
        let next_page = (end < total_pages).then(|| end + 1);

        Self {
            content,
            page,
            size,
            total_count: total_count.max(0),
            start,
            end,
            prev: prev_page.is_some(),
            next: next_page.is_some(),
            prev_page,
            next_page,
        }
    }

    pub(crate) fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_count: self.total_count,
            start: self.start,
            end: self.end,
            prev: self.prev,
            next: self.next,
            prev_page: self.prev_page,
            next_page: self.next_page,
        }
    }
}
