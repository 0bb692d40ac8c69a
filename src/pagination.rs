use serde::Deserialize;

pub const QUESTIONS_PER_PAGE: i64 = 10;

/// `?page=N` query parameter, 1-based.
#[derive(Deserialize, Debug, Default, Clone, Copy)]
pub struct PageParams {
    pub page: Option<i64>,
}

/// Half-open row range `[start, end)` covered by one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    start: i64,
    end: i64,
}

impl PageWindow {
    pub fn for_page(page: i64) -> Self {
        if page < 1 {
            return PageWindow { start: 0, end: 0 };
        }
        let start = (page - 1).saturating_mul(QUESTIONS_PER_PAGE);
        PageWindow {
            start,
            end: start.saturating_add(QUESTIONS_PER_PAGE),
        }
    }

    /// Window of the last page holding `total` rows. An empty set still has page 1.
    pub fn last(total: i64) -> Self {
        let pages = (total.max(0) + QUESTIONS_PER_PAGE - 1) / QUESTIONS_PER_PAGE;
        Self::for_page(pages.max(1))
    }

    pub fn offset(&self) -> i64 {
        self.start
    }

    pub fn limit(&self) -> i64 {
        self.end - self.start
    }
}

impl From<PageParams> for PageWindow {
    fn from(params: PageParams) -> Self {
        PageWindow::for_page(params.page.unwrap_or(1))
    }
}
