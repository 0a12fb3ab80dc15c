use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Home,
    End,
}

// ---------------------------------------------------------------------------
// Pager state
// ---------------------------------------------------------------------------

/// Paging position over a catalog of `total` files shown `rows * cols` at a
/// time.
///
/// `offset` is where the next page starts once `advance` has normalized it.
/// After `render` it points just past the page on screen, so `loaded` is
/// needed to find the first file of the visible page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerState {
    pub offset: usize,
    pub total: usize,
    pub page_size: usize,
    pub rows: usize,
    pub cols: usize,
    pub loaded: usize,
}

impl PagerState {
    pub fn new(total: usize, rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            offset: 0,
            total,
            page_size: rows * cols,
            rows,
            cols,
            loaded: 0,
        }
    }

    /// First catalog index of the last page. Equal to `total - loaded` of a
    /// ragged last page, `total - page_size` when the last page is full.
    pub fn last_page_start(&self) -> usize {
        let rem = self.total % self.page_size;
        if rem == 0 {
            self.total.saturating_sub(self.page_size)
        } else {
            self.total - rem
        }
    }

    fn on_ragged_last_page(&self) -> bool {
        self.offset == self.total && self.total % self.page_size != 0
    }

    /// Move to where the next page should start and return that offset.
    /// `render` must follow to actually fill the page.
    pub fn advance(&mut self, direction: Direction) -> usize {
        let before = self.offset;
        self.offset = match direction {
            Direction::Forward => {
                if self.offset >= self.total {
                    0
                } else {
                    self.offset
                }
            }
            Direction::Backward => {
                if self.offset <= self.page_size {
                    self.last_page_start()
                } else if self.on_ragged_last_page() {
                    self.offset - (self.page_size + self.total % self.page_size)
                } else {
                    self.offset.saturating_sub(2 * self.page_size)
                }
            }
            Direction::Home => 0,
            Direction::End => self.last_page_start(),
        };
        log::debug!("[pager] {:?}: {} -> {}", direction, before, self.offset);
        self.offset
    }

    /// Take up to one page of files from `offset` and step past them.
    /// Returns the catalog range now on screen.
    pub fn render(&mut self) -> Range<usize> {
        let start = self.offset.min(self.total);
        self.loaded = self.page_size.min(self.total - start);
        self.offset = start + self.loaded;
        start..self.offset
    }

    /// Catalog range of the page on screen.
    pub fn visible(&self) -> Range<usize> {
        (self.offset - self.loaded)..self.offset
    }

    /// Catalog index behind grid slot `index` of the page on screen.
    pub fn catalog_index(&self, index: usize) -> Option<usize> {
        if index < self.loaded {
            Some(self.offset - self.loaded + index)
        } else {
            None
        }
    }

    /// `(grid slot, catalog index)` for every file on screen.
    pub fn current_page(&self) -> Vec<(usize, usize)> {
        self.visible().enumerate().collect()
    }

    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size)
    }

    /// 1-based number of the page on screen.
    pub fn page_number(&self) -> usize {
        if self.loaded == 0 {
            0
        } else {
            (self.offset - self.loaded) / self.page_size + 1
        }
    }
}
