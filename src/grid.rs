/// Row-major grid of equally sized cells, `cols` wide and `rows` tall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    pub cell_w: u32,
    pub cell_h: u32,
}

impl GridLayout {
    pub fn new(rows: usize, cols: usize, cell_w: u32, cell_h: u32) -> Self {
        Self {
            rows: rows.max(1),
            cols: cols.max(1),
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }

    /// Pixel size of the whole grid.
    pub fn size(&self) -> (u32, u32) {
        (
            (self.cols as u32).saturating_mul(self.cell_w),
            (self.rows as u32).saturating_mul(self.cell_h),
        )
    }

    pub fn locate(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.rows && col < self.cols {
            Some(row * self.cols + col)
        } else {
            None
        }
    }

    /// Grid slot under a pixel position, `None` outside the grid.
    pub fn locate_pixel(&self, x: f64, y: f64) -> Option<usize> {
        if x.is_nan() || y.is_nan() || x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / self.cell_w as f64) as usize;
        let row = (y / self.cell_h as f64) as usize;
        self.locate(row, col)
    }

    /// Grid slot for a `1`..`9` key press.
    pub fn key_index(&self, c: char) -> Option<usize> {
        let n = c.to_digit(10)? as usize;
        if n == 0 || n > self.capacity() {
            return None;
        }
        Some(n - 1)
    }

    pub fn position(&self, index: usize) -> Option<(usize, usize)> {
        if index < self.capacity() {
            Some((index / self.cols, index % self.cols))
        } else {
            None
        }
    }

    /// Top-left pixel of a cell.
    pub fn cell_origin(&self, index: usize) -> Option<(i32, i32)> {
        let (row, col) = self.position(index)?;
        Some((
            col as i32 * self.cell_w as i32,
            row as i32 * self.cell_h as i32,
        ))
    }
}
