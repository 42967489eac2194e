use super::Packer;
use crate::error::{Result, SpriteFontError};
use crate::model::Rect;

/// Row-major grid of fixed-size cells. Trades density for speed: every glyph
/// gets a cell as large as the largest glyph, and there is no free-space
/// bookkeeping at all.
pub struct GridPacker {
    width: u32,
    cell_w: u32,
    cell_h: u32,
    cur_x: u32,
    cur_y: u32,
}

impl GridPacker {
    pub fn new(width: u32, cell_w: u32, cell_h: u32) -> Self {
        Self {
            width,
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            cur_x: 0,
            cur_y: 0,
        }
    }

    /// Number of cells that fit on one row.
    pub fn columns(&self) -> u32 {
        (self.width / self.cell_w).max(1)
    }
}

impl Packer for GridPacker {
    /// Returns the whole grid cell; the glyph occupies its top-left corner.
    fn pack(&mut self, w: u32, h: u32) -> Result<Rect> {
        if w > self.cell_w || h > self.cell_h {
            return Err(SpriteFontError::OutOfSpace {
                width: w,
                height: h,
            });
        }
        let cell = Rect::new(self.cur_x, self.cur_y, self.cell_w, self.cell_h);
        self.cur_x += self.cell_w;
        if self.cur_x + self.cell_w > self.width {
            self.cur_x = 0;
            self.cur_y += self.cell_h;
        }
        Ok(cell)
    }
}
