// Software drawing primitives for the softbuffer framebuffer (u32 per pixel,
// 0x00RRGGBB). Everything clips against the buffer edges.

pub const BG_COLOR: [u8; 3] = [31, 31, 31];

pub type Rgba = (u8, u8, u8, u8);

// 5x7 bitmap font covering ASCII 32..127, one byte per column, LSB = top row.
static FONT_5X7: [[u8; 5]; 96] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], [0x00, 0x00, 0x5F, 0x00, 0x00], [0x00, 0x07, 0x00, 0x07, 0x00], [0x14, 0x7F, 0x14, 0x7F, 0x14], // sp ! " #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], [0x23, 0x13, 0x08, 0x64, 0x62], [0x36, 0x49, 0x55, 0x22, 0x50], [0x00, 0x05, 0x03, 0x00, 0x00], // $ % & '
    [0x00, 0x1C, 0x22, 0x41, 0x00], [0x00, 0x41, 0x22, 0x1C, 0x00], [0x14, 0x08, 0x3E, 0x08, 0x14], [0x08, 0x08, 0x3E, 0x08, 0x08], // ( ) * +
    [0x00, 0x50, 0x30, 0x00, 0x00], [0x08, 0x08, 0x08, 0x08, 0x08], [0x00, 0x60, 0x60, 0x00, 0x00], [0x20, 0x10, 0x08, 0x04, 0x02], // , - . /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], [0x00, 0x42, 0x7F, 0x40, 0x00], [0x42, 0x61, 0x51, 0x49, 0x46], [0x21, 0x41, 0x45, 0x4B, 0x31], // 0 1 2 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], [0x27, 0x45, 0x45, 0x45, 0x39], [0x3C, 0x4A, 0x49, 0x49, 0x30], [0x01, 0x71, 0x09, 0x05, 0x03], // 4 5 6 7
    [0x36, 0x49, 0x49, 0x49, 0x36], [0x06, 0x49, 0x49, 0x29, 0x1E], [0x00, 0x36, 0x36, 0x00, 0x00], [0x00, 0x56, 0x36, 0x00, 0x00], // 8 9 : ;
    [0x08, 0x14, 0x22, 0x41, 0x00], [0x14, 0x14, 0x14, 0x14, 0x14], [0x00, 0x41, 0x22, 0x14, 0x08], [0x02, 0x01, 0x51, 0x09, 0x06], // < = > ?
    [0x3E, 0x41, 0x5D, 0x55, 0x1E], [0x7E, 0x11, 0x11, 0x11, 0x7E], [0x7F, 0x49, 0x49, 0x49, 0x36], [0x3E, 0x41, 0x41, 0x41, 0x22], // @ A B C
    [0x7F, 0x41, 0x41, 0x22, 0x1C], [0x7F, 0x49, 0x49, 0x49, 0x41], [0x7F, 0x09, 0x09, 0x09, 0x01], [0x3E, 0x41, 0x49, 0x49, 0x7A], // D E F G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], [0x00, 0x41, 0x7F, 0x41, 0x00], [0x20, 0x40, 0x41, 0x3F, 0x01], [0x7F, 0x08, 0x14, 0x22, 0x41], // H I J K
    [0x7F, 0x40, 0x40, 0x40, 0x40], [0x7F, 0x02, 0x0C, 0x02, 0x7F], [0x7F, 0x04, 0x08, 0x10, 0x7F], [0x3E, 0x41, 0x41, 0x41, 0x3E], // L M N O
    [0x7F, 0x09, 0x09, 0x09, 0x06], [0x3E, 0x41, 0x51, 0x21, 0x5E], [0x7F, 0x09, 0x19, 0x29, 0x46], [0x46, 0x49, 0x49, 0x49, 0x31], // P Q R S
    [0x01, 0x01, 0x7F, 0x01, 0x01], [0x3F, 0x40, 0x40, 0x40, 0x3F], [0x1F, 0x20, 0x40, 0x20, 0x1F], [0x3F, 0x40, 0x38, 0x40, 0x3F], // T U V W
    [0x63, 0x14, 0x08, 0x14, 0x63], [0x07, 0x08, 0x70, 0x08, 0x07], [0x61, 0x51, 0x49, 0x45, 0x43], [0x00, 0x7F, 0x41, 0x41, 0x00], // X Y Z [
    [0x02, 0x04, 0x08, 0x10, 0x20], [0x00, 0x41, 0x41, 0x7F, 0x00], [0x04, 0x02, 0x01, 0x02, 0x04], [0x40, 0x40, 0x40, 0x40, 0x40], // \ ] ^ _
    [0x00, 0x01, 0x02, 0x04, 0x00], [0x20, 0x54, 0x54, 0x54, 0x78], [0x7F, 0x48, 0x44, 0x44, 0x38], [0x38, 0x44, 0x44, 0x44, 0x20], // ` a b c
    [0x38, 0x44, 0x44, 0x48, 0x7F], [0x38, 0x54, 0x54, 0x54, 0x18], [0x08, 0x7E, 0x09, 0x01, 0x02], [0x0C, 0x52, 0x52, 0x52, 0x3E], // d e f g
    [0x7F, 0x08, 0x04, 0x04, 0x78], [0x00, 0x44, 0x7D, 0x40, 0x00], [0x20, 0x40, 0x44, 0x3D, 0x00], [0x7F, 0x10, 0x28, 0x44, 0x00], // h i j k
    [0x00, 0x41, 0x7F, 0x40, 0x00], [0x7C, 0x04, 0x18, 0x04, 0x78], [0x7C, 0x08, 0x04, 0x04, 0x78], [0x38, 0x44, 0x44, 0x44, 0x38], // l m n o
    [0x7C, 0x14, 0x14, 0x14, 0x08], [0x08, 0x14, 0x14, 0x18, 0x7C], [0x7C, 0x08, 0x04, 0x04, 0x08], [0x48, 0x54, 0x54, 0x54, 0x20], // p q r s
    [0x04, 0x3F, 0x44, 0x40, 0x20], [0x3C, 0x40, 0x40, 0x20, 0x7C], [0x1C, 0x20, 0x40, 0x20, 0x1C], [0x3C, 0x40, 0x30, 0x40, 0x3C], // t u v w
    [0x44, 0x28, 0x10, 0x28, 0x44], [0x0C, 0x50, 0x50, 0x50, 0x3C], [0x44, 0x64, 0x54, 0x4C, 0x44], [0x00, 0x08, 0x36, 0x41, 0x00], // x y z {
    [0x00, 0x00, 0x7F, 0x00, 0x00], [0x00, 0x41, 0x36, 0x08, 0x00], [0x10, 0x08, 0x08, 0x10, 0x08], [0x00, 0x00, 0x00, 0x00, 0x00], // | } ~ del
];

/// Pack RGB into softbuffer u32 format: 0x00RRGGBB.
pub fn rgb(r: u8, g: u8, b: u8) -> u32 {
    (r as u32) << 16 | (g as u32) << 8 | b as u32
}

fn unpack_rgb(v: u32) -> (u8, u8, u8) {
    ((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

fn blend(dst: u32, color: Rgba) -> u32 {
    let a = color.3 as u32;
    if a == 255 {
        return rgb(color.0, color.1, color.2);
    }
    let (dr, dg, db) = unpack_rgb(dst);
    let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a)) / 255) as u8;
    rgb(mix(color.0, dr), mix(color.1, dg), mix(color.2, db))
}

/// Target framebuffer with its dimensions.
pub struct Canvas<'a> {
    pub buf: &'a mut [u32],
    pub width: u32,
    pub height: u32,
}

impl<'a> Canvas<'a> {
    pub fn new(buf: &'a mut [u32], width: u32, height: u32) -> Self {
        Self { buf, width, height }
    }

    pub fn clear(&mut self, color: [u8; 3]) {
        self.buf.fill(rgb(color[0], color[1], color[2]));
    }

    fn put(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let off = (y as u32 * self.width + x as u32) as usize;
        if let Some(px) = self.buf.get_mut(off) {
            *px = blend(*px, color);
        }
    }

    pub fn fill_rect(&mut self, rx: i32, ry: i32, rw: u32, rh: u32, color: Rgba) {
        for y in ry..ry + rh as i32 {
            for x in rx..rx + rw as i32 {
                self.put(x, y, color);
            }
        }
    }

    /// Rectangle outline `thickness` pixels wide, drawn inside the bounds.
    pub fn stroke_rect(&mut self, rx: i32, ry: i32, rw: u32, rh: u32, thickness: u32, color: Rgba) {
        let t = thickness.min(rw / 2).min(rh / 2);
        self.fill_rect(rx, ry, rw, t, color);
        self.fill_rect(rx, ry + rh as i32 - t as i32, rw, t, color);
        self.fill_rect(rx, ry + t as i32, t, rh - 2 * t, color);
        self.fill_rect(rx + rw as i32 - t as i32, ry + t as i32, t, rh - 2 * t, color);
    }

    fn draw_char(&mut self, ch: char, px: i32, py: i32, scale: u32, color: Rgba) {
        let idx = (ch as u32).wrapping_sub(32) as usize;
        let Some(glyph) = FONT_5X7.get(idx) else {
            return;
        };
        let s = scale as i32;
        for (col, bits) in glyph.iter().enumerate() {
            for row in 0..7 {
                if bits & (1 << row) != 0 {
                    let x = px + col as i32 * s;
                    let y = py + row * s;
                    self.fill_rect(x, y, scale, scale, color);
                }
            }
        }
    }

    /// Draw a string. Returns the x position after the last character.
    pub fn draw_text(&mut self, text: &str, px: i32, py: i32, scale: u32, color: Rgba) -> i32 {
        let mut x = px;
        for ch in text.chars() {
            self.draw_char(ch, x, py, scale, color);
            x += text_advance(scale);
        }
        x
    }

    /// Nearest-neighbour blit of an RGBA image scaled by `scale` with its
    /// top-left corner at (x0, y0).
    pub fn blit_scaled(&mut self, src: &[u8], src_w: u32, src_h: u32, x0: f32, y0: f32, scale: f32) {
        let draw_w = src_w as f32 * scale;
        let draw_h = src_h as f32 * scale;

        let dx_start = x0.max(0.0) as u32;
        let dy_start = y0.max(0.0) as u32;
        let dx_end = ((x0 + draw_w).ceil().max(0.0) as u32).min(self.width);
        let dy_end = ((y0 + draw_h).ceil().max(0.0) as u32).min(self.height);

        let inv_scale = 1.0 / scale;
        for dy in dy_start..dy_end {
            let sy = ((dy as f32 - y0) * inv_scale) as u32;
            if sy >= src_h {
                continue;
            }
            for dx in dx_start..dx_end {
                let sx = ((dx as f32 - x0) * inv_scale) as u32;
                if sx >= src_w {
                    continue;
                }
                let si = (sy as usize * src_w as usize + sx as usize) * 4;
                let Some(p) = src.get(si..si + 4) else {
                    continue;
                };
                if p[3] > 0 {
                    let di = dy as usize * self.width as usize + dx as usize;
                    if let Some(px) = self.buf.get_mut(di) {
                        *px = blend(*px, (p[0], p[1], p[2], p[3]));
                    }
                }
            }
        }
    }
}

/// Horizontal pixels taken by one character: 5 columns + 1 spacing.
pub fn text_advance(scale: u32) -> i32 {
    (6 * scale) as i32
}

pub fn fit_scale(img_w: f32, img_h: f32, box_w: f32, box_h: f32) -> f32 {
    (box_w / img_w).min(box_h / img_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_clips() {
        let mut buf = vec![0u32; 4 * 4];
        let mut canvas = Canvas::new(&mut buf, 4, 4);
        canvas.fill_rect(-2, 2, 4, 10, (255, 255, 255, 255));
        assert_eq!(buf[2 * 4], 0x00FF_FFFF);
        assert_eq!(buf[3 * 4 + 1], 0x00FF_FFFF);
        assert_eq!(buf[3 * 4 + 2], 0);
        assert_eq!(buf[0], 0);
    }

    #[test]
    fn test_stroke_rect_leaves_inside() {
        let mut buf = vec![0u32; 5 * 5];
        let mut canvas = Canvas::new(&mut buf, 5, 5);
        canvas.stroke_rect(0, 0, 5, 5, 1, (0, 0, 255, 255));
        assert_eq!(buf[0], 0x0000_00FF);
        assert_eq!(buf[4 * 5 + 4], 0x0000_00FF);
        assert_eq!(buf[2 * 5 + 2], 0);
    }

    #[test]
    fn test_blit_scaled_doubles() {
        let src = [255, 0, 0, 255, 0, 255, 0, 255];
        let mut buf = vec![0u32; 4 * 2];
        let mut canvas = Canvas::new(&mut buf, 4, 2);
        canvas.blit_scaled(&src, 2, 1, 0.0, 0.0, 2.0);
        assert_eq!(&buf[..4], &[0xFF0000, 0xFF0000, 0x00FF00, 0x00FF00]);
        assert_eq!(&buf[4..], &[0xFF0000, 0xFF0000, 0x00FF00, 0x00FF00]);
    }

    #[test]
    fn test_blit_into_short_buffer_clips() {
        let src = [255u8; 4 * 4 * 4];
        let mut buf = vec![0u32; 4 * 2];
        let mut canvas = Canvas::new(&mut buf, 4, 4);
        canvas.blit_scaled(&src, 4, 4, 0.0, 0.0, 1.0);
        assert!(buf.iter().all(|&p| p == 0x00FF_FFFF));
    }

    #[test]
    fn test_draw_text_advances() {
        let mut buf = vec![0u32; 40 * 10];
        let mut canvas = Canvas::new(&mut buf, 40, 10);
        let end = canvas.draw_text("Hi", 1, 1, 1, (255, 255, 255, 255));
        assert_eq!(end, 13);
        assert!(buf.iter().any(|&p| p != 0));
    }
}
