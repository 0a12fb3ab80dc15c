use image::GenericImageView;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Decoded thumbnail (CPU side, ready to blit)
// ---------------------------------------------------------------------------

pub struct Thumbnail {
    pub rgba_bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

fn decode_thumbnail(path: &Path, max_w: u32, max_h: u32) -> Result<Thumbnail, image::ImageError> {
    let img = image::open(path)?;
    let thumb = if img.width() > max_w || img.height() > max_h {
        img.thumbnail(max_w, max_h)
    } else {
        img
    };
    let (width, height) = thumb.dimensions();
    Ok(Thumbnail {
        rgba_bytes: thumb.to_rgba8().into_raw(),
        width,
        height,
    })
}

/// Decode one page worth of images, each fitted into `max_w` x `max_h`.
/// Files that fail to decode come back as `None`.
pub fn load_page(paths: &[PathBuf], max_w: u32, max_h: u32) -> Vec<Option<Thumbnail>> {
    paths
        .par_iter()
        .map(|path| match decode_thumbnail(path, max_w, max_h) {
            Ok(thumb) => Some(thumb),
            Err(e) => {
                log::warn!("Could not load {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    #[test]
    fn test_load_page_fits_and_keeps_order() {
        let dir = tempdir().unwrap();
        let big = dir.path().join("big.png");
        let small = dir.path().join("small.png");
        let broken = dir.path().join("broken.png");
        RgbaImage::from_pixel(400, 200, Rgba([255, 0, 0, 255])).save(&big).unwrap();
        RgbaImage::from_pixel(10, 20, Rgba([0, 255, 0, 255])).save(&small).unwrap();
        std::fs::write(&broken, b"not a png").unwrap();

        let page = load_page(&[big, broken, small], 100, 100);
        assert_eq!(page.len(), 3);

        let first = page[0].as_ref().unwrap();
        assert_eq!((first.width, first.height), (100, 50));
        assert_eq!(&first.rgba_bytes[..4], &[255, 0, 0, 255]);

        assert!(page[1].is_none());

        let last = page[2].as_ref().unwrap();
        assert_eq!((last.width, last.height), (10, 20));
        assert_eq!(last.rgba_bytes.len(), 10 * 20 * 4);
    }
}
