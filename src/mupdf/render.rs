//! Page rasterization for OCR

use std::io::Cursor;

use image::DynamicImage;
use mupdf::{Colorspace, Matrix, Page};

use crate::document::{DocumentError, Result};

/// PDF user space is 72 points per inch
const POINTS_PER_INCH: f32 = 72.0;

/// Render a page to PNG at the given resolution
pub fn render_page_png(page: &Page, dpi: u32) -> Result<Vec<u8>> {
    let scale = dpi as f32 / POINTS_PER_INCH;
    let matrix = Matrix::new_scale(scale, scale);
    let colorspace = Colorspace::device_rgb();
    let pixmap = page.to_pixmap(&matrix, &colorspace, false, true)?;

    encode_png(&pixmap)
}

fn encode_png(pixmap: &mupdf::Pixmap) -> Result<Vec<u8>> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = pixmap.n() as usize;

    // OCR engines only need the colour channels
    let mut rgb_buffer = Vec::with_capacity((width * height * 3) as usize);

    for y in 0..height as usize {
        for x in 0..width as usize {
            let offset = (y * width as usize + x) * n;
            let r = samples.get(offset).copied().unwrap_or(255);
            let g = samples.get(offset + 1).copied().unwrap_or(255);
            let b = samples.get(offset + 2).copied().unwrap_or(255);
            rgb_buffer.extend_from_slice(&[r, g, b]);
        }
    }

    let img = image::RgbImage::from_raw(width, height, rgb_buffer)
        .ok_or_else(|| DocumentError::Render("Failed to create image buffer".to_string()))?;

    let mut output = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut output), image::ImageFormat::Png)
        .map_err(|e| DocumentError::Render(e.to_string()))?;

    Ok(output)
}
