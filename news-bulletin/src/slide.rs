use crate::types::{Result, Script};
use crate::utils::text::truncate_chars;
use ab_glyph::{FontRef, PxScale};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use std::path::{Path, PathBuf};
use tracing::info;

pub const SLIDE_WIDTH: u32 = 1280;
pub const SLIDE_HEIGHT: u32 = 720;
pub const MAX_SLIDE_CHARS: usize = 900;

/// DejaVu Sans: Latin, Cyrillic and Greek coverage.
static FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

const LINE_SPACING: f32 = 1.25;

#[derive(Debug, Clone)]
pub struct SlideStyle {
    pub background: [u8; 3],
    pub foreground: [u8; 3],
    /// Top-left corner of the first line.
    pub origin: (u32, u32),
    /// Glyph height in pixels.
    pub font_size: f32,
}

impl SlideStyle {
    /// Distance between the tops of two consecutive lines.
    pub fn line_height(&self) -> u32 {
        (self.font_size.max(1.0) * LINE_SPACING).ceil() as u32
    }
}

impl Default for SlideStyle {
    fn default() -> Self {
        Self {
            background: [20, 20, 30],
            foreground: [255, 255, 255],
            origin: (50, 50),
            font_size: 28.0,
        }
    }
}

/// Renders the single still image shown for the whole bulletin.
///
/// Text is drawn left-aligned from the origin. Newlines start a new line;
/// nothing is wrapped, and text running past the canvas is clipped.
pub struct SlideRenderer {
    output_dir: PathBuf,
    style: SlideStyle,
}

impl SlideRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            style: SlideStyle::default(),
        }
    }

    pub fn with_style(mut self, style: SlideStyle) -> Self {
        self.style = style;
        self
    }

    pub fn style(&self) -> &SlideStyle {
        &self.style
    }

    pub fn slide_path(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("slide_{}.png", index))
    }

    /// Render `script` to `slide_<index>.png`, replacing any previous file.
    pub fn render(&self, script: &Script, index: usize) -> Result<PathBuf> {
        let image = self.render_image(script.as_str())?;
        let path = self.slide_path(index);
        save_png(&image, &path)?;
        info!("Slide written to {}", path.display());
        Ok(path)
    }

    /// Draw the first [`MAX_SLIDE_CHARS`] characters of `text` onto a fresh canvas.
    pub fn render_image(&self, text: &str) -> Result<RgbImage> {
        let font = FontRef::try_from_slice(FONT_DATA)?;
        let scale = PxScale::from(self.style.font_size.max(1.0));
        let color = Rgb(self.style.foreground);
        let line_height = self.style.line_height();
        let (origin_x, origin_y) = self.style.origin;

        let mut image = RgbImage::from_pixel(SLIDE_WIDTH, SLIDE_HEIGHT, Rgb(self.style.background));

        let mut y = origin_y;
        for line in truncate_chars(text, MAX_SLIDE_CHARS).split('\n') {
            if y >= SLIDE_HEIGHT {
                break;
            }
            let line = line.trim_end_matches('\r').replace('\t', " ");
            if !line.trim().is_empty() {
                // Pixels outside the canvas are dropped by the drawing primitive
                draw_text_mut(&mut image, color, origin_x as i32, y as i32, scale, &font, &line);
            }
            y = y.saturating_add(line_height);
        }

        Ok(image)
    }
}

fn save_png(image: &RgbImage, path: &Path) -> Result<()> {
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
