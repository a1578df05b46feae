//! Rendering surfaces the playback engine paints into.

use std::io::{self, Write};

/// Semantic paint colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// Empty space behind the columns.
    Background,
    /// `start` steps and cells restored during playback.
    Neutral,
    Compare,
    Swap,
    /// `copy` steps.
    Transfer,
    /// `set` steps.
    Write,
    /// Cells restored while draining.
    Sweep,
    /// Final column-by-column reveal.
    Reveal,
}

impl Color {
    /// 8-bit RGB components.
    pub const fn rgb(self) -> [u8; 3] {
        match self {
            Color::Background => [0, 0, 0],
            Color::Neutral => [255, 255, 255],
            Color::Compare => [0, 0, 255],
            Color::Swap => [255, 0, 0],
            Color::Transfer => [128, 0, 128],
            Color::Write => [255, 165, 0],
            Color::Sweep => [0, 160, 160],
            Color::Reveal => [0, 255, 0],
        }
    }

    /// CSS color string.
    pub fn css(self) -> &'static str {
        match self {
            Color::Background => "black",
            Color::Neutral => "white",
            Color::Compare => "blue",
            Color::Swap => "red",
            Color::Transfer => "purple",
            Color::Write => "orange",
            Color::Sweep => "rgb(0,160,160)",
            Color::Reveal => "rgb(0,255,0)",
        }
    }
}

/// A fixed-size 2D drawing region.
pub trait Surface {
    fn width(&self) -> f64;

    fn height(&self) -> f64;

    /// Fill an axis-aligned rectangle. `y` grows downwards.
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color);

    /// Fill the whole surface.
    fn clear(&mut self, color: Color) {
        let (w, h) = (self.width(), self.height());
        self.fill_rect(0.0, 0.0, w, h, color);
    }
}

/// Screen rectangle of one value column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Geometry of column `index` holding `value`, bottom-aligned.
pub fn column_rect(
    surface_width: f64,
    surface_height: f64,
    cell_count: usize,
    max_value: i64,
    index: usize,
    value: i64,
) -> ColumnRect {
    let width = surface_width / cell_count.max(1) as f64;
    let height = if max_value > 0 {
        surface_height * value as f64 / max_value as f64
    } else {
        0.0
    };
    ColumnRect {
        x: width * index as f64,
        y: surface_height - height,
        width,
        height,
    }
}

/// In-memory RGB pixel buffer.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::Background; width as usize * height as usize],
        }
    }

    /// Color at pixel `(x, y)`, if inside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Write the buffer as a binary PPM (P6) image.
    pub fn write_ppm<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write!(w, "P6\n{} {}\n255\n", self.width, self.height)?;
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for c in &self.pixels {
            bytes.extend_from_slice(&c.rgb());
        }
        w.write_all(&bytes)?;
        Ok(())
    }

    fn span(start: f64, len: f64, limit: u32) -> (usize, usize) {
        let lo = start.round().clamp(0.0, limit as f64) as usize;
        let hi = (start + len).round().clamp(0.0, limit as f64) as usize;
        (lo, hi.max(lo))
    }
}

impl Surface for RasterSurface {
    fn width(&self) -> f64 {
        self.width as f64
    }

    fn height(&self) -> f64 {
        self.height as f64
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        let (x0, x1) = Self::span(x, width, self.width);
        let (y0, y1) = Self::span(y, height, self.height);
        let stride = self.width as usize;
        for row in y0..y1 {
            self.pixels[row * stride + x0..row * stride + x1].fill(color);
        }
    }
}

/// One recorded `fill_rect` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Color,
}

/// Surface that logs every draw call instead of rasterizing.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the log collected so far, leaving it empty.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Colors of bars painted for the column starting at `x`, skipping the
    /// background clears.
    pub fn column_colors(&self, x: f64) -> Vec<Color> {
        self.commands
            .iter()
            .filter(|c| c.x == x && c.color != Color::Background)
            .map(|c| c.color)
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        self.commands.push(DrawCommand {
            x,
            y,
            width,
            height,
            color,
        });
    }
}
