use std::fmt;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// The original implementation of the Chip-8 language used a 64x32-pixel monochrome display with this format:
/// ( 0, 0)   (63, 0)
/// ( 0,31)   (63,31)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display([bool; DISPLAY_WIDTH * DISPLAY_HEIGHT]);

impl Display {
    pub fn new() -> Self {
        Display([false; DISPLAY_WIDTH * DISPLAY_HEIGHT])
    }

    pub fn clear(&mut self) {
        self.0.fill(false);
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.0[self.compute_idx(x, y)]
    }

    /// Flips the pixel at position (`x`, `y`) and returns `true` if it was already set,
    /// i.e. the sprite collided with it. Positions outside the screen are clipped and
    /// never collide.
    pub fn flip_pixel(&mut self, x: usize, y: usize) -> bool {
        if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT {
            return false;
        }

        let idx = self.compute_idx(x, y);
        let was_set = self.0[idx];
        self.0[idx] = !was_set;

        was_set
    }

    pub fn compute_idx(&self, x: usize, y: usize) -> usize {
        y * self.width() + x
    }

    /// Row-major pixel buffer, `width() * height()` cells.
    pub fn pixels(&self) -> &[bool] {
        &self.0
    }

    pub fn width(&self) -> usize {
        DISPLAY_WIDTH
    }

    pub fn height(&self) -> usize {
        DISPLAY_HEIGHT
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.0.chunks(DISPLAY_WIDTH) {
            let line: String = row.iter().map(|p| if *p { '#' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
