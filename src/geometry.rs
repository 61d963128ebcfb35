//! Geometry primitives for diagram layout.
//!
//! All coordinates live in an abstract pixel space: y grows downward in call
//! order, x grows rightward by participant index.

/// Axis-aligned bounding box used by every view-state record.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Rect {
    /// Creates a new rectangle with the specified origin and dimensions
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a zero-positioned rectangle with the specified dimensions
    pub fn sized(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Returns the x-coordinate of the left edge
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the top edge
    pub fn y(self) -> f32 {
        self.y
    }

    /// Returns the width of the rectangle
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height of the rectangle
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns the x-coordinate of the right edge
    pub fn right(self) -> f32 {
        self.x + self.width
    }

    /// Returns the y-coordinate of the bottom edge
    pub fn bottom(self) -> f32 {
        self.y + self.height
    }

    /// Returns the x-coordinate of the horizontal center
    pub fn center_x(self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Sets the x-coordinate of the left edge
    pub fn set_x(&mut self, x: f32) {
        self.x = x;
    }

    /// Sets the y-coordinate of the top edge
    pub fn set_y(&mut self, y: f32) {
        self.y = y;
    }

    /// Sets the width of the rectangle
    pub fn set_width(&mut self, width: f32) {
        self.width = width;
    }

    /// Sets the height of the rectangle
    pub fn set_height(&mut self, height: f32) {
        self.height = height;
    }

    /// Checks if position and dimensions are all zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.width == 0.0 && self.height == 0.0
    }
}
