pub mod surface;
pub mod view;

pub use surface::{CairoSurface, DetailHit, FrameUpdate, SnapAnimator};
pub use view::draw;

pub const ITEM_HEIGHT: f64 = 84.0;
pub const ITEM_GAP: f64 = 12.0;
pub const TRACK_WIDTH: f64 = 360.0;
pub const TRACK_MARGIN: f64 = 48.0;
pub const CORNER_RADIUS: f64 = 14.0;
pub const THUMB_WIDTH: f64 = 4.0;
pub const THUMB_GAP: f64 = 16.0;
pub const FOCUS_RING_WIDTH: f64 = 2.0;

// one wheel notch moves roughly one item
pub const WHEEL_STEP_PIXELS: f64 = ITEM_HEIGHT + ITEM_GAP;

pub const DETAIL_WIDTH: f64 = 380.0;
pub const DETAIL_PADDING: f64 = 28.0;
pub const CLOSE_BUTTON_SIZE: f64 = 32.0;
pub const USP_LINE_HEIGHT: f64 = 30.0;
pub const USP_FADE_MS: u64 = 240;
pub const DETAIL_FADE_MS: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}
