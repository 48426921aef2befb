use camino::Utf8PathBuf;
use image::GrayImage;
use std::fmt;

/// Absolute screen coordinate in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A captured bitmap and where its top-left pixel sits on screen.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: GrayImage,
    pub origin: Point,
}

impl Frame {
    pub fn new(image: GrayImage, origin: Point) -> Self {
        Self { image, origin }
    }
}

/// A decoded reference image of the button to look for.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub path: Utf8PathBuf,
    pub image: GrayImage,
}

impl Template {
    pub fn new(name: impl Into<String>, path: impl Into<Utf8PathBuf>, image: GrayImage) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            image,
        }
    }
}

/// Outcome of matching one template against one frame.
///
/// `location` is the centre of the matched box in absolute screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchResult {
    NoMatch,
    Hit { location: Point, confidence: f64 },
}

impl MatchResult {
    /// The hit, if its confidence reaches `threshold`
    pub fn passing(self, threshold: f64) -> Option<(Point, f64)> {
        match self {
            MatchResult::Hit {
                location,
                confidence,
            } if confidence >= threshold => Some((location, confidence)),
            _ => None,
        }
    }
}
