use super::{CaptureError, FrameSource, WindowError, WindowInspector};
use crate::models::{Frame, Point, Region};
use image::{DynamicImage, GrayImage, imageops};
use xcap::{Monitor, Window};

/// Grabs the primary monitor through `xcap`.
///
/// Monitors are re-enumerated on every capture so display changes while the
/// agent runs are picked up.
#[derive(Debug, Default)]
pub struct ScreenCapture;

impl ScreenCapture {
    pub fn new() -> Self {
        Self
    }

    fn primary_monitor() -> Result<Monitor, CaptureError> {
        let monitors = Monitor::all().map_err(|e| CaptureError::Backend(e.to_string()))?;
        let mut fallback = None;
        for monitor in monitors {
            if monitor.is_primary().unwrap_or(false) {
                return Ok(monitor);
            }
            fallback.get_or_insert(monitor);
        }
        fallback.ok_or(CaptureError::NoDisplay)
    }
}

impl FrameSource for ScreenCapture {
    fn capture(&mut self, region: Option<Region>) -> Result<Frame, CaptureError> {
        let monitor = Self::primary_monitor()?;
        let origin = Point::new(monitor.x().unwrap_or(0), monitor.y().unwrap_or(0));

        let rgba = monitor
            .capture_image()
            .map_err(|e| CaptureError::Backend(e.to_string()))?;
        let screen = DynamicImage::ImageRgba8(rgba).into_luma8();

        match region {
            None => Ok(Frame::new(screen, origin)),
            Some(region) => crop_to_region(&screen, origin, region),
        }
    }
}

/// Cut `region` (absolute screen coordinates) out of a full-screen grab whose
/// top-left pixel sits at `origin`.
pub fn crop_to_region(screen: &GrayImage, origin: Point, region: Region) -> Result<Frame, CaptureError> {
    let (width, height) = screen.dimensions();
    let out_of_bounds = || CaptureError::RegionOutOfBounds {
        region,
        width,
        height,
    };

    let left = i64::from(region.left) - i64::from(origin.x);
    let top = i64::from(region.top) - i64::from(origin.y);
    if left < 0
        || top < 0
        || left + i64::from(region.width) > i64::from(width)
        || top + i64::from(region.height) > i64::from(height)
    {
        return Err(out_of_bounds());
    }

    let cropped = imageops::crop_imm(
        screen,
        left as u32,
        top as u32,
        region.width,
        region.height,
    )
    .to_image();

    Ok(Frame::new(cropped, Point::new(region.left, region.top)))
}

/// Looks up the focused top-level window through `xcap`.
#[derive(Debug, Default)]
pub struct FocusedWindow;

impl FocusedWindow {
    pub fn new() -> Self {
        Self
    }
}

impl WindowInspector for FocusedWindow {
    fn active_title(&mut self) -> Result<Option<String>, WindowError> {
        let windows = Window::all().map_err(|e| WindowError::Backend(e.to_string()))?;
        let title = windows
            .iter()
            .find(|w| w.is_focused().unwrap_or(false))
            .map(|w| w.title().unwrap_or_default());
        Ok(title)
    }
}
