//! Integration tests for template loading and matching
//!
//! These tests verify:
//! - Templates decoded from disk are found in a synthetic screen
//! - The best template wins when several are loaded
//! - The click sequence drives the pointer in order

use autoclick::models::{ClickButton, Frame, MatchResult, Point};
use autoclick::platform::{InputDriver, InputError, Matcher, NccMatcher};
use autoclick::services::{ClickExecutor, ClickSettings, load_templates};
use camino::{Utf8Path, Utf8PathBuf};
use image::{GrayImage, Luma, imageops};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use tokio_test::assert_ok;

fn create_test_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, path)
}

/// A screen-like image: flat background with a few distinct "buttons"
fn screen() -> GrayImage {
    let mut image = GrayImage::from_pixel(320, 200, Luma([30]));
    draw_button(&mut image, 40, 30, 0);
    draw_button(&mut image, 200, 120, 1);
    image
}

fn draw_button(image: &mut GrayImage, left: u32, top: u32, style: u32) {
    for y in 0..24 {
        for x in 0..64 {
            let border = x < 2 || y < 2 || x >= 62 || y >= 22;
            let label = (8..56).contains(&x) && (8..16).contains(&y) && (x / (4 + style)) % 2 == 0;
            let value = if border {
                220
            } else if label {
                15
            } else {
                120 + (style * 50) as u8
            };
            image.put_pixel(left + x, top + y, Luma([value]));
        }
    }
}

fn save_crop(image: &GrayImage, path: &Utf8Path, left: u32, top: u32) {
    imageops::crop_imm(image, left, top, 64, 24)
        .to_image()
        .save(path)
        .unwrap();
}

#[test]
fn test_template_from_disk_is_located() {
    let (_guard, dir) = create_test_dir();
    let screen = screen();
    let primary = dir.join("approve.png");
    save_crop(&screen, &primary, 200, 120);

    let templates = load_templates(&primary, None).unwrap();
    let template = templates.iter().next().unwrap();
    let frame = Frame::new(screen, Point::new(0, 0));

    let result = NccMatcher::new().find(&frame, template, 0.85).unwrap();
    assert_eq!(result.passing(0.85).map(|h| h.0), Some(Point::new(232, 132)));
}

#[test]
fn test_each_template_matches_its_own_button() {
    let (_guard, dir) = create_test_dir();
    let images = dir.join("images");
    fs::create_dir(&images).unwrap();

    let screen = screen();
    let primary = dir.join("approve.png");
    save_crop(&screen, &primary, 40, 30);
    save_crop(&screen, &images.join("accept.png"), 200, 120);

    let templates = load_templates(&primary, Some(&images)).unwrap();
    assert_eq!(templates.len(), 2);

    let frame = Frame::new(screen, Point::default());
    let matcher = NccMatcher::new();
    let centres: Vec<Option<Point>> = templates
        .iter()
        .map(|t| matcher.find(&frame, t, 0.95).unwrap().passing(0.95).map(|h| h.0))
        .collect();

    assert_eq!(centres, vec![Some(Point::new(72, 42)), Some(Point::new(232, 132))]);
}

#[test]
fn test_missing_button_is_no_match() {
    let (_guard, dir) = create_test_dir();
    let with_button = screen();
    let primary = dir.join("approve.png");
    save_crop(&with_button, &primary, 200, 120);

    let empty_screen = GrayImage::from_fn(320, 200, |x, y| Luma([((x / 8 + y / 8) % 2 * 60 + 30) as u8]));
    let templates = load_templates(&primary, None).unwrap();
    let frame = Frame::new(empty_screen, Point::default());

    let result = NccMatcher::new()
        .find(&frame, templates.iter().next().unwrap(), 0.85)
        .unwrap();
    assert_eq!(result, MatchResult::NoMatch);
}

#[derive(Default)]
struct LoggingDriver {
    calls: Vec<String>,
}

impl InputDriver for LoggingDriver {
    fn pointer(&mut self) -> Result<Point, InputError> {
        self.calls.push("pointer".to_string());
        Ok(Point::new(1, 2))
    }

    fn move_to(&mut self, target: Point, _duration: Duration) -> Result<(), InputError> {
        self.calls.push(format!("move {}", target));
        Ok(())
    }

    fn click(&mut self, target: Point, button: ClickButton, count: u32) -> Result<(), InputError> {
        self.calls
            .push(format!("click {} {} x{}", target, button.as_str(), count));
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_click_sequence_order() {
    let executor = ClickExecutor::new(ClickSettings {
        button: ClickButton::Left,
        count: 1,
        pre_click_delay: Duration::from_millis(50),
        after_click_wait: Duration::from_millis(500),
        restore_pointer: true,
        restore_duration: Duration::ZERO,
    });
    let mut driver = LoggingDriver::default();

    let start = tokio::time::Instant::now();
    let report = assert_ok!(executor.execute(&mut driver, Point::new(500, 500)).await);

    assert_eq!(
        driver.calls,
        vec!["pointer", "click (500, 500) left x1", "move (1, 2)"]
    );
    assert_eq!(report.restored_to, Some(Point::new(1, 2)));
    assert!(start.elapsed() >= Duration::from_millis(550));
}
