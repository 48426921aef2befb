use super::{InputDriver, InputError};
use crate::models::{ClickButton, Point};
use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};
use std::time::Duration;

/// Interval between intermediate pointer positions during an animated move
const MOVE_STEP: Duration = Duration::from_millis(10);

/// Pointer control through `enigo`.
pub struct EnigoDriver {
    enigo: Enigo,
}

impl EnigoDriver {
    pub fn new() -> Result<Self, InputError> {
        let enigo =
            Enigo::new(&Settings::default()).map_err(|e| InputError::Unavailable(e.to_string()))?;
        Ok(Self { enigo })
    }

    fn jump(&mut self, target: Point) -> Result<(), InputError> {
        self.enigo
            .move_mouse(target.x, target.y, Coordinate::Abs)
            .map_err(|e| InputError::Move(e.to_string()))
    }
}

impl InputDriver for EnigoDriver {
    fn pointer(&mut self) -> Result<Point, InputError> {
        let (x, y) = self
            .enigo
            .location()
            .map_err(|e| InputError::Pointer(e.to_string()))?;
        Ok(Point::new(x, y))
    }

    fn move_to(&mut self, target: Point, duration: Duration) -> Result<(), InputError> {
        if duration.is_zero() {
            return self.jump(target);
        }

        let start = self.pointer()?;
        for point in glide_path(start, target, duration) {
            self.jump(point)?;
            std::thread::sleep(MOVE_STEP);
        }
        self.jump(target)
    }

    fn click(&mut self, target: Point, button: ClickButton, count: u32) -> Result<(), InputError> {
        self.jump(target)?;

        let mapped = match button {
            ClickButton::Left => Button::Left,
            ClickButton::Right => Button::Right,
            ClickButton::Middle => Button::Middle,
        };
        for _ in 0..count.max(1) {
            self.enigo
                .button(mapped, Direction::Click)
                .map_err(|e| InputError::Click {
                    button: button.as_str(),
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }
}

/// Intermediate points of a linear move, one per [`MOVE_STEP`], excluding
/// the start and the final target. Points are produced lazily.
pub fn glide_path(start: Point, target: Point, duration: Duration) -> impl Iterator<Item = Point> {
    let steps = (duration.as_millis() / MOVE_STEP.as_millis()).max(1) as i64;
    let (dx, dy) = (
        i64::from(target.x) - i64::from(start.x),
        i64::from(target.y) - i64::from(start.y),
    );

    (1..steps).map(move |i| {
        Point::new(
            (i64::from(start.x) + dx * i / steps) as i32,
            (i64::from(start.y) + dy * i / steps) as i32,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glide_path_is_linear() {
        let path: Vec<Point> =
            glide_path(Point::new(0, 0), Point::new(100, -50), Duration::from_millis(50)).collect();
        assert_eq!(
            path,
            vec![
                Point::new(20, -10),
                Point::new(40, -20),
                Point::new(60, -30),
                Point::new(80, -40),
            ]
        );
    }

    #[test]
    fn test_short_duration_has_no_intermediate_points() {
        assert_eq!(
            glide_path(Point::new(5, 5), Point::new(9, 9), Duration::from_millis(3)).count(),
            0
        );
    }

    #[test]
    fn test_long_glide_is_lazy() {
        let mut path = glide_path(Point::new(0, 0), Point::new(1000, 0), Duration::from_secs(1_000_000_000));
        assert_eq!(path.next(), Some(Point::new(0, 0)));
        assert_eq!(path.size_hint().0, 99_999_999_998);
    }
}
