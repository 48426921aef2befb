use super::{MatchError, Matcher};
use crate::models::{Frame, MatchResult, Point, Template};
use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::definitions::Image;
use imageproc::integral_image::{integral_image, integral_squared_image};
use imageproc::template_matching::{MatchTemplateMethod, find_extremes, match_template};

/// Downscale factor for the coarse search pass
pub const DEFAULT_COARSE_FACTOR: u32 = 4;

/// A template is never shrunk below this many pixels on either side
pub const MIN_COARSE_SIDE: u32 = 8;

/// Coarse peaks that get a full-resolution refinement
const REFINE_CANDIDATES: usize = 4;

const VARIANCE_EPSILON: f64 = 1e-6;

/// Normalised cross-correlation matcher (mean-subtracted, i.e. `TM_CCOEFF_NORMED`)
/// on top of `imageproc`'s template matching and integral images.
///
/// Scores fall in `[0, 1]`: negative correlation clamps to zero, and windows
/// with no intensity variation score zero. Large templates are searched on a
/// downscaled copy first, then the best coarse peaks are re-scored at full
/// resolution in a small neighbourhood.
#[derive(Debug, Clone)]
pub struct NccMatcher {
    coarse_factor: u32,
}

impl NccMatcher {
    pub fn new() -> Self {
        Self::with_coarse_factor(DEFAULT_COARSE_FACTOR)
    }

    /// `1` disables the coarse pass and scores every position at full resolution.
    pub fn with_coarse_factor(factor: u32) -> Self {
        Self {
            coarse_factor: factor.max(1),
        }
    }

    fn factor_for(&self, template: &GrayImage) -> u32 {
        let (w, h) = template.dimensions();
        let mut factor = self.coarse_factor;
        while factor > 1 && (w / factor < MIN_COARSE_SIDE || h / factor < MIN_COARSE_SIDE) {
            factor /= 2;
        }
        factor
    }

    fn best_position(&self, frame: &GrayImage, template: &GrayImage) -> Option<Candidate> {
        let factor = self.factor_for(template);
        if factor == 1 {
            return best_of(&score_map(frame, template), 0, 0);
        }

        let (fw, fh) = frame.dimensions();
        let (tw, th) = template.dimensions();
        let coarse_frame = imageops::resize(frame, fw / factor, fh / factor, FilterType::Triangle);
        let coarse_template =
            imageops::resize(template, tw / factor, th / factor, FilterType::Triangle);
        let peaks = top_peaks(&score_map(&coarse_frame, &coarse_template), REFINE_CANDIDATES);

        let (max_x, max_y) = (fw - tw, fh - th);
        peaks
            .into_iter()
            .filter_map(|peak| {
                let (cx, cy) = (peak.x * factor, peak.y * factor);
                let left = cx.saturating_sub(factor).min(max_x);
                let top = cy.saturating_sub(factor).min(max_y);
                let right = (cx + factor).min(max_x);
                let bottom = (cy + factor).min(max_y);

                let window =
                    imageops::crop_imm(frame, left, top, right - left + tw, bottom - top + th)
                        .to_image();
                best_of(&score_map(&window, template), left, top)
            })
            .fold(None, |best, candidate| match best {
                Some(b) if b.score >= candidate.score => Some(b),
                _ => Some(candidate),
            })
    }
}

impl Default for NccMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher for NccMatcher {
    fn find(
        &self,
        frame: &Frame,
        template: &Template,
        threshold: f64,
    ) -> Result<MatchResult, MatchError> {
        let (tw, th) = template.image.dimensions();
        let (fw, fh) = frame.image.dimensions();

        if tw == 0 || th == 0 {
            return Err(MatchError::EmptyTemplate(template.name.clone()));
        }
        if fw == 0 || fh == 0 {
            return Err(MatchError::EmptyFrame);
        }
        if tw > fw || th > fh {
            return Ok(MatchResult::NoMatch);
        }

        let Some(best) = self.best_position(&frame.image, &template.image) else {
            return Ok(MatchResult::NoMatch);
        };

        tracing::trace!(
            "Best score for {}: {:.3} at +({}, {})",
            template.name,
            best.score,
            best.x,
            best.y
        );

        if best.score < threshold {
            return Ok(MatchResult::NoMatch);
        }

        let location = Point::new(
            frame.origin.x + (best.x + tw / 2) as i32,
            frame.origin.y + (best.y + th / 2) as i32,
        );
        Ok(MatchResult::Hit {
            location,
            confidence: best.score,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    x: u32,
    y: u32,
    score: f64,
}

/// Mean-subtracted correlation for every placement of `template` in `frame`.
///
/// `imageproc` supplies the raw cross-correlation and the window sums; the
/// means are removed here with `sum(f*t) - sum(f)*sum(t)/n`.
fn score_map(frame: &GrayImage, template: &GrayImage) -> Image<Luma<f32>> {
    let cross = match_template(frame, template, MatchTemplateMethod::CrossCorrelation);
    let sums = integral_image::<_, u64>(frame);
    let squares = integral_squared_image::<_, u64>(frame);

    let (tw, th) = template.dimensions();
    let n = f64::from(tw) * f64::from(th);
    let t_sum: f64 = template.as_raw().iter().map(|&v| f64::from(v)).sum();
    let t_sq: f64 = template.as_raw().iter().map(|&v| f64::from(v).powi(2)).sum();
    let t_var = t_sq - t_sum * t_sum / n;

    ImageBuffer::from_fn(cross.width(), cross.height(), |x, y| {
        let f_sum = window_sum(&sums, x, y, tw, th);
        let f_var = window_sum(&squares, x, y, tw, th) - f_sum * f_sum / n;
        if t_var < VARIANCE_EPSILON || f_var < VARIANCE_EPSILON {
            return Luma([0.0]);
        }

        let numerator = f64::from(cross.get_pixel(x, y)[0]) - f_sum * t_sum / n;
        let score = numerator / (t_var * f_var).sqrt();
        if score.is_finite() {
            Luma([score.clamp(0.0, 1.0) as f32])
        } else {
            Luma([0.0])
        }
    })
}

/// Sum over the `w`x`h` window at (`x`, `y`) of a zero-padded integral image
fn window_sum(integral: &Image<Luma<u64>>, x: u32, y: u32, w: u32, h: u32) -> f64 {
    let at = |x: u32, y: u32| integral.get_pixel(x, y)[0];
    (at(x + w, y + h) + at(x, y) - at(x + w, y) - at(x, y + h)) as f64
}

fn best_of(scores: &Image<Luma<f32>>, left: u32, top: u32) -> Option<Candidate> {
    if scores.width() == 0 || scores.height() == 0 {
        return None;
    }
    let extremes = find_extremes(scores);
    let (x, y) = extremes.max_value_location;
    Some(Candidate {
        x: left + x,
        y: top + y,
        score: f64::from(extremes.max_value),
    })
}

/// Best `keep` positions, highest first; ties keep scan order
fn top_peaks(scores: &Image<Luma<f32>>, keep: usize) -> Vec<Candidate> {
    let mut peaks: Vec<Candidate> = scores
        .enumerate_pixels()
        .map(|(x, y, p)| Candidate {
            x,
            y,
            score: f64::from(p[0]),
        })
        .collect();
    peaks.sort_by(|a, b| b.score.total_cmp(&a.score));
    peaks.truncate(keep);
    peaks
}
