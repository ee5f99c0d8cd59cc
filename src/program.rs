use crate::dither::{present, Dither};
use crate::error::Result;
use crate::picture::{or_bit, Bitplane, Intensity, Picture};

/// Per-frame readings handed to a program by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Input {
    /// Crank position in degrees, when the host has one.
    pub crank: Option<f32>,
    pub frame: u64,
}

const RADIANS_PER_FRAME: f32 = 0.05;

impl Input {
    /// Light angle in radians: the crank if present, otherwise time.
    pub fn angle(&self) -> f32 {
        match self.crank {
            Some(degrees) => degrees.to_radians(),
            None => self.frame as f32 * RADIANS_PER_FRAME,
        }
    }
}

/// Frame callback invoked once per display refresh.
///
/// Returns whether the program wants another refresh.
pub trait Program {
    fn update(&mut self, frame: &mut Bitplane, input: &Input) -> Result<bool>;
}

/// A disc in the middle of the display that breathes over time.
#[derive(Default)]
pub struct Circle;

impl Program for Circle {
    fn update(&mut self, frame: &mut Bitplane, input: &Input) -> Result<bool> {
        frame.clear();
        let cy = (frame.height() >> 1) as i64;
        let cx = (frame.width() >> 1) as i64;
        let rad2 = ((input.frame as f64 / 100.0).sin() * 1000.0 + 1000.0) as i64;
        let width = frame.width();

        for r in 0..frame.height() {
            let dr2 = (r as i64 - cy).pow(2);
            let row = frame.row_mut(r);
            for c in 0..width {
                let dc2 = (c as i64 - cx).pow(2);
                or_bit(row, c, dr2 + dc2 < rad2);
            }
        }
        Ok(true)
    }
}

/// Vertical gradient, temporally dithered.
pub struct Gradient {
    intensity: Intensity,
    dither: Dither,
}

impl Gradient {
    pub fn new(width: u32, height: u32, dither: Dither) -> Self {
        let mut intensity = Picture::filled((width, height), 0);
        for y in 0..height {
            let level = y.min(u8::MAX as u32) as u8;
            for x in 0..width {
                *intensity.pixel_mut(x, y) = level;
            }
        }
        Gradient { intensity, dither }
    }
}

impl Program for Gradient {
    fn update(&mut self, frame: &mut Bitplane, _input: &Input) -> Result<bool> {
        frame.clear();
        present(&self.intensity, frame, &mut self.dither);
        self.dither.end_frame();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::dither::RandNoise;

    use super::*;

    #[test]
    fn crank_overrides_time() {
        let input = Input { crank: Some(180.0), frame: 99 };
        assert!((input.angle() - std::f32::consts::PI).abs() < 1e-6);
        let input = Input { crank: None, frame: 20 };
        assert!((input.angle() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn circle_radius_breathes() {
        let mut frame = Bitplane::new(400, 240);
        let mut circle = Circle;

        // sin(0) = 0: squared radius 1000, so about 31 pixels out
        circle.update(&mut frame, &Input::default()).unwrap();
        assert!(frame.is_set(200, 120));
        assert!(frame.is_set(230, 120));
        assert!(!frame.is_set(232, 120));
        assert!(!frame.is_set(0, 0));

        // a quarter period later the disc has grown to about 44 pixels
        let grown = Input { crank: None, frame: 157 };
        circle.update(&mut frame, &grown).unwrap();
        assert!(frame.is_set(243, 120));
        assert!(!frame.is_set(246, 120));
    }

    #[test]
    fn circle_vanishes_at_minimum() {
        // sin(3pi/2) = -1 collapses the radius to nothing
        let mut frame = Bitplane::new(400, 240);
        let input = Input { crank: None, frame: 471 };
        Circle.update(&mut frame, &input).unwrap();
        assert!(frame.bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn gradient_top_row_is_dark() {
        let mut gradient = Gradient::new(400, 240, Dither::Rand(RandNoise::new(9)));
        let mut frame = Bitplane::new(400, 240);
        gradient.update(&mut frame, &Input::default()).unwrap();
        assert!((0..400).all(|x| !frame.is_set(x, 0)));

        let lit = (0..400).filter(|&x| frame.is_set(x, 239)).count();
        // row 239 is lit with probability 239/256
        assert!(lit > 330, "lit {}", lit);
    }
}
