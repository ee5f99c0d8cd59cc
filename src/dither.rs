use crate::picture::{or_bit, Bitplane, Intensity};

/// Source of per-pixel threshold bytes.
pub trait Noise {
    fn next_byte(&mut self) -> u8;
}

/// Full PRNG draw per pixel.
pub struct RandNoise {
    rng: fastrand::Rng,
}

impl RandNoise {
    pub fn new(seed: u64) -> Self {
        RandNoise { rng: fastrand::Rng::with_seed(seed) }
    }
}

impl Noise for RandNoise {
    fn next_byte(&mut self) -> u8 {
        self.rng.u8(..)
    }
}

/// 256 random bytes read back through a wrapping counter.
///
/// Much cheaper than a PRNG call per pixel but repeats every 256 draws; with
/// a frame size that is a multiple of 256 a pixel sees the same threshold
/// every frame, so the counter is nudged by one extra step per frame.
pub struct LutNoise {
    table: [u8; 256],
    cursor: u8,
}

impl LutNoise {
    pub fn new(seed: u64) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut table = [0; 256];
        rng.fill(&mut table);
        LutNoise { table, cursor: 0 }
    }

    pub fn skip(&mut self) {
        self.cursor = self.cursor.wrapping_add(1);
    }
}

impl Noise for LutNoise {
    fn next_byte(&mut self) -> u8 {
        let value = self.table[self.cursor as usize];
        self.cursor = self.cursor.wrapping_add(1);
        value
    }
}

pub enum Dither {
    Rand(RandNoise),
    Lut(LutNoise),
}

impl Dither {
    pub fn end_frame(&mut self) {
        if let Dither::Lut(lut) = self {
            lut.skip();
        }
    }
}

impl Noise for Dither {
    fn next_byte(&mut self) -> u8 {
        match self {
            Dither::Rand(noise) => noise.next_byte(),
            Dither::Lut(noise) => noise.next_byte(),
        }
    }
}

/// ORs a bit into `frame` wherever the intensity beats a fresh noise byte.
///
/// `frame` is expected to have been cleared by the caller.
pub fn present(intensity: &Intensity, frame: &mut Bitplane, noise: &mut impl Noise) {
    let width = intensity.width().min(frame.width());
    let height = intensity.height().min(frame.height());
    for y in 0..height {
        let source = intensity.row(y);
        let row = frame.row_mut(y);
        for x in 0..width {
            let on = source[x as usize] > noise.next_byte();
            or_bit(row, x, on);
        }
    }
}
