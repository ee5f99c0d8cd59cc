use bytemuck_derive::{AnyBitPattern, NoUninit};
use wgpu::TextureFormat;

#[derive(Default, Debug, Copy, Clone, PartialEq, AnyBitPattern, NoUninit)]
#[repr(C)]
pub struct RGBA8 {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl RGBA8 {
    pub const WHITE: RGBA8 = RGBA8::new_hex(0xFFFFFFFF);
    pub const BLACK: RGBA8 = RGBA8::new_hex(0x000000FF);

    pub const fn new_hex(rgba: u32) -> RGBA8 {
        RGBA8 {
            r: ((rgba & 0xff000000) >> 24) as u8,
            g: ((rgba & 0x00ff0000) >> 16) as u8,
            b: ((rgba & 0x0000ff00) >> 8) as u8,
            a: (rgba & 0x000000ff) as u8,
        }
    }
}

impl PixelFormat for RGBA8 {
    fn texture_format() -> TextureFormat {
        TextureFormat::Rgba8Unorm
    }
}

pub trait PixelFormat: bytemuck::AnyBitPattern + bytemuck::NoUninit {
    fn texture_format() -> TextureFormat;
}

pub struct Picture<P> {
    pixels: P,
    size: (u32, u32),
}

impl<P> Picture<P> {
    pub fn new(pixels: P, size: (u32, u32)) -> Self {
        Picture { pixels, size }
    }

    pub fn width(&self) -> u32 {
        self.size.0
    }

    pub fn height(&self) -> u32 {
        self.size.1
    }

    fn to_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width() as usize + x as usize
    }
}

impl<T: Clone> Picture<Vec<T>> {
    pub fn filled(size: (u32, u32), value: T) -> Self {
        let pixels = vec![value; size.0 as usize * size.1 as usize];
        Picture::new(pixels, size)
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> &T {
        &self.pixels[self.to_index(x, y)]
    }

    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut T {
        let index = self.to_index(x, y);
        &mut self.pixels[index]
    }

    pub fn row(&self, y: u32) -> &[T] {
        let from = self.to_index(0, y);
        &self.pixels[from..from + self.width() as usize]
    }

    #[cfg(test)]
    pub fn buffer(&self) -> &[T] {
        &self.pixels
    }

    pub fn buffer_mut(&mut self) -> &mut [T] {
        &mut self.pixels
    }
}

impl<'a, T> Picture<&'a mut [T]> {
    pub fn slice_mut(&mut self, x: u32, y: u32, len: usize) -> &mut [T] {
        let from = self.to_index(x, y);
        &mut self.pixels[from..from + len]
    }
}

/// Greyscale shading result, one byte per pixel.
pub type Intensity = Picture<Vec<u8>>;

/// Packed 1-bit framebuffer, most significant bit leftmost.
pub struct Bitplane {
    bytes: Vec<u8>,
    stride: usize,
    size: (u32, u32),
}

impl Bitplane {
    pub fn new(width: u32, height: u32) -> Self {
        let stride = (width as usize + 7) / 8;
        Bitplane {
            bytes: vec![0; stride * height as usize],
            stride,
            size: (width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.size.0
    }

    pub fn height(&self) -> u32 {
        self.size.1
    }

    #[cfg(test)]
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let from = y as usize * self.stride;
        &mut self.bytes[from..from + self.stride]
    }

    /// ORs `on` into the bit for (x, y); never clears a bit.
    #[cfg(test)]
    pub fn or(&mut self, x: u32, y: u32, on: bool) {
        or_bit(self.row_mut(y), x, on);
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        let byte = self.bytes[y as usize * self.stride + (x >> 3) as usize];
        byte & (0x80 >> (x & 7)) != 0
    }

    #[cfg(test)]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Expands set bits to white and clear bits to black.
    pub fn expand_into(&self, picture: &mut Picture<&mut [RGBA8]>) {
        let width = self.width().min(picture.width());
        let height = self.height().min(picture.height());
        for y in 0..height {
            let row = picture.slice_mut(0, y, width as usize);
            for (x, pixel) in row.iter_mut().enumerate() {
                *pixel = if self.is_set(x as u32, y) { RGBA8::WHITE } else { RGBA8::BLACK };
            }
        }
    }
}

pub fn or_bit(row: &mut [u8], x: u32, on: bool) {
    row[(x >> 3) as usize] |= (on as u8) << (7 - (x & 7));
}
