use std::path::Path;

use glam::{UVec2, Vec4};

use crate::gpu::Tex;
use crate::Result;

/// In-memory, single-layer texture with `f32` channels.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    size: UVec2,
    pixels: Vec<Vec4>,
}

impl Image {
    pub fn new(size: UVec2) -> Self {
        Self::filled(size, Vec4::ZERO)
    }

    pub fn filled(size: UVec2, value: Vec4) -> Self {
        assert!(size.x > 0);
        assert!(size.y > 0);

        Self {
            size,
            pixels: vec![value; (size.x * size.y) as usize],
        }
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn contains(&self, pos: UVec2) -> bool {
        pos.x < self.size.x && pos.y < self.size.y
    }

    /// Returns value of given pixel; out-of-bounds reads return zero, the
    /// same way robust buffer access does on the GPU.
    pub fn get(&self, pos: UVec2) -> Vec4 {
        if self.contains(pos) {
            self.pixels[self.index(pos)]
        } else {
            Vec4::ZERO
        }
    }

    pub fn set(&mut self, pos: UVec2, value: Vec4) {
        assert!(
            self.contains(pos),
            "out-of-bounds write at {pos} (size={})",
            self.size
        );

        let idx = self.index(pos);

        self.pixels[idx] = value;
    }

    pub fn fill(&mut self, value: Vec4) {
        self.pixels.fill(value);
    }

    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    /// Iterates over positions of all pixels, row by row.
    pub fn positions(&self) -> impl Iterator<Item = UVec2> {
        let size = self.size;

        (0..size.y).flat_map(move |y| (0..size.x).map(move |x| UVec2::new(x, y)))
    }

    /// Saves the image as an 8-bit PNG, clamping channels into `<0.0, 1.0>`.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        log::debug!("Saving image `{}`; size={}", path.display(), self.size);

        let img = ::image::RgbaImage::from_fn(self.size.x, self.size.y, |x, y| {
            let px = self.get(UVec2::new(x, y)).clamp(Vec4::ZERO, Vec4::ONE);
            let px = (px * 255.0).round();

            ::image::Rgba([px.x as u8, px.y as u8, px.z as u8, px.w as u8])
        });

        img.save_with_format(path, ::image::ImageFormat::Png)?;

        Ok(())
    }

    fn index(&self, pos: UVec2) -> usize {
        (pos.y * self.size.x + pos.x) as usize
    }
}

impl Tex for Image {
    fn read(&self, pos: UVec2) -> Vec4 {
        self.get(pos)
    }
}

#[cfg(test)]
mod tests {
    use glam::{uvec2, vec4};

    use super::*;

    #[test]
    fn get_and_set() {
        let mut image = Image::new(uvec2(4, 3));

        image.set(uvec2(3, 2), vec4(1.0, 2.0, 3.0, 4.0));

        assert_eq!(vec4(1.0, 2.0, 3.0, 4.0), image.get(uvec2(3, 2)));
        assert_eq!(Vec4::ZERO, image.get(uvec2(2, 2)));
        assert_eq!(12, image.positions().count());
    }

    #[test]
    fn out_of_bounds_reads_are_zero() {
        let image = Image::filled(uvec2(4, 3), Vec4::ONE);

        assert_eq!(Vec4::ONE, image.read(uvec2(3, 2)));
        assert_eq!(Vec4::ZERO, image.read(uvec2(4, 0)));
        assert_eq!(Vec4::ZERO, image.read(uvec2(0, 3)));
    }

    #[test]
    #[should_panic]
    fn out_of_bounds_writes_panic() {
        Image::new(uvec2(4, 3)).set(uvec2(4, 0), Vec4::ONE);
    }
}
