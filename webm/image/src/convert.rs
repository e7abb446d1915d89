/*!
    Packed RGBA to planar YUV conversion.

    Integer BT.601 studio-swing coefficients, with chroma box-averaged over
    each chroma cell. Channel handling is byte-exact: the source is read as
    R, G, B, A in memory order and the fourth channel is ignored for color.
*/

use webm_types::{Error, Result};

use crate::plane::Plane;
use crate::planar::PlanarImage;

impl PlanarImage {
    /**
        Color-convert packed RGBA pixels into this image's YUV planes.

        The source must be `width * height * 4` bytes of interleaved 8-bit
        RGBA rows; anything else fails with a conversion error. Call
        [`PlanarImage::clear`] since the buffer's last use first: conversion
        writes only the logical plane regions, so a stale buffer keeps old
        edge bytes. An alpha plane, when present, is left at its cleared
        sentinel.
    */
    pub fn convert_rgba(&mut self, rgba: &[u8]) -> Result<()> {
        let width = self.width() as usize;
        let height = self.height() as usize;

        let expected = width * height * 4;
        if rgba.len() != expected {
            return Err(Error::conversion(format!(
                "source buffer is {} bytes, {}x{} RGBA needs {}",
                rgba.len(),
                width,
                height,
                expected
            )));
        }

        self.convert_luma(rgba)?;
        self.convert_chroma(rgba, Plane::ChromaU)?;
        self.convert_chroma(rgba, Plane::ChromaV)?;
        Ok(())
    }

    fn convert_luma(&mut self, rgba: &[u8]) -> Result<()> {
        let width = self.width() as usize;
        let height = self.height() as usize;
        let stride = self.stride(Plane::Luma);
        let data = self
            .plane_data_mut(Plane::Luma)
            .ok_or_else(|| Error::conversion("luma plane missing"))?;

        for y in 0..height {
            let row = &mut data[y * stride..y * stride + width];
            for (x, out) in row.iter_mut().enumerate() {
                let i = (y * width + x) * 4;
                *out = luma_value(rgba[i] as i32, rgba[i + 1] as i32, rgba[i + 2] as i32);
            }
        }
        Ok(())
    }

    fn convert_chroma(&mut self, rgba: &[u8], plane: Plane) -> Result<()> {
        let width = self.width() as usize;
        let height = self.height() as usize;
        let plane_w = self.plane_width(plane) as usize;
        let plane_h = self.plane_height(plane) as usize;
        let stride = self.stride(plane);
        let data = self
            .plane_data_mut(plane)
            .ok_or_else(|| Error::conversion("chroma plane missing"))?;

        for cy in 0..plane_h {
            let row = &mut data[cy * stride..cy * stride + plane_w];
            for (cx, out) in row.iter_mut().enumerate() {
                let (r, g, b) = average_box(rgba, width, height, cx, cy);
                *out = match plane {
                    Plane::ChromaU => chroma_u_value(r, g, b),
                    _ => chroma_v_value(r, g, b),
                };
            }
        }
        Ok(())
    }
}

/// Average the RGB channels of the source pixels under one chroma cell.
/// Edge cells of odd-dimension images cover fewer than four pixels.
fn average_box(rgba: &[u8], width: usize, height: usize, cx: usize, cy: usize) -> (i32, i32, i32) {
    let x0 = cx * 2;
    let y0 = cy * 2;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);

    let (mut r, mut g, mut b) = (0i32, 0i32, 0i32);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let i = (y * width + x) * 4;
            r += rgba[i] as i32;
            g += rgba[i + 1] as i32;
            b += rgba[i + 2] as i32;
        }
    }

    let count = ((x1 - x0 + 1) * (y1 - y0 + 1)) as i32;
    let half = count / 2;
    ((r + half) / count, (g + half) / count, (b + half) / count)
}

fn luma_value(r: i32, g: i32, b: i32) -> u8 {
    clamp_byte(((66 * r + 129 * g + 25 * b + 128) >> 8) + 16)
}

fn chroma_u_value(r: i32, g: i32, b: i32) -> u8 {
    clamp_byte(((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128)
}

fn chroma_v_value(r: i32, g: i32, b: i32) -> u8 {
    clamp_byte(((112 * r - 94 * g - 18 * b + 128) >> 8) + 128)
}

fn clamp_byte(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_rgba(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        rgba.repeat((width * height) as usize)
    }

    fn converted(width: u32, height: u32, pixel: [u8; 4]) -> PlanarImage {
        let mut image = PlanarImage::i420(width, height).unwrap();
        image.clear();
        image
            .convert_rgba(&solid_rgba(width, height, pixel))
            .unwrap();
        image
    }

    fn first_samples(image: &PlanarImage) -> (u8, u8, u8) {
        (
            image.plane_data(Plane::Luma).unwrap()[0],
            image.plane_data(Plane::ChromaU).unwrap()[0],
            image.plane_data(Plane::ChromaV).unwrap()[0],
        )
    }

    #[test]
    fn solid_colors_hit_bt601_studio_swing_values() {
        assert_eq!(first_samples(&converted(4, 4, [0, 0, 0, 255])), (16, 128, 128));
        assert_eq!(
            first_samples(&converted(4, 4, [255, 255, 255, 255])),
            (235, 128, 128)
        );
        assert_eq!(first_samples(&converted(4, 4, [255, 0, 0, 255])), (82, 90, 240));
        assert_eq!(first_samples(&converted(4, 4, [0, 255, 0, 255])), (144, 54, 34));
        assert_eq!(first_samples(&converted(4, 4, [0, 0, 255, 255])), (41, 240, 110));
    }

    #[test]
    fn alpha_channel_is_ignored_for_color() {
        assert_eq!(
            first_samples(&converted(4, 4, [255, 0, 0, 0])),
            first_samples(&converted(4, 4, [255, 0, 0, 255]))
        );
    }

    #[test]
    fn chroma_cells_average_their_source_block() {
        let mut image = PlanarImage::i420(2, 2).unwrap();
        image.clear();

        let red = [255u8, 0, 0, 255];
        let blue = [0u8, 0, 255, 255];
        let rgba: Vec<u8> = [red, red, blue, blue].concat();
        image.convert_rgba(&rgba).unwrap();

        let luma = image.plane_data(Plane::Luma).unwrap();
        let stride = image.stride(Plane::Luma);
        assert_eq!(&luma[..2], &[82, 82]);
        assert_eq!(&luma[stride..stride + 2], &[41, 41]);

        // Averaged half-red half-blue block.
        assert_eq!(image.plane_data(Plane::ChromaU).unwrap()[0], 165);
        assert_eq!(image.plane_data(Plane::ChromaV).unwrap()[0], 175);
    }

    #[test]
    fn odd_dimensions_use_partial_edge_blocks() {
        let mut image = PlanarImage::i420(3, 3).unwrap();
        image.clear();

        let mut rgba = solid_rgba(3, 3, [0, 0, 0, 255]);
        // Bottom-right pixel red; it alone feeds the last chroma cell.
        rgba[(2 * 3 + 2) * 4] = 255;
        image.convert_rgba(&rgba).unwrap();

        let u = image.plane_data(Plane::ChromaU).unwrap();
        let v = image.plane_data(Plane::ChromaV).unwrap();
        let u_stride = image.stride(Plane::ChromaU);
        let v_stride = image.stride(Plane::ChromaV);

        assert_eq!(u[0], 128);
        assert_eq!(v[0], 128);
        assert_eq!(u[u_stride + 1], 90);
        assert_eq!(v[v_stride + 1], 240);

        let luma = image.plane_data(Plane::Luma).unwrap();
        let l_stride = image.stride(Plane::Luma);
        assert_eq!(luma[0], 16);
        assert_eq!(luma[2 * l_stride + 2], 82);
    }

    #[test]
    fn wrong_source_length_is_a_conversion_error() {
        let mut image = PlanarImage::i420(4, 4).unwrap();
        image.clear();

        let err = image.convert_rgba(&[0u8; 7]).unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
    }

    #[test]
    fn alpha_plane_keeps_cleared_sentinel() {
        let mut image = PlanarImage::i420_alpha(4, 4).unwrap();
        image.clear();
        image
            .convert_rgba(&solid_rgba(4, 4, [10, 20, 30, 200]))
            .unwrap();

        let w = image.plane_width(Plane::Alpha) as usize;
        let stride = image.stride(Plane::Alpha);
        let alpha = image.plane_data(Plane::Alpha).unwrap();
        for row in 0..image.plane_height(Plane::Alpha) as usize {
            assert!(alpha[row * stride..row * stride + w].iter().all(|&b| b == 1));
        }
    }
}
