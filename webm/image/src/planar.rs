/*!
    Reusable planar image buffer.
*/

use webm_types::{Error, Result};

use crate::plane::{Plane, plane_height, plane_width};

/// Row stride alignment, in bytes, for every plane.
const STRIDE_ALIGN: usize = 16;

/// Baseline byte written by `clear` into luma and chroma planes.
const CLEAR_COLOR: u8 = 0;

/// Baseline byte written by `clear` into an alpha plane (minimum opaque).
const CLEAR_ALPHA: u8 = 1;

/**
    An owned planar pixel buffer in 4:2:0 layout, with an optional
    full-resolution alpha plane.

    Row pitch may exceed the logical plane width for alignment; every
    operation distinguishes stride from logical width.
*/
pub struct PlanarImage {
    width: u32,
    height: u32,
    x_shift: u32,
    y_shift: u32,
    planes: Vec<PlaneBuffer>,
}

struct PlaneBuffer {
    plane: Plane,
    stride: usize,
    data: Vec<u8>,
}

impl PlanarImage {
    /**
        Create a 4:2:0 image with luma and two chroma planes.
    */
    pub fn i420(width: u32, height: u32) -> Result<Self> {
        Self::with_layout(width, height, &[Plane::Luma, Plane::ChromaU, Plane::ChromaV])
    }

    /**
        Create a 4:2:0 image with an additional full-resolution alpha plane.
    */
    pub fn i420_alpha(width: u32, height: u32) -> Result<Self> {
        Self::with_layout(
            width,
            height,
            &[Plane::Luma, Plane::ChromaU, Plane::ChromaV, Plane::Alpha],
        )
    }

    fn with_layout(width: u32, height: u32, layout: &[Plane]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_data(format!(
                "image dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }

        let (x_shift, y_shift) = (1, 1);
        let planes = layout
            .iter()
            .map(|&plane| {
                let w = plane_width(plane, width, x_shift) as usize;
                let h = plane_height(plane, height, y_shift) as usize;
                let stride = w.next_multiple_of(STRIDE_ALIGN);
                PlaneBuffer {
                    plane,
                    stride,
                    data: vec![0; stride * h],
                }
            })
            .collect();

        Ok(Self {
            width,
            height,
            x_shift,
            y_shift,
            planes,
        })
    }

    /**
        Full image width in pixels.
    */
    pub fn width(&self) -> u32 {
        self.width
    }

    /**
        Full image height in pixels.
    */
    pub fn height(&self) -> u32 {
        self.height
    }

    /**
        Horizontal chroma subsampling shift.
    */
    pub fn x_shift(&self) -> u32 {
        self.x_shift
    }

    /**
        Vertical chroma subsampling shift.
    */
    pub fn y_shift(&self) -> u32 {
        self.y_shift
    }

    /**
        Returns true if the image carries an alpha plane.
    */
    pub fn has_alpha(&self) -> bool {
        self.buffer(Plane::Alpha).is_some()
    }

    /**
        Effective pixel width of one of this image's planes.
    */
    pub fn plane_width(&self, plane: Plane) -> u32 {
        plane_width(plane, self.width, self.x_shift)
    }

    /**
        Effective pixel height of one of this image's planes.
    */
    pub fn plane_height(&self, plane: Plane) -> u32 {
        plane_height(plane, self.height, self.y_shift)
    }

    /**
        Row pitch of a plane in bytes, or 0 if the plane is absent.
    */
    pub fn stride(&self, plane: Plane) -> usize {
        self.buffer(plane).map(|b| b.stride).unwrap_or(0)
    }

    /**
        Bytes of a plane, or None if the plane is absent.
    */
    pub fn plane_data(&self, plane: Plane) -> Option<&[u8]> {
        self.buffer(plane).map(|b| b.data.as_slice())
    }

    pub(crate) fn plane_data_mut(&mut self, plane: Plane) -> Option<&mut [u8]> {
        self.buffer_mut(plane).map(|b| b.data.as_mut_slice())
    }

    /**
        Reset every plane to its baseline value.

        Walks each plane's logical rows and writes the baseline across exactly
        the logical width, leaving stride padding untouched. Luma and chroma
        planes clear to 0; an alpha plane clears to the minimum opaque
        sentinel. Stale pixels from a previous frame never survive a clear.
    */
    pub fn clear(&mut self) {
        let (width, height) = (self.width, self.height);
        let (x_shift, y_shift) = (self.x_shift, self.y_shift);

        for buffer in &mut self.planes {
            let value = if buffer.plane == Plane::Alpha {
                CLEAR_ALPHA
            } else {
                CLEAR_COLOR
            };
            let w = plane_width(buffer.plane, width, x_shift) as usize;
            let h = plane_height(buffer.plane, height, y_shift) as usize;

            for row in 0..h {
                let start = row * buffer.stride;
                buffer.data[start..start + w].fill(value);
            }
        }
    }

    fn buffer(&self, plane: Plane) -> Option<&PlaneBuffer> {
        self.planes.iter().find(|b| b.plane == plane)
    }

    fn buffer_mut(&mut self, plane: Plane) -> Option<&mut PlaneBuffer> {
        self.planes.iter_mut().find(|b| b.plane == plane)
    }
}

impl std::fmt::Debug for PlanarImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanarImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("planes", &self.planes.len())
            .finish_non_exhaustive()
    }
}
