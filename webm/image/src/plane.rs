/*!
    Plane geometry.

    Subsampled chroma planes round their dimensions up so odd source
    dimensions stay fully covered; a one-pixel deviation here corrupts chroma
    at image edges.
*/

/**
    One plane of a planar image.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Plane {
    /// Full-resolution luma plane.
    Luma,
    /// First chroma plane, reduced by the image's chroma shift.
    ChromaU,
    /// Second chroma plane, reduced by the image's chroma shift.
    ChromaV,
    /// Full-resolution alpha plane.
    Alpha,
}

impl Plane {
    /**
        Returns true if this plane is reduced by the chroma subsampling shift.
    */
    pub const fn is_subsampled(self) -> bool {
        matches!(self, Self::ChromaU | Self::ChromaV)
    }
}

/**
    Effective pixel width of a plane.

    Chroma planes with a non-zero horizontal shift `s` are `(width + 1) >> s`
    pixels wide; luma and alpha planes keep the full width.
*/
pub const fn plane_width(plane: Plane, width: u32, x_shift: u32) -> u32 {
    if plane.is_subsampled() && x_shift > 0 {
        (width + 1) >> x_shift
    } else {
        width
    }
}

/**
    Effective pixel height of a plane.

    Mirrors [`plane_width`] for the vertical shift.
*/
pub const fn plane_height(plane: Plane, height: u32, y_shift: u32) -> u32 {
    if plane.is_subsampled() && y_shift > 0 {
        (height + 1) >> y_shift
    } else {
        height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_resolution_planes_keep_dimensions() {
        assert_eq!(plane_width(Plane::Luma, 641, 1), 641);
        assert_eq!(plane_width(Plane::Alpha, 641, 1), 641);
        assert_eq!(plane_height(Plane::Luma, 481, 1), 481);
        assert_eq!(plane_height(Plane::Alpha, 481, 1), 481);
    }

    #[test]
    fn chroma_rounds_up_for_odd_dimensions() {
        assert_eq!(plane_width(Plane::ChromaU, 641, 1), 321);
        assert_eq!(plane_width(Plane::ChromaV, 640, 1), 320);
        assert_eq!(plane_height(Plane::ChromaU, 481, 1), 241);
        assert_eq!(plane_height(Plane::ChromaV, 480, 1), 240);
    }

    #[test]
    fn zero_shift_disables_subsampling() {
        assert_eq!(plane_width(Plane::ChromaU, 641, 0), 641);
        assert_eq!(plane_height(Plane::ChromaV, 481, 0), 481);
    }

    #[test]
    fn larger_shifts_divide_further() {
        assert_eq!(plane_width(Plane::ChromaU, 640, 2), 160);
        assert_eq!(plane_width(Plane::ChromaU, 641, 2), 160);
    }
}
