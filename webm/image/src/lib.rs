/*!
    Planar image preparation for the webm crate ecosystem.

    This crate turns packed RGBA pixels into the subsampled planar YUV layout
    a video encoder consumes: plane geometry math, a reusable planar buffer
    with deterministic clearing, and integer BT.601 color conversion.
*/

pub use webm_types::{Error, Result};

mod convert;
mod plane;
mod planar;

pub use plane::{Plane, plane_height, plane_width};
pub use planar::PlanarImage;
