//! Geometrical objects and transforms.

mod angle;
mod axis_aligned_box;
mod bounds;
mod oriented_box;
mod transform;

pub use angle::{Angle, Degrees, Radians};
pub use axis_aligned_box::AxisAlignedBox;
pub use bounds::{Bounds, InclusiveBounds};
pub use oriented_box::OrientedBox;
pub use transform::NodeTransform;
