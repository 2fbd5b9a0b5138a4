pub mod edges;
pub mod contour;
pub mod simplify;
pub mod hough;
pub mod merge;
pub mod detection;

pub use edges::*;
pub use contour::*;
pub use simplify::*;
pub use hough::*;
pub use merge::*;
pub use detection::*;
