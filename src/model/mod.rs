//! Data model types.
//!
//! Pages, regions and captures are plain values; ownership of the
//! collections that hold them lives in the component modules
//! (`raster`, `selection`, `capture`).

mod capture;
mod page;
mod region;
mod table;

pub use capture::{Capture, CaptureId};
pub use page::{PageInfo, PageRaster};
pub use region::{InProgressSelection, Region, RegionId, RegionSpec};
pub use table::{Table, TableRow, TableSet};
