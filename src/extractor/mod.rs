//! Pixel extraction from tiled and stripped images
//!
//! The tile locator maps a source region onto the tile grid; the pixel copy
//! streams the located tiles into a typed raster.

mod region;
pub mod raster;
pub mod listener;
pub mod param;
pub mod tile_locator;
pub mod pixel_copy;

pub use listener::{NoopListener, ReadListener, ReadStatus};
pub use param::{ReadParam, ResolvedRead};
pub use raster::{Raster, RasterData};
pub use region::Region;
pub use tile_locator::Tile;
