//! # Tick Index
//!
//! Tick arrays and the bitmaps that record which of them hold liquidity.

pub mod bitmap;
pub mod bitmap_extension;
pub mod index;
pub mod tick_array;
pub mod tick_array_bitmap;

pub use bitmap_extension::{
    bitmap_offset, extension_tick_boundary, tick_array_offset_in_bitmap, ExtensionBitmap,
    TickArrayBitmapExtension,
};
pub use index::TickArrayIndex;
pub use tick_array::*;
pub use tick_array_bitmap::*;
