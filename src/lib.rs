//! Amrbndry synthesizes the boundary values of grid patches at one level of
//! a block-structured adaptive mesh, for use by linear operators such as
//! multigrid smoothers. Boundary values sit in the cells just outside each
//! face of each patch. They come from the level's own ghost-filled data on
//! faces shared with other patches or wrapped periodically, from the
//! physical boundary fill on the domain edge, and from quadratic
//! interpolation of coarse-level data on coarse-fine interfaces. A coverage
//! mask records which boundary cells lie under another patch of the same
//! level, so that coarse data only ever reaches the cells that need it.

pub mod array;
pub mod bc;
pub mod bndry_data;
pub mod bndry_register;
pub mod box_array;
pub mod descriptor;
pub mod error;
pub mod geometry;
pub mod index_space;
pub mod interp;
pub mod interp_bndry_data;
pub mod level_data;
pub mod mask;
pub mod orientation;
pub mod patch;

pub use error::{Error, Result};
pub use interp_bndry_data::InterpBndryData;
