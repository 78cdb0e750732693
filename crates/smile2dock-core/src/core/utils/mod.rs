pub mod geometry;
pub mod optimize;
