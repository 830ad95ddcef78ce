//! Procedural generation of connected block shapes for guess-the-count
//! puzzles.
//!
//! The generator produces a small, connected, voxel-like solid on an
//! integer lattice in which every cube can be seen along at least one of a
//! fixed set of viewing directions, together with the cube count a player
//! has to guess. Rendering, camera handling and the game loop live
//! elsewhere; this crate only deals in lattice points.

#[cfg(test)]
mod test;

pub mod generator;
pub mod shape;
pub mod shapefile;

pub use generator::{generate, generate_with, GeneratedShape, GeneratorConfig};
pub use shape::{Board, Point, Shape, ViewDir};
