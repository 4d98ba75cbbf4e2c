//! Facet Data Crate
//!
//! Mesh data and per-face attribute generation for the facet viewer.
//! This crate is GPU-agnostic: it produces flat CPU-side arrays that
//! `facet-gpu` uploads as vertex streams.

pub mod attributes;
pub mod color;
pub mod mesh;
pub mod obj;

pub use attributes::{
    AttributeBuilder, ColorScheme, DEFAULT_AMPLITUDE, FLOATS_PER_FACE, FaceColorPolicy, HueRamp,
    MeshAttributes, SolidHsl, random_displacement,
};
pub use color::{Hsl, Rgb};
pub use mesh::{Mesh, MeshError};
pub use obj::{LoadError, MeshLoader, ObjLoader, load_obj_from_buffer};
