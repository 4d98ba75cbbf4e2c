//! Shader source code embedded at compile time.

/// Displacement shader for the outer mesh, driven by the pointer and the
/// displacement vertex stream.
pub const DISPLACED: &str = include_str!("../shaders/displaced.wgsl");

/// Phong/unlit shader for the inner mesh and the background plane.
pub const LIT: &str = include_str!("../shaders/lit.wgsl");
