//! Ivar Core - the renderer's collaborators outside the tracing loop.
//!
//! This crate provides:
//!
//! - **Mesh input**: `TriangleMesh`, loaded from Wavefront OBJ files
//! - **Image output**: `ImageBuffer` of linear RGB samples, written as
//!   plain-text PPM or PNG with gamma correction
//!
//! # Example
//!
//! ```ignore
//! use ivar_core::{ImageBuffer, TriangleMesh};
//!
//! let mesh = TriangleMesh::load_obj("bunny.obj")?;
//! println!("Loaded {} triangles", mesh.triangle_count());
//!
//! let image = ImageBuffer::new(400, 225);
//! image.save("out.ppm")?;
//! ```

pub mod mesh;
pub mod output;

pub use mesh::{MeshError, MeshResult, TriangleMesh};
pub use output::{color_to_rgb, linear_to_gamma, ImageBuffer, ImageError, ImageResult};
