//! Thin OpenGL bindings.
//!
//! The raw binding layer is produced by `glbind-generator` from the Khronos API registry. This
//! crate holds the hand-written pieces that sit next to it, most notably the vertex input layout
//! machinery in [vertex].

pub mod vertex;

pub mod derive {
    pub use glbind_macros::Vertex;
}

#[doc(hidden)]
pub mod __private {
    pub use memoffset;
}
