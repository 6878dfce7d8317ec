//! Wavefront `.obj`/`.mtl` loading.
//!
//! Models are expanded into a flat triangle list: every face corner becomes
//! its own [`VertexData`](fe_format::VertexData), resolved against the
//! position/texcoord/normal tables read so far.

mod error;
pub mod meta;
pub mod mtl;
pub mod obj;

pub use error::ParserError;
pub use meta::LoadOptions;
pub use obj::{load, load_with_options, parse_str};
