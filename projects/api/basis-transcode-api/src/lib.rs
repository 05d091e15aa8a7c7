#![doc = include_str!("../README.MD")]
#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

// Module declarations
pub mod basis_file;
pub mod error;

#[cfg(feature = "c-exports")]
pub mod c_api;

#[cfg(test)]
pub(crate) mod test_prelude;

// Re-export main functionality at crate root
pub use basis_file::BasisFile;
pub use error::HandleError;

pub use basis_transcode_core::{
    BasisTranscoder, DecodeFlags, ImageLevelDesc, NoSliceDecoder, SliceDecoder,
    TranscoderEngine, TranscoderTextureFormat, TOTAL_TEXTURE_FORMATS,
};
#[cfg(feature = "std")]
pub use basis_transcode_core::basis_init;
