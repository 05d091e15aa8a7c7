#![doc = include_str!("../README.MD")]
#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// `.basis` container header and slice descriptor handling.
pub mod basis;

/// Shared decode tables.
pub mod codebook;

/// Option flags passed down to the transcoder.
pub mod decode_flags;

/// The contract between the handle layer and a transcoding backend.
pub mod engine;

/// Error types.
pub mod error;

/// Target texture formats.
pub mod format;

/// Transcoded output size computation.
pub mod size;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod test_prelude;

pub use basis::{BasisTranscoder, NoSliceDecoder, SliceDecoder};
pub use codebook::GlobalCodebook;
#[cfg(feature = "std")]
pub use codebook::{basis_init, global_codebook};
pub use decode_flags::DecodeFlags;
pub use engine::{ImageInfo, ImageLevelInfo, TranscodeRequest, TranscoderEngine};
pub use error::HeaderError;
pub use format::{FormatFamily, TranscoderTextureFormat, TOTAL_TEXTURE_FORMATS};
pub use size::{
    pvrtc1_padded_size_in_bytes, transcoded_size_in_bytes, transcoded_size_in_bytes_raw,
    ImageLevelDesc,
};
