//! Error types for container handle operations.

use basis_transcode_core::TOTAL_TEXTURE_FORMATS;
use thiserror::Error;

/// Errors that can occur when querying or transcoding through a [`BasisFile`].
///
/// The sentinel API collapses all of these to `0` / `false`.
///
/// [`BasisFile`]: crate::BasisFile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HandleError {
    /// The handle has not been opened on a valid container, or was closed.
    #[error("The handle is not open.")]
    NotOpen,

    /// The raw texture format value is out of range.
    #[error(
        "Invalid texture format: {0}. Valid formats are 0..{max}.",
        max = TOTAL_TEXTURE_FORMATS
    )]
    InvalidFormat(u32),

    /// The image or level does not exist, or its metadata is malformed.
    #[error("No metadata for image {image_index}, level {level_index}.")]
    MetadataUnavailable {
        /// The requested image
        image_index: u32,
        /// The requested level
        level_index: u32,
    },

    /// The output buffer is too small for the transcoded level.
    #[error("Output buffer too small: need {needed} bytes, but only {actual} bytes available.")]
    OutputBufferTooSmall {
        /// The required size in bytes
        needed: usize,
        /// The actual size in bytes
        actual: usize,
    },

    /// The transcoder rejected the level or failed to decode it.
    #[error("Transcoding failed.")]
    TranscodeFailed,

    /// The transcoder could not prepare a session for this container.
    #[error("Failed to start transcoding.")]
    StartTranscodingFailed,
}
