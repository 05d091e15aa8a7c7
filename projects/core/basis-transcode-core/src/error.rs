//! Errors produced while reading a `.basis` container.

use thiserror::Error;

/// Why a `.basis` header (or its payload) was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// The buffer is not larger than the fixed size header.
    #[error("Buffer too short: {len} bytes, a .basis file needs more than {min} bytes.")]
    TooShort {
        /// Length of the supplied buffer.
        len: usize,
        /// Size of the fixed header.
        min: usize,
    },

    /// The signature is not `sB`.
    #[error("Invalid signature: {0:#06X}")]
    BadSignature(u16),

    /// The file was written by an incompatible encoder version.
    #[error("Unsupported .basis version: {0:#X}")]
    UnsupportedVersion(u16),

    /// The header size field does not match the known header layout.
    #[error("Unexpected header size: {0}")]
    BadHeaderSize(u16),

    /// The stored header CRC-16 does not match the header contents.
    #[error("Header CRC mismatch: stored {stored:#06X}, computed {computed:#06X}")]
    HeaderCrcMismatch {
        /// CRC stored in the header.
        stored: u16,
        /// CRC computed over the header.
        computed: u16,
    },

    /// The buffer ends before the data section the header describes.
    #[error("Data truncated: header describes {needed} bytes, buffer holds {actual}")]
    DataTruncated {
        /// Bytes required by the header.
        needed: usize,
        /// Bytes in the buffer.
        actual: usize,
    },

    /// The file declares no slices or no images.
    #[error("File contains no slices or no images")]
    NoSlices,

    /// More images than slices are declared.
    #[error("Image count {images} exceeds slice count {slices}")]
    TooManyImages {
        /// Declared image count.
        images: u32,
        /// Declared slice count.
        slices: u32,
    },

    /// A file with alpha slices must pair every colour slice with an alpha slice.
    #[error("File has alpha slices but an odd slice count ({0})")]
    OddAlphaSliceCount(u32),

    /// The slice descriptor table does not fit in the buffer.
    #[error("Slice descriptor table is out of bounds")]
    SliceTableOutOfBounds,

    /// The stored data CRC-16 does not match the data section.
    #[error("Data CRC mismatch: stored {stored:#06X}, computed {computed:#06X}")]
    DataCrcMismatch {
        /// CRC stored in the header.
        stored: u16,
        /// CRC computed over the data section.
        computed: u16,
    },

    /// A slice's encoded data lies outside the buffer.
    #[error("Slice {0} data is out of bounds")]
    SliceOutOfBounds(u32),

    /// A slice's stored CRC-16 does not match its data.
    #[error("Slice {0} CRC mismatch")]
    SliceCrcMismatch(u32),
}
