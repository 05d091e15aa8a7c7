//! # C API (FFI) Documentation
//!
//! *Note: The C API is only available when the `c-exports` feature is enabled.*
//!
//! The C API exposes the container handle as an opaque [`AaBasisFile`] pointer. All functions
//! are prefixed with `aa_` and keep the sentinel convention of the Rust API: queries on a null,
//! closed or otherwise unusable handle return `0` / `false`.
//!
//! ## Example Usage
//!
//! ```c
//! #include <stdio.h>
//! #include <stdlib.h>
//!
//! aa_basis_init(); // optional
//!
//! AaBasisFile* file = aa_create_basis_with_decoder(my_decoder);
//! if (aa_open_basis(file, bytes, bytes_len)) {
//!     uint32_t format = 7; // BC7 mode 5 RGBA
//!     uint32_t size = aa_getImageTranscodedSizeInBytes(file, 0, 0, format);
//!     uint8_t* dst = malloc(size);
//!
//!     if (aa_startTranscoding(file)
//!         && aa_transcodeImage(file, dst, size, 0, 0, format, false, false)) {
//!         printf("Level 0: %ux%u\n", aa_getImageWidth(file, 0, 0), aa_getImageHeight(file, 0, 0));
//!     }
//!
//!     free(dst);
//!     aa_close_basis(file);
//! }
//! aa_delete_basis(file);
//! ```
//!
//! ## Lifecycle
//!
//! - **`aa_basis_init()`** - Construct the shared decode tables (optional, idempotent)
//! - **`aa_create_basis()`** - Create a closed, metadata-only handle
//! - **`aa_create_basis_with_decoder(decoder)`** - Create a closed handle which decodes through an [`AaSliceDecoder`]
//! - **`aa_open_basis(file, data, len)`** - Validate and bind a buffer. The buffer must outlive the open state
//! - **`aa_close_basis(file)`** - Release the buffer
//! - **`aa_delete_basis(file)`** - Free the handle
//!
//! ## Queries
//!
//! - **`aa_getHasAlpha(file)`**
//! - **`aa_getNumImages(file)`**
//! - **`aa_getNumLevels(file, image)`**
//! - **`aa_getImageWidth(file, image, level)`** / **`aa_getImageHeight(file, image, level)`**
//! - **`aa_getImageTranscodedSizeInBytes(file, image, level, format)`**
//!
//! ## Transcoding
//!
//! - **`aa_startTranscoding(file)`**
//! - **`aa_transcodeImage(file, dst, dst_size, image, level, format, wrap, alpha)`** - `dst_size`
//!   must be at least the transcoded size.
//! - **`aa_transcodeImageChecked(...)`** - Same parameters; verifies `dst_size` and returns an
//!   [`AaBasisErrorCode`]. Use [`aa_basis_error_message`] for a description.

pub mod basis_file;
pub mod error;
pub mod slice_decoder;

pub use basis_file::*;
pub use error::*;
pub use slice_decoder::*;
