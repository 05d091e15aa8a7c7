//! Opaque container handle for the C API.
//!
//! The handle borrows the buffer passed to [`aa_open_basis`] without copying it; the caller
//! keeps it alive until the handle is closed, reopened or deleted.
#![allow(non_snake_case)]

use super::error::AaBasisErrorCode;
use super::slice_decoder::AaSliceDecoder;
use crate::BasisFile;
use alloc::boxed::Box;
use basis_transcode_core::{BasisTranscoder, NoSliceDecoder, SliceDecoder, basis_init};
use core::slice;

/// Opaque handle over a `.basis` buffer.
///
/// The handle must be:
///
/// - Created with [`aa_create_basis()`] or [`aa_create_basis_with_decoder()`]
/// - Opened on a buffer with [`aa_open_basis()`]
/// - Freed with [`aa_delete_basis()`] when no longer needed
///
/// The handle is NOT thread-safe and should not be shared between threads.
#[repr(C)]
pub struct AaBasisFile {
    // Private field to ensure it's opaque
    _private: [u8; 0],
}

/// Internal representation of the handle
pub(crate) struct AaBasisFileInner {
    pub(crate) file: BasisFile<'static, BasisTranscoder<Box<dyn SliceDecoder>>>,
}

fn create_handle(decoder: Box<dyn SliceDecoder>) -> *mut AaBasisFile {
    let inner = Box::new(AaBasisFileInner {
        file: BasisFile::with_engine(BasisTranscoder::with_global_codebook(decoder)),
    });

    Box::into_raw(inner) as *mut AaBasisFile
}

/// Get access to the inner handle, or [`None`] for a null pointer.
///
/// # Safety
/// - `file` must be null or a valid pointer returned by one of the create functions
unsafe fn get_file<'a>(file: *const AaBasisFile) -> Option<&'a AaBasisFileInner> {
    unsafe { (file as *const AaBasisFileInner).as_ref() }
}

/// Get mutable access to the inner handle, or [`None`] for a null pointer.
///
/// # Safety
/// - `file` must be null or a valid pointer returned by one of the create functions
unsafe fn get_file_mut<'a>(file: *mut AaBasisFile) -> Option<&'a mut AaBasisFileInner> {
    unsafe { (file as *mut AaBasisFileInner).as_mut() }
}

/// Construct the process-wide decode tables.
///
/// Optional: handles construct them on first use. Safe to call any number of times.
#[unsafe(no_mangle)]
pub extern "C" fn aa_basis_init() {
    basis_init();
}

/// Create a closed handle which can answer metadata queries but cannot decode levels.
///
/// The returned handle must be freed with [`aa_delete_basis()`].
#[unsafe(no_mangle)]
pub extern "C" fn aa_create_basis() -> *mut AaBasisFile {
    create_handle(Box::new(NoSliceDecoder))
}

/// Create a closed handle which decodes levels through `decoder`.
///
/// The returned handle must be freed with [`aa_delete_basis()`].
/// `decoder.context` must stay valid until then.
#[unsafe(no_mangle)]
pub extern "C" fn aa_create_basis_with_decoder(decoder: AaSliceDecoder) -> *mut AaBasisFile {
    create_handle(Box::new(decoder))
}

/// Free a handle.
///
/// # Safety
/// - `file` must be null or a valid pointer returned by one of the create functions
/// - `file` must not have been freed already
/// - After calling this function, `file` becomes invalid
#[unsafe(no_mangle)]
pub unsafe extern "C" fn aa_delete_basis(file: *mut AaBasisFile) {
    if !file.is_null() {
        unsafe {
            drop(Box::from_raw(file as *mut AaBasisFileInner));
        }
    }
}

/// Validate the header of `data` and open the handle on it.
///
/// On failure the handle is left closed.
///
/// # Safety
/// - `file` must be null or a valid handle
/// - `data` must be null or valid for reads of `len` bytes, and stay valid and unmodified
///   until the handle is closed, reopened or deleted
#[unsafe(no_mangle)]
pub unsafe extern "C" fn aa_open_basis(
    file: *mut AaBasisFile,
    data: *const u8,
    len: usize,
) -> bool {
    let Some(inner) = (unsafe { get_file_mut(file) }) else {
        return false;
    };

    let data: &'static [u8] = if data.is_null() {
        &[]
    } else {
        unsafe { slice::from_raw_parts(data, len) }
    };
    inner.file.open(data)
}

/// Release the buffer the handle is open on.
///
/// Closing a handle that is not open is a caller error (asserted in debug builds).
///
/// # Safety
/// - `file` must be null or a valid handle
#[unsafe(no_mangle)]
pub unsafe extern "C" fn aa_close_basis(file: *mut AaBasisFile) {
    if let Some(inner) = unsafe { get_file_mut(file) } {
        inner.file.close();
    }
}

/// Whether the first image has alpha. `false` on failure.
///
/// # Safety
/// - `file` must be null or a valid handle
#[unsafe(no_mangle)]
pub unsafe extern "C" fn aa_getHasAlpha(file: *const AaBasisFile) -> bool {
    unsafe { get_file(file) }.is_some_and(|inner| inner.file.has_alpha())
}

/// Number of images. `0` on failure.
///
/// # Safety
/// - `file` must be null or a valid handle
#[unsafe(no_mangle)]
pub unsafe extern "C" fn aa_getNumImages(file: *const AaBasisFile) -> u32 {
    unsafe { get_file(file) }.map_or(0, |inner| inner.file.num_images())
}

/// Number of mip levels in `image_index`. `0` on failure.
///
/// # Safety
/// - `file` must be null or a valid handle
#[unsafe(no_mangle)]
pub unsafe extern "C" fn aa_getNumLevels(file: *const AaBasisFile, image_index: u32) -> u32 {
    unsafe { get_file(file) }.map_or(0, |inner| inner.file.num_levels(image_index))
}

/// Width of a level in pixels. `0` on failure.
///
/// # Safety
/// - `file` must be null or a valid handle
#[unsafe(no_mangle)]
pub unsafe extern "C" fn aa_getImageWidth(
    file: *const AaBasisFile,
    image_index: u32,
    level_index: u32,
) -> u32 {
    unsafe { get_file(file) }.map_or(0, |inner| inner.file.image_width(image_index, level_index))
}

/// Height of a level in pixels. `0` on failure.
///
/// # Safety
/// - `file` must be null or a valid handle
#[unsafe(no_mangle)]
pub unsafe extern "C" fn aa_getImageHeight(
    file: *const AaBasisFile,
    image_index: u32,
    level_index: u32,
) -> u32 {
    unsafe { get_file(file) }.map_or(0, |inner| inner.file.image_height(image_index, level_index))
}

/// Bytes needed to hold a level transcoded to `format`. `0` on failure.
///
/// # Safety
/// - `file` must be null or a valid handle
#[unsafe(no_mangle)]
pub unsafe extern "C" fn aa_getImageTranscodedSizeInBytes(
    file: *const AaBasisFile,
    image_index: u32,
    level_index: u32,
    format: u32,
) -> u32 {
    unsafe { get_file(file) }.map_or(0, |inner| {
        inner
            .file
            .transcoded_size_in_bytes(image_index, level_index, format)
    })
}

/// Prepare the handle's transcoding session. `false` on failure.
///
/// # Safety
/// - `file` must be null or a valid handle
#[unsafe(no_mangle)]
pub unsafe extern "C" fn aa_startTranscoding(file: *mut AaBasisFile) -> bool {
    unsafe { get_file_mut(file) }.is_some_and(|inner| inner.file.start_transcoding())
}

/// Transcode a level into `dst`.
///
/// `dst_size` must be at least [`aa_getImageTranscodedSizeInBytes()`] for the same level and
/// format; this is only checked in debug builds. Any non-zero `wrap_addressing` or
/// `transcode_alpha_to_opaque` enables that option.
///
/// # Safety
/// - `file` must be null or a valid handle
/// - `dst` must be null or valid for writes of `dst_size` bytes
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn aa_transcodeImage(
    file: *mut AaBasisFile,
    dst: *mut u8,
    dst_size: usize,
    image_index: u32,
    level_index: u32,
    format: u32,
    wrap_addressing: u32,
    transcode_alpha_to_opaque: u32,
) -> bool {
    let Some(inner) = (unsafe { get_file_mut(file) }) else {
        return false;
    };
    if dst.is_null() {
        return false;
    }

    let dst = unsafe { slice::from_raw_parts_mut(dst, dst_size) };
    inner.file.transcode_image(
        dst,
        image_index,
        level_index,
        format,
        wrap_addressing != 0,
        transcode_alpha_to_opaque != 0,
    )
}

/// Transcode a level into `dst`, verifying `dst_size` first.
///
/// # Returns
/// [`AaBasisErrorCode::Success`] on success, otherwise the reason for failure.
///
/// # Safety
/// - `file` must be null or a valid handle
/// - `dst` must be null or valid for writes of `dst_size` bytes
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn aa_transcodeImageChecked(
    file: *mut AaBasisFile,
    dst: *mut u8,
    dst_size: usize,
    image_index: u32,
    level_index: u32,
    format: u32,
    wrap_addressing: u32,
    transcode_alpha_to_opaque: u32,
) -> AaBasisErrorCode {
    let Some(inner) = (unsafe { get_file_mut(file) }) else {
        return AaBasisErrorCode::NullHandle;
    };
    if dst.is_null() {
        return AaBasisErrorCode::NullOutputBuffer;
    }

    let dst = unsafe { slice::from_raw_parts_mut(dst, dst_size) };
    inner
        .file
        .transcode_image_checked(
            dst,
            image_index,
            level_index,
            format,
            wrap_addressing != 0,
            transcode_alpha_to_opaque != 0,
        )
        .into()
}
