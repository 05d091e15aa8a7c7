//! C API error handling for container handle operations.

use crate::error::HandleError;
use core::ffi::c_char;

/// C-compatible error codes for container handle operations.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AaBasisErrorCode {
    /// Operation succeeded
    Success = 0,
    /// Null pointer provided for the handle parameter
    NullHandle = 1,
    /// Null pointer provided for the output buffer parameter
    NullOutputBuffer = 2,
    /// The handle is not open
    NotOpen = 3,
    /// The texture format is out of range
    InvalidFormat = 4,
    /// The image or level does not exist
    MetadataUnavailable = 5,
    /// Output buffer too small for the transcoded level
    OutputBufferTooSmall = 6,
    /// The transcoder failed to decode the level
    TranscodeFailed = 7,
    /// The transcoder failed to start a session
    StartTranscodingFailed = 8,
}

impl From<HandleError> for AaBasisErrorCode {
    fn from(error: HandleError) -> Self {
        match error {
            HandleError::NotOpen => Self::NotOpen,
            HandleError::InvalidFormat(_) => Self::InvalidFormat,
            HandleError::MetadataUnavailable { .. } => Self::MetadataUnavailable,
            HandleError::OutputBufferTooSmall { .. } => Self::OutputBufferTooSmall,
            HandleError::TranscodeFailed => Self::TranscodeFailed,
            HandleError::StartTranscodingFailed => Self::StartTranscodingFailed,
        }
    }
}

impl<T> From<Result<T, HandleError>> for AaBasisErrorCode {
    fn from(result: Result<T, HandleError>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(e) => e.into(),
        }
    }
}

/// Get a null-terminated string description of the error code.
///
/// The returned string is a static string literal that does not need to be freed.
///
/// # Safety
/// This function is safe to call with any error code value.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn aa_basis_error_message(error_code: AaBasisErrorCode) -> *const c_char {
    match error_code {
        AaBasisErrorCode::Success => c"Success".as_ptr(),
        AaBasisErrorCode::NullHandle => c"Null pointer provided for handle parameter".as_ptr(),
        AaBasisErrorCode::NullOutputBuffer => {
            c"Null pointer provided for output buffer parameter".as_ptr()
        }
        AaBasisErrorCode::NotOpen => c"The handle is not open".as_ptr(),
        AaBasisErrorCode::InvalidFormat => c"Invalid texture format".as_ptr(),
        AaBasisErrorCode::MetadataUnavailable => {
            c"The requested image or level does not exist".as_ptr()
        }
        AaBasisErrorCode::OutputBufferTooSmall => {
            c"Output buffer too small for the transcoded level".as_ptr()
        }
        AaBasisErrorCode::TranscodeFailed => c"Transcoding failed".as_ptr(),
        AaBasisErrorCode::StartTranscodingFailed => c"Failed to start transcoding".as_ptr(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;
    use core::ffi::CStr;

    #[rstest]
    #[case(HandleError::NotOpen, AaBasisErrorCode::NotOpen)]
    #[case(HandleError::InvalidFormat(22), AaBasisErrorCode::InvalidFormat)]
    #[case(
        HandleError::MetadataUnavailable { image_index: 1, level_index: 2 },
        AaBasisErrorCode::MetadataUnavailable
    )]
    #[case(
        HandleError::OutputBufferTooSmall { needed: 2, actual: 1 },
        AaBasisErrorCode::OutputBufferTooSmall
    )]
    #[case(HandleError::TranscodeFailed, AaBasisErrorCode::TranscodeFailed)]
    #[case(
        HandleError::StartTranscodingFailed,
        AaBasisErrorCode::StartTranscodingFailed
    )]
    fn handle_errors_map_to_codes(#[case] error: HandleError, #[case] code: AaBasisErrorCode) {
        assert_eq!(AaBasisErrorCode::from(error), code);
        assert_eq!(AaBasisErrorCode::from(Err::<(), _>(error)), code);
    }

    #[test]
    fn ok_maps_to_success() {
        assert_eq!(
            AaBasisErrorCode::from(Ok::<(), HandleError>(())),
            AaBasisErrorCode::Success
        );
    }

    #[test]
    fn every_code_has_a_message() {
        let codes = [
            AaBasisErrorCode::Success,
            AaBasisErrorCode::NullHandle,
            AaBasisErrorCode::NullOutputBuffer,
            AaBasisErrorCode::NotOpen,
            AaBasisErrorCode::InvalidFormat,
            AaBasisErrorCode::MetadataUnavailable,
            AaBasisErrorCode::OutputBufferTooSmall,
            AaBasisErrorCode::TranscodeFailed,
            AaBasisErrorCode::StartTranscodingFailed,
        ];

        for code in codes {
            let message = unsafe { CStr::from_ptr(aa_basis_error_message(code)) };
            assert!(!message.to_bytes().is_empty(), "{code:?}");
        }

        let message = unsafe { CStr::from_ptr(aa_basis_error_message(AaBasisErrorCode::Success)) };
        assert_eq!(message.to_str().unwrap(), "Success");
    }
}
