//! The container handle.
//!
//! A [`BasisFile`] is either closed or open on a validated buffer. Nothing reaches the
//! transcoding engine until a header has been validated.

use crate::error::HandleError;
use basis_transcode_core::{
    BasisTranscoder, DecodeFlags, ImageLevelDesc, TranscodeRequest, TranscoderEngine,
    TranscoderTextureFormat, transcoded_size_in_bytes,
};
use likely_stable::unlikely;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileState<'a> {
    Closed,
    Open { data: &'a [u8] },
}

/// A handle over a caller owned `.basis` buffer.
///
/// The buffer is borrowed for `'a` and never copied or modified. The engine `E` holds the
/// transcoding session and lives as long as the handle; it may be reused across several
/// [`open`](Self::open) calls.
///
/// Two API flavours are offered:
///
/// - Sentinel methods (`num_images`, `image_width`, ...) return `0` / `false` on any failure,
///   including a closed handle.
/// - `try_*` methods report the reason as a [`HandleError`].
#[derive(Debug)]
pub struct BasisFile<'a, E: TranscoderEngine = BasisTranscoder> {
    engine: E,
    state: FileState<'a>,
}

#[cfg(feature = "std")]
impl BasisFile<'_, BasisTranscoder> {
    /// Creates a closed handle with a metadata-only engine bound to the process-wide codebook.
    ///
    /// Transcodes through this handle always fail; use [`BasisFile::with_engine`] with a
    /// [`BasisTranscoder`] carrying a real slice decoder to decode levels.
    pub fn new() -> Self {
        Self::with_engine(BasisTranscoder::default())
    }
}

#[cfg(feature = "std")]
impl Default for BasisFile<'_, BasisTranscoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, E: TranscoderEngine> BasisFile<'a, E> {
    /// Creates a closed handle using `engine`.
    pub const fn with_engine(engine: E) -> Self {
        Self {
            engine,
            state: FileState::Closed,
        }
    }

    /// The engine owned by this handle.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The engine owned by this handle, mutably.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Consumes the handle, returning its engine.
    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Whether the handle is open on a validated buffer.
    #[inline]
    pub fn is_open(&self) -> bool {
        matches!(self.state, FileState::Open { .. })
    }

    /// The buffer the handle is open on.
    #[inline]
    pub fn data(&self) -> Option<&'a [u8]> {
        match self.state {
            FileState::Open { data } => Some(data),
            FileState::Closed => None,
        }
    }

    /// Validates the header of `data` and, on success, opens the handle on it.
    ///
    /// On failure the handle is left closed, even if it was open on another buffer before.
    /// Any transcoding session from a previous buffer is dropped either way.
    pub fn open(&mut self, data: &'a [u8]) -> bool {
        self.engine.stop_transcoding();
        self.state = FileState::Closed;

        if !self.engine.validate_header(data) {
            return false;
        }

        self.state = FileState::Open { data };
        true
    }

    /// Releases the buffer.
    ///
    /// Closing a handle that is not open is a caller error; it is caught by a debug assertion
    /// and is a no-op in release builds.
    pub fn close(&mut self) {
        debug_assert!(self.is_open(), "close() called on a handle that is not open");
        self.engine.stop_transcoding();
        self.state = FileState::Closed;
    }

    #[inline]
    fn try_data(&self) -> Result<&'a [u8], HandleError> {
        self.data().ok_or(HandleError::NotOpen)
    }

    /// Whether the first image has alpha.
    pub fn try_has_alpha(&self) -> Result<bool, HandleError> {
        let data = self.try_data()?;
        self.engine
            .image_level_info(data, 0, 0)
            .map(|info| info.alpha_flag)
            .ok_or(HandleError::MetadataUnavailable {
                image_index: 0,
                level_index: 0,
            })
    }

    /// Whether the first image has alpha; `false` on failure.
    pub fn has_alpha(&self) -> bool {
        self.try_has_alpha().unwrap_or(false)
    }

    /// Number of images in the container.
    pub fn try_num_images(&self) -> Result<u32, HandleError> {
        let data = self.try_data()?;
        Ok(self.engine.total_images(data))
    }

    /// Number of images in the container; `0` on failure.
    pub fn num_images(&self) -> u32 {
        self.try_num_images().unwrap_or(0)
    }

    /// Number of mip levels in `image_index`.
    pub fn try_num_levels(&self, image_index: u32) -> Result<u32, HandleError> {
        let data = self.try_data()?;
        self.engine
            .image_info(data, image_index)
            .map(|info| info.total_levels)
            .ok_or(HandleError::MetadataUnavailable {
                image_index,
                level_index: 0,
            })
    }

    /// Number of mip levels in `image_index`; `0` on failure.
    pub fn num_levels(&self, image_index: u32) -> u32 {
        self.try_num_levels(image_index).unwrap_or(0)
    }

    /// Pre-decode description of a level.
    pub fn try_level_desc(
        &self,
        image_index: u32,
        level_index: u32,
    ) -> Result<ImageLevelDesc, HandleError> {
        let data = self.try_data()?;
        self.engine
            .image_level_desc(data, image_index, level_index)
            .ok_or(HandleError::MetadataUnavailable {
                image_index,
                level_index,
            })
    }

    /// Width of a level in pixels, before block alignment.
    pub fn try_image_width(&self, image_index: u32, level_index: u32) -> Result<u32, HandleError> {
        Ok(self.try_level_desc(image_index, level_index)?.orig_width)
    }

    /// Width of a level in pixels; `0` on failure.
    pub fn image_width(&self, image_index: u32, level_index: u32) -> u32 {
        self.try_image_width(image_index, level_index).unwrap_or(0)
    }

    /// Height of a level in pixels, before block alignment.
    pub fn try_image_height(
        &self,
        image_index: u32,
        level_index: u32,
    ) -> Result<u32, HandleError> {
        Ok(self.try_level_desc(image_index, level_index)?.orig_height)
    }

    /// Height of a level in pixels; `0` on failure.
    pub fn image_height(&self, image_index: u32, level_index: u32) -> u32 {
        self.try_image_height(image_index, level_index).unwrap_or(0)
    }

    /// Number of bytes a level needs once transcoded to the raw `format` value.
    ///
    /// The format is checked before anything else, so an invalid format fails even on a
    /// closed handle.
    pub fn try_transcoded_size_in_bytes(
        &self,
        image_index: u32,
        level_index: u32,
        format: u32,
    ) -> Result<u32, HandleError> {
        let format = parse_format(format)?;
        let desc = self.try_level_desc(image_index, level_index)?;
        Ok(transcoded_size_in_bytes(&desc, format))
    }

    /// Number of bytes a level needs once transcoded; `0` on failure.
    pub fn transcoded_size_in_bytes(
        &self,
        image_index: u32,
        level_index: u32,
        format: u32,
    ) -> u32 {
        self.try_transcoded_size_in_bytes(image_index, level_index, format)
            .unwrap_or(0)
    }

    /// Prepares the engine's transcoding session for the open buffer.
    pub fn try_start_transcoding(&mut self) -> Result<(), HandleError> {
        let data = self.try_data()?;
        if self.engine.start_transcoding(data) {
            Ok(())
        } else {
            Err(HandleError::StartTranscodingFailed)
        }
    }

    /// Prepares the engine's transcoding session; `false` on failure.
    pub fn start_transcoding(&mut self) -> bool {
        self.try_start_transcoding().is_ok()
    }

    /// Transcodes a level into `dst`.
    ///
    /// `dst` must be at least [`transcoded_size_in_bytes`](Self::transcoded_size_in_bytes)
    /// long; this is checked by a debug assertion only. Use
    /// [`transcode_image_checked`](Self::transcode_image_checked) to have it verified.
    ///
    /// - `wrap_addressing` selects PVRTC1 wrap addressing.
    /// - `transcode_alpha_to_opaque` decodes the alpha slice when targeting an opaque format.
    ///
    /// Returns the engine's status unchanged. On failure `dst` may be partially written.
    pub fn transcode_image(
        &mut self,
        dst: &mut [u8],
        image_index: u32,
        level_index: u32,
        format: u32,
        wrap_addressing: bool,
        transcode_alpha_to_opaque: bool,
    ) -> bool {
        let Ok((format, desc)) = self.prepare_transcode(image_index, level_index, format) else {
            return false;
        };

        debug_assert!(
            dst.len() >= transcoded_size_in_bytes(&desc, format) as usize,
            "destination buffer is smaller than the transcoded size of the level"
        );

        let flags = DecodeFlags::from_options(wrap_addressing, transcode_alpha_to_opaque);
        self.dispatch(dst, image_index, level_index, format, &desc, flags)
    }

    /// Transcodes a level into `dst`, verifying `dst` is large enough first.
    ///
    /// # Errors
    ///
    /// - [`HandleError::InvalidFormat`] if `format` is out of range.
    /// - [`HandleError::NotOpen`] if the handle is not open.
    /// - [`HandleError::MetadataUnavailable`] if the level does not exist.
    /// - [`HandleError::OutputBufferTooSmall`] if `dst` is too short.
    /// - [`HandleError::TranscodeFailed`] if the engine reports failure.
    pub fn transcode_image_checked(
        &mut self,
        dst: &mut [u8],
        image_index: u32,
        level_index: u32,
        format: u32,
        wrap_addressing: bool,
        transcode_alpha_to_opaque: bool,
    ) -> Result<(), HandleError> {
        let (format, desc) = self.prepare_transcode(image_index, level_index, format)?;

        let needed = transcoded_size_in_bytes(&desc, format) as usize;
        if unlikely(dst.len() < needed) {
            return Err(HandleError::OutputBufferTooSmall {
                needed,
                actual: dst.len(),
            });
        }

        let flags = DecodeFlags::from_options(wrap_addressing, transcode_alpha_to_opaque);
        if self.dispatch(dst, image_index, level_index, format, &desc, flags) {
            Ok(())
        } else {
            Err(HandleError::TranscodeFailed)
        }
    }

    fn prepare_transcode(
        &self,
        image_index: u32,
        level_index: u32,
        format: u32,
    ) -> Result<(TranscoderTextureFormat, ImageLevelDesc), HandleError> {
        let format = parse_format(format)?;
        let desc = self.try_level_desc(image_index, level_index)?;
        Ok((format, desc))
    }

    fn dispatch(
        &mut self,
        dst: &mut [u8],
        image_index: u32,
        level_index: u32,
        format: TranscoderTextureFormat,
        desc: &ImageLevelDesc,
        flags: DecodeFlags,
    ) -> bool {
        let FileState::Open { data } = self.state else {
            return false;
        };

        let request = transcode_request(desc, format, dst.len(), flags);
        self.engine
            .transcode_image_level(data, image_index, level_index, dst, &request)
    }
}

#[inline]
fn parse_format(format: u32) -> Result<TranscoderTextureFormat, HandleError> {
    TranscoderTextureFormat::from_raw(format).ok_or(HandleError::InvalidFormat(format))
}

/// Builds the decode parameters for a level.
///
/// - Uncompressed formats: `width * height` pixels, one row per pixel row.
/// - Block formats: as many blocks as fit in the destination; pitch and rows left to the engine.
fn transcode_request(
    desc: &ImageLevelDesc,
    format: TranscoderTextureFormat,
    dst_len: usize,
    flags: DecodeFlags,
) -> TranscodeRequest {
    if format.is_uncompressed() {
        TranscodeRequest {
            format,
            output_units: desc.orig_width.saturating_mul(desc.orig_height),
            flags,
            output_row_pitch: desc.orig_width,
            output_rows: desc.orig_height,
        }
    } else {
        let units = dst_len / format.bytes_per_block() as usize;
        TranscodeRequest {
            format,
            output_units: u32::try_from(units).unwrap_or(u32::MAX),
            flags,
            output_row_pitch: 0,
            output_rows: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;

    #[test]
    fn new_handle_is_closed() {
        let file = BasisFile::new();
        assert!(!file.is_open());
        assert_eq!(file.data(), None);
        assert_eq!(file.try_num_images(), Err(HandleError::NotOpen));
    }

    #[test]
    fn open_binds_buffer() {
        let data = BasisFixture::new(16, 8).build();
        let mut file = BasisFile::new();
        assert!(file.open(&data));
        assert!(file.is_open());
        assert_eq!(file.data().map(<[u8]>::as_ptr), Some(data.as_ptr()));
    }

    #[test]
    fn failed_open_closes_previously_open_handle() {
        let good = BasisFixture::new(16, 8).build();
        let bad = vec![0u8; good.len()];

        let mut file = BasisFile::new();
        assert!(file.open(&good));
        assert!(!file.open(&bad));
        assert!(!file.is_open());
        assert_eq!(file.num_images(), 0);
    }

    #[test]
    fn reopen_drops_previous_session() {
        let data = BasisFixture::new(16, 8).build();
        let mut file = recording_file();
        assert!(file.open(&data));
        assert!(file.start_transcoding());
        assert!(file.engine().is_ready_to_transcode());

        assert!(file.open(&data));
        assert!(!file.engine().is_ready_to_transcode());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "not open")]
    fn close_on_closed_handle_asserts() {
        let mut file = BasisFile::new();
        file.close();
    }

    #[rstest]
    #[case(TranscoderTextureFormat::Rgba32, 16 * 8, 16, 8)]
    #[case(TranscoderTextureFormat::Rgb565, 16 * 8, 16, 8)]
    #[case(TranscoderTextureFormat::Bc1Rgb, 4096 / 8, 0, 0)]
    #[case(TranscoderTextureFormat::Bc7M5Rgba, 4096 / 16, 0, 0)]
    #[case(TranscoderTextureFormat::Pvrtc1_4Rgba, 4096 / 8, 0, 0)]
    fn request_units_follow_format_family(
        #[case] format: TranscoderTextureFormat,
        #[case] units: u32,
        #[case] pitch: u32,
        #[case] rows: u32,
    ) {
        let desc = ImageLevelDesc::from_dimensions(16, 8);
        let request = transcode_request(&desc, format, 4096, DecodeFlags::NONE);
        assert_eq!(request.format, format);
        assert_eq!(request.output_units, units);
        assert_eq!(request.output_row_pitch, pitch);
        assert_eq!(request.output_rows, rows);
    }

    #[test]
    fn block_request_rounds_units_down() {
        let desc = ImageLevelDesc::from_dimensions(16, 8);
        let request =
            transcode_request(&desc, TranscoderTextureFormat::Bc1Rgb, 63, DecodeFlags::NONE);
        assert_eq!(request.output_units, 7);
    }

    #[rstest]
    #[case(false, false, 0)]
    #[case(true, false, 1)]
    #[case(false, true, 4)]
    #[case(true, true, 5)]
    fn transcode_forwards_flags(#[case] wrap: bool, #[case] alpha: bool, #[case] bits: u32) {
        let data = BasisFixture::new(16, 8).build();
        let mut file = recording_file();
        assert!(file.open(&data));
        assert!(file.start_transcoding());

        let format = TranscoderTextureFormat::Bc1Rgb as u32;
        let mut dst = vec![0u8; file.transcoded_size_in_bytes(0, 0, format) as usize];
        assert!(file.transcode_image(&mut dst, 0, 0, format, wrap, alpha));

        let recorded = &file.engine().decoder().transcodes[0];
        assert_eq!(recorded.request.flags.bits(), bits);
    }

    #[test]
    fn checked_transcode_rejects_small_buffer() {
        let data = BasisFixture::new(16, 8).build();
        let mut file = recording_file();
        assert!(file.open(&data));
        assert!(file.start_transcoding());

        let format = TranscoderTextureFormat::Rgba32 as u32;
        let mut dst = vec![0u8; 16 * 8 * 4 - 1];
        assert_eq!(
            file.transcode_image_checked(&mut dst, 0, 0, format, false, false),
            Err(HandleError::OutputBufferTooSmall {
                needed: 512,
                actual: 511
            })
        );
        assert!(file.engine().decoder().transcodes.is_empty());
    }

    #[test]
    fn checked_transcode_reports_engine_failure() {
        let data = BasisFixture::new(16, 8).build();
        let mut file = BasisFile::new();
        assert!(file.open(&data));
        assert!(file.start_transcoding());

        let format = TranscoderTextureFormat::Bc1Rgb as u32;
        let mut dst = vec![0u8; 64];
        assert_eq!(
            file.transcode_image_checked(&mut dst, 0, 0, format, false, false),
            Err(HandleError::TranscodeFailed)
        );
    }

    #[test]
    fn try_variants_report_missing_levels() {
        let data = BasisFixture::new(16, 8).build();
        let mut file = BasisFile::new();
        assert!(file.open(&data));

        assert_eq!(
            file.try_image_width(0, 3),
            Err(HandleError::MetadataUnavailable {
                image_index: 0,
                level_index: 3
            })
        );
        assert_eq!(
            file.try_num_levels(5),
            Err(HandleError::MetadataUnavailable {
                image_index: 5,
                level_index: 0
            })
        );
        assert_eq!(
            file.try_transcoded_size_in_bytes(0, 0, TOTAL_TEXTURE_FORMATS),
            Err(HandleError::InvalidFormat(TOTAL_TEXTURE_FORMATS))
        );
    }

    #[test]
    fn invalid_format_checked_before_state() {
        let mut file = BasisFile::new();
        assert_eq!(
            file.try_transcoded_size_in_bytes(0, 0, 99),
            Err(HandleError::InvalidFormat(99))
        );
        assert_eq!(
            file.transcode_image_checked(&mut [], 0, 0, 99, false, false),
            Err(HandleError::InvalidFormat(99))
        );
    }
}
