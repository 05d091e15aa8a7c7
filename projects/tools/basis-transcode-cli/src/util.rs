use crate::error::CliError;
use basis_transcode_core::TranscoderTextureFormat;
use lightweight_mmap::handles::*;
use lightweight_mmap::mmap::*;
use std::path::Path;

/// Memory maps the file at `path` read-only and passes its contents to `f`.
///
/// Empty files are passed through as an empty slice, since they cannot be mapped.
pub fn with_mapped_file<T>(
    path: &Path,
    f: impl FnOnce(&[u8]) -> Result<T, CliError>,
) -> Result<T, CliError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| CliError::InvalidPath(path.to_path_buf()))?;

    let handle = ReadOnlyFileHandle::open(path_str)?;
    let len = handle.size()? as usize;
    if len == 0 {
        return f(&[]);
    }

    let mapping = ReadOnlyMmap::new(&handle, 0, len)?;
    f(mapping.as_slice())
}

/// Parses a target format from either its name (`bc7_m5_rgba`) or its numeric value (`6`).
pub fn parse_format(value: &str) -> Result<TranscoderTextureFormat, String> {
    let value = value.trim();
    if let Ok(raw) = value.parse::<u32>() {
        return TranscoderTextureFormat::try_from(raw)
            .map_err(|raw| format!("Invalid format value: {raw}. {}", valid_formats()));
    }

    TranscoderTextureFormat::from_name(&value.to_lowercase())
        .ok_or_else(|| format!("Invalid format: {value}. {}", valid_formats()))
}

fn valid_formats() -> String {
    let names: Vec<&str> = TranscoderTextureFormat::all_values()
        .iter()
        .map(|format| format.name())
        .collect();
    format!("Valid formats are: {}", names.join(", "))
}
