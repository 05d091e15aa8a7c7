use basis_transcode_api::HandleError;
use basis_transcode_core::HeaderError;
use lightweight_mmap::handles::HandleOpenError;
use lightweight_mmap::mmap::MmapError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Path is not valid UTF-8: {0:?}")]
    InvalidPath(PathBuf),
    #[error("Failed to open file handle: {0}")]
    FileHandle(#[from] HandleOpenError),
    #[error("Failed to create memory mapping: {0}")]
    MemoryMapping(#[from] MmapError),
    #[error("Not a valid .basis file: {0}")]
    Header(#[from] HeaderError),
    #[error(transparent)]
    Handle(#[from] HandleError),
    #[error(transparent)]
    Format(#[from] core::fmt::Error),
}
