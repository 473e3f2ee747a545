use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    BinRwError(#[from] binrw::Error),

    #[error("CHD file not found: {0}")]
    NotFound(PathBuf),

    #[error(
        "this CHD requires a parent CHD; delta/diff images are not supported, \
         use a standalone (merged) CHD"
    )]
    RequiresParent,

    #[error("corrupt or unsupported CHD: {0}")]
    CorruptOrUnsupportedVersion(String),

    #[error("hunk {0} is out of range")]
    HunkOutOfRange(u32),

    #[error("hunks are compressed with {0}, which the built-in store cannot decode")]
    UnsupportedCompression(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
