use crate::chd::store::error::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChdError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    StoreError(#[from] StoreError),

    #[error("no track metadata found in CHD file, this may not be a disc image")]
    NoTrackMetadataFound,

    #[error("duplicate track number {0} in CHD metadata")]
    DuplicateTrackNumber(u32),

    #[error("no data track found in CHD file")]
    NoDataTrackFound,

    #[error("hunk size {0} is not a multiple of the raw frame size")]
    InvalidHunkSize(u32),

    #[error("this CHD is not a GD-ROM image, convert it to CUE/BIN instead")]
    NotGdRom,

    #[error("conversion was cancelled")]
    Cancelled,
}

pub type ChdResult<T> = Result<T, ChdError>;
