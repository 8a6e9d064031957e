use std::path::PathBuf;

use thiserror::Error;

use crate::geometry::Dims;
use crate::layout::ImageId;

#[derive(Debug, Error)]
pub enum CollageError {
    #[error("malformed geometry string: '{0}'")]
    MalformedGeometry(String),

    #[error("malformed dimension string: '{0}'")]
    MalformedDims(String),

    #[error("nothing to lay out: image list is empty")]
    Empty,

    #[error("tiling does not support cropped images (image {id}, '{}')", .path.display())]
    UnsupportedCropping { id: ImageId, path: PathBuf },

    #[error("could not find a usable canvas size within the configured limits")]
    NoUsableCanvas,

    #[error("collision while balancing image {id} ('{}') at {position}", .path.display())]
    InternalCollision {
        id: ImageId,
        path: PathBuf,
        position: Dims,
    },
}

pub type Result<T> = std::result::Result<T, CollageError>;
