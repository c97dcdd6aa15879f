//! Utility functions for vidget

pub mod download_dir;
pub mod filename;
pub mod url;

pub use download_dir::*;
pub use filename::*;
pub use self::url::*;
