//! Download system for vidget

pub mod downloader;

pub use downloader::*;
