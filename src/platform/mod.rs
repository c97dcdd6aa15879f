//! Video platform clients and related functionality

pub mod client;
pub mod formats;
pub mod innertube;
pub mod instagram;

pub use client::*;
pub use formats::*;
pub use innertube::*;
pub use instagram::*;
