//! Data models for the upload pipeline
//!
//! Each sub-module represents one concept of the pipeline: the files being
//! uploaded, the images committed to a campground, the short-lived upload
//! authorization, and the signed-in user.

pub mod authorization;
mod image;
mod upload;
mod user;

// Re-export all models for convenient imports
pub use authorization::*;
pub use image::*;
pub use upload::*;
pub use user::*;
