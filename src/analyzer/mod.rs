//! AI vision analysis of facial photos.
//!
//! Provider text goes through `extract_json_payload` and then `normalize`;
//! nothing downstream ever sees an unvalidated payload.

pub mod extraction;
pub mod image_prep;
pub mod normalize;
pub mod prompts;
pub mod types;
pub mod vision;

pub use extraction::extract_json_payload;
pub use image_prep::{prepare_image, PreparedImage};
pub use normalize::{clamp, normalize};
pub use types::*;
pub use vision::{analyze_image, Provider, ProviderConfig};
