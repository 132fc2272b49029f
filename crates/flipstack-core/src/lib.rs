pub mod analysis;
pub mod composite;
pub mod consts;
pub mod error;
pub mod frame;
pub mod grid;
pub mod io;
pub mod pipeline;
pub mod sharpen;

pub use error::{FlipstackError, Result};
pub use pipeline::{process_video_to_image, run_pipeline, run_pipeline_reported};
