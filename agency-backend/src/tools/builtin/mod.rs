mod generate_image;

pub use generate_image::{GenerateImageTool, LOGO_ARTIFACT_NAME};
