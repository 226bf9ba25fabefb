pub mod health;
pub mod image;
pub mod job;
pub mod mesh;

pub use health::HealthReport;
pub use image::UploadedImage;
pub use job::{JobSnapshot, JobStatus};
pub use mesh::{MeshConvertRequest, MeshConvertResponse, MeshMethod};
