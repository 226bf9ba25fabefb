use serde::{Deserialize, Serialize};

/// Surface reconstruction methods offered by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshMethod {
    Poisson,
    BallPivoting,
    AlphaShape,
}

impl MeshMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeshMethod::Poisson => "poisson",
            MeshMethod::BallPivoting => "ball_pivoting",
            MeshMethod::AlphaShape => "alpha_shape",
        }
    }
}

/// Request body for the remote splat-to-mesh conversion endpoint.
///
/// Unlike the job endpoints this API uses snake_case field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshConvertRequest {
    pub splat_path: String,
    pub method: MeshMethod,
    pub output_format: String,
    /// Octree depth, only meaningful for Poisson reconstruction.
    pub depth: u32,
    /// Alpha radius, only meaningful for alpha-shape reconstruction.
    pub alpha: f64,
}

impl MeshConvertRequest {
    pub fn new(splat_path: impl Into<String>, method: MeshMethod, output_format: impl Into<String>) -> Self {
        Self {
            splat_path: splat_path.into(),
            method,
            output_format: output_format.into(),
            depth: 8,
            alpha: 0.03,
        }
    }
}

/// Response from the remote splat-to-mesh conversion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshConvertResponse {
    pub success: bool,
    pub mesh_path: String,
    pub mesh_filename: String,
    pub vertex_count: u64,
    pub face_count: u64,
    pub method: String,
    pub format: String,
    pub download_url: String,
}
