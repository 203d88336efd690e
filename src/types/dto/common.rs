use poem_openapi::Object;

/// Response model for health check endpoint
#[derive(Object, Debug)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,

    /// Timestamp of the health check (ISO 8601 format)
    pub timestamp: String,
}

/// Generic message response
#[derive(Object, Debug)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
}
