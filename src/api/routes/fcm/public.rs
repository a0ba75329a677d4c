//! Public types for the FCM API
use serde::Serialize;

#[derive(Serialize)]
pub struct CopyResponse {
    pub copied: bool,
}

#[derive(Serialize)]
pub struct TestResponse {
    pub shown: bool,
}
