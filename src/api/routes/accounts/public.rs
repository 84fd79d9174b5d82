//! Public types for the accounts API
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
}

#[derive(Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub message: String,
}

#[derive(Deserialize)]
pub struct ConfirmRequest {
    pub email: String,
    pub code: String,
}

#[derive(Serialize, Deserialize)]
pub struct ConfirmResponse {
    pub user_id: i64,
    pub confirmed: bool,
}
