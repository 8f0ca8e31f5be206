//! Request/response types for auth endpoints.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Signup form. Missing fields deserialize as empty and fail validation.
#[derive(ToSchema, Deserialize, Debug)]
pub struct SignupRequest {
    #[serde(default, alias = "student_name")]
    pub name: String,
    #[serde(default)]
    pub prn: String,
    #[serde(default, deserialize_with = "secret_from_string")]
    #[schema(value_type = String, format = Password)]
    pub password: SecretString,
    #[serde(default, deserialize_with = "secret_from_string")]
    #[schema(value_type = String, format = Password)]
    pub confirm_password: SecretString,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct LoginRequest {
    #[serde(default)]
    pub prn: String,
    #[serde(default, deserialize_with = "secret_from_string")]
    #[schema(value_type = String, format = Password)]
    pub password: SecretString,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub message: String,
    pub prn: String,
    pub student_name: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub prn: String,
    pub student_name: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

fn secret_from_string<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}
