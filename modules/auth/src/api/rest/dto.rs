use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::model::{Credentials, NewUser, User};

/// REST DTO for the public user representation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// REST DTO for registration.
///
/// Missing fields default to empty strings so that field-level validation
/// reports them instead of a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RegisterReq {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// REST DTO for login
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

/// REST DTO for register/login responses: user plus bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponseDto {
    pub user: UserDto,
    pub token: String,
}

// Conversion implementations between REST DTOs and contract models

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<RegisterReq> for NewUser {
    fn from(req: RegisterReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
        }
    }
}

impl From<LoginReq> for Credentials {
    fn from(req: LoginReq) -> Self {
        Self {
            email: req.email,
            password: req.password,
        }
    }
}
