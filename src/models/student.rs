use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::student_entity as students;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct StudentQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Restrict to one department.
    pub department: Option<String>,
    /// Substring match on student id or draw number.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateStudentRequest {
    pub student_id: String,
    /// Raw input; normalized (digits only, max 4) before storage.
    pub draw_number: Option<String>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateStudentRequest {
    /// `Some("")` clears the number, `Some(value)` reassigns it.
    pub draw_number: Option<String>,
    pub is_suspended: Option<bool>,
    pub gender: Option<String>,
    pub department: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentResponse {
    pub student_id: String,
    pub draw_number: Option<String>,
    pub is_suspended: bool,
    pub gender: String,
    pub department: String,
    pub role: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<students::Model> for StudentResponse {
    fn from(m: students::Model) -> Self {
        Self {
            student_id: m.student_id,
            draw_number: m.draw_number,
            is_suspended: m.is_suspended,
            gender: m.gender,
            department: m.department,
            role: m.role,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
