use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::model::{AdminData, AuthUser, NewStudent, Profile, Session, Student};

/// Credentials for register and login. Not `Debug` so it never ends up in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialsReq {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub uid: Uuid,
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUserDto {
    pub uid: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDto {
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub enrollment_date: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentReq {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub enrollment_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentListDto {
    pub students: Vec<StudentDto>,
    pub total: usize,
}

/// Payload of one `roster` SSE event: the whole ordered collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterSnapshotDto {
    pub owner: Uuid,
    pub students: Vec<StudentDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDataDto {
    pub id: Uuid,
    pub message: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminDataListDto {
    pub records: Vec<AdminDataDto>,
    pub total: usize,
}

// Conversion implementations between REST DTOs and contract models

impl From<Session> for SessionDto {
    fn from(s: Session) -> Self {
        Self {
            uid: s.user.uid,
            email: s.user.email,
            token: s.token.expose().to_string(),
            expires_at: s.expires_at,
        }
    }
}

impl From<AuthUser> for AuthUserDto {
    fn from(u: AuthUser) -> Self {
        Self {
            uid: u.uid,
            email: u.email,
        }
    }
}

impl From<Profile> for ProfileDto {
    fn from(p: Profile) -> Self {
        Self {
            email: p.email,
            role: p.role,
        }
    }
}

impl From<ProfileDto> for Profile {
    fn from(p: ProfileDto) -> Self {
        Self {
            email: p.email,
            role: p.role,
        }
    }
}

impl From<Student> for StudentDto {
    fn from(s: Student) -> Self {
        Self {
            id: s.id,
            first_name: s.first_name,
            last_name: s.last_name,
            enrollment_date: s.enrollment_date,
            created_at: s.created_at,
        }
    }
}

impl From<CreateStudentReq> for NewStudent {
    fn from(req: CreateStudentReq) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            enrollment_date: req.enrollment_date,
        }
    }
}

impl From<Vec<Student>> for StudentListDto {
    fn from(students: Vec<Student>) -> Self {
        let students: Vec<StudentDto> = students.into_iter().map(StudentDto::from).collect();
        Self {
            total: students.len(),
            students,
        }
    }
}

impl From<AdminData> for AdminDataDto {
    fn from(r: AdminData) -> Self {
        Self {
            id: r.id,
            message: r.message,
            created_by: r.created_by,
            created_at: r.created_at,
        }
    }
}

impl From<Vec<AdminData>> for AdminDataListDto {
    fn from(records: Vec<AdminData>) -> Self {
        let records: Vec<AdminDataDto> = records.into_iter().map(AdminDataDto::from).collect();
        Self {
            total: records.len(),
            records,
        }
    }
}
