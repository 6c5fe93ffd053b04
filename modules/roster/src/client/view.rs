use uuid::Uuid;

use crate::contract::model::{Role, Student};

/// Which of the two auth forms is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthForm {
    #[default]
    Register,
    Login,
}

/// Dashboard sub-panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    User,
    Admin,
}

impl From<Role> for Panel {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => Panel::Admin,
            Role::User => Panel::User,
        }
    }
}

/// Controls rendered on every roster row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRow {
    pub id: Uuid,
    pub label: String,
    pub actions: [RowAction; 2],
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddStudentForm {
    pub first_name: String,
    pub last_name: String,
    pub enrollment_date: String,
}

/// Everything the two-panel page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub auth_visible: bool,
    pub dashboard_visible: bool,
    pub auth_form: AuthForm,
    pub panel: Panel,
    pub user_label: String,
    pub students: Vec<StudentRow>,
    pub add_form: AddStudentForm,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            auth_visible: true,
            dashboard_visible: false,
            auth_form: AuthForm::default(),
            panel: Panel::default(),
            user_label: String::new(),
            students: Vec::new(),
            add_form: AddStudentForm::default(),
        }
    }
}

pub fn user_label(email: &str, role: &str) -> String {
    format!("{email} ({role})")
}

pub fn student_label(s: &Student) -> String {
    format!(
        "{} {} — Enrolled: {}",
        s.first_name, s.last_name, s.enrollment_date
    )
}

/// Full replacement rendering of an ordered snapshot.
pub fn render_students(students: &[Student]) -> Vec<StudentRow> {
    students
        .iter()
        .map(|s| StudentRow {
            id: s.id,
            label: student_label(s),
            actions: [RowAction::Edit, RowAction::Delete],
        })
        .collect()
}
