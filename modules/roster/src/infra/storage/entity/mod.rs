pub mod accounts;
pub mod admin_data;
pub mod profiles;
pub mod sessions;
pub mod students;
