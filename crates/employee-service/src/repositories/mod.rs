pub mod employees;
pub mod query_builder;
pub mod users;

use crate::errors::ApiError;

/// Map an INSERT/UPDATE failure, turning unique-constraint violations into
/// `Conflict` with a message naming the duplicated field.
pub(crate) fn map_write_error(err: sqlx::Error, context: &str) -> ApiError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = match db_err.constraint() {
                Some("employees_nip_unique") => "Employee with this NIP already exists",
                Some("employees_email_unique") => "Employee with this email already exists",
                Some("users_username_unique") => "Username already exists",
                Some("users_email_unique") => "Email already exists",
                _ => "Resource already exists",
            };
            return ApiError::Conflict(message.to_string());
        }
    }
    ApiError::Database(format!("{}: {}", context, err))
}
