use crate::errors::ApiError;
use chrono::{DateTime, NaiveDate, Utc};
use common::secret::SecretString;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Default page size for employee listings.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Upper bound on page size.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Employee record (maps to employees table)
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Employee {
    pub id: i32,
    pub nip: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub department: String,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub salary: Option<Decimal>,
    pub hire_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for inserting an employee.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub nip: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub department: String,
    pub salary: Option<Decimal>,
    pub hire_date: NaiveDate,
}

/// Request body for `POST /api/v1/employees`.
///
/// Missing string fields deserialize as empty and are rejected by the
/// service with a field-specific message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateEmployeeRequest {
    #[serde(default)]
    pub nip: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub salary: Option<Decimal>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub hire_date: String,
}

/// Request body for `PUT /api/v1/employees/{id}`.
///
/// A field that is absent from the JSON is left unchanged. For the nullable
/// columns, `Some(None)` (JSON `null`) clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EmployeeUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub phone: Option<Option<String>>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub salary: Option<Option<Decimal>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl EmployeeUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.position.is_none()
            && self.department.is_none()
            && self.salary.is_none()
            && self.is_active.is_none()
    }
}

/// Present-but-null deserializes to `Some(None)`, distinguishing it from an
/// absent field.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Raw query string for `GET /api/v1/employees`.
///
/// Every field is taken as text so empty values (`?department=`) behave as
/// absent instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEmployeesQuery {
    pub department: Option<String>,
    pub position: Option<String>,
    pub is_active: Option<String>,
    pub search: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Normalized listing filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub department: Option<String>,
    pub position: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for EmployeeFilter {
    fn default() -> Self {
        Self {
            department: None,
            position: None,
            is_active: None,
            search: None,
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl TryFrom<ListEmployeesQuery> for EmployeeFilter {
    type Error = ApiError;

    fn try_from(query: ListEmployeesQuery) -> Result<Self, Self::Error> {
        let is_active = match non_empty(query.is_active).as_deref() {
            None => None,
            Some("true") | Some("1") => Some(true),
            Some("false") | Some("0") => Some(false),
            Some(other) => {
                return Err(ApiError::Validation(format!(
                    "is_active must be true or false, got '{}'",
                    other
                )))
            }
        };

        let limit = match parse_int(query.limit, "limit")? {
            Some(l) if l > 0 => l.min(MAX_PAGE_LIMIT),
            _ => DEFAULT_PAGE_LIMIT,
        };
        let offset = parse_int(query.offset, "offset")?.map_or(0, |o| o.max(0));

        Ok(EmployeeFilter {
            department: non_empty(query.department),
            position: non_empty(query.position),
            is_active,
            search: non_empty(query.search),
            limit,
            offset,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_int(value: Option<String>, name: &str) -> Result<Option<i64>, ApiError> {
    non_empty(value)
        .map(|v| {
            v.parse::<i64>().map_err(|_| {
                ApiError::Validation(format!("{} must be an integer, got '{}'", name, v))
            })
        })
        .transpose()
}

/// Paginated employee listing.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeListResponse {
    pub employees: Vec<Employee>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// User account (maps to users table)
#[derive(Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// Request body for `POST /api/v1/auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: SecretString,
}

/// Request body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    pub password: SecretString,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
    pub expires_at: DateTime<Utc>,
}

/// Success envelope shared by every JSON endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}
