//! Employee record business logic.
//!
//! Uniqueness pre-checks give specific conflict messages; the unique
//! constraints in the store remain the final guard and are mapped to
//! `ApiError::Conflict` by the repository.

use crate::crypto;
use crate::errors::ApiError;
use crate::models::{
    CreateEmployeeRequest, Employee, EmployeeFilter, EmployeeListResponse, EmployeeUpdate,
    NewEmployee,
};
use crate::repositories::employees;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

const MAX_NIP_LENGTH: usize = 20;
const MAX_PHONE_LENGTH: usize = 20;
const MAX_TEXT_LENGTH: usize = 100;

/// Largest value that fits NUMERIC(15,2).
fn max_salary() -> Decimal {
    Decimal::new(999_999_999_999_999, 2)
}

/// Create an employee.
///
/// # Steps
///
/// 1. Validate and normalize the request
/// 2. Reject a taken NIP, then a taken email
/// 3. Insert
#[instrument(skip_all, name = "employee.service.create")]
pub async fn create_employee(
    pool: &PgPool,
    request: CreateEmployeeRequest,
) -> Result<Employee, ApiError> {
    let new = validate_new_employee(request)?;

    if employees::nip_exists(pool, &new.nip).await? {
        return Err(ApiError::Conflict(
            "Employee with this NIP already exists".to_string(),
        ));
    }

    if employees::email_exists(pool, &new.email, None).await? {
        return Err(ApiError::Conflict(
            "Employee with this email already exists".to_string(),
        ));
    }

    let employee = employees::create(pool, &new).await?;

    tracing::info!(
        target: "employee.service",
        employee_id = employee.id,
        "Employee created"
    );

    Ok(employee)
}

/// List employees matching `filter`, with the total number of matches.
#[instrument(skip_all, name = "employee.service.list")]
pub async fn list_employees(
    pool: &PgPool,
    filter: &EmployeeFilter,
) -> Result<EmployeeListResponse, ApiError> {
    let (employees, total) = employees::list(pool, filter).await?;

    Ok(EmployeeListResponse {
        employees,
        total,
        limit: filter.limit,
        offset: filter.offset,
    })
}

/// Fetch a single employee, active or not.
#[instrument(skip_all, name = "employee.service.get", fields(employee_id = id))]
pub async fn get_employee(pool: &PgPool, id: i32) -> Result<Employee, ApiError> {
    employees::get_by_id(pool, id)
        .await?
        .ok_or_else(employee_not_found)
}

/// Apply a partial update.
///
/// Nothing is written when the update carries no fields.
#[instrument(skip_all, name = "employee.service.update", fields(employee_id = id))]
pub async fn update_employee(
    pool: &PgPool,
    id: i32,
    update: EmployeeUpdate,
) -> Result<Employee, ApiError> {
    let update = normalize_update(update)?;
    if update.is_empty() {
        return Err(ApiError::NoFieldsToUpdate);
    }

    if employees::get_by_id(pool, id).await?.is_none() {
        return Err(employee_not_found());
    }

    if let Some(email) = &update.email {
        if employees::email_exists(pool, email, Some(id)).await? {
            return Err(ApiError::Conflict(
                "Another employee with this email already exists".to_string(),
            ));
        }
    }

    let employee = employees::update(pool, id, &update, Utc::now())
        .await?
        .ok_or_else(employee_not_found)?;

    tracing::info!(target: "employee.service", employee_id = id, "Employee updated");

    Ok(employee)
}

/// Deactivate an employee. Repeating the call succeeds.
#[instrument(skip_all, name = "employee.service.delete", fields(employee_id = id))]
pub async fn delete_employee(pool: &PgPool, id: i32) -> Result<(), ApiError> {
    if !employees::soft_delete(pool, id, Utc::now()).await? {
        return Err(employee_not_found());
    }

    tracing::info!(target: "employee.service", employee_id = id, "Employee deactivated");
    Ok(())
}

fn employee_not_found() -> ApiError {
    ApiError::NotFound("Employee with the specified ID does not exist".to_string())
}

/// Validate a create request and convert it to an insertable record.
pub fn validate_new_employee(request: CreateEmployeeRequest) -> Result<NewEmployee, ApiError> {
    let nip = required("nip", &request.nip, MAX_NIP_LENGTH)?;
    let name = required("name", &request.name, MAX_TEXT_LENGTH)?;
    let email = required("email", &request.email, MAX_TEXT_LENGTH)?;
    let position = required("position", &request.position, MAX_TEXT_LENGTH)?;
    let department = required("department", &request.department, MAX_TEXT_LENGTH)?;

    if request.hire_date.trim().is_empty() {
        return Err(ApiError::Validation("hire_date is required".to_string()));
    }
    let hire_date = parse_hire_date(request.hire_date.trim())?;

    if !crypto::is_valid_email(&email) {
        return Err(ApiError::Validation("Invalid email format".to_string()));
    }

    let phone = normalize_phone(request.phone)?;

    if let Some(salary) = request.salary {
        validate_salary(salary)?;
    }

    Ok(NewEmployee {
        nip,
        name,
        email,
        phone,
        position,
        department,
        salary: request.salary,
        hire_date,
    })
}

/// Trim provided fields and check them. An empty phone clears the column.
pub fn normalize_update(update: EmployeeUpdate) -> Result<EmployeeUpdate, ApiError> {
    let name = update
        .name
        .map(|v| required("name", &v, MAX_TEXT_LENGTH))
        .transpose()?;
    let email = update
        .email
        .map(|v| required("email", &v, MAX_TEXT_LENGTH))
        .transpose()?;
    let position = update
        .position
        .map(|v| required("position", &v, MAX_TEXT_LENGTH))
        .transpose()?;
    let department = update
        .department
        .map(|v| required("department", &v, MAX_TEXT_LENGTH))
        .transpose()?;

    if let Some(email) = &email {
        if !crypto::is_valid_email(email) {
            return Err(ApiError::Validation("Invalid email format".to_string()));
        }
    }

    let phone = update.phone.map(normalize_phone).transpose()?;

    if let Some(Some(salary)) = update.salary {
        validate_salary(salary)?;
    }

    Ok(EmployeeUpdate {
        name,
        email,
        phone,
        position,
        department,
        salary: update.salary,
        is_active: update.is_active,
    })
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_hire_date(value: &str) -> Result<NaiveDate, ApiError> {
    let well_formed = value.len() == 10
        && value.chars().enumerate().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        });

    well_formed
        .then(|| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
        .flatten()
        .ok_or_else(|| {
            ApiError::Validation("Invalid hire date format, use YYYY-MM-DD".to_string())
        })
}

fn required(field: &str, value: &str, max_len: usize) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::Validation(format!("{} is required", field)));
    }
    if value.chars().count() > max_len {
        return Err(ApiError::Validation(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }
    Ok(value.to_string())
}

fn normalize_phone(phone: Option<String>) -> Result<Option<String>, ApiError> {
    let Some(phone) = phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    if phone.chars().count() > MAX_PHONE_LENGTH {
        return Err(ApiError::Validation(format!(
            "phone must be at most {} characters",
            MAX_PHONE_LENGTH
        )));
    }
    Ok(Some(phone))
}

fn validate_salary(salary: Decimal) -> Result<(), ApiError> {
    if salary.is_sign_negative() && !salary.is_zero() {
        return Err(ApiError::Validation("salary must not be negative".to_string()));
    }
    if salary > max_salary() {
        return Err(ApiError::Validation("salary is too large".to_string()));
    }
    Ok(())
}
