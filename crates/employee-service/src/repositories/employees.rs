//! Employee repository.
//!
//! Records are never physically deleted; `soft_delete` flips `is_active`.

use crate::errors::ApiError;
use crate::models::{Employee, EmployeeFilter, EmployeeUpdate, NewEmployee};
use crate::observability::metrics;
use crate::repositories::map_write_error;
use crate::repositories::query_builder::{self, EMPLOYEE_COLUMNS};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::time::Instant;
use tracing::instrument;

fn record<T, E>(operation: &str, result: &Result<T, E>, start: Instant) {
    let status = if result.is_ok() { "success" } else { "error" };
    metrics::record_db_query(operation, "employees", status, start.elapsed());
}

/// Insert a new employee. `is_active` defaults to true.
///
/// A duplicate NIP or email surfaces as `ApiError::Conflict`.
#[instrument(skip_all, name = "employee.repo.create")]
pub async fn create(pool: &PgPool, new: &NewEmployee) -> Result<Employee, ApiError> {
    let start = Instant::now();
    let sql = format!(
        r#"
        INSERT INTO employees (nip, name, email, phone, position, department, salary, hire_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {}
        "#,
        EMPLOYEE_COLUMNS
    );

    let result = sqlx::query_as::<_, Employee>(&sql)
        .bind(&new.nip) // $1
        .bind(&new.name) // $2
        .bind(&new.email) // $3
        .bind(&new.phone) // $4
        .bind(&new.position) // $5
        .bind(&new.department) // $6
        .bind(new.salary) // $7
        .bind(new.hire_date) // $8
        .fetch_one(pool)
        .await;
    record("insert", &result, start);

    result.map_err(|e| map_write_error(e, "Failed to create employee"))
}

/// Fetch an employee by id, active or not.
#[instrument(skip_all, name = "employee.repo.get_by_id")]
pub async fn get_by_id(pool: &PgPool, id: i32) -> Result<Option<Employee>, ApiError> {
    let start = Instant::now();
    let sql = format!("SELECT {} FROM employees WHERE id = $1", EMPLOYEE_COLUMNS);

    let result = sqlx::query_as::<_, Employee>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await;
    record("select", &result, start);

    result.map_err(|e| ApiError::Database(format!("Failed to fetch employee by id: {}", e)))
}

/// Whether any employee has this NIP.
pub async fn nip_exists(pool: &PgPool, nip: &str) -> Result<bool, ApiError> {
    let start = Instant::now();
    let result: Result<bool, _> =
        sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM employees WHERE nip = $1)"#)
            .bind(nip)
            .fetch_one(pool)
            .await;
    record("select", &result, start);

    result.map_err(|e| ApiError::Database(format!("Failed to check NIP: {}", e)))
}

/// Whether any employee other than `exclude_id` has this email.
pub async fn email_exists(
    pool: &PgPool,
    email: &str,
    exclude_id: Option<i32>,
) -> Result<bool, ApiError> {
    let start = Instant::now();
    let result: Result<bool, _> = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM employees
            WHERE email = $1 AND ($2::INTEGER IS NULL OR id <> $2)
        )
        "#,
    )
    .bind(email)
    .bind(exclude_id)
    .fetch_one(pool)
    .await;
    record("select", &result, start);

    result.map_err(|e| ApiError::Database(format!("Failed to check email: {}", e)))
}

/// Fetch one page of employees plus the total number of matches.
///
/// Both statements run in one REPEATABLE READ transaction so the total and
/// the page come from the same snapshot.
#[instrument(skip_all, name = "employee.repo.list")]
pub async fn list(
    pool: &PgPool,
    filter: &EmployeeFilter,
) -> Result<(Vec<Employee>, i64), ApiError> {
    let start = Instant::now();
    let query = query_builder::build_filtered_select(filter);

    let result = async {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let total: i64 = query.count.query_scalar::<i64>().fetch_one(&mut *tx).await?;
        let employees = query
            .select
            .query_as::<Employee>()
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok::<_, sqlx::Error>((employees, total))
    }
    .await;
    record("select", &result, start);

    result.map_err(|e| ApiError::Database(format!("Failed to list employees: {}", e)))
}

/// Apply a partial update and return the refreshed row, or `None` if no
/// employee has this id.
#[instrument(skip_all, name = "employee.repo.update")]
pub async fn update(
    pool: &PgPool,
    id: i32,
    changes: &EmployeeUpdate,
    now: DateTime<Utc>,
) -> Result<Option<Employee>, ApiError> {
    let query = query_builder::build_partial_update(id, changes, now)?;

    let start = Instant::now();
    let result = query
        .query_as::<Employee>()
        .fetch_optional(pool)
        .await;
    record("update", &result, start);

    result.map_err(|e| map_write_error(e, "Failed to update employee"))
}

/// Mark an employee inactive. Returns `false` if no employee has this id.
///
/// Idempotent: deactivating an inactive employee still succeeds and
/// refreshes `updated_at`.
#[instrument(skip_all, name = "employee.repo.soft_delete")]
pub async fn soft_delete(pool: &PgPool, id: i32, now: DateTime<Utc>) -> Result<bool, ApiError> {
    let start = Instant::now();
    let result = sqlx::query(
        r#"
        UPDATE employees
        SET is_active = false, updated_at = $2
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(now)
    .execute(pool)
    .await;
    record("update", &result, start);

    let rows = result
        .map_err(|e| ApiError::Database(format!("Failed to delete employee: {}", e)))?
        .rows_affected();

    Ok(rows > 0)
}
