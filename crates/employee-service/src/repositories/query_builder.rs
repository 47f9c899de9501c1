//! Dynamic SQL for employee listing and partial updates.
//!
//! Only [`Column`] names are ever written into SQL text. Every caller-supplied
//! value travels as a positional [`SqlParam`], so the rendered SQL for a given
//! filter or update shape is always byte-identical.

use crate::errors::ApiError;
use crate::models::{EmployeeFilter, EmployeeUpdate};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::{FromRow, Postgres};

/// Column list shared by every query that returns an [`crate::models::Employee`].
pub const EMPLOYEE_COLUMNS: &str = "id, nip, name, email, phone, position, department, salary, \
                                    hire_date, is_active, created_at, updated_at";

/// Columns searched by the free-text filter.
pub const SEARCH_COLUMNS: &[Column] = &[Column::Name, Column::Email, Column::Nip];

/// Whitelisted employee columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Nip,
    Name,
    Email,
    Phone,
    Position,
    Department,
    Salary,
    IsActive,
    UpdatedAt,
}

impl Column {
    pub fn as_str(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Nip => "nip",
            Column::Name => "name",
            Column::Email => "email",
            Column::Phone => "phone",
            Column::Position => "position",
            Column::Department => "department",
            Column::Salary => "salary",
            Column::IsActive => "is_active",
            Column::UpdatedAt => "updated_at",
        }
    }
}

/// A bound query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    NullableText(Option<String>),
    Bool(bool),
    Int(i32),
    BigInt(i64),
    NullableDecimal(Option<Decimal>),
    Timestamp(DateTime<Utc>),
}

/// One conjunct of a WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column = $n`
    Eq(Column, SqlParam),
    /// `(c1 ILIKE $n ESCAPE '\' OR c2 ILIKE $n ESCAPE '\' ...)`, one parameter
    /// shared by every column.
    AnyILike(&'static [Column], SqlParam),
}

/// One `column = $n` entry of a SET clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: Column,
    pub value: SqlParam,
}

/// Rendered SQL plus its parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl BuiltQuery {
    /// Prepare a row-returning query with every parameter bound.
    pub fn query_as<O>(&self) -> QueryAs<'_, Postgres, O, PgArguments>
    where
        O: for<'r> FromRow<'r, PgRow>,
    {
        let mut query = sqlx::query_as::<_, O>(&self.sql);
        for param in &self.params {
            query = match param {
                SqlParam::Text(v) => query.bind(v.clone()),
                SqlParam::NullableText(v) => query.bind(v.clone()),
                SqlParam::Bool(v) => query.bind(*v),
                SqlParam::Int(v) => query.bind(*v),
                SqlParam::BigInt(v) => query.bind(*v),
                SqlParam::NullableDecimal(v) => query.bind(*v),
                SqlParam::Timestamp(v) => query.bind(*v),
            };
        }
        query
    }

    /// Prepare a single-value query (e.g. `COUNT(*)`) with every parameter bound.
    pub fn query_scalar<O>(&self) -> QueryScalar<'_, Postgres, O, PgArguments>
    where
        (O,): for<'r> FromRow<'r, PgRow>,
    {
        let mut query = sqlx::query_scalar::<_, O>(&self.sql);
        for param in &self.params {
            query = match param {
                SqlParam::Text(v) => query.bind(v.clone()),
                SqlParam::NullableText(v) => query.bind(v.clone()),
                SqlParam::Bool(v) => query.bind(*v),
                SqlParam::Int(v) => query.bind(*v),
                SqlParam::BigInt(v) => query.bind(*v),
                SqlParam::NullableDecimal(v) => query.bind(*v),
                SqlParam::Timestamp(v) => query.bind(*v),
            };
        }
        query
    }
}

/// Page query and its matching count query.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeQuery {
    pub select: BuiltQuery,
    pub count: BuiltQuery,
}

/// Accumulates predicates and renders them with `$n` placeholders.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    predicates: Vec<Predicate>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_predicate(&mut self, predicate: Predicate) -> &mut Self {
        self.predicates.push(predicate);
        self
    }

    /// Render ` WHERE ...` (empty if there are no predicates), appending the
    /// bound values to `params`.
    pub fn build_where_clause(&self, params: &mut Vec<SqlParam>) -> String {
        if self.predicates.is_empty() {
            return String::new();
        }

        let conditions: Vec<String> = self
            .predicates
            .iter()
            .map(|predicate| match predicate {
                Predicate::Eq(column, value) => {
                    let n = push_param(params, value.clone());
                    format!("{} = ${}", column.as_str(), n)
                }
                Predicate::AnyILike(columns, value) => {
                    let n = push_param(params, value.clone());
                    let alternatives: Vec<String> = columns
                        .iter()
                        .map(|column| format!("{} ILIKE ${} ESCAPE '\\'", column.as_str(), n))
                        .collect();
                    format!("({})", alternatives.join(" OR "))
                }
            })
            .collect();

        format!(" WHERE {}", conditions.join(" AND "))
    }
}

fn push_param(params: &mut Vec<SqlParam>, value: SqlParam) -> usize {
    params.push(value);
    params.len()
}

/// Escape LIKE metacharacters and wrap in `%...%` for a substring match.
pub fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Build the page and count queries for an employee listing.
///
/// Predicates appear in the order department, position, is_active, search.
/// Absent filters emit nothing. Ordering is `created_at DESC, id DESC`, and
/// `LIMIT`/`OFFSET` are always the last two parameters.
pub fn build_filtered_select(filter: &EmployeeFilter) -> EmployeeQuery {
    let mut builder = QueryBuilder::new();

    if let Some(department) = &filter.department {
        builder.add_predicate(Predicate::Eq(
            Column::Department,
            SqlParam::Text(department.clone()),
        ));
    }
    if let Some(position) = &filter.position {
        builder.add_predicate(Predicate::Eq(
            Column::Position,
            SqlParam::Text(position.clone()),
        ));
    }
    if let Some(is_active) = filter.is_active {
        builder.add_predicate(Predicate::Eq(Column::IsActive, SqlParam::Bool(is_active)));
    }
    if let Some(search) = &filter.search {
        builder.add_predicate(Predicate::AnyILike(
            SEARCH_COLUMNS,
            SqlParam::Text(contains_pattern(search)),
        ));
    }

    let mut params = Vec::new();
    let where_clause = builder.build_where_clause(&mut params);

    let count = BuiltQuery {
        sql: format!("SELECT COUNT(*) FROM employees{}", where_clause),
        params: params.clone(),
    };

    let limit_n = push_param(&mut params, SqlParam::BigInt(filter.limit));
    let offset_n = push_param(&mut params, SqlParam::BigInt(filter.offset));
    let select = BuiltQuery {
        sql: format!(
            "SELECT {} FROM employees{} ORDER BY created_at DESC, id DESC LIMIT ${} OFFSET ${}",
            EMPLOYEE_COLUMNS, where_clause, limit_n, offset_n
        ),
        params,
    };

    EmployeeQuery { select, count }
}

/// Build `UPDATE employees SET ... WHERE id = $n RETURNING ...` for the
/// fields present in `update`.
///
/// Assignments follow the order name, email, phone, position, department,
/// salary, is_active, and always end with `updated_at`.
///
/// # Errors
///
/// Returns `ApiError::NoFieldsToUpdate` when no field is present.
pub fn build_partial_update(
    id: i32,
    update: &EmployeeUpdate,
    now: DateTime<Utc>,
) -> Result<BuiltQuery, ApiError> {
    let mut assignments = Vec::new();
    let mut assign = |column, value| assignments.push(Assignment { column, value });

    if let Some(name) = &update.name {
        assign(Column::Name, SqlParam::Text(name.clone()));
    }
    if let Some(email) = &update.email {
        assign(Column::Email, SqlParam::Text(email.clone()));
    }
    if let Some(phone) = &update.phone {
        assign(Column::Phone, SqlParam::NullableText(phone.clone()));
    }
    if let Some(position) = &update.position {
        assign(Column::Position, SqlParam::Text(position.clone()));
    }
    if let Some(department) = &update.department {
        assign(Column::Department, SqlParam::Text(department.clone()));
    }
    if let Some(salary) = update.salary {
        assign(Column::Salary, SqlParam::NullableDecimal(salary));
    }
    if let Some(is_active) = update.is_active {
        assign(Column::IsActive, SqlParam::Bool(is_active));
    }

    if assignments.is_empty() {
        return Err(ApiError::NoFieldsToUpdate);
    }

    assignments.push(Assignment {
        column: Column::UpdatedAt,
        value: SqlParam::Timestamp(now),
    });

    let mut params = Vec::with_capacity(assignments.len() + 1);
    let set_clause: Vec<String> = assignments
        .into_iter()
        .map(|Assignment { column, value }| {
            let n = push_param(&mut params, value);
            format!("{} = ${}", column.as_str(), n)
        })
        .collect();
    let id_n = push_param(&mut params, SqlParam::Int(id));

    Ok(BuiltQuery {
        sql: format!(
            "UPDATE employees SET {} WHERE {} = ${} RETURNING {}",
            set_clause.join(", "),
            Column::Id.as_str(),
            id_n,
            EMPLOYEE_COLUMNS
        ),
        params,
    })
}
