//! Row structs bridging Diesel and the domain types.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{Email, Product, Role, User, UserValidationError};

use super::schema::{products, seed_runs, users};

#[derive(Debug, Queryable)]
#[diesel(table_name = users)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert a stored row back into the domain aggregate. Fails only when
    /// the row predates the current validation rules.
    pub fn into_domain(self) -> Result<User, UserValidationError> {
        Ok(User {
            id: self.id,
            name: self.name,
            email: Email::new(self.email)?,
            role: self.role.parse::<Role>()?,
            password_hash: self.password_hash,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: user.id,
            name: &user.name,
            email: user.email.as_str(),
            role: user.role.as_str(),
            password_hash: &user.password_hash,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Queryable)]
#[diesel(table_name = products)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price_cents: row.price_cents,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub description: &'a str,
    pub price_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a Product> for NewProductRow<'a> {
    fn from(product: &'a Product) -> Self {
        Self {
            id: product.id,
            name: &product.name,
            description: &product.description,
            price_cents: product.price_cents,
            created_at: product.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = seed_runs)]
pub struct NewSeedRunRow<'a> {
    pub seed_key: &'a str,
    pub applied_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn row(role: &str) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            role: role.into(),
            password_hash: "hash".into(),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn user_row_round_trips_to_domain() {
        let user = row("admin").into_domain().expect("valid row");
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.email.as_str(), "ada@example.com");
    }

    #[rstest]
    fn user_row_with_unknown_role_is_rejected() {
        let err = row("superuser").into_domain().expect_err("invalid role");
        assert_eq!(
            err,
            UserValidationError::UnknownRole {
                value: "superuser".into()
            }
        );
    }
}
