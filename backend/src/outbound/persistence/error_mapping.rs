//! Shared mapping from pool and Diesel errors onto the persistence port.

use tracing::debug;

use crate::domain::ports::PersistenceError;

use super::pool::PoolError;

pub fn map_pool_error(error: PoolError) -> PersistenceError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    PersistenceError::connection(message)
}

/// Map Diesel errors into port variants. `unique_field` names the column the
/// caller expects unique-violations on.
pub fn map_diesel_error(
    error: diesel::result::Error,
    unique_field: &'static str,
) -> PersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(
            error_type = %std::any::type_name_of_val(other),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            PersistenceError::duplicate(unique_field)
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            PersistenceError::connection(info.message().to_owned())
        }
        other => PersistenceError::query(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_map_to_connection() {
        let mapped = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(mapped, PersistenceError::connection("timed out"));
    }

    #[rstest]
    fn not_found_maps_to_query() {
        let mapped = map_diesel_error(diesel::result::Error::NotFound, "email");
        assert!(matches!(mapped, PersistenceError::Query { .. }));
    }
}
