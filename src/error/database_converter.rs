use crate::error::AppError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Turns Diesel failures into [`AppError`] values carrying the failed operation.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error raised while running `operation`.
    ///
    /// Constraint violations keep the database message so the log line shows
    /// which constraint fired; everything else is wrapped as a
    /// [`AppError::Database`] failure.
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info, operation)
            }
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: Box<dyn diesel::result::DatabaseErrorInformation + Send + Sync>,
        operation: &str,
    ) -> AppError {
        let message = info.message().to_string();

        match kind {
            DatabaseErrorKind::UniqueViolation => AppError::Duplicate {
                entity: info.table_name().unwrap_or("users").to_string(),
                field: info
                    .column_name()
                    .or(info.constraint_name())
                    .unwrap_or("unknown")
                    .to_string(),
                value: info.details().unwrap_or_default().to_string(),
            },
            DatabaseErrorKind::ClosedConnection => AppError::ConnectionPool {
                source: anyhow::Error::msg(message),
            },
            _ => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(format!("{:?}: {}", kind, message)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[derive(Debug)]
    struct Info {
        message: &'static str,
        constraint: Option<&'static str>,
    }

    impl diesel::result::DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            self.message
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("users")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(
            kind,
            Box::new(Info {
                message: "constraint violated",
                constraint,
            }),
        )
    }

    #[test]
    fn test_unique_violation_becomes_duplicate() {
        let error = DatabaseErrorConverter::convert_diesel_error(
            database_error(DatabaseErrorKind::UniqueViolation, Some("users_email_key")),
            "create user",
        );
        match error {
            AppError::Duplicate { entity, field, .. } => {
                assert_eq!(entity, "users");
                assert_eq!(field, "users_email_key");
            }
            other => panic!("Expected Duplicate, got {:?}", other),
        }
    }

    #[test]
    fn test_other_database_errors_keep_operation() {
        let error = DatabaseErrorConverter::convert_diesel_error(
            database_error(DatabaseErrorKind::CheckViolation, None),
            "update user",
        );
        assert_eq!(error.kind(), ErrorKind::Persistence);
        match error {
            AppError::Database { operation, .. } => assert_eq!(operation, "update user"),
            other => panic!("Expected Database, got {:?}", other),
        }
    }

    #[test]
    fn test_rollback_transaction_error_is_persistence() {
        let error = DatabaseErrorConverter::convert_diesel_error(
            DieselError::RollbackTransaction,
            "delete user",
        );
        assert_eq!(error.kind(), ErrorKind::Persistence);
        assert!(error.to_string().contains("delete user"));
    }
}
