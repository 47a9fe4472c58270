//! PostgreSQL user repository built on diesel_async.
//!
//! Transactions are driven through the connection's transaction manager
//! directly so a failed rollback can be reported together with the error
//! that triggered it.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::{ScopedBoxFuture, ScopedFutureExt};
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};

use crate::db::{AsyncDbPool, PooledConnection};
use crate::error::{AppError, AppResult, DatabaseErrorConverter};
use crate::models::{NewUser, UpdateUser, User};
use crate::repositories::{UserRepository, empty_update_error};
use crate::schema::users;

/// User repository holding an async connection pool.
///
/// `AsyncDbPool` is reference counted, so cloning the repository is cheap.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: AsyncDbPool,
}

impl DieselUserRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    async fn connection(&self) -> AppResult<PooledConnection<'_>> {
        self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })
    }

    /// Runs `callback` inside a transaction on a pooled connection.
    async fn in_transaction<'a, R, F>(&self, operation: &'static str, callback: F) -> AppResult<R>
    where
        F: for<'r> FnOnce(&'r mut AsyncPgConnection) -> ScopedBoxFuture<'a, 'r, AppResult<R>>
            + Send
            + 'a,
        R: Send + 'a,
    {
        let mut pooled = self.connection().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        AnsiTransactionManager::begin_transaction(conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, operation))?;

        match callback(&mut *conn).await {
            Ok(value) => {
                AnsiTransactionManager::commit_transaction(conn)
                    .await
                    .map_err(|e| {
                        DatabaseErrorConverter::convert_diesel_error(
                            e,
                            &format!("commit {}", operation),
                        )
                    })?;
                Ok(value)
            }
            Err(error) => Err(rollback(conn, error, operation).await),
        }
    }
}

/// Rolls back after `error`; a failing rollback wraps both failures.
async fn rollback(conn: &mut AsyncPgConnection, error: AppError, operation: &str) -> AppError {
    match AnsiTransactionManager::rollback_transaction(conn).await {
        Ok(()) => error,
        Err(rollback_error) => {
            tracing::error!(
                operation,
                error = %error,
                rollback_error = %rollback_error,
                "Transaction rollback failed"
            );
            rollback_failed(error, rollback_error, operation)
        }
    }
}

/// Chains a failed rollback onto the error that caused it.
fn rollback_failed(
    error: AppError,
    rollback_error: diesel::result::Error,
    operation: &str,
) -> AppError {
    AppError::Database {
        operation: format!("rollback {}", operation),
        source: anyhow::Error::new(error).context(format!("rollback failed: {}", rollback_error)),
    }
}

/// Makes the count and the page read from one snapshot. Under the default
/// READ COMMITTED level each statement would see its own.
const PAGE_SNAPSHOT: &str = "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY";

fn not_found_if_untouched(affected: usize, id: i32) -> AppResult<()> {
    if affected == 0 {
        Err(AppError::user_not_found(id))
    } else {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        const OP: &str = "create user";
        self.in_transaction(OP, move |conn| {
            async move {
                diesel::insert_into(users::table)
                    .values(&new_user)
                    .returning(User::as_returning())
                    .get_result(conn)
                    .await
                    .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, OP))
            }
            .scope_boxed()
        })
        .await
    }

    async fn get_user_by_id(&self, id: i32) -> AppResult<User> {
        const OP: &str = "get user by id";
        self.in_transaction(OP, move |conn| {
            async move {
                users::table
                    .find(id)
                    .select(User::as_select())
                    .first(conn)
                    .await
                    .optional()
                    .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, OP))?
                    .ok_or_else(|| AppError::user_not_found(id))
            }
            .scope_boxed()
        })
        .await
    }

    async fn get_all_users(&self) -> AppResult<Vec<User>> {
        const OP: &str = "get all users";
        self.in_transaction(OP, |conn| {
            async move {
                users::table
                    .order(users::id.asc())
                    .select(User::as_select())
                    .load(conn)
                    .await
                    .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, OP))
            }
            .scope_boxed()
        })
        .await
    }

    async fn get_users_page(&self, offset: i64, limit: i64) -> AppResult<(Vec<User>, i64)> {
        const OP: &str = "get users page";
        self.in_transaction(OP, move |conn| {
            async move {
                diesel::sql_query(PAGE_SNAPSHOT)
                    .execute(conn)
                    .await
                    .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, OP))?;

                let total: i64 = users::table
                    .count()
                    .get_result(conn)
                    .await
                    .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, OP))?;

                let page = users::table
                    .order(users::id.asc())
                    .limit(limit)
                    .offset(offset)
                    .select(User::as_select())
                    .load(conn)
                    .await
                    .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, OP))?;

                Ok((page, total))
            }
            .scope_boxed()
        })
        .await
    }

    async fn update_user(&self, update: UpdateUser) -> AppResult<()> {
        const OP: &str = "update user";
        if !update.has_changes() {
            return Err(empty_update_error());
        }

        self.in_transaction(OP, move |conn| {
            async move {
                let affected = diesel::update(users::table.find(update.id))
                    .set(&update)
                    .execute(conn)
                    .await
                    .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, OP))?;
                not_found_if_untouched(affected, update.id)
            }
            .scope_boxed()
        })
        .await
    }

    async fn delete_user_by_id(&self, id: i32) -> AppResult<()> {
        const OP: &str = "delete user";
        self.in_transaction(OP, move |conn| {
            async move {
                let affected = diesel::delete(users::table.find(id))
                    .execute(conn)
                    .await
                    .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, OP))?;
                not_found_if_untouched(affected, id)
            }
            .scope_boxed()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::debug_query;
    use diesel::pg::Pg;

    use crate::error::ErrorKind;

    #[test]
    fn test_update_sets_only_provided_columns() {
        let update = UpdateUser {
            id: 7,
            email: Some("new@example.com".to_string()),
            ..Default::default()
        };
        let query = diesel::update(users::table.find(update.id)).set(&update);
        let sql = debug_query::<Pg, _>(&query).to_string();

        assert!(sql.contains(r#"SET "email" = $1"#), "{}", sql);
        assert!(!sql.contains(r#""username""#), "{}", sql);
        assert!(!sql.contains(r#""password""#), "{}", sql);
        assert!(sql.contains(r#"WHERE ("users"."id" = $2)"#), "{}", sql);
    }

    #[test]
    fn test_page_query_binds_limit_and_offset() {
        let query = users::table
            .order(users::id.asc())
            .limit(10)
            .offset(20)
            .select(User::as_select());
        let sql = debug_query::<Pg, _>(&query).to_string();

        assert!(sql.contains("ORDER BY \"users\".\"id\" ASC"), "{}", sql);
        assert!(sql.contains("LIMIT $1 OFFSET $2"), "{}", sql);
        assert!(sql.contains("binds: [10, 20]"), "{}", sql);
    }

    #[test]
    fn test_page_reads_from_one_snapshot() {
        let sql = debug_query::<Pg, _>(&diesel::sql_query(PAGE_SNAPSHOT)).to_string();
        assert!(sql.starts_with("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ"), "{}", sql);
        assert!(sql.contains("READ ONLY"), "{}", sql);
    }

    #[test]
    fn test_rollback_failure_chains_both_errors() {
        let original = AppError::user_not_found(42);
        let rollback_error =
            diesel::result::Error::QueryBuilderError("server closed the connection".into());

        let err = rollback_failed(original, rollback_error, "update user");
        assert_eq!(err.kind(), ErrorKind::Persistence);
        match &err {
            AppError::Database { operation, .. } => assert_eq!(operation, "rollback update user"),
            other => panic!("Expected Database error, got {:?}", other),
        }

        let chain = format!("{:#}", anyhow::Error::new(err));
        assert!(chain.contains("rollback update user"), "{}", chain);
        assert!(chain.contains("server closed the connection"), "{}", chain);
        assert!(chain.contains("user with id=42"), "{}", chain);
    }

    #[test]
    fn test_not_found_if_untouched() {
        assert!(not_found_if_untouched(1, 3).is_ok());
        match not_found_if_untouched(0, 3) {
            Err(AppError::NotFound { value, .. }) => assert_eq!(value, "3"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }
}
