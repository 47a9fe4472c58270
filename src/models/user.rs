use diesel::prelude::*;

/// User row as stored in the `users` table.
#[derive(Debug, Queryable, Selectable, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Insert payload. Ids are always assigned by the store.
#[derive(Debug, Insertable, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Partial update of an existing user.
///
/// `None` leaves the column untouched; the derived changeset skips the
/// primary key and every `None` field, so only provided columns reach `SET`.
#[derive(Debug, AsChangeset, Clone, Default, PartialEq, Eq)]
#[diesel(table_name = crate::schema::users)]
pub struct UpdateUser {
    pub id: i32,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateUser {
    /// Whether at least one column would be written.
    pub fn has_changes(&self) -> bool {
        self.username.is_some() || self.email.is_some() || self.password.is_some()
    }

    /// Applies the provided fields onto an existing row.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(username) = &self.username {
            user.username = username.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(password) = &self.password {
            user.password = password.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing() -> User {
        User {
            id: 1,
            username: "ivan".to_string(),
            email: "123@example.com".to_string(),
            password: "12345678".to_string(),
        }
    }

    #[test]
    fn test_has_changes() {
        assert!(!UpdateUser { id: 1, ..Default::default() }.has_changes());
        assert!(UpdateUser {
            id: 1,
            password: Some("secret".to_string()),
            ..Default::default()
        }
        .has_changes());
    }

    #[test]
    fn test_apply_to_only_overwrites_provided_fields() {
        let mut user = existing();
        let update = UpdateUser {
            id: 1,
            email: Some("new@example.com".to_string()),
            ..Default::default()
        };

        update.apply_to(&mut user);

        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.username, "ivan");
        assert_eq!(user.password, "12345678");
    }

    #[test]
    fn test_apply_to_keeps_explicit_empty_string() {
        let mut user = existing();
        let update = UpdateUser {
            id: 1,
            username: Some(String::new()),
            ..Default::default()
        };

        update.apply_to(&mut user);

        assert_eq!(user.username, "");
    }
}
