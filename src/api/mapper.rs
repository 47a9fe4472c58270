//! Conversions between the HTTP DTOs and the persistence models.
//!
//! All conversions are total. Optional update fields stay optional, so an
//! omitted field is never confused with an empty string.

use crate::api::dto::{CreateUserDto, UpdateUserDto, UserDto};
use crate::models::{NewUser, UpdateUser, User};

impl From<CreateUserDto> for NewUser {
    fn from(dto: CreateUserDto) -> Self {
        NewUser {
            username: dto.username,
            email: dto.email,
            password: dto.password,
        }
    }
}

impl From<UserDto> for User {
    fn from(dto: UserDto) -> Self {
        User {
            id: dto.id,
            username: dto.username,
            email: dto.email,
            password: dto.password,
        }
    }
}

impl From<UpdateUserDto> for UpdateUser {
    fn from(dto: UpdateUserDto) -> Self {
        UpdateUser {
            id: dto.id,
            username: dto.username,
            email: dto.email,
            password: dto.password,
        }
    }
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            id: user.id,
            username: user.username,
            email: user.email,
            password: user.password,
        }
    }
}

/// Order-preserving batch conversion to DTOs.
pub fn to_user_dtos(users: Vec<User>) -> Vec<UserDto> {
    users.into_iter().map(UserDto::from).collect()
}

/// Order-preserving batch conversion from DTOs.
pub fn from_user_dtos(dtos: Vec<UserDto>) -> Vec<User> {
    dtos.into_iter().map(User::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_create_dto_to_new_user() {
        let new_user = NewUser::from(CreateUserDto {
            username: "ivan".to_string(),
            email: "123@example.com".to_string(),
            password: "12345678".to_string(),
        });
        assert_eq!(new_user.username, "ivan");
        assert_eq!(new_user.email, "123@example.com");
        assert_eq!(new_user.password, "12345678");
    }

    #[test]
    fn test_update_dto_keeps_absent_fields_absent() {
        let update = UpdateUser::from(UpdateUserDto {
            id: 3,
            username: None,
            email: Some("new@example.com".to_string()),
            password: Some(String::new()),
        });
        assert_eq!(update.id, 3);
        assert_eq!(update.username, None);
        assert_eq!(update.email.as_deref(), Some("new@example.com"));
        assert_eq!(update.password.as_deref(), Some(""));
    }

    #[test]
    fn test_batch_conversions_preserve_order() {
        let users: Vec<User> = (1..=3)
            .map(|id| User {
                id,
                username: format!("user{}", id),
                email: format!("user{}@example.com", id),
                password: "pw".to_string(),
            })
            .collect();

        let dtos = to_user_dtos(users.clone());
        assert_eq!(dtos.iter().map(|d| d.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(from_user_dtos(dtos), users);
        assert!(to_user_dtos(Vec::new()).is_empty());
    }

    proptest! {
        #[test]
        fn prop_user_dto_round_trip(
            id in 1i32..i32::MAX,
            username in "\\PC{0,20}",
            email in "[a-z]{1,8}@[a-z]{1,8}\\.com",
            password in "\\PC{0,20}",
        ) {
            let user = User { id, username, email, password };
            prop_assert_eq!(User::from(UserDto::from(user.clone())), user);
        }
    }
}
