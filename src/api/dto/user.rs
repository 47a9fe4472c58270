//! User-related DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::api::dto::PageRequest;

/// Request body for creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateUserDto {
    #[validate(length(min = 1, message = "Username must not be empty"))]
    #[schema(min_length = 1, example = "ivan")]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    #[schema(format = "email", example = "123@example.com")]
    pub email: String,

    #[validate(length(min = 1, message = "Password must not be empty"))]
    #[schema(format = "password", min_length = 1, example = "12345678")]
    pub password: String,
}

/// A persisted user.
///
/// The password is returned as stored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct UserDto {
    #[schema(example = 1)]
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for a partial update. Omitted fields keep their value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema, Validate)]
#[validate(schema(function = "require_any_field", skip_on_field_errors = false))]
pub struct UpdateUserDto {
    #[validate(range(min = 1, message = "Id must be a positive integer"))]
    #[schema(minimum = 1, example = 1)]
    pub id: i32,

    #[validate(length(min = 1, message = "Username must not be empty"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(format = "email")]
    pub email: Option<String>,

    #[validate(length(min = 1, message = "Password must not be empty"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(format = "password")]
    pub password: Option<String>,
}

fn require_any_field(dto: &UpdateUserDto) -> Result<(), ValidationError> {
    if dto.username.is_none() && dto.email.is_none() && dto.password.is_none() {
        return Err(ValidationError::new("empty_update")
            .with_message("At least one of username, email or password must be provided".into()));
    }
    Ok(())
}

/// One page of users.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct PaginatedUsersDto {
    pub data: Vec<UserDto>,
    #[schema(example = 1)]
    pub page: i64,
    #[schema(example = 10)]
    pub page_size: i64,
    #[schema(example = 42)]
    pub total: i64,
    #[schema(example = 5)]
    pub total_pages: i64,
}

impl PaginatedUsersDto {
    pub fn new(data: Vec<UserDto>, request: &PageRequest, total: i64) -> Self {
        Self {
            data,
            page: request.page,
            page_size: request.page_size,
            total,
            total_pages: request.total_pages(total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rules() {
        let valid = CreateUserDto {
            username: "ivan".to_string(),
            email: "123@example.com".to_string(),
            password: "12345678".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = CreateUserDto {
            username: String::new(),
            email: "nope".to_string(),
            password: String::new(),
        };
        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_update_requires_a_field() {
        let empty: UpdateUserDto = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        let errors = empty.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("__all__"));
    }

    #[test]
    fn test_update_checks_present_fields_only() {
        let dto: UpdateUserDto =
            serde_json::from_str(r#"{"id": 3, "email": "new@example.com"}"#).unwrap();
        assert!(dto.validate().is_ok());
        assert_eq!(dto.username, None);

        let bad: UpdateUserDto = serde_json::from_str(r#"{"id": 0, "email": "x"}"#).unwrap();
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("id"));
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_paginated_dto_serialization() {
        let dto = PaginatedUsersDto::new(Vec::new(), &PageRequest { page: 4, page_size: 10 }, 31);
        let value = serde_json::to_value(&dto).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "data": [],
                "page": 4,
                "page_size": 10,
                "total": 31,
                "total_pages": 4
            })
        );
    }
}
