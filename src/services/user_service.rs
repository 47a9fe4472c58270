//! User use cases.
//!
//! Each operation maps the incoming DTO, calls the repository once and maps
//! the result back. Repository errors pass through unchanged.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::api::dto::{CreateUserDto, PageRequest, PaginatedUsersDto, UpdateUserDto, UserDto};
use crate::api::mapper::to_user_dtos;
use crate::error::AppResult;
use crate::repositories::UserRepository;

/// User operations over any [`UserRepository`] adapter.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, dto), fields(username = %dto.username))]
    pub async fn create_user(&self, dto: CreateUserDto) -> AppResult<UserDto> {
        let user = self.repo.create_user(dto.into()).await?;
        debug!(id = user.id, "User created");
        Ok(user.into())
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_id(&self, id: i32) -> AppResult<UserDto> {
        Ok(self.repo.get_user_by_id(id).await?.into())
    }

    #[instrument(skip(self))]
    pub async fn get_all_users(&self) -> AppResult<Vec<UserDto>> {
        let users = self.repo.get_all_users().await?;
        debug!(count = users.len(), "Users listed");
        Ok(to_user_dtos(users))
    }

    #[instrument(skip(self, request), fields(page = request.page, page_size = request.page_size))]
    pub async fn get_users_page(&self, request: PageRequest) -> AppResult<PaginatedUsersDto> {
        let (users, total) = self
            .repo
            .get_users_page(request.offset(), request.limit())
            .await?;
        debug!(returned = users.len(), total, "Users page loaded");
        Ok(PaginatedUsersDto::new(to_user_dtos(users), &request, total))
    }

    #[instrument(skip(self, dto), fields(id = dto.id))]
    pub async fn update_user(&self, dto: UpdateUserDto) -> AppResult<()> {
        self.repo.update_user(dto.into()).await?;
        debug!("User updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_user_by_id(&self, id: i32) -> AppResult<()> {
        self.repo.delete_user_by_id(id).await?;
        debug!("User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::repositories::InMemoryUserRepository;

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryUserRepository::new()))
    }

    fn ivan() -> CreateUserDto {
        CreateUserDto {
            username: "ivan".to_string(),
            email: "123@example.com".to_string(),
            password: "12345678".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_get_returns_same_fields() {
        let service = service();
        let created = service.create_user(ivan()).await.unwrap();
        assert!(created.id > 0);

        let fetched = service.get_user_by_id(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.username, "ivan");
        assert_eq!(fetched.email, "123@example.com");
        assert_eq!(fetched.password, "12345678");
    }

    #[tokio::test]
    async fn test_get_is_idempotent() {
        let service = service();
        let created = service.create_user(ivan()).await.unwrap();

        let first = service.get_user_by_id(created.id).await.unwrap();
        let second = service.get_user_by_id(created.id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_update_changes_only_email() {
        let service = service();
        let created = service.create_user(ivan()).await.unwrap();

        service
            .update_user(UpdateUserDto {
                id: created.id,
                username: None,
                email: Some("new@example.com".to_string()),
                password: None,
            })
            .await
            .unwrap();

        let updated = service.get_user_by_id(created.id).await.unwrap();
        assert_eq!(updated.email, "new@example.com");
        assert_eq!(updated.username, created.username);
        assert_eq!(updated.password, created.password);
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let service = service();
        service.create_user(ivan()).await.unwrap();

        let get = service.get_user_by_id(9999).await.unwrap_err();
        let update = service
            .update_user(UpdateUserDto {
                id: 9999,
                username: Some("ghost".to_string()),
                email: None,
                password: None,
            })
            .await
            .unwrap_err();
        let delete = service.delete_user_by_id(9999).await.unwrap_err();

        assert_eq!(get.kind(), ErrorKind::NotFound);
        assert_eq!(update.kind(), ErrorKind::NotFound);
        assert_eq!(delete.kind(), ErrorKind::NotFound);
        assert_eq!(service.get_all_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pages() {
        let service = service();
        for i in 0..23 {
            service
                .create_user(CreateUserDto {
                    username: format!("user{}", i),
                    email: format!("user{}@example.com", i),
                    password: "pw".to_string(),
                })
                .await
                .unwrap();
        }

        let last = service
            .get_users_page(PageRequest { page: 3, page_size: 10 })
            .await
            .unwrap();
        assert_eq!(last.total, 23);
        assert_eq!(last.total_pages, 3);
        assert_eq!(last.data.len(), 3);
        assert_eq!(last.data[0].id, 21);

        let beyond = service
            .get_users_page(PageRequest { page: 4, page_size: 10 })
            .await
            .unwrap();
        assert!(beyond.data.is_empty());
        assert_eq!(beyond.total, 23);
    }

    #[tokio::test]
    async fn test_list_in_id_order() {
        let service = service();
        service.create_user(ivan()).await.unwrap();
        service.create_user(ivan()).await.unwrap();

        let ids: Vec<i32> = service
            .get_all_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
