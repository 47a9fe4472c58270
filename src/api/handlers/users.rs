//! User CRUD request handlers.

use axum::{Json, Router, extract::State, routing::get};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::USER_TAG;
use crate::api::dto::{
    CreateUserDto, ErrorResponse, PaginatedUsersDto, PaginationParams, UpdateUserDto, UserDto,
};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::{ApiPath, ApiQuery, ValidatedJson};

/// Documented user routes.
///
/// - `GET /api/users/` list a page of users
/// - `POST /api/users/` create a user
/// - `PUT /api/users/` update a user
/// - `GET /api/users/{id}` fetch one user
/// - `DELETE /api/users/{id}` delete one user
pub fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_users, create_user, update_user))
        .routes(routes!(get_user, delete_user))
}

/// The collection routes without the trailing slash.
pub fn user_alias_routes() -> Router<AppState> {
    Router::new().route(
        "/api/users",
        get(list_users).post(create_user).put(update_user),
    )
}

/// GET /api/users/ - List users by page
#[utoipa::path(
    get,
    path = "/api/users/",
    tag = USER_TAG,
    params(PaginationParams),
    responses(
        (status = 200, description = "A page of users in id order", body = PaginatedUsersDto),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
async fn list_users(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<Json<PaginatedUsersDto>> {
    let page = state.services.users.get_users_page(params.normalize()).await?;
    Ok(Json(page))
}

/// POST /api/users/ - Create a user
#[utoipa::path(
    post,
    path = "/api/users/",
    tag = USER_TAG,
    request_body = CreateUserDto,
    responses(
        (status = 200, description = "User created", body = UserDto),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> AppResult<Json<UserDto>> {
    let user = state.services.users.create_user(dto).await?;
    Ok(Json(user))
}

/// PUT /api/users/ - Update the provided fields of a user
#[utoipa::path(
    put,
    path = "/api/users/",
    tag = USER_TAG,
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "Id of the updated user", body = i32),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
async fn update_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> AppResult<Json<i32>> {
    let id = dto.id;
    state.services.users.update_user(dto).await?;
    Ok(Json(id))
}

/// GET /api/users/{id} - Get a user by id
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = USER_TAG,
    params(
        ("id" = i32, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<UserDto>> {
    let user = state.services.users.get_user_by_id(id).await?;
    Ok(Json(user))
}

/// DELETE /api/users/{id} - Delete a user by id
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = USER_TAG,
    params(
        ("id" = i32, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "Id of the deleted user", body = i32),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
async fn delete_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<i32>> {
    state.services.users.delete_user_by_id(id).await?;
    Ok(Json(id))
}
