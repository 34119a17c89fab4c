use std::sync::Arc;

use apikit::{
    created_json, no_content, ApiError, ApiJson, DataResponse, ItemsResponse, ListResponse,
    QueryPairs,
};
use axum::{extract::Path, response::Response, Extension, Json};
use tracing::{error, info};
use uuid::Uuid;

use crate::api::rest::auth::AuthUser;
use crate::api::rest::dto::{
    CreateFlatReq, FlatDto, FlatWithOwnerDto, ForgotPasswordReq, LoginReq, MessageDto, NoticeDto,
    RegisterReq, ResetPasswordReq, SendMessageReq, UpdateFlatReq, UpdatePasswordReq,
    UpdateUserReq, UserDto, UserSummaryDto,
};
use crate::api::rest::error::map_domain_error;
use crate::contract::model::{AuthSession, MessageWithSender};
use crate::domain::service::Service;

type Svc = Extension<Arc<Service>>;

/// Ids arrive as strings so a malformed one is a `400`, not a routing miss.
fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::bad_request(format!("invalid {what} id '{raw}'")))
}

fn session_response(session: AuthSession) -> DataResponse<UserDto> {
    DataResponse::new(UserDto::from(session.user)).with_token(session.token)
}

/* ---------- accounts ---------- */

pub async fn register(
    Extension(svc): Svc,
    ApiJson(req): ApiJson<RegisterReq>,
) -> Result<Response, ApiError> {
    info!("Registering user: {}", req.email);
    match svc.register(req.into()).await {
        Ok(session) => Ok(created_json(session_response(session))),
        Err(e) => {
            error!("Failed to register user: {}", e);
            Err(map_domain_error(&e))
        }
    }
}

pub async fn login(
    Extension(svc): Svc,
    ApiJson(req): ApiJson<LoginReq>,
) -> Result<Json<DataResponse<UserDto>>, ApiError> {
    match svc.login(&req.email, &req.password).await {
        Ok(session) => Ok(Json(session_response(session))),
        Err(e) => Err(map_domain_error(&e)),
    }
}

pub async fn me(
    Extension(svc): Svc,
    AuthUser(caller): AuthUser,
) -> Result<Json<DataResponse<UserDto>>, ApiError> {
    let user = svc
        .get_user(&caller, caller.id)
        .await
        .map_err(|e| map_domain_error(&e))?;
    Ok(Json(DataResponse::new(user.into())))
}

pub async fn get_user(
    Extension(svc): Svc,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<UserDto>>, ApiError> {
    let id = parse_id(&id, "user")?;
    info!("Getting user with id: {}", id);
    match svc.get_user(&caller, id).await {
        Ok(user) => Ok(Json(DataResponse::new(user.into()))),
        Err(e) => {
            error!("Failed to get user {}: {}", id, e);
            Err(map_domain_error(&e))
        }
    }
}

pub async fn list_users(
    Extension(svc): Svc,
    AuthUser(caller): AuthUser,
    query: QueryPairs,
) -> Result<Json<ListResponse<UserSummaryDto>>, ApiError> {
    info!("Listing users with query: {:?}", query.0);
    match svc.list_users(&caller, query.iter()).await {
        Ok(page) => Ok(Json(ListResponse::new(
            page.page,
            page.limit,
            page.total_count,
            page.items.into_iter().map(UserSummaryDto::from).collect(),
        ))),
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(map_domain_error(&e))
        }
    }
}

pub async fn update_user(
    Extension(svc): Svc,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateUserReq>,
) -> Result<Json<DataResponse<UserDto>>, ApiError> {
    let id = parse_id(&id, "user")?;
    info!("Updating user {} with: {:?}", id, req);
    let patch = req.into_patch().map_err(ApiError::bad_request)?;
    match svc.update_user(&caller, id, patch).await {
        Ok(user) => Ok(Json(DataResponse::new(user.into()))),
        Err(e) => {
            error!("Failed to update user {}: {}", id, e);
            Err(map_domain_error(&e))
        }
    }
}

pub async fn update_password(
    Extension(svc): Svc,
    AuthUser(caller): AuthUser,
    ApiJson(req): ApiJson<UpdatePasswordReq>,
) -> Result<Json<DataResponse<UserDto>>, ApiError> {
    match svc
        .update_password(&caller, &req.current_password, &req.new_password)
        .await
    {
        Ok(session) => Ok(Json(session_response(session))),
        Err(e) => Err(map_domain_error(&e)),
    }
}

pub async fn forgot_password(
    Extension(svc): Svc,
    ApiJson(req): ApiJson<ForgotPasswordReq>,
) -> Result<Json<DataResponse<NoticeDto>>, ApiError> {
    svc.forgot_password(&req.email)
        .await
        .map_err(|e| map_domain_error(&e))?;
    Ok(Json(DataResponse::new(NoticeDto {
        message: "If that email is registered, a reset token has been sent".to_string(),
    })))
}

pub async fn reset_password(
    Extension(svc): Svc,
    Path(token): Path<String>,
    ApiJson(req): ApiJson<ResetPasswordReq>,
) -> Result<Json<DataResponse<UserDto>>, ApiError> {
    match svc.reset_password(&token, &req.password).await {
        Ok(session) => Ok(Json(session_response(session))),
        Err(e) => Err(map_domain_error(&e)),
    }
}

pub async fn delete_user(
    Extension(svc): Svc,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "user")?;
    info!("Deleting user: {}", id);
    match svc.delete_user(&caller, id).await {
        Ok(()) => Ok(no_content()),
        Err(e) => {
            error!("Failed to delete user {}: {}", id, e);
            Err(map_domain_error(&e))
        }
    }
}

/* ---------- flats ---------- */

pub async fn list_flats(
    Extension(svc): Svc,
    AuthUser(_caller): AuthUser,
    query: QueryPairs,
) -> Result<Json<ListResponse<FlatWithOwnerDto>>, ApiError> {
    info!("Listing flats with query: {:?}", query.0);
    match svc.list_flats(query.iter()).await {
        Ok(page) => Ok(Json(ListResponse::new(
            page.page,
            page.limit,
            page.total_count,
            page.items.into_iter().map(FlatWithOwnerDto::from).collect(),
        ))),
        Err(e) => {
            error!("Failed to list flats: {}", e);
            Err(map_domain_error(&e))
        }
    }
}

pub async fn get_flat(
    Extension(svc): Svc,
    AuthUser(_caller): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<FlatWithOwnerDto>>, ApiError> {
    let id = parse_id(&id, "flat")?;
    match svc.get_flat(id).await {
        Ok(flat) => Ok(Json(DataResponse::new(flat.into()))),
        Err(e) => Err(map_domain_error(&e)),
    }
}

pub async fn my_flats(
    Extension(svc): Svc,
    AuthUser(caller): AuthUser,
) -> Result<Json<ItemsResponse<FlatDto>>, ApiError> {
    let flats = svc.my_flats(&caller).await.map_err(|e| map_domain_error(&e))?;
    Ok(Json(
        flats.into_iter().map(FlatDto::from).collect::<Vec<_>>().into(),
    ))
}

pub async fn create_flat(
    Extension(svc): Svc,
    AuthUser(caller): AuthUser,
    ApiJson(req): ApiJson<CreateFlatReq>,
) -> Result<Response, ApiError> {
    info!("Creating flat in {}", req.city);
    match svc.create_flat(&caller, req.into()).await {
        Ok(flat) => Ok(created_json(DataResponse::new(FlatDto::from(flat)))),
        Err(e) => {
            error!("Failed to create flat: {}", e);
            Err(map_domain_error(&e))
        }
    }
}

pub async fn update_flat(
    Extension(svc): Svc,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateFlatReq>,
) -> Result<Json<DataResponse<FlatDto>>, ApiError> {
    let id = parse_id(&id, "flat")?;
    info!("Updating flat {} with: {:?}", id, req);
    match svc.update_flat(&caller, id, req.into()).await {
        Ok(flat) => Ok(Json(DataResponse::new(flat.into()))),
        Err(e) => {
            error!("Failed to update flat {}: {}", id, e);
            Err(map_domain_error(&e))
        }
    }
}

pub async fn delete_flat(
    Extension(svc): Svc,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "flat")?;
    info!("Deleting flat: {}", id);
    match svc.delete_flat(&caller, id).await {
        Ok(()) => Ok(no_content()),
        Err(e) => {
            error!("Failed to delete flat {}: {}", id, e);
            Err(map_domain_error(&e))
        }
    }
}

/* ---------- messages ---------- */

pub async fn send_message(
    Extension(svc): Svc,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<SendMessageReq>,
) -> Result<Response, ApiError> {
    let flat_id = parse_id(&id, "flat")?;
    match svc.send_message(&caller, flat_id, &req.content).await {
        Ok(message) => Ok(created_json(DataResponse::new(MessageDto::from(
            MessageWithSender {
                message,
                sender: None,
            },
        )))),
        Err(e) => Err(map_domain_error(&e)),
    }
}

pub async fn list_messages(
    Extension(svc): Svc,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ItemsResponse<MessageDto>>, ApiError> {
    let flat_id = parse_id(&id, "flat")?;
    let messages = svc
        .list_messages(&caller, flat_id)
        .await
        .map_err(|e| map_domain_error(&e))?;
    Ok(Json(
        messages.into_iter().map(MessageDto::from).collect::<Vec<_>>().into(),
    ))
}

/* ---------- favorites ---------- */

pub async fn list_favorites(
    Extension(svc): Svc,
    AuthUser(caller): AuthUser,
) -> Result<Json<ItemsResponse<FlatWithOwnerDto>>, ApiError> {
    let flats = svc
        .list_favorites(&caller)
        .await
        .map_err(|e| map_domain_error(&e))?;
    Ok(Json(
        flats
            .into_iter()
            .map(FlatWithOwnerDto::from)
            .collect::<Vec<_>>()
            .into(),
    ))
}

pub async fn add_favorite(
    Extension(svc): Svc,
    AuthUser(caller): AuthUser,
    Path(flat_id): Path<String>,
) -> Result<Response, ApiError> {
    let flat_id = parse_id(&flat_id, "flat")?;
    svc.add_favorite(&caller, flat_id)
        .await
        .map_err(|e| map_domain_error(&e))?;
    Ok(no_content())
}

pub async fn remove_favorite(
    Extension(svc): Svc,
    AuthUser(caller): AuthUser,
    Path(flat_id): Path<String>,
) -> Result<Response, ApiError> {
    let flat_id = parse_id(&flat_id, "flat")?;
    svc.remove_favorite(&caller, flat_id)
        .await
        .map_err(|e| map_domain_error(&e))?;
    Ok(no_content())
}
