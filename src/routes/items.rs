use crate::{
    auth::AuthenticatedUser, error::AppError, models::TodoItemInput, routes::IdResponse,
    todo::TodoOperations,
};
use actix_web::{get, post, web, HttpResponse, Responder};

/// Creates an item inside one of the caller's lists.
///
/// The item row and its list association are written in a single
/// transaction; either both exist afterwards or neither does.
///
/// ## Responses:
/// - `200 OK`: `{"id": <item id>}`.
/// - `400 Bad Request`: empty title, malformed body or non-numeric list id.
/// - `401 Unauthorized`: missing or invalid bearer token.
/// - `404 Not Found`: the list does not belong to the caller.
/// - `500 Internal Server Error`: the transaction failed or timed out.
#[post("/{list_id}/items")]
pub async fn create_item(
    todos: web::Data<dyn TodoOperations>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    item_data: web::Json<TodoItemInput>,
) -> Result<impl Responder, AppError> {
    let list_id = path.into_inner();
    let id = todos
        .create_item(user.id(), list_id, item_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(IdResponse { id }))
}

/// Returns a single item reachable through one of the caller's lists.
#[get("/{item_id}")]
pub async fn get_item(
    todos: web::Data<dyn TodoOperations>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let item = todos.get_item(user.id(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}
