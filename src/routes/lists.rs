use crate::{
    auth::AuthenticatedUser, error::AppError, models::TodoListInput, routes::IdResponse,
    todo::TodoOperations,
};
use actix_web::{post, web, HttpResponse, Responder};

/// Creates a new todo list owned by the authenticated user.
///
/// ## Responses:
/// - `200 OK`: `{"id": <list id>}`.
/// - `400 Bad Request`: empty title or malformed body.
/// - `401 Unauthorized`: missing or invalid bearer token.
/// - `500 Internal Server Error`: the transaction failed.
#[post("")]
pub async fn create_list(
    todos: web::Data<dyn TodoOperations>,
    user: AuthenticatedUser,
    list_data: web::Json<TodoListInput>,
) -> Result<impl Responder, AppError> {
    let id = todos.create_list(user.id(), list_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(IdResponse { id }))
}
