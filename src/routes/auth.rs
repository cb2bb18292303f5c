use crate::{
    auth::{Authenticator, SignInRequest, SignUpRequest, TokenResponse},
    error::AppError,
    routes::IdResponse,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Stores the user and returns its id.
#[post("/sign-up")]
pub async fn sign_up(
    auth: web::Data<dyn Authenticator>,
    sign_up_data: web::Json<SignUpRequest>,
) -> Result<impl Responder, AppError> {
    sign_up_data.validate()?;

    let id = auth.register(sign_up_data.into_inner()).await?;

    Ok(HttpResponse::Ok().json(IdResponse { id }))
}

/// Sign in
///
/// Checks the credentials and returns a signed token.
#[post("/sign-in")]
pub async fn sign_in(
    auth: web::Data<dyn Authenticator>,
    sign_in_data: web::Json<SignInRequest>,
) -> Result<impl Responder, AppError> {
    sign_in_data.validate()?;

    let token = auth
        .authenticate(&sign_in_data.username, &sign_in_data.password)
        .await?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}
