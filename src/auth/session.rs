use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::middleware::gate::login_redirect;
use crate::state::AppState;
use crate::store::{StoreError, User};

/// Resolve the signed-in user from the request's session cookie.
///
/// A missing cookie, a token that fails verification, or a user id that no
/// longer exists all count as "not signed in" (`Ok(None)`). Only a failing
/// store call is an error.
pub async fn current_user(state: &AppState, jar: &CookieJar) -> Result<Option<User>, StoreError> {
    let Some(token) = state.cookie.extract(jar) else {
        return Ok(None);
    };

    let user_id = match state.sessions.verify(&token) {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::debug!("Ignoring session cookie: {}", e);
            return Ok(None);
        }
    };

    let user = state.store.get_user(&user_id).await?;
    if user.is_none() {
        tracing::warn!("Session refers to unknown user '{}'", user_id);
    }
    Ok(user)
}

/// Session check for page composers.
///
/// Rejects with a redirect to the login page unless the cookie carries a
/// valid token for an existing user. When the store cannot be reached the
/// signed token is accepted as is and `user` is `None`; the page then
/// degrades like any other failed fetch.
#[derive(Debug)]
pub struct PageSession {
    pub user: Option<User>,
}

#[async_trait]
impl FromRequestParts<AppState> for PageSession {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let to_login = || Redirect::to(&login_redirect(parts.uri.path())).into_response();

        match current_user(state, &jar).await {
            Ok(Some(user)) => Ok(Self { user: Some(user) }),
            Ok(None) => Err(to_login()),
            Err(e) => {
                tracing::error!("Could not resolve session user: {}", e);
                Ok(Self { user: None })
            }
        }
    }
}
