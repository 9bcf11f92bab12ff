//! Bearer-token authentication guard.
//!
//! Routes that require a caller take [`AuthenticatedIdentity`] as an
//! extractor argument. The guard reads the `Authorization: Bearer` header,
//! verifies the token, and rejects the request with an unauthorized failure
//! envelope before the handler body runs.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::domain::{Error, Identity, TokenError};

use super::state::HttpState;

/// The verified identity of the calling user.
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity(pub Identity);

impl AuthenticatedIdentity {
    pub fn into_inner(self) -> Identity {
        self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("missing bearer token"))
}

fn verify(req: &HttpRequest) -> Result<AuthenticatedIdentity, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("http state not registered"))?;
    let token = bearer_token(req)?;
    let identity = state.tokens.verify(token).map_err(|err| match err {
        TokenError::Expired => Error::unauthorized("token has expired"),
        _ => Error::unauthorized("invalid token"),
    })?;
    Ok(AuthenticatedIdentity(identity))
}

impl FromRequest for AuthenticatedIdentity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(verify(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    #[rstest]
    #[case(TestRequest::default(), "missing bearer token")]
    #[case(
        TestRequest::default().insert_header((AUTHORIZATION, "Basic Zm9vOmJhcg==")),
        "missing bearer token"
    )]
    #[case(
        TestRequest::default().insert_header((AUTHORIZATION, "Bearer ")),
        "missing bearer token"
    )]
    fn rejects_absent_or_malformed_header(#[case] builder: TestRequest, #[case] message: &str) {
        let req = builder.to_http_request();
        let error = bearer_token(&req).expect_err("rejected");
        assert_eq!(error.message(), message);
    }

    #[rstest]
    fn extracts_token_after_bearer_prefix() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(bearer_token(&req).expect("token"), "abc.def.ghi");
    }
}
