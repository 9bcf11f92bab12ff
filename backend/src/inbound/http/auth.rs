//! Authentication route group: signup, login, token echo, and the PDF
//! download exercising the authenticated path end to end.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{Credentials, Email, Error, NewSignup};
use crate::outbound::pdf::{self, WELCOME_TEMPLATE};

use super::envelope::{pdf_response, success, success_with_message};
use super::identity::AuthenticatedIdentity;
use super::state::HttpState;
use super::validation::{FieldRule, Rule, RuleSet};

static SIGNUP_RULES: RuleSet = RuleSet {
    name: "auth.signup",
    rules: &[
        FieldRule {
            field: "name",
            rule: Rule::Required,
            message: "name is required",
        },
        FieldRule {
            field: "email",
            rule: Rule::Email,
            message: "email must be a valid address",
        },
        FieldRule {
            field: "password",
            rule: Rule::MinLength(8),
            message: "password must be at least 8 characters",
        },
    ],
};

static LOGIN_RULES: RuleSet = RuleSet {
    name: "auth.login",
    rules: &[
        FieldRule {
            field: "email",
            rule: Rule::Email,
            message: "email must be a valid address",
        },
        FieldRule {
            field: "password",
            rule: Rule::Required,
            message: "password is required",
        },
    ],
};

#[derive(Debug, Deserialize)]
struct SignupRequest {
    name: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

/// Mounts the auth route group under the supplied scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/signup/", web::post().to(signup))
        .route("/login/", web::post().to(login))
        .route("/test/", web::get().to(token_test))
        .route("/pdf/", web::get().to(welcome_pdf));
}

async fn signup(
    state: web::Data<HttpState>,
    body: web::Json<Value>,
) -> Result<HttpResponse, Error> {
    RuleSet::apply_all(&[&SIGNUP_RULES], &body)?;
    let request: SignupRequest = serde_json::from_value(body.into_inner())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let signup = NewSignup::new(request.name, request.email, request.password)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let user = state.auth.signup(signup).await?;
    Ok(success_with_message(user, "user created"))
}

async fn login(state: web::Data<HttpState>, body: web::Json<Value>) -> Result<HttpResponse, Error> {
    RuleSet::apply_all(&[&LOGIN_RULES], &body)?;
    let request: LoginRequest = serde_json::from_value(body.into_inner())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let email = Email::new(request.email).map_err(|err| Error::invalid_request(err.to_string()))?;
    let outcome = state
        .auth
        .login(Credentials {
            email,
            password: request.password,
        })
        .await?;
    Ok(success(outcome))
}

/// Echoes the identity decoded from the presented token.
async fn token_test(identity: AuthenticatedIdentity) -> HttpResponse {
    success_with_message(identity.into_inner(), "token is valid")
}

async fn welcome_pdf(identity: AuthenticatedIdentity) -> HttpResponse {
    let bytes = pdf::build_pdf(&WELCOME_TEMPLATE, &identity.into_inner());
    pdf_response(bytes, WELCOME_TEMPLATE.name)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use rstest::rstest;
    use serde_json::json;

    use crate::domain::ports::{
        MemoryProductRepository, MemoryUserRepository, NoopAuditTrail, NoopNotificationBus,
        NoopTaskDispatcher,
    };
    use crate::domain::{AuthService, ProductService, TokenCodec};

    use super::super::error::json_error_handler;
    use super::*;

    fn test_state() -> HttpState {
        let tokens = TokenCodec::new("test-secret", 60);
        let auth = Arc::new(AuthService::new(
            Arc::new(MemoryUserRepository::new()),
            Arc::new(NoopTaskDispatcher),
            Arc::new(NoopNotificationBus),
            Arc::new(NoopAuditTrail),
            tokens.clone(),
        ));
        let products = Arc::new(ProductService::new(
            Arc::new(MemoryProductRepository::new()),
            Arc::new(NoopNotificationBus),
        ));
        HttpState::new(auth, products, tokens)
    }

    macro_rules! test_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                    .service(web::scope("/auth").configure(configure)),
            )
            .await
        };
    }

    fn signup_body() -> Value {
        json!({"name": "Ada", "email": "ada@example.com", "password": "longenough"})
    }

    #[actix_web::test]
    async fn signup_returns_success_envelope() {
        let app = test_app!(test_state());
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/signup/")
                .set_json(signup_body())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["email"], "ada@example.com");
        assert_eq!(body["data"]["role"], "member");
        assert!(body["data"].get("passwordHash").is_none());
    }

    #[rstest]
    #[case(json!({"email": "ada@example.com", "password": "longenough"}), "name")]
    #[case(json!({"name": "Ada", "email": "nope", "password": "longenough"}), "email")]
    #[case(json!({"name": "Ada", "email": "ada@example.com", "password": "pw"}), "password")]
    #[actix_web::test]
    async fn signup_rejects_invalid_bodies(#[case] body: Value, #[case] field: &str) {
        let app = test_app!(test_state());
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/signup/")
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "failure");
        assert_eq!(body["details"]["field"], field);
    }

    #[actix_web::test]
    async fn malformed_json_gets_failure_envelope() {
        let app = test_app!(test_state());
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/signup/")
                .insert_header(("content-type", "application/json"))
                .set_payload("{not json")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "failure");
    }

    #[actix_web::test]
    async fn duplicate_signup_conflicts() {
        let app = test_app!(test_state());
        for expected in [StatusCode::OK, StatusCode::CONFLICT] {
            let res = test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/auth/signup/")
                    .set_json(signup_body())
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), expected);
        }
    }

    macro_rules! signup_and_login {
        ($app:expr) => {{
            let res = test::call_service(
                $app,
                test::TestRequest::post()
                    .uri("/auth/signup/")
                    .set_json(signup_body())
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::OK);
            let res = test::call_service(
                $app,
                test::TestRequest::post()
                    .uri("/auth/login/")
                    .set_json(json!({"email": "ada@example.com", "password": "longenough"}))
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::OK);
            let body: Value = test::read_body_json(res).await;
            assert_eq!(body["status"], "success");
            body["data"]["token"]
                .as_str()
                .expect("token string")
                .to_owned()
        }};
    }

    #[actix_web::test]
    async fn login_then_test_echoes_the_identity() {
        let app = test_app!(test_state());
        let token = signup_and_login!(&app);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/auth/test/")
                .insert_header(("authorization", format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["email"], "ada@example.com");
        assert_eq!(body["data"]["name"], "Ada");
        assert_eq!(body["data"]["role"], "member");
    }

    #[actix_web::test]
    async fn test_route_rejects_missing_token() {
        let app = test_app!(test_state());
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/auth/test/").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "failure");
        assert_eq!(body["message"], "missing bearer token");
    }

    #[actix_web::test]
    async fn login_rejects_wrong_password() {
        let app = test_app!(test_state());
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/signup/")
                .set_json(signup_body())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/login/")
                .set_json(json!({"email": "ada@example.com", "password": "wrong-password"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "invalid credentials");
    }

    #[actix_web::test]
    async fn pdf_route_returns_attachment() {
        let app = test_app!(test_state());
        let token = signup_and_login!(&app);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/auth/pdf/")
                .insert_header(("authorization", format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let content_type = res
            .headers()
            .get("content-type")
            .expect("content type")
            .to_str()
            .expect("ascii");
        assert_eq!(content_type, "application/pdf");
        let body = test::read_body(res).await;
        assert!(body.starts_with(b"%PDF-"));
    }
}
