//! HTTP server construction and hook wiring.

pub mod extensions;

pub use extensions::{AssemblyError, Extensions, StartupMode};

use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::Condition;
use actix_web::{web, App, HttpServer};

use crate::config::HookName;
use crate::inbound::http::health::{live, ready, HealthState};
use crate::inbound::http::{auth, json_error_handler, products, HttpState};
use crate::inbound::ws::{self, WsState};
use crate::middleware::{RequestLog, Trace};

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    ws_state: web::Data<WsState>,
    trace_enabled: bool,
    request_log_enabled: bool,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        ws_state,
        trace_enabled,
        request_log_enabled,
    } = deps;

    // Registration order matters: `Trace` is registered last so it wraps the
    // request log and every error response carries a trace identifier.
    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(ws_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(Condition::new(request_log_enabled, RequestLog))
        .wrap(Condition::new(trace_enabled, Trace))
        .service(web::scope("/auth").configure(auth::configure))
        .service(web::scope("/products").configure(products::configure))
        .service(ws::ws_entry)
        .service(ready)
        .service(live)
}

/// Construct the HTTP server from fully assembled extensions.
///
/// Marks the health state ready once the listener is bound; the returned
/// [`Server`] must be awaited to drive it.
pub fn create_server(
    extensions: &Extensions,
    bind_addr: &str,
    health_state: web::Data<HealthState>,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(HttpState::new(
        extensions.auth.clone(),
        extensions.products.clone(),
        extensions.tokens.clone(),
    ));
    let ws_state = web::Data::new(extensions.ws_state.clone());
    let trace_enabled = extensions.hook_enabled(HookName::Trace);
    let request_log_enabled = extensions.hook_enabled(HookName::RequestLog);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            ws_state: ws_state.clone(),
            trace_enabled,
            request_log_enabled,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use serde_json::Value;

    use crate::domain::ports::{
        MemoryProductRepository, MemoryUserRepository, NoopAuditTrail, NoopNotificationBus,
        NoopTaskDispatcher,
    };
    use crate::domain::{AuthService, ProductService, TokenCodec};
    use std::sync::Arc;

    fn http_state() -> web::Data<HttpState> {
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
        web::Data::new(HttpState::new(auth, products, tokens))
    }

    fn deps(trace_enabled: bool) -> AppDependencies {
        let health_state = web::Data::new(HealthState::new());
        health_state.mark_ready();
        AppDependencies {
            health_state,
            http_state: http_state(),
            ws_state: web::Data::new(WsState::new()),
            trace_enabled,
            request_log_enabled: false,
        }
    }

    #[actix_web::test]
    async fn assembled_app_serves_health_and_auth_routes() {
        let app = test::init_service(build_app(deps(true))).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/health/ready").to_request(),
        )
        .await;
        assert!(res.status().is_success());

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/signup/")
                .set_json(serde_json::json!({
                    "name": "Ada",
                    "email": "ada@example.com",
                    "password": "longenough"
                }))
                .to_request(),
        )
        .await;
        assert!(res.status().is_success());
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "success");
    }

    #[actix_web::test]
    async fn trace_hook_is_conditional() {
        let app = test::init_service(build_app(deps(true))).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/health/live").to_request(),
        )
        .await;
        assert!(res.headers().contains_key("trace-id"));

        let app = test::init_service(build_app(deps(false))).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/health/live").to_request(),
        )
        .await;
        assert!(!res.headers().contains_key("trace-id"));
    }
}
