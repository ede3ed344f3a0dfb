//! API server application wiring.
//!
//! # Purpose
//! Builds the axum router, installs the call authorizer in front of every
//! route, and defines the shared state injected into handlers.
//!
//! # Notes
//! The authorizer is a route layer, so unknown paths fall through to a plain
//! 404 without touching credentials.
use crate::api;
use crate::auth::{CallAuthorizer, authorize_call};
use crate::config::ApiServerConfig;
use crate::store::ZoneBackend;
use crate::store::memory::InMemoryZones;
use anyhow::Context;
use axum::Router;
use axum::routing::post;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use zonegate_authz::{RuleEngine, RuleSet, SharedSecret, TokenIssuer};

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn ZoneBackend>,
    pub issuer: Arc<TokenIssuer>,
}

/// Everything `build_router` needs, derived from configuration.
pub struct App {
    pub state: AppState,
    pub authorizer: CallAuthorizer,
}

impl App {
    pub fn from_config(config: &ApiServerConfig) -> anyhow::Result<Self> {
        let backend = Arc::new(InMemoryZones::with_zones(config.seed_zones.iter().cloned()));
        Self::with_backend(config, backend)
    }

    pub fn with_backend(
        config: &ApiServerConfig,
        backend: Arc<dyn ZoneBackend>,
    ) -> anyhow::Result<Self> {
        let secret = SharedSecret::new(config.secret.as_bytes()).context("shared secret")?;
        let issuer = TokenIssuer::new(config.token_subject.clone(), secret.clone());
        let engine = RuleEngine::new(
            RuleSet {
                leeway_secs: config.token_leeway_secs,
                ..RuleSet::default()
            },
            secret.clone(),
        );
        let authorizer = CallAuthorizer::new(
            Arc::new(engine),
            secret,
            config.max_body_bytes,
            config.call_timeout,
        );
        Ok(Self {
            state: AppState {
                backend,
                issuer: Arc::new(issuer),
            },
            authorizer,
        })
    }

    pub fn into_router(self) -> Router {
        build_router(self.state, self.authorizer)
    }
}

pub fn build_router(state: AppState, authorizer: CallAuthorizer) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "rpc",
                method = %request.uri().path(),
                version = ?request.version()
            )
        });

    Router::new()
        .route("/grpc.health.v1.Health/Check", post(api::health::check))
        .route("/v1.TokenService/Create", post(api::tokens::create_token))
        .route("/v1.DomainService/List", post(api::domains::list_domains))
        .route("/v1.DomainService/Get", post(api::domains::get_domain))
        .route("/v1.DomainService/Create", post(api::domains::create_domain))
        .route("/v1.DomainService/Update", post(api::domains::update_domain))
        .route("/v1.DomainService/Delete", post(api::domains::delete_domain))
        .route("/v1.RecordService/List", post(api::records::list_records))
        .route("/v1.RecordService/Create", post(api::records::create_record))
        .route("/v1.RecordService/Update", post(api::records::update_record))
        .route("/v1.RecordService/Delete", post(api::records::delete_record))
        .route_layer(axum::middleware::from_fn_with_state(
            authorizer,
            authorize_call,
        ))
        .layer(trace_layer)
        .with_state(state)
}
