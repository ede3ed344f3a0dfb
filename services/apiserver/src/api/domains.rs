//! `v1.DomainService` handlers.
//!
//! Listing narrows the backend's zones to the caller's effective scope; the
//! single-zone calls reject names outside the token's `domains` claim.
use crate::api::ConnectJson;
use crate::api::error::ApiError;
use crate::api::names::validate_domain_name;
use crate::api::types::{
    Domain, DomainCreateRequest, DomainDeleteRequest, DomainGetRequest, DomainResponse,
    DomainUpdateRequest, DomainsListRequest, DomainsResponse,
};
use crate::app::AppState;
use crate::auth::VerifiedClaims;
use crate::store::ZonePatch;
use axum::Json;
use axum::extract::State;
use zonegate_authz::{ScopeAction, ensure_resource_allowed, filter_resources};

pub async fn list_domains(
    State(state): State<AppState>,
    claims: VerifiedClaims,
    ConnectJson(request): ConnectJson<DomainsListRequest>,
) -> Result<Json<DomainsResponse>, ApiError> {
    let visible = filter_resources(&request.domains, claims.domains())?;
    let zones = state.backend.list_zones().await?;
    let domains = zones
        .into_iter()
        .filter(|zone| visible.contains(&zone.name))
        .map(Domain::from)
        .collect();
    Ok(Json(DomainsResponse { domains }))
}

pub async fn get_domain(
    State(state): State<AppState>,
    claims: VerifiedClaims,
    ConnectJson(request): ConnectJson<DomainGetRequest>,
) -> Result<Json<DomainResponse>, ApiError> {
    ensure_resource_allowed(ScopeAction::Get, &request.name, claims.domains())?;
    let zone = state.backend.get_zone(&request.name).await?;
    Ok(Json(DomainResponse {
        domain: zone.into(),
    }))
}

pub async fn create_domain(
    State(state): State<AppState>,
    claims: VerifiedClaims,
    ConnectJson(request): ConnectJson<DomainCreateRequest>,
) -> Result<Json<DomainResponse>, ApiError> {
    ensure_resource_allowed(ScopeAction::Create, &request.name, claims.domains())?;
    validate_domain_name(&request.name)?;
    let zone = state
        .backend
        .create_zone(
            &request.name,
            ZonePatch {
                url: request.url,
                nameservers: request.nameservers,
            },
        )
        .await?;
    tracing::info!(zone = %zone.name, issuer = %claims.iss, "zone created");
    Ok(Json(DomainResponse {
        domain: zone.into(),
    }))
}

pub async fn update_domain(
    State(state): State<AppState>,
    claims: VerifiedClaims,
    ConnectJson(request): ConnectJson<DomainUpdateRequest>,
) -> Result<Json<DomainResponse>, ApiError> {
    ensure_resource_allowed(ScopeAction::Update, &request.name, claims.domains())?;
    let zone = state
        .backend
        .update_zone(
            &request.name,
            ZonePatch {
                url: request.url,
                nameservers: request.nameservers,
            },
        )
        .await?;
    Ok(Json(DomainResponse {
        domain: zone.into(),
    }))
}

pub async fn delete_domain(
    State(state): State<AppState>,
    claims: VerifiedClaims,
    ConnectJson(request): ConnectJson<DomainDeleteRequest>,
) -> Result<Json<DomainResponse>, ApiError> {
    ensure_resource_allowed(ScopeAction::Delete, &request.name, claims.domains())?;
    state.backend.delete_zone(&request.name).await?;
    tracing::info!(zone = %request.name, issuer = %claims.iss, "zone deleted");
    Ok(Json(DomainResponse {
        domain: Domain {
            name: request.name,
            ..Domain::default()
        },
    }))
}
