use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use sea_orm::{
    sea_query::{extension::postgres::PgExpr, Expr},
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::{investor_contact, investor_firm};
use crate::error::AppError;
use crate::import::SOURCE_ADMIN_UPLOAD;
use crate::AppState;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct FirmListQuery {
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    /// Free text over the firm name
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FirmListResponse {
    pub rows: Vec<investor_firm::Model>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// Paginated list of investor firms
#[utoipa::path(
    get,
    path = "/api/admin/firms",
    params(FirmListQuery),
    responses(
        (status = 200, description = "One page of firms", body = FirmListResponse),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_firms(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<FirmListQuery>,
) -> Result<Json<FirmListResponse>, AppError> {
    auth.require_admin()?;

    let mut select = investor_firm::Entity::find().order_by_asc(investor_firm::Column::Name);
    if let Some(q) = query.q.as_deref().filter(|q| !q.trim().is_empty()) {
        select = select
            .filter(Expr::col(investor_firm::Column::Name).ilike(format!("%{}%", q.trim())));
    }

    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);
    let paginator = select.paginate(&state.db, limit);
    let total = paginator.num_items().await?;
    let rows = paginator.fetch_page(page - 1).await?;

    Ok(Json(FirmListResponse {
        rows,
        total,
        page,
        limit,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FirmRequest {
    pub name: String,
    pub website: Option<String>,
    pub location: Option<String>,
    pub firm_type: Option<String>,
}

fn validate_firm(body: &FirmRequest) -> Result<(), AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("firm name is required".to_string()));
    }
    if let Some(website) = body.website.as_deref() {
        Url::parse(website)
            .map_err(|e| AppError::Validation(format!("invalid website URL: {}", e)))?;
    }
    Ok(())
}

/// Create an investor firm
#[utoipa::path(
    post,
    path = "/api/admin/firms",
    request_body = FirmRequest,
    responses(
        (status = 200, description = "Firm created", body = investor_firm::Model),
        (status = 409, description = "Firm name already exists"),
        (status = 422, description = "Missing name or bad website URL")
    )
)]
#[tracing::instrument(skip(state, auth, body), fields(name = %body.name))]
pub async fn create_firm(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<FirmRequest>,
) -> Result<Json<investor_firm::Model>, AppError> {
    auth.require_admin()?;
    validate_firm(&body)?;

    let now = Utc::now();
    let firm = investor_firm::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(body.name.trim().to_string()),
        website: Set(body.website),
        location: Set(body.location),
        firm_type: Set(body.firm_type),
        source: Set(SOURCE_ADMIN_UPLOAD.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    Ok(Json(firm))
}

/// Update an investor firm
#[utoipa::path(
    put,
    path = "/api/admin/firms/{id}",
    params(("id" = Uuid, Path, description = "Firm id")),
    request_body = FirmRequest,
    responses(
        (status = 200, description = "Firm updated", body = investor_firm::Model),
        (status = 404, description = "Unknown firm")
    )
)]
pub async fn update_firm(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(firm_id): Path<Uuid>,
    Json(body): Json<FirmRequest>,
) -> Result<Json<investor_firm::Model>, AppError> {
    auth.require_admin()?;
    validate_firm(&body)?;

    let firm = investor_firm::Entity::find_by_id(firm_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("firm {}", firm_id)))?;

    let mut am: investor_firm::ActiveModel = firm.into();
    am.name = Set(body.name.trim().to_string());
    am.website = Set(body.website);
    am.location = Set(body.location);
    am.firm_type = Set(body.firm_type);
    am.updated_at = Set(Utc::now());
    let updated = am.update(&state.db).await?;

    Ok(Json(updated))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminDeleteResponse {
    pub deleted: u64,
}

/// Delete a firm; its contacts stay, with their firm link cleared
#[utoipa::path(
    delete,
    path = "/api/admin/firms/{id}",
    params(("id" = Uuid, Path, description = "Firm id")),
    responses(
        (status = 200, description = "Delete outcome", body = AdminDeleteResponse)
    )
)]
pub async fn delete_firm(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(firm_id): Path<Uuid>,
) -> Result<Json<AdminDeleteResponse>, AppError> {
    auth.require_admin()?;

    let result = investor_firm::Entity::delete_by_id(firm_id)
        .exec(&state.db)
        .await?;

    Ok(Json(AdminDeleteResponse {
        deleted: result.rows_affected,
    }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactListResponse {
    pub contacts: Vec<investor_contact::Model>,
}

/// Contacts belonging to a firm
#[utoipa::path(
    get,
    path = "/api/admin/firms/{id}/contacts",
    params(("id" = Uuid, Path, description = "Firm id")),
    responses(
        (status = 200, description = "Contacts for the firm", body = ContactListResponse),
        (status = 404, description = "Unknown firm")
    )
)]
pub async fn list_firm_contacts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(firm_id): Path<Uuid>,
) -> Result<Json<ContactListResponse>, AppError> {
    auth.require_admin()?;

    investor_firm::Entity::find_by_id(firm_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("firm {}", firm_id)))?;

    let contacts = investor_contact::Entity::find()
        .filter(investor_contact::Column::FirmId.eq(firm_id))
        .order_by_asc(investor_contact::Column::FullName)
        .all(&state.db)
        .await?;

    Ok(Json(ContactListResponse { contacts }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ContactRequest {
    pub full_name: String,
    pub email: Option<String>,
    pub title: Option<String>,
    pub linkedin_url: Option<String>,
}

/// Add a contact to a firm
#[utoipa::path(
    post,
    path = "/api/admin/firms/{id}/contacts",
    params(("id" = Uuid, Path, description = "Firm id")),
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Contact created", body = investor_contact::Model),
        (status = 409, description = "A contact with this email already exists"),
        (status = 422, description = "Missing name")
    )
)]
pub async fn create_firm_contact(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(firm_id): Path<Uuid>,
    Json(body): Json<ContactRequest>,
) -> Result<Json<investor_contact::Model>, AppError> {
    auth.require_admin()?;

    if body.full_name.trim().is_empty() {
        return Err(AppError::Validation("contact name is required".to_string()));
    }

    investor_firm::Entity::find_by_id(firm_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("firm {}", firm_id)))?;

    let contact = investor_contact::ActiveModel {
        id: Set(Uuid::new_v4()),
        firm_id: Set(Some(firm_id)),
        full_name: Set(body.full_name.trim().to_string()),
        email: Set(body.email.map(|e| e.trim().to_lowercase())),
        title: Set(body.title),
        linkedin_url: Set(body.linkedin_url),
        source: Set(SOURCE_ADMIN_UPLOAD.to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    Ok(Json(contact))
}

/// Delete a contact
#[utoipa::path(
    delete,
    path = "/api/admin/contacts/{id}",
    params(("id" = Uuid, Path, description = "Contact id")),
    responses(
        (status = 200, description = "Delete outcome", body = AdminDeleteResponse)
    )
)]
pub async fn delete_contact(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(contact_id): Path<Uuid>,
) -> Result<Json<AdminDeleteResponse>, AppError> {
    auth.require_admin()?;

    let result = investor_contact::Entity::delete_by_id(contact_id)
        .exec(&state.db)
        .await?;

    Ok(Json(AdminDeleteResponse {
        deleted: result.rows_affected,
    }))
}
