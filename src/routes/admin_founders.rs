use axum::{
    extract::{Path, Query, State},
    Json,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::{AuthUser, Role};
use crate::entities::{company, user};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct FounderListQuery {
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FounderRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub company_name: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FounderListResponse {
    pub rows: Vec<FounderRow>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// Paginated founder accounts with their company names
#[utoipa::path(
    get,
    path = "/api/admin/founders",
    params(FounderListQuery),
    responses(
        (status = 200, description = "One page of founders", body = FounderListResponse),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_founders(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<FounderListQuery>,
) -> Result<Json<FounderListResponse>, AppError> {
    auth.require_admin()?;

    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);

    let paginator = user::Entity::find()
        .filter(user::Column::Role.eq(Role::Founder.as_str()))
        .order_by_desc(user::Column::CreatedAt)
        .paginate(&state.db, limit);
    let total = paginator.num_items().await?;
    let founders = paginator.fetch_page(page - 1).await?;

    let ids: Vec<Uuid> = founders.iter().map(|f| f.id).collect();
    let companies = if ids.is_empty() {
        Vec::new()
    } else {
        company::Entity::find()
            .filter(company::Column::OwnerId.is_in(ids))
            .all(&state.db)
            .await?
    };

    let rows = founders
        .into_iter()
        .map(|founder| {
            let company_name = companies
                .iter()
                .find(|c| c.owner_id == founder.id)
                .map(|c| c.name.clone());
            FounderRow {
                id: founder.id,
                email: founder.email,
                full_name: founder.full_name,
                company_name,
                created_at: founder.created_at,
            }
        })
        .collect();

    Ok(Json(FounderListResponse {
        rows,
        total,
        page,
        limit,
    }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FounderDeleteResponse {
    pub deleted: u64,
}

/// Delete a founder account; company data cascades away with it
#[utoipa::path(
    delete,
    path = "/api/admin/founders/{id}",
    params(("id" = Uuid, Path, description = "Founder user id")),
    responses(
        (status = 200, description = "Delete outcome", body = FounderDeleteResponse),
        (status = 403, description = "Admin role required")
    )
)]
#[tracing::instrument(skip(state, auth), fields(founder = %founder_id))]
pub async fn delete_founder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(founder_id): Path<Uuid>,
) -> Result<Json<FounderDeleteResponse>, AppError> {
    auth.require_admin()?;

    let result = user::Entity::delete_many()
        .filter(user::Column::Id.eq(founder_id))
        .filter(user::Column::Role.eq(Role::Founder.as_str()))
        .exec(&state.db)
        .await?;

    Ok(Json(FounderDeleteResponse {
        deleted: result.rows_affected,
    }))
}
