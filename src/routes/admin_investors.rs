use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Datelike, Months, Utc};
use sea_orm::{
    sea_query::{extension::postgres::PgExpr, Expr, Query as SeaQuery},
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::{investor_preference, investor_profile};
use crate::error::AppError;
use crate::AppState;

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct InvestorTableQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// created_at | full_name | email | firm_name | location | source
    #[serde(default, rename = "sortBy")]
    pub sort_by: Option<String>,
    /// asc | desc (default desc)
    #[serde(default, rename = "sortOrder")]
    pub sort_order: Option<String>,
    /// Free text over name, email and firm
    #[serde(default)]
    pub q: Option<String>,
    /// Comma-joined preference filters
    #[serde(default)]
    pub sectors: Option<String>,
    #[serde(default)]
    pub regions: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub sales_type: Option<String>,
    #[serde(default)]
    pub ranges: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvestorTableResponse {
    pub rows: Vec<investor_profile::Model>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

fn csv_values(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or("")
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Restrict to investors having a preference row of `kind` whose value is
/// in the requested set.
fn preference_filter(kind: &str, values: Vec<String>) -> Condition {
    Condition::all().add(
        investor_profile::Column::Id.in_subquery(
            SeaQuery::select()
                .column(investor_preference::Column::InvestorId)
                .from(investor_preference::Entity)
                .and_where(investor_preference::Column::Kind.eq(kind))
                .and_where(investor_preference::Column::Value.is_in(values))
                .to_owned(),
        ),
    )
}

fn sort_column(name: &str) -> Option<investor_profile::Column> {
    match name {
        "created_at" => Some(investor_profile::Column::CreatedAt),
        "full_name" => Some(investor_profile::Column::FullName),
        "email" => Some(investor_profile::Column::Email),
        "firm_name" => Some(investor_profile::Column::FirmName),
        "location" => Some(investor_profile::Column::Location),
        "source" => Some(investor_profile::Column::Source),
        _ => None,
    }
}

/// Paginated, filterable admin view over all investor profiles
#[utoipa::path(
    get,
    path = "/api/admin/investors",
    params(InvestorTableQuery),
    responses(
        (status = 200, description = "One page of investors plus total count", body = InvestorTableResponse),
        (status = 403, description = "Admin role required")
    )
)]
#[tracing::instrument(skip(state, auth, query))]
pub async fn list_investors(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<InvestorTableQuery>,
) -> Result<Json<InvestorTableResponse>, AppError> {
    auth.require_admin()?;

    let mut select = investor_profile::Entity::find();

    if let Some(q) = query.q.as_deref().filter(|q| !q.trim().is_empty()) {
        let pattern = format!("%{}%", q.trim());
        select = select.filter(
            Condition::any()
                .add(Expr::col(investor_profile::Column::FullName).ilike(pattern.clone()))
                .add(Expr::col(investor_profile::Column::Email).ilike(pattern.clone()))
                .add(Expr::col(investor_profile::Column::FirmName).ilike(pattern)),
        );
    }

    let business_types = csv_values(query.business_type.as_deref());
    if !business_types.is_empty() {
        select = select.filter(investor_profile::Column::BusinessType.is_in(business_types));
    }

    for (kind, raw) in [
        ("sector", query.sectors.as_deref()),
        ("region", query.regions.as_deref()),
        ("stage", query.stage.as_deref()),
        ("model", query.model.as_deref()),
        ("sales_type", query.sales_type.as_deref()),
        ("range", query.ranges.as_deref()),
    ] {
        let values = csv_values(raw);
        if !values.is_empty() {
            select = select.filter(preference_filter(kind, values));
        }
    }

    let descending = !matches!(query.sort_order.as_deref(), Some("asc"));
    let column = query
        .sort_by
        .as_deref()
        .and_then(sort_column)
        .unwrap_or(investor_profile::Column::CreatedAt);
    select = if descending {
        select.order_by_desc(column)
    } else {
        select.order_by_asc(column)
    };

    let limit = query.limit.clamp(1, MAX_PAGE_SIZE);
    let page = query.page.max(1);
    let paginator = select.paginate(&state.db, limit);
    let total = paginator.num_items().await?;
    let rows = paginator.fetch_page(page - 1).await?;

    Ok(Json(InvestorTableResponse {
        rows,
        total,
        page,
        limit,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkDeleteRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkDeleteResponse {
    pub deleted: u64,
}

/// Delete investor profiles in bulk; unknown ids are skipped, not errors
#[utoipa::path(
    post,
    path = "/api/admin/investors/bulk-delete",
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Number of profiles removed", body = BulkDeleteResponse),
        (status = 403, description = "Admin role required")
    )
)]
#[tracing::instrument(skip(state, auth, body), fields(requested = body.ids.len()))]
pub async fn bulk_delete_investors(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    auth.require_admin()?;

    if body.ids.is_empty() {
        return Ok(Json(BulkDeleteResponse { deleted: 0 }));
    }

    let result = investor_profile::Entity::delete_many()
        .filter(investor_profile::Column::Id.is_in(body.ids))
        .exec(&state.db)
        .await?;

    tracing::info!(deleted = result.rows_affected, "bulk investor delete");
    Ok(Json(BulkDeleteResponse {
        deleted: result.rows_affected,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EnrichRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnrichResponse {
    pub job_id: Uuid,
    pub requested: usize,
    pub status: String,
}

/// Request enrichment for a set of investors
///
/// Returns a job id for tracking. No worker consumes these jobs; the id is
/// recorded in the logs only.
#[utoipa::path(
    post,
    path = "/api/admin/investors/enrich",
    request_body = EnrichRequest,
    responses(
        (status = 200, description = "Job accepted", body = EnrichResponse),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn enrich_investors(
    State(_state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<EnrichRequest>,
) -> Result<Json<EnrichResponse>, AppError> {
    auth.require_admin()?;

    let job_id = Uuid::new_v4();
    tracing::info!(job_id = %job_id, requested = body.ids.len(), "enrichment job accepted");

    Ok(Json(EnrichResponse {
        job_id,
        requested: body.ids.len(),
        status: "queued".to_string(),
    }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountBucket {
    pub key: String,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthBucket {
    /// YYYY-MM
    pub month: String,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvestorStatsResponse {
    pub total_investors: u64,
    pub by_source: Vec<CountBucket>,
    pub by_sector: Vec<CountBucket>,
    pub by_location: Vec<CountBucket>,
    /// Trailing six months of new profiles, oldest first
    pub monthly_new: Vec<MonthBucket>,
}

async fn count_by_source(db: &DatabaseConnection) -> Result<Vec<CountBucket>, AppError> {
    let rows: Vec<(String, i64)> = investor_profile::Entity::find()
        .select_only()
        .column(investor_profile::Column::Source)
        .column_as(investor_profile::Column::Id.count(), "count")
        .group_by(investor_profile::Column::Source)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(key, count)| CountBucket { key, count })
        .collect())
}

async fn count_by_sector(db: &DatabaseConnection) -> Result<Vec<CountBucket>, AppError> {
    let rows: Vec<(String, i64)> = investor_preference::Entity::find()
        .select_only()
        .column(investor_preference::Column::Value)
        .column_as(investor_preference::Column::Id.count(), "count")
        .filter(investor_preference::Column::Kind.eq("sector"))
        .group_by(investor_preference::Column::Value)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(key, count)| CountBucket { key, count })
        .collect())
}

async fn count_by_location(db: &DatabaseConnection) -> Result<Vec<CountBucket>, AppError> {
    let rows: Vec<(String, i64)> = investor_profile::Entity::find()
        .select_only()
        .column(investor_profile::Column::Location)
        .column_as(investor_profile::Column::Id.count(), "count")
        .filter(investor_profile::Column::Location.is_not_null())
        .group_by(investor_profile::Column::Location)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(key, count)| CountBucket { key, count })
        .collect())
}

async fn monthly_new_profiles(db: &DatabaseConnection) -> Result<Vec<MonthBucket>, AppError> {
    let now = Utc::now();
    let cutoff = now - Months::new(6);

    let created: Vec<DateTime<Utc>> = investor_profile::Entity::find()
        .select_only()
        .column(investor_profile::Column::CreatedAt)
        .filter(investor_profile::Column::CreatedAt.gte(cutoff))
        .into_tuple()
        .all(db)
        .await?;

    let mut buckets: Vec<MonthBucket> = (0..6)
        .rev()
        .map(|back| {
            let point = now - Months::new(back);
            MonthBucket {
                month: format!("{:04}-{:02}", point.year(), point.month()),
                count: 0,
            }
        })
        .collect();

    for ts in created {
        let label = format!("{:04}-{:02}", ts.year(), ts.month());
        if let Some(bucket) = buckets.iter_mut().find(|b| b.month == label) {
            bucket.count += 1;
        }
    }

    Ok(buckets)
}

/// Dashboard statistics over investor profiles
///
/// The total count is critical and fails the request; the remaining
/// queries degrade to empty results when they error.
#[utoipa::path(
    get,
    path = "/api/admin/investors/stats",
    responses(
        (status = 200, description = "Flat stats object", body = InvestorStatsResponse),
        (status = 403, description = "Admin role required"),
        (status = 500, description = "Total count query failed")
    )
)]
#[tracing::instrument(skip(state, auth))]
pub async fn investor_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<InvestorStatsResponse>, AppError> {
    auth.require_admin()?;

    let db = &state.db;
    let (total, by_source, by_sector, by_location, monthly_new) = futures::join!(
        investor_profile::Entity::find().count(db),
        count_by_source(db),
        count_by_sector(db),
        count_by_location(db),
        monthly_new_profiles(db),
    );

    // Total is the one number the dashboard cannot render without.
    let total_investors = total?;

    let by_source = by_source.unwrap_or_else(|e| {
        tracing::warn!("by-source stats query failed: {}", e);
        Vec::new()
    });
    let by_sector = by_sector.unwrap_or_else(|e| {
        tracing::warn!("by-sector stats query failed: {}", e);
        Vec::new()
    });
    let by_location = by_location.unwrap_or_else(|e| {
        tracing::warn!("by-location stats query failed: {}", e);
        Vec::new()
    });
    let monthly_new = monthly_new.unwrap_or_else(|e| {
        tracing::warn!("monthly stats query failed: {}", e);
        Vec::new()
    });

    Ok(Json(InvestorStatsResponse {
        total_investors,
        by_source,
        by_sector,
        by_location,
        monthly_new,
    }))
}
