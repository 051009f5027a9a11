use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{AuthUser, Role};
use crate::captable::{self, CapTableSummary};
use crate::entities::{cap_table_entry, company, funding_round};
use crate::error::AppError;
use crate::AppState;

/// Owner founder or admin; everyone else gets a 403.
async fn authorize_company_access(
    state: &AppState,
    auth: AuthUser,
    company_id: Uuid,
) -> Result<company::Model, AppError> {
    let company = company::Entity::find_by_id(company_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("company {}", company_id)))?;

    if auth.role != Role::Admin && company.owner_id != auth.id {
        return Err(AppError::Forbidden(
            "not the owner of this company".to_string(),
        ));
    }
    Ok(company)
}

async fn current_round(
    state: &AppState,
    company_id: Uuid,
) -> Result<Option<funding_round::Model>, AppError> {
    Ok(funding_round::Entity::find()
        .filter(funding_round::Column::CompanyId.eq(company_id))
        .filter(funding_round::Column::IsCurrent.eq(true))
        .one(&state.db)
        .await?)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CapTableRow {
    #[serde(flatten)]
    pub entry: cap_table_entry::Model,
    /// Share of the current valuation, two decimals; 0 when no valuation
    pub ownership_percentage: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CapTableResponse {
    pub company_id: Uuid,
    pub current_valuation: Option<i64>,
    pub rows: Vec<CapTableRow>,
}

/// List the company's cap table with point-in-time ownership percentages
#[utoipa::path(
    get,
    path = "/api/company/{id}/cap-table",
    params(("id" = Uuid, Path, description = "Company id")),
    responses(
        (status = 200, description = "Cap table rows", body = CapTableResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Unknown company")
    )
)]
#[tracing::instrument(skip(state, auth), fields(company_id = %company_id))]
pub async fn get_cap_table(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(company_id): Path<Uuid>,
) -> Result<Json<CapTableResponse>, AppError> {
    authorize_company_access(&state, auth, company_id).await?;

    let round = current_round(&state, company_id).await?;
    let valuation = round.as_ref().map(|r| r.valuation);

    let entries = cap_table_entry::Entity::find()
        .filter(cap_table_entry::Column::CompanyId.eq(company_id))
        .filter(cap_table_entry::Column::IsInvestment.eq(true))
        .order_by_desc(cap_table_entry::Column::Amount)
        .all(&state.db)
        .await?;

    let rows = entries
        .into_iter()
        .map(|entry| {
            let ownership_percentage =
                captable::ownership_percentage(entry.amount, valuation.unwrap_or(0));
            CapTableRow {
                entry,
                ownership_percentage,
            }
        })
        .collect();

    Ok(Json(CapTableResponse {
        company_id,
        current_valuation: valuation,
        rows,
    }))
}

/// Equity/debt totals and the open allocation on the current round
#[utoipa::path(
    get,
    path = "/api/company/{id}/cap-table/summary",
    params(("id" = Uuid, Path, description = "Company id")),
    responses(
        (status = 200, description = "Cap table summary", body = CapTableSummary),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Unknown company")
    )
)]
pub async fn get_cap_table_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(company_id): Path<Uuid>,
) -> Result<Json<CapTableSummary>, AppError> {
    authorize_company_access(&state, auth, company_id).await?;

    let round = current_round(&state, company_id).await?;
    let entries = cap_table_entry::Entity::find()
        .filter(cap_table_entry::Column::CompanyId.eq(company_id))
        .filter(cap_table_entry::Column::IsInvestment.eq(true))
        .all(&state.db)
        .await?;

    Ok(Json(captable::summarize(&entries, round.as_ref())))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CapTableEntryRequest {
    pub investor_name: String,
    pub email: Option<String>,
    pub amount: i64,
    pub round_stage: String,
    /// equity | debt
    pub investment_type: String,
    pub share_price: Option<f64>,
    pub share_count: Option<i64>,
}

/// Record an investment on the company's cap table
#[utoipa::path(
    post,
    path = "/api/company/{id}/cap-table",
    params(("id" = Uuid, Path, description = "Company id")),
    request_body = CapTableEntryRequest,
    responses(
        (status = 200, description = "Entry stored", body = cap_table_entry::Model),
        (status = 422, description = "Bad amount or investment type")
    )
)]
#[tracing::instrument(skip(state, auth, body), fields(company_id = %company_id))]
pub async fn add_cap_table_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(company_id): Path<Uuid>,
    Json(body): Json<CapTableEntryRequest>,
) -> Result<Json<cap_table_entry::Model>, AppError> {
    authorize_company_access(&state, auth, company_id).await?;

    if body.investor_name.trim().is_empty() {
        return Err(AppError::Validation("investor name is required".to_string()));
    }
    if body.amount <= 0 {
        return Err(AppError::Validation("amount must be positive".to_string()));
    }
    let investment_type = body.investment_type.trim().to_lowercase();
    if investment_type != captable::EQUITY && investment_type != captable::DEBT {
        return Err(AppError::Validation(format!(
            "investment type must be equity or debt, got {}",
            investment_type
        )));
    }

    let entry = cap_table_entry::ActiveModel {
        company_id: Set(company_id),
        investor_name: Set(body.investor_name.trim().to_string()),
        email: Set(body.email.map(|e| e.trim().to_lowercase())),
        amount: Set(body.amount),
        round_stage: Set(body.round_stage.trim().to_lowercase()),
        investment_type: Set(investment_type),
        share_price: Set(body.share_price),
        share_count: Set(body.share_count),
        is_investment: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(Json(entry))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub deleted: u64,
}

/// Remove a cap table entry; deleting a missing entry is not an error
#[utoipa::path(
    delete,
    path = "/api/company/{id}/cap-table/{entry_id}",
    params(
        ("id" = Uuid, Path, description = "Company id"),
        ("entry_id" = i64, Path, description = "Cap table entry id")
    ),
    responses(
        (status = 200, description = "Delete outcome", body = DeleteResponse)
    )
)]
pub async fn delete_cap_table_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((company_id, entry_id)): Path<(Uuid, i64)>,
) -> Result<Json<DeleteResponse>, AppError> {
    authorize_company_access(&state, auth, company_id).await?;

    let result = cap_table_entry::Entity::delete_many()
        .filter(cap_table_entry::Column::Id.eq(entry_id))
        .filter(cap_table_entry::Column::CompanyId.eq(company_id))
        .exec(&state.db)
        .await?;

    Ok(Json(DeleteResponse {
        deleted: result.rows_affected,
    }))
}
