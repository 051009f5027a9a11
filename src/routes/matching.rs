use axum::{
    extract::{Query, State},
    Json,
};
use sea_orm::{
    sea_query::{extension::postgres::PgExpr, Expr, Query as SeaQuery},
    ColumnTrait, Condition, EntityTrait, QueryFilter, QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::{AuthUser, Role};
use crate::entities::{company, company_industry};
use crate::error::AppError;
use crate::matching::match_score;
use crate::AppState;

const MAX_MATCHES: u64 = 20;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct MatchQuery {
    /// Free-text keywords, whitespace or comma separated
    #[serde(default)]
    pub keywords: Option<String>,
    /// Comma-joined industry categories to restrict and score against
    #[serde(default)]
    pub industries: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompanyMatch {
    #[serde(flatten)]
    pub company: company::Model,
    pub industries: Vec<String>,
    /// Deterministic criteria-fit score in [70, 99]
    pub match_score: u8,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MatchResponse {
    pub matches: Vec<CompanyMatch>,
}

fn split_terms(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or("")
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Search companies for deal flow, scored by criteria fit
#[utoipa::path(
    get,
    path = "/api/match/companies",
    params(MatchQuery),
    responses(
        (status = 200, description = "Up to 20 companies, best fit first", body = MatchResponse),
        (status = 401, description = "Not authenticated")
    )
)]
#[tracing::instrument(skip(state, auth, query))]
pub async fn match_companies(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<MatchQuery>,
) -> Result<Json<MatchResponse>, AppError> {
    auth.require_role(Role::Investor)?;

    let keywords = split_terms(query.keywords.as_deref());
    let industry_filter = split_terms(query.industries.as_deref());

    let mut select = company::Entity::find();

    if !keywords.is_empty() {
        let mut cond = Condition::any();
        for kw in &keywords {
            let pattern = format!("%{}%", kw);
            cond = cond
                .add(Expr::col(company::Column::Name).ilike(pattern.clone()))
                .add(Expr::col(company::Column::Tagline).ilike(pattern.clone()))
                .add(Expr::col(company::Column::Description).ilike(pattern));
        }
        select = select.filter(cond);
    }

    if !industry_filter.is_empty() {
        select = select.filter(
            company::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(company_industry::Column::CompanyId)
                    .from(company_industry::Entity)
                    .and_where(
                        company_industry::Column::Category.is_in(industry_filter.clone()),
                    )
                    .to_owned(),
            ),
        );
    }

    let companies = select.limit(MAX_MATCHES).all(&state.db).await?;

    let ids: Vec<Uuid> = companies.iter().map(|c| c.id).collect();
    let mut industries_by_company: HashMap<Uuid, Vec<String>> = HashMap::new();
    if !ids.is_empty() {
        for row in company_industry::Entity::find()
            .filter(company_industry::Column::CompanyId.is_in(ids))
            .all(&state.db)
            .await?
        {
            industries_by_company
                .entry(row.company_id)
                .or_default()
                .push(row.category);
        }
    }

    let mut matches: Vec<CompanyMatch> = companies
        .into_iter()
        .map(|company| {
            let industries = industries_by_company
                .remove(&company.id)
                .unwrap_or_default();
            let score = match_score(
                &keywords,
                &industry_filter,
                &company.name,
                company.tagline.as_deref(),
                company.description.as_deref(),
                &industries,
            );
            CompanyMatch {
                company,
                industries,
                match_score: score,
            }
        })
        .collect();

    // Best fit first; name as a stable tie-break.
    matches.sort_by(|a, b| {
        b.match_score
            .cmp(&a.match_score)
            .then_with(|| a.company.name.cmp(&b.company.name))
    });

    Ok(Json(MatchResponse { matches }))
}
