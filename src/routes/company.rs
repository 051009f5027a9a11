use axum::{
    extract::{Multipart, State},
    Json,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{AuthUser, Role};
use crate::entities::{company, company_industry, funding_round};
use crate::error::AppError;
use crate::AppState;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// The founder's company. When a user owns several, the application picks
/// the first by creation time and logs a warning; the rest stay untouched.
pub(crate) async fn company_for_owner(
    db: &sea_orm::DatabaseConnection,
    owner_id: Uuid,
) -> Result<Option<company::Model>, AppError> {
    let mut companies = company::Entity::find()
        .filter(company::Column::OwnerId.eq(owner_id))
        .order_by_asc(company::Column::CreatedAt)
        .all(db)
        .await?;
    if companies.len() > 1 {
        tracing::warn!(
            owner_id = %owner_id,
            count = companies.len(),
            "user owns multiple companies, using the first"
        );
    }
    Ok(if companies.is_empty() {
        None
    } else {
        Some(companies.remove(0))
    })
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompanyResponse {
    #[serde(flatten)]
    pub company: company::Model,
    pub industries: Vec<company_industry::Model>,
    pub current_round: Option<funding_round::Model>,
}

/// Fetch the authenticated founder's company profile
#[utoipa::path(
    get,
    path = "/api/company",
    responses(
        (status = 200, description = "Company profile with industries and current round", body = CompanyResponse),
        (status = 404, description = "Founder has not created a company yet"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_company(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<CompanyResponse>, AppError> {
    auth.require_role(Role::Founder)?;

    let company = company_for_owner(&state.db, auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("no company profile yet".to_string()))?;

    let industries = company_industry::Entity::find()
        .filter(company_industry::Column::CompanyId.eq(company.id))
        .all(&state.db)
        .await?;

    let current_round = funding_round::Entity::find()
        .filter(funding_round::Column::CompanyId.eq(company.id))
        .filter(funding_round::Column::IsCurrent.eq(true))
        .one(&state.db)
        .await?;

    Ok(Json(CompanyResponse {
        company,
        industries,
        current_round,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompanyUpsertRequest {
    pub name: String,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
}

/// Create or update the founder's company profile
#[utoipa::path(
    put,
    path = "/api/company",
    request_body = CompanyUpsertRequest,
    responses(
        (status = 200, description = "Saved company profile", body = company::Model),
        (status = 422, description = "Missing name or malformed website URL")
    )
)]
#[tracing::instrument(skip(state, auth, body), fields(owner = %auth.id))]
pub async fn upsert_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CompanyUpsertRequest>,
) -> Result<Json<company::Model>, AppError> {
    auth.require_role(Role::Founder)?;

    let name = body.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("company name is required".to_string()));
    }
    if let Some(website) = body.website.as_deref() {
        Url::parse(website)
            .map_err(|e| AppError::Validation(format!("invalid website URL: {}", e)))?;
    }

    let saved = match company_for_owner(&state.db, auth.id).await? {
        Some(existing) => {
            let mut am: company::ActiveModel = existing.into();
            am.name = Set(name);
            am.tagline = Set(body.tagline);
            am.description = Set(body.description);
            am.website = Set(body.website);
            am.updated_at = Set(Utc::now());
            am.update(&state.db).await?
        }
        None => {
            let now = Utc::now();
            company::ActiveModel {
                id: Set(Uuid::new_v4()),
                owner_id: Set(auth.id),
                name: Set(name),
                tagline: Set(body.tagline),
                description: Set(body.description),
                logo_url: Set(None),
                cover_url: Set(None),
                website: Set(body.website),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&state.db)
            .await?
        }
    };

    Ok(Json(saved))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct IndustriesRequest {
    /// category -> subcategories; an empty list keeps the bare category
    pub industries: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IndustriesResponse {
    pub industries: Vec<company_industry::Model>,
}

/// Replace the company's industry rows with the submitted set
#[utoipa::path(
    put,
    path = "/api/company/industries",
    request_body = IndustriesRequest,
    responses(
        (status = 200, description = "Full replacement set now stored", body = IndustriesResponse),
        (status = 404, description = "Founder has no company")
    )
)]
#[tracing::instrument(skip(state, auth, body), fields(owner = %auth.id))]
pub async fn replace_industries(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<IndustriesRequest>,
) -> Result<Json<IndustriesResponse>, AppError> {
    auth.require_role(Role::Founder)?;

    let company = company_for_owner(&state.db, auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("no company profile yet".to_string()))?;

    // Delete-all-then-insert, no diffing. One transaction so a failure
    // between the two statements cannot leave the set half-replaced.
    let txn = state.db.begin().await?;

    company_industry::Entity::delete_many()
        .filter(company_industry::Column::CompanyId.eq(company.id))
        .exec(&txn)
        .await?;

    let mut rows = Vec::new();
    for (category, subcategories) in &body.industries {
        if subcategories.is_empty() {
            rows.push(company_industry::ActiveModel {
                company_id: Set(company.id),
                category: Set(category.clone()),
                subcategory: Set(None),
                ..Default::default()
            });
        }
        for sub in subcategories {
            rows.push(company_industry::ActiveModel {
                company_id: Set(company.id),
                category: Set(category.clone()),
                subcategory: Set(Some(sub.clone())),
                ..Default::default()
            });
        }
    }
    if !rows.is_empty() {
        company_industry::Entity::insert_many(rows).exec(&txn).await?;
    }

    txn.commit().await?;

    let industries = company_industry::Entity::find()
        .filter(company_industry::Column::CompanyId.eq(company.id))
        .all(&state.db)
        .await?;

    Ok(Json(IndustriesResponse { industries }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RoundUpsertRequest {
    pub stage: String,
    pub valuation: i64,
    pub allocation: i64,
}

/// Open or replace the company's current funding round
#[utoipa::path(
    put,
    path = "/api/company/round",
    request_body = RoundUpsertRequest,
    responses(
        (status = 200, description = "Current round stored", body = funding_round::Model),
        (status = 422, description = "Negative valuation or allocation")
    )
)]
#[tracing::instrument(skip(state, auth, body), fields(owner = %auth.id))]
pub async fn upsert_round(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<RoundUpsertRequest>,
) -> Result<Json<funding_round::Model>, AppError> {
    auth.require_role(Role::Founder)?;

    if body.valuation < 0 || body.allocation < 0 {
        return Err(AppError::Validation(
            "valuation and allocation must be non-negative".to_string(),
        ));
    }

    let company = company_for_owner(&state.db, auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("no company profile yet".to_string()))?;

    let txn = state.db.begin().await?;

    funding_round::Entity::update_many()
        .col_expr(funding_round::Column::IsCurrent, sea_orm::sea_query::Expr::value(false))
        .filter(funding_round::Column::CompanyId.eq(company.id))
        .exec(&txn)
        .await?;

    let round = funding_round::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company.id),
        stage: Set(body.stage.trim().to_lowercase()),
        valuation: Set(body.valuation),
        allocation: Set(body.allocation),
        is_current: Set(true),
        created_at: Set(Utc::now()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    Ok(Json(round))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Public URL of the stored file
    pub url: String,
}

async fn store_image(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<String, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let extension = file_name
            .rsplit('.')
            .next()
            .map(|s| s.to_lowercase())
            .unwrap_or_default();
        if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AppError::Validation(format!(
                "unsupported image type: {}",
                file_name
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("could not read upload: {}", e)))?;
        if data.is_empty() {
            return Err(AppError::Validation("uploaded file is empty".to_string()));
        }
        if data.len() > MAX_IMAGE_BYTES {
            return Err(AppError::Validation(format!(
                "image exceeds the {} MiB upload limit",
                MAX_IMAGE_BYTES / (1024 * 1024)
            )));
        }

        let stored_name = format!("{}.{}", Uuid::new_v4().simple(), extension);
        tokio::fs::create_dir_all(&state.config.upload_dir).await?;
        let path = format!("{}/{}", state.config.upload_dir, stored_name);
        tokio::fs::write(&path, &data).await?;
        return Ok(format!("/uploads/{}", stored_name));
    }
    Err(AppError::Validation("no file field in upload".to_string()))
}

async fn set_company_image(
    state: &AppState,
    auth: AuthUser,
    multipart: Multipart,
    cover: bool,
) -> Result<Json<UploadResponse>, AppError> {
    auth.require_role(Role::Founder)?;

    let company = company_for_owner(&state.db, auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("no company profile yet".to_string()))?;

    let url = store_image(state, multipart).await?;

    let mut am: company::ActiveModel = company.into();
    if cover {
        am.cover_url = Set(Some(url.clone()));
    } else {
        am.logo_url = Set(Some(url.clone()));
    }
    am.updated_at = Set(Utc::now());
    am.update(&state.db).await?;

    tracing::info!(url = %url, cover, "stored company image");
    Ok(Json(UploadResponse { url }))
}

/// Upload a company logo, returns its public URL
#[utoipa::path(
    post,
    path = "/api/company/logo",
    responses(
        (status = 200, description = "Logo stored", body = UploadResponse),
        (status = 422, description = "Bad file type, empty file or over the size limit")
    )
)]
pub async fn upload_logo(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    set_company_image(&state, auth, multipart, false).await
}

/// Upload a company cover image, returns its public URL
#[utoipa::path(
    post,
    path = "/api/company/cover",
    responses(
        (status = 200, description = "Cover stored", body = UploadResponse),
        (status = 422, description = "Bad file type, empty file or over the size limit")
    )
)]
pub async fn upload_cover(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    set_company_image(&state, auth, multipart, true).await
}
