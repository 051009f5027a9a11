use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set,
};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::{investor_contact, investor_firm, investor_profile};
use crate::error::AppError;
use crate::import::{
    parse_contacts_csv, validate_upload, ParsedContact, CONTACTS_TEMPLATE, SOURCE_ADMIN_UPLOAD,
};
use crate::AppState;

const CHUNK_SIZE: usize = 100;

/// Download the contacts CSV template
#[utoipa::path(
    get,
    path = "/api/admin/import/template",
    responses(
        (status = 200, description = "CSV template", content_type = "text/csv")
    )
)]
pub async fn download_template(auth: AuthUser) -> Result<impl IntoResponse, AppError> {
    auth.require_admin()?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"contacts_template.csv\"",
            ),
        ],
        CONTACTS_TEMPLATE,
    ))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportResponse {
    /// Contact rows written (upsert by email)
    pub imported_contacts: usize,
    /// Firms created for previously unseen company names
    pub firms_created: usize,
    /// Derived investor profiles inserted
    pub derived_profiles: usize,
    /// Rows dropped for missing email, name and company
    pub dropped: usize,
    pub row_errors: Vec<String>,
}

/// Find-or-create firms for every distinct company name in the batch.
async fn upsert_firms(
    db: &sea_orm::DatabaseConnection,
    rows: &[ParsedContact],
) -> Result<(HashMap<String, Uuid>, usize), AppError> {
    let mut firm_ids: HashMap<String, Uuid> = HashMap::new();
    let mut created = 0;

    for row in rows {
        let name = row.company_name.trim();
        if name.is_empty() || firm_ids.contains_key(name) {
            continue;
        }
        let existing = investor_firm::Entity::find()
            .filter(investor_firm::Column::Name.eq(name))
            .one(db)
            .await?;
        let id = match existing {
            Some(firm) => firm.id,
            None => {
                let now = Utc::now();
                let firm = investor_firm::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    name: Set(name.to_string()),
                    website: Set(none_if_empty(&row.website)),
                    location: Set(none_if_empty(&row.location)),
                    firm_type: Set(none_if_empty(&row.firm_type)),
                    source: Set(SOURCE_ADMIN_UPLOAD.to_string()),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(db)
                .await?;
                created += 1;
                firm.id
            }
        };
        firm_ids.insert(name.to_string(), id);
    }

    Ok((firm_ids, created))
}

fn none_if_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Upload a contacts CSV for bulk import
///
/// Contacts are upserted by email in chunks; a chunk failure aborts the
/// remaining batch but already-written chunks stay committed. Re-uploading
/// the same file is the recovery path. Derived investor profiles are
/// inserted after the contacts; a failure there is logged, not undone.
#[utoipa::path(
    post,
    path = "/api/admin/import/contacts",
    responses(
        (status = 200, description = "Import outcome", body = ImportResponse),
        (status = 403, description = "Admin role required"),
        (status = 422, description = "Bad file type, empty file or over the size limit")
    )
)]
#[tracing::instrument(skip(state, auth, multipart))]
pub async fn import_contacts(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, AppError> {
    auth.require_admin()?;

    let mut payload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("could not read upload: {}", e)))?;
        payload = Some((file_name, data.to_vec()));
        break;
    }
    let (file_name, data) =
        payload.ok_or_else(|| AppError::Validation("no file field in upload".to_string()))?;

    validate_upload(&file_name, data.len())?;
    let parsed = parse_contacts_csv(&data)?;

    let (firm_ids, firms_created) = upsert_firms(&state.db, &parsed.rows).await?;

    // Rows carrying only a company name still create the firm above, but
    // there is no person to store a contact for.
    let contact_rows: Vec<&ParsedContact> = parsed
        .rows
        .iter()
        .filter(|row| !row.email.is_empty() || !row.full_name.is_empty())
        .collect();

    // Chunked upsert, conflict key is the contact email. No rollback of
    // earlier chunks when a later one fails.
    let mut imported_contacts = 0;
    for chunk in contact_rows.chunks(CHUNK_SIZE) {
        let models: Vec<investor_contact::ActiveModel> = chunk
            .iter()
            .map(|row| investor_contact::ActiveModel {
                id: Set(Uuid::new_v4()),
                firm_id: Set(firm_ids.get(row.company_name.trim()).copied()),
                full_name: Set(if row.full_name.is_empty() {
                    row.email.clone()
                } else {
                    row.full_name.clone()
                }),
                email: Set(none_if_empty(&row.email)),
                title: Set(none_if_empty(&row.title)),
                linkedin_url: Set(none_if_empty(&row.linkedin_url)),
                source: Set(SOURCE_ADMIN_UPLOAD.to_string()),
                created_at: Set(Utc::now()),
            })
            .collect();
        if models.is_empty() {
            continue;
        }

        investor_contact::Entity::insert_many(models)
            .on_conflict(
                OnConflict::column(investor_contact::Column::Email)
                    .update_columns([
                        investor_contact::Column::FullName,
                        investor_contact::Column::Title,
                        investor_contact::Column::LinkedinUrl,
                        investor_contact::Column::FirmId,
                    ])
                    .to_owned(),
            )
            .exec(&state.db)
            .await
            .map_err(|e| {
                tracing::error!(
                    imported = imported_contacts,
                    "contact chunk insert failed, aborting remaining batch: {}",
                    e
                );
                AppError::from(e)
            })?;
        imported_contacts += chunk.len();
    }

    // Derived profiles need both a person and an address to be useful.
    let profile_models: Vec<investor_profile::ActiveModel> = parsed
        .rows
        .iter()
        .filter(|row| !row.email.is_empty() && !row.full_name.is_empty())
        .map(|row| {
            let now = Utc::now();
            investor_profile::ActiveModel {
                id: Set(Uuid::new_v4()),
                full_name: Set(row.full_name.clone()),
                email: Set(row.email.clone()),
                phone: Set(None),
                linkedin_url: Set(none_if_empty(&row.linkedin_url)),
                bio: Set(None),
                firm_name: Set(none_if_empty(&row.company_name)),
                title: Set(none_if_empty(&row.title)),
                business_type: Set(None),
                location: Set(none_if_empty(&row.location)),
                source: Set(SOURCE_ADMIN_UPLOAD.to_string()),
                created_at: Set(now),
                updated_at: Set(now),
            }
        })
        .collect();

    let mut derived_profiles = 0;
    if !profile_models.is_empty() {
        let attempted = profile_models.len();
        match investor_profile::Entity::insert_many(profile_models)
            .on_conflict(
                OnConflict::column(investor_profile::Column::Email)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&state.db)
            .await
        {
            Ok(_) => derived_profiles = attempted,
            // Every row conflicted; nothing new, nothing wrong.
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => {
                // Contacts stay committed; the derived insert is not undone.
                tracing::error!("derived investor profile insert failed: {}", e);
            }
        }
    }

    tracing::info!(
        imported_contacts,
        firms_created,
        derived_profiles,
        dropped = parsed.dropped,
        "contacts import finished"
    );

    Ok(Json(ImportResponse {
        imported_contacts,
        firms_created,
        derived_profiles,
        dropped: parsed.dropped,
        row_errors: parsed.row_errors,
    }))
}
