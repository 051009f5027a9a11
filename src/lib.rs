use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
// Conditionally import SwaggerUi only when needed (not test)
#[cfg(not(test))]
use utoipa_swagger_ui::SwaggerUi;
use utoipa::OpenApi;
// Conditionally import CORS only when needed (not test)
#[cfg(not(test))]
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
// Conditionally import Governor only when needed (not test)
#[cfg(not(test))]
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
#[cfg(not(test))]
use std::num::NonZeroU32;

pub mod auth;
pub mod captable;
pub mod config;
pub mod entities;
pub mod error;
pub mod import;
pub mod matching;
pub mod routes;

pub use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    )
)]
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Service is healthy")
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dealflow API",
        version = "0.1.0",
        description = "Startup-investor matchmaking: profiles, mandates, cap tables, CSV import and admin dashboards"
    ),
    paths(
        health_check,
        routes::auth::signup,
        routes::auth::login,
        routes::company::get_company,
        routes::company::upsert_company,
        routes::company::replace_industries,
        routes::company::upsert_round,
        routes::company::upload_logo,
        routes::company::upload_cover,
        routes::captable::get_cap_table,
        routes::captable::get_cap_table_summary,
        routes::captable::add_cap_table_entry,
        routes::captable::delete_cap_table_entry,
        routes::investor::get_investor_profile,
        routes::investor::upsert_investor_profile,
        routes::investor::upsert_mandate,
        routes::investor::upsert_metrics,
        routes::investor::delete_investor_profile,
        routes::matching::match_companies,
        routes::admin_investors::list_investors,
        routes::admin_investors::bulk_delete_investors,
        routes::admin_investors::enrich_investors,
        routes::admin_investors::investor_stats,
        routes::admin_firms::list_firms,
        routes::admin_firms::create_firm,
        routes::admin_firms::update_firm,
        routes::admin_firms::delete_firm,
        routes::admin_firms::list_firm_contacts,
        routes::admin_firms::create_firm_contact,
        routes::admin_firms::delete_contact,
        routes::admin_founders::list_founders,
        routes::admin_founders::delete_founder,
        routes::admin_import::download_template,
        routes::admin_import::import_contacts
    ),
    components(schemas(
        routes::auth::SignupRequest,
        routes::auth::LoginRequest,
        routes::auth::SessionResponse,
        routes::company::CompanyResponse,
        routes::company::CompanyUpsertRequest,
        routes::company::IndustriesRequest,
        routes::company::IndustriesResponse,
        routes::company::RoundUpsertRequest,
        routes::company::UploadResponse,
        routes::captable::CapTableRow,
        routes::captable::CapTableResponse,
        routes::captable::CapTableEntryRequest,
        routes::captable::DeleteResponse,
        captable::CapTableSummary,
        routes::investor::InvestorProfileResponse,
        routes::investor::InvestorProfileRequest,
        routes::investor::MandateRequest,
        routes::investor::MandateResponse,
        routes::investor::MetricsRequest,
        routes::investor::ProfileDeleteResponse,
        routes::matching::CompanyMatch,
        routes::matching::MatchResponse,
        routes::admin_investors::InvestorTableResponse,
        routes::admin_investors::BulkDeleteRequest,
        routes::admin_investors::BulkDeleteResponse,
        routes::admin_investors::EnrichRequest,
        routes::admin_investors::EnrichResponse,
        routes::admin_investors::CountBucket,
        routes::admin_investors::MonthBucket,
        routes::admin_investors::InvestorStatsResponse,
        routes::admin_firms::FirmListResponse,
        routes::admin_firms::FirmRequest,
        routes::admin_firms::AdminDeleteResponse,
        routes::admin_firms::ContactListResponse,
        routes::admin_firms::ContactRequest,
        routes::admin_founders::FounderRow,
        routes::admin_founders::FounderListResponse,
        routes::admin_founders::FounderDeleteResponse,
        routes::admin_import::ImportResponse,
        entities::company::Model,
        entities::company_industry::Model,
        entities::funding_round::Model,
        entities::cap_table_entry::Model,
        entities::investor_profile::Model,
        entities::investor_preference::Model,
        entities::investor_metrics::Model,
        entities::investor_firm::Model,
        entities::investor_contact::Model
    ))
)]
struct ApiDoc;

/// Create the application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // Build our API documentation (needed regardless for ApiDoc::openapi())
    let api_doc = ApiDoc::openapi();

    // --- Define API routes separately ---
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/auth/signup", post(routes::auth::signup))
        .route("/auth/login", post(routes::auth::login))
        .route(
            "/api/company",
            get(routes::company::get_company).put(routes::company::upsert_company),
        )
        .route("/api/company/industries", put(routes::company::replace_industries))
        .route("/api/company/round", put(routes::company::upsert_round))
        .route("/api/company/logo", post(routes::company::upload_logo))
        .route("/api/company/cover", post(routes::company::upload_cover))
        .route(
            "/api/company/{id}/cap-table",
            get(routes::captable::get_cap_table).post(routes::captable::add_cap_table_entry),
        )
        .route(
            "/api/company/{id}/cap-table/summary",
            get(routes::captable::get_cap_table_summary),
        )
        .route(
            "/api/company/{id}/cap-table/{entry_id}",
            axum::routing::delete(routes::captable::delete_cap_table_entry),
        )
        .route(
            "/api/investor/profile",
            get(routes::investor::get_investor_profile)
                .put(routes::investor::upsert_investor_profile)
                .delete(routes::investor::delete_investor_profile),
        )
        .route("/api/investor/mandate", put(routes::investor::upsert_mandate))
        .route("/api/investor/metrics", put(routes::investor::upsert_metrics))
        .route("/api/match/companies", get(routes::matching::match_companies))
        .route("/api/admin/investors", get(routes::admin_investors::list_investors))
        .route(
            "/api/admin/investors/bulk-delete",
            post(routes::admin_investors::bulk_delete_investors),
        )
        .route(
            "/api/admin/investors/enrich",
            post(routes::admin_investors::enrich_investors),
        )
        .route(
            "/api/admin/investors/stats",
            get(routes::admin_investors::investor_stats),
        )
        .route(
            "/api/admin/firms",
            get(routes::admin_firms::list_firms).post(routes::admin_firms::create_firm),
        )
        .route(
            "/api/admin/firms/{id}",
            put(routes::admin_firms::update_firm).delete(routes::admin_firms::delete_firm),
        )
        .route(
            "/api/admin/firms/{id}/contacts",
            get(routes::admin_firms::list_firm_contacts)
                .post(routes::admin_firms::create_firm_contact),
        )
        .route(
            "/api/admin/contacts/{id}",
            axum::routing::delete(routes::admin_firms::delete_contact),
        )
        .route(
            "/api/admin/founders",
            get(routes::admin_founders::list_founders),
        )
        .route(
            "/api/admin/founders/{id}",
            axum::routing::delete(routes::admin_founders::delete_founder),
        )
        .route(
            "/api/admin/import/template",
            get(routes::admin_import::download_template),
        )
        .route(
            "/api/admin/import/contacts",
            post(routes::admin_import::import_contacts),
        )
        // CSV and image uploads may exceed axum's 2 MB default
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024));

    // --- Conditionally apply layers and Swagger UI only when NOT running tests ---
    #[cfg(not(test))]
    let (docs_router, rate_limited_api_routes) = {
        // Create Swagger UI router
        let docs_router = SwaggerUi::new("/docs").url("/api-doc/openapi.json", api_doc);

        // Configure Rate Limiting
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .key_extractor(SmartIpKeyExtractor)
                .period(std::time::Duration::from_secs(60))
                .burst_size(NonZeroU32::new(30).unwrap().into())
                .finish()
                .unwrap(),
        );
        // Apply Governor layer ONLY to the api_routes defined above
        let rate_limited_api_routes = api_routes.layer(GovernorLayer {
            config: governor_conf,
        });

        (docs_router, rate_limited_api_routes)
    };

    // For test builds, use the original api_routes and an empty router for docs
    #[cfg(test)]
    let (docs_router, rate_limited_api_routes) = {
        let _ = &api_doc;
        (Router::new(), api_routes)
    };

    // --- Build the final application router ---
    let mut app = Router::new()
        .merge(rate_limited_api_routes)
        .merge(docs_router)
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir));

    // --- Apply CORS to the whole app (both API and docs) if needed ---
    #[cfg(not(test))]
    {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    app.with_state(state)
}
