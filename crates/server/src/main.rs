// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod extract;
mod messenger;
mod scope;
mod worker;

use axum::{
    Json, Router,
    extract::State as AxumState,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use clark::{
    DispatchingNotifier, ErrorReporter, LogMailer, NotificationChannel, NotificationDispatcher,
    NotificationLog, PaybackConfig, TracingErrorReporter,
};
use clark_api::{
    AcceptOfferRequest, AcceptOfferResponse, ApiError, ClarkConfig, ContractDetailsResponse,
    ContractTransitionResponse, ContractsUnderAnalysisResponse, CreditPaybackPointsRequest,
    CreditPaybackPointsResponse, EnqueueJobResponse, EnrollPaybackRequest,
    EnrollPaybackResponse, GroupedInquiriesResponse, InquiryCategoryResponse, JobConfig,
    ListContractsUnderAnalysisRequest, ListNotificationsRequest, ListNotificationsResponse,
    OpportunityResponse, RequestCorrectionRequest, RequestCorrectionResponse, Services,
    UpdateAnalysisStateRequest, UpdateInquiryCategoryRequest, UploadDocumentsRequest,
    UploadDocumentsResponse,
};
use clark_audit::Cause;
use clark_domain::{AnalysisEstimateConfig, Channel, DocumentType, DomainError};
use clark_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{error, info};

use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::messenger::{MessengerHub, messenger_handler};
use crate::scope::{RequestId, ScopedActor};

/// Clark Server - HTTP server for the Clark insurance lifecycle engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// IANA timezone deciding whether an upload happened on a weekend
    #[arg(long, default_value = "Europe/Berlin")]
    timezone: String,

    /// Document type whose upload starts the analysis estimate
    #[arg(long, default_value = "customer_upload")]
    trigger_document_type: String,

    /// Hours added to uploads made Monday through Friday
    #[arg(long, default_value_t = 24)]
    weekday_offset_hours: i64,

    /// Hours added to uploads made on Saturday or Sunday
    #[arg(long, default_value_t = 76)]
    weekend_offset_hours: i64,

    /// Days a payback credit stays locked
    #[arg(long, default_value_t = clark::DEFAULT_LOCK_DAYS)]
    payback_lock_days: i64,

    /// Attempts a background job gets before it is dropped
    #[arg(long, default_value_t = clark_api::DEFAULT_MAX_ATTEMPTS)]
    job_max_attempts: u32,

    /// Seconds between job queue polls
    #[arg(long, default_value_t = 5)]
    job_poll_interval_secs: u64,

    /// Seconds between scheduling offer expiry and payback recalculation
    #[arg(long, default_value_t = 3600)]
    maintenance_interval_secs: u64,
}

impl Args {
    /// Builds the engine configuration from the command line.
    fn config(&self) -> Result<ClarkConfig, DomainError> {
        let trigger_type: DocumentType = self.trigger_document_type.parse()?;
        Ok(ClarkConfig {
            analysis: AnalysisEstimateConfig::from_parts(
                &self.timezone,
                trigger_type,
                self.weekday_offset_hours,
                self.weekend_offset_hours,
            )?,
            payback: PaybackConfig {
                lock_days: self.payback_lock_days,
            },
            jobs: JobConfig {
                max_attempts: self.job_max_attempts,
                poll_interval: std::time::Duration::from_secs(self.job_poll_interval_secs),
            },
        })
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The engine collaborators.
    services: Arc<Services>,
    /// Transport of the messenger channel.
    messenger: Arc<MessengerHub>,
}

/// Wires the persistence layer, the notification channels and the services.
fn build_app_state(persistence: Persistence, config: ClarkConfig) -> AppState {
    let store: Arc<Persistence> = Arc::new(persistence);
    let reporter: Arc<dyn ErrorReporter> = Arc::new(TracingErrorReporter);
    let messenger: Arc<MessengerHub> = Arc::new(MessengerHub::new());
    let dispatcher: NotificationDispatcher = NotificationDispatcher::new(
        vec![
            Arc::new(LogMailer) as Arc<dyn NotificationChannel>,
            Arc::clone(&messenger) as Arc<dyn NotificationChannel>,
        ],
        Arc::clone(&store) as Arc<dyn NotificationLog>,
        Arc::clone(&reporter),
    );
    let notifier: DispatchingNotifier = DispatchingNotifier::new(
        Arc::new(dispatcher),
        vec![Channel::Email, Channel::Messenger],
    );
    AppState {
        services: Arc::new(Services::from_store(
            &store,
            Arc::new(notifier),
            reporter,
            config,
        )),
        messenger,
    }
}

fn cause(RequestId(id): RequestId, action: &str) -> Cause {
    Cause::new(id, format!("HTTP {action}"))
}

// ============================================================================
// Errors
// ============================================================================

/// One entry of the JSON:API error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorObject {
    /// The HTTP status, as a string.
    status: String,
    /// Short summary shared by all errors of this kind.
    title: String,
    /// Human-readable explanation of this occurrence.
    detail: String,
    meta: ErrorMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorMeta {
    /// Messages keyed by the offending field.
    data: BTreeMap<String, String>,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    errors: Vec<ErrorObject>,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
pub struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
    /// Messages keyed by field.
    data: BTreeMap<String, String>,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            errors: vec![ErrorObject {
                status: self.status.as_u16().to_string(),
                title: self
                    .status
                    .canonical_reason()
                    .unwrap_or("Error")
                    .to_string(),
                detail: self.message,
                meta: ErrorMeta { data: self.data },
            }],
        });
        (self.status, body).into_response()
    }
}

impl HttpError {
    /// An extractor rejection, attributed to the part of the request that failed.
    pub(crate) fn rejected(status: StatusCode, part: &str, message: String) -> Self {
        Self {
            status,
            data: BTreeMap::from([(part.to_string(), message.clone())]),
            message,
        }
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } | ApiError::OperationFailed { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { message } => {
                error!(error = %message, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            data: err.field_errors(),
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Customer routes
// ============================================================================

/// Handler for GET `/api/customer/contracts/under_analysis`.
async fn handle_list_contracts_under_analysis(
    AxumState(app_state): AxumState<AppState>,
    ScopedActor(actor): ScopedActor,
    ApiQuery(query): ApiQuery<ListContractsUnderAnalysisRequest>,
) -> Result<Json<ContractsUnderAnalysisResponse>, HttpError> {
    let response: ContractsUnderAnalysisResponse =
        clark_api::list_contracts_under_analysis(&app_state.services, &actor, &query)?;
    Ok(Json(response))
}

/// Handler for GET `/api/customer/contracts/{id}`.
async fn handle_get_contract_details(
    AxumState(app_state): AxumState<AppState>,
    ScopedActor(actor): ScopedActor,
    ApiPath(contract_id): ApiPath<i64>,
) -> Result<Json<ContractDetailsResponse>, HttpError> {
    let response: ContractDetailsResponse =
        clark_api::get_contract_details(&app_state.services, &actor, contract_id)?;
    Ok(Json(response))
}

/// Handler for POST `/api/customer/contracts/{id}/provide_details`.
async fn handle_provide_details(
    AxumState(app_state): AxumState<AppState>,
    ScopedActor(actor): ScopedActor,
    request_id: RequestId,
    ApiPath(contract_id): ApiPath<i64>,
) -> Result<Json<ContractTransitionResponse>, HttpError> {
    info!(contract_id, "Handling provide_details request");
    let response: ContractTransitionResponse = clark_api::provide_details(
        &app_state.services,
        &actor,
        contract_id,
        cause(request_id, "provide_details"),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/api/customer/contracts/{id}/cancel_analysis`.
async fn handle_cancel_analysis(
    AxumState(app_state): AxumState<AppState>,
    ScopedActor(actor): ScopedActor,
    request_id: RequestId,
    ApiPath(contract_id): ApiPath<i64>,
) -> Result<Json<ContractTransitionResponse>, HttpError> {
    info!(contract_id, "Handling cancel_analysis request");
    let response: ContractTransitionResponse = clark_api::cancel_analysis(
        &app_state.services,
        &actor,
        contract_id,
        cause(request_id, "cancel_analysis"),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/api/customer/contracts/{id}/documents`.
async fn handle_upload_documents(
    AxumState(app_state): AxumState<AppState>,
    ScopedActor(actor): ScopedActor,
    request_id: RequestId,
    ApiPath(contract_id): ApiPath<i64>,
    ApiJson(req): ApiJson<UploadDocumentsRequest>,
) -> Result<Json<UploadDocumentsResponse>, HttpError> {
    info!(
        contract_id,
        documents = req.documents.len(),
        "Handling upload_documents request"
    );
    let response: UploadDocumentsResponse = clark_api::upload_documents(
        &app_state.services,
        &actor,
        contract_id,
        &req,
        cause(request_id, "upload_documents"),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/api/customer/offers/{id}/accept`.
async fn handle_accept_offer(
    AxumState(app_state): AxumState<AppState>,
    ScopedActor(actor): ScopedActor,
    request_id: RequestId,
    ApiPath(offer_id): ApiPath<i64>,
    ApiJson(req): ApiJson<AcceptOfferRequest>,
) -> Result<Json<AcceptOfferResponse>, HttpError> {
    info!(offer_id, option_id = req.option_id, "Handling accept_offer request");
    let response: AcceptOfferResponse = clark_api::accept_offer(
        &app_state.services,
        &actor,
        offer_id,
        &req,
        cause(request_id, "accept_offer"),
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for GET `/api/customer/inquiries/grouped`.
async fn handle_grouped_inquiries(
    AxumState(app_state): AxumState<AppState>,
    ScopedActor(actor): ScopedActor,
) -> Result<Json<GroupedInquiriesResponse>, HttpError> {
    let response: GroupedInquiriesResponse =
        clark_api::grouped_inquiries(&app_state.services, &actor)?;
    Ok(Json(response))
}

/// Handler for POST `/api/customer/payback`.
///
/// Responds 201 for a new enrollment and 200 when it already existed.
async fn handle_enroll_payback(
    AxumState(app_state): AxumState<AppState>,
    ScopedActor(actor): ScopedActor,
    ApiJson(req): ApiJson<EnrollPaybackRequest>,
) -> Result<(StatusCode, Json<EnrollPaybackResponse>), HttpError> {
    let response: EnrollPaybackResponse =
        clark_api::enroll_payback(&app_state.services, &actor, &req)?;
    let status: StatusCode = if response.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(response)))
}

// ============================================================================
// Admin routes
// ============================================================================

/// Handler for POST `/api/admin/contracts/{id}/analysis_state`.
async fn handle_update_analysis_state(
    AxumState(app_state): AxumState<AppState>,
    ScopedActor(actor): ScopedActor,
    request_id: RequestId,
    ApiPath(contract_id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateAnalysisStateRequest>,
) -> Result<Json<ContractTransitionResponse>, HttpError> {
    info!(
        actor_id = actor.id,
        contract_id,
        event = %req.event,
        "Handling update_analysis_state request"
    );
    let response: ContractTransitionResponse = clark_api::update_analysis_state(
        &app_state.services,
        &actor,
        contract_id,
        &req,
        cause(request_id, "update_analysis_state"),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/api/admin/contracts/{id}/request_correction`.
async fn handle_request_correction(
    AxumState(app_state): AxumState<AppState>,
    ScopedActor(actor): ScopedActor,
    request_id: RequestId,
    ApiPath(contract_id): ApiPath<i64>,
    ApiJson(req): ApiJson<RequestCorrectionRequest>,
) -> Result<Json<RequestCorrectionResponse>, HttpError> {
    info!(
        actor_id = actor.id,
        contract_id,
        reasons = req.reasons.len(),
        "Handling request_correction request"
    );
    let response: RequestCorrectionResponse = clark_api::request_correction(
        &app_state.services,
        &actor,
        contract_id,
        &req,
        cause(request_id, "request_correction"),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/api/admin/opportunities/{id}/move_to_success`.
async fn handle_move_to_success(
    AxumState(app_state): AxumState<AppState>,
    ScopedActor(actor): ScopedActor,
    request_id: RequestId,
    ApiPath(opportunity_id): ApiPath<i64>,
) -> Result<Json<OpportunityResponse>, HttpError> {
    info!(
        actor_id = actor.id,
        opportunity_id, "Handling move_to_success request"
    );
    let response: OpportunityResponse = clark_api::move_to_success(
        &app_state.services,
        &actor,
        opportunity_id,
        cause(request_id, "move_to_success"),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/api/admin/inquiries/{id}/categories/{category_id}`.
async fn handle_update_inquiry_category(
    AxumState(app_state): AxumState<AppState>,
    ScopedActor(actor): ScopedActor,
    request_id: RequestId,
    ApiPath((inquiry_id, category_id)): ApiPath<(i64, i64)>,
    ApiJson(req): ApiJson<UpdateInquiryCategoryRequest>,
) -> Result<Json<InquiryCategoryResponse>, HttpError> {
    info!(
        actor_id = actor.id,
        inquiry_id,
        category_id,
        event = %req.event,
        "Handling update_inquiry_category request"
    );
    let response: InquiryCategoryResponse = clark_api::update_inquiry_category(
        &app_state.services,
        &actor,
        inquiry_id,
        category_id,
        &req,
        cause(request_id, "update_inquiry_category"),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/api/admin/inquiries/{id}/finalize`.
async fn handle_finalize_inquiry(
    AxumState(app_state): AxumState<AppState>,
    ScopedActor(actor): ScopedActor,
    ApiPath(inquiry_id): ApiPath<i64>,
) -> Result<Json<EnqueueJobResponse>, HttpError> {
    let response: EnqueueJobResponse = clark_api::enqueue_finalize_inquiry(
        &app_state.services,
        &actor,
        inquiry_id,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/api/admin/payback/recalculate`.
async fn handle_recalculate_payback(
    AxumState(app_state): AxumState<AppState>,
    ScopedActor(actor): ScopedActor,
) -> Result<Json<EnqueueJobResponse>, HttpError> {
    let response: EnqueueJobResponse = clark_api::enqueue_payback_recalculation(
        &app_state.services,
        &actor,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/api/admin/payback/{customer_id}/transactions`.
async fn handle_credit_payback_points(
    AxumState(app_state): AxumState<AppState>,
    ScopedActor(actor): ScopedActor,
    ApiPath(customer_id): ApiPath<i64>,
    ApiJson(req): ApiJson<CreditPaybackPointsRequest>,
) -> Result<Json<CreditPaybackPointsResponse>, HttpError> {
    info!(
        actor_id = actor.id,
        customer_id,
        kind = %req.kind,
        points = req.points,
        "Handling credit_payback_points request"
    );
    let response: CreditPaybackPointsResponse = clark_api::credit_payback_points(
        &app_state.services,
        &actor,
        customer_id,
        &req,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/api/admin/offers/expire`.
async fn handle_expire_offers(
    AxumState(app_state): AxumState<AppState>,
    ScopedActor(actor): ScopedActor,
) -> Result<Json<EnqueueJobResponse>, HttpError> {
    let response: EnqueueJobResponse =
        clark_api::enqueue_offer_expiry(&app_state.services, &actor, OffsetDateTime::now_utc())?;
    Ok(Json(response))
}

/// Handler for GET `/api/admin/notifications`.
async fn handle_list_notifications(
    AxumState(app_state): AxumState<AppState>,
    ScopedActor(actor): ScopedActor,
    ApiQuery(query): ApiQuery<ListNotificationsRequest>,
) -> Result<Json<ListNotificationsResponse>, HttpError> {
    let response: ListNotificationsResponse =
        clark_api::list_notifications(&app_state.services, &actor, &query)?;
    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/api/customer/contracts/under_analysis",
            get(handle_list_contracts_under_analysis),
        )
        .route("/api/customer/contracts/{id}", get(handle_get_contract_details))
        .route(
            "/api/customer/contracts/{id}/provide_details",
            post(handle_provide_details),
        )
        .route(
            "/api/customer/contracts/{id}/cancel_analysis",
            post(handle_cancel_analysis),
        )
        .route(
            "/api/customer/contracts/{id}/documents",
            post(handle_upload_documents),
        )
        .route("/api/customer/offers/{id}/accept", post(handle_accept_offer))
        .route("/api/customer/inquiries/grouped", get(handle_grouped_inquiries))
        .route("/api/customer/payback", post(handle_enroll_payback))
        .route("/api/customer/messenger", get(messenger_handler))
        .route(
            "/api/admin/contracts/{id}/analysis_state",
            post(handle_update_analysis_state),
        )
        .route(
            "/api/admin/contracts/{id}/request_correction",
            post(handle_request_correction),
        )
        .route(
            "/api/admin/opportunities/{id}/move_to_success",
            post(handle_move_to_success),
        )
        .route(
            "/api/admin/inquiries/{id}/categories/{category_id}",
            post(handle_update_inquiry_category),
        )
        .route(
            "/api/admin/inquiries/{id}/finalize",
            post(handle_finalize_inquiry),
        )
        .route("/api/admin/payback/recalculate", post(handle_recalculate_payback))
        .route(
            "/api/admin/payback/{customer_id}/transactions",
            post(handle_credit_payback_points),
        )
        .route("/api/admin/offers/expire", post(handle_expire_offers))
        .route("/api/admin/notifications", get(handle_list_notifications))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Clark Server");

    let config: ClarkConfig = args.config()?;

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let app_state: AppState = build_app_state(persistence, config);

    tokio::spawn(worker::run(
        Arc::clone(&app_state.services),
        std::time::Duration::from_secs(args.maintenance_interval_secs),
    ));

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode as HttpStatusCode},
    };
    use clark::{ContractRepository, OpportunityRepository};
    use clark_api::{ACTOR_ID_HEADER, SCOPE_HEADER};
    use clark_domain::{
        AnalysisState, Contract, ContractState, CustomerId, NewContract, NewOpportunity,
        Opportunity, OpportunityState, SubcompanyId,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    const CUSTOMER_ID: i64 = 7;

    /// Helper to create test app state with in-memory persistence.
    fn create_test_app_state() -> AppState {
        let persistence: Persistence =
            Persistence::new_in_memory().expect("Failed to create in-memory persistence");
        build_app_state(persistence, ClarkConfig::default())
    }

    fn create_test_contract(app_state: &AppState, analysis_state: AnalysisState) -> Contract {
        app_state
            .services
            .contracts
            .create_contract(NewContract {
                customer_id: CustomerId::new(CUSTOMER_ID),
                state: ContractState::DetailsAvailable,
                analysis_state: Some(analysis_state),
                category_ident: String::from("liability"),
                subcompany_id: Some(SubcompanyId::new(11)),
            })
            .expect("Failed to create contract")
    }

    fn scoped(method: &str, uri: &str, scope: &str, actor_id: i64) -> axum::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(SCOPE_HEADER, scope)
            .header(ACTOR_ID_HEADER, actor_id.to_string())
            .header("content-type", "application/json")
    }

    async fn send(app: &Router, request: Request<Body>) -> (HttpStatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap()
        };
        (status, body)
    }

    #[test]
    fn test_default_args_build_default_config() {
        let args: Args = Args::parse_from(["clark-server"]);

        let config: ClarkConfig = args.config().unwrap();

        assert_eq!(config, ClarkConfig::default());
    }

    #[test]
    fn test_unknown_timezone_is_rejected() {
        let args: Args = Args::parse_from(["clark-server", "--timezone", "Mars/Olympus"]);

        assert!(matches!(args.config(), Err(DomainError::InvalidTimezone(_))));
    }

    #[tokio::test]
    async fn test_missing_scope_headers_return_401_envelope() {
        let app: Router = build_router(create_test_app_state());

        let (status, body) = send(
            &app,
            Request::builder()
                .uri("/api/customer/contracts/under_analysis")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
        assert_eq!(body["errors"][0]["status"], "401");
        assert_eq!(body["errors"][0]["title"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_admin_on_customer_route_returns_403() {
        let app: Router = build_router(create_test_app_state());

        let (status, _) = send(
            &app,
            scoped("GET", "/api/customer/inquiries/grouped", "admin", 3)
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, HttpStatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_list_contracts_under_analysis() {
        let app_state: AppState = create_test_app_state();
        let contract: Contract = create_test_contract(&app_state, AnalysisState::UnderAnalysis);
        create_test_contract(&app_state, AnalysisState::DetailsMissing);
        let app: Router = build_router(app_state);

        let (status, body) = send(
            &app,
            scoped(
                "GET",
                "/api/customer/contracts/under_analysis?limit=10",
                "lead",
                CUSTOMER_ID,
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await;

        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(body["total_count"], 1);
        assert_eq!(body["limit"], 10);
        assert_eq!(body["contracts"][0]["contract"]["id"], contract.id.value());
    }

    #[tokio::test]
    async fn test_enroll_payback_returns_201_then_200() {
        let app: Router = build_router(create_test_app_state());
        let body = r#"{"payback_number":"3083640123"}"#;

        let (first, first_body) = send(
            &app,
            scoped("POST", "/api/customer/payback", "user", CUSTOMER_ID)
                .body(Body::from(body))
                .unwrap(),
        )
        .await;
        let (second, second_body) = send(
            &app,
            scoped("POST", "/api/customer/payback", "user", CUSTOMER_ID)
                .body(Body::from(body))
                .unwrap(),
        )
        .await;

        assert_eq!(first, HttpStatusCode::CREATED);
        assert_eq!(first_body["created"], true);
        assert_eq!(second, HttpStatusCode::OK);
        assert_eq!(second_body["created"], false);
    }

    #[tokio::test]
    async fn test_enroll_payback_malformed_number_returns_422_with_field() {
        let app: Router = build_router(create_test_app_state());

        let (status, body) = send(
            &app,
            scoped("POST", "/api/customer/payback", "user", CUSTOMER_ID)
                .body(Body::from(r#"{"payback_number":"12"}"#))
                .unwrap(),
        )
        .await;

        assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"][0]["meta"]["data"]["payback_number"].is_string());
    }

    #[tokio::test]
    async fn test_accept_unknown_offer_returns_404() {
        let app: Router = build_router(create_test_app_state());

        let (status, body) = send(
            &app,
            scoped("POST", "/api/customer/offers/999/accept", "user", CUSTOMER_ID)
                .body(Body::from(r#"{"option_id":1}"#))
                .unwrap(),
        )
        .await;

        assert_eq!(status, HttpStatusCode::NOT_FOUND);
        assert_eq!(body["errors"][0]["status"], "404");
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected_in_error_envelope() {
        let app: Router = build_router(create_test_app_state());

        let (status, body) = send(
            &app,
            scoped("POST", "/api/customer/offers/1/accept", "user", CUSTOMER_ID)
                .body(Body::from(r#"{"option_id":"#))
                .unwrap(),
        )
        .await;

        assert_eq!(status, HttpStatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["status"], "400");
        assert!(body["errors"][0]["meta"]["data"]["body"].is_string());
    }

    #[tokio::test]
    async fn test_non_numeric_path_id_is_rejected_in_error_envelope() {
        let app: Router = build_router(create_test_app_state());

        let (status, body) = send(
            &app,
            scoped("POST", "/api/customer/offers/abc/accept", "user", CUSTOMER_ID)
                .body(Body::from(r#"{"option_id":1}"#))
                .unwrap(),
        )
        .await;

        assert_eq!(status, HttpStatusCode::BAD_REQUEST);
        assert!(body["errors"][0]["meta"]["data"]["path"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_analysis_event_returns_400() {
        let app_state: AppState = create_test_app_state();
        let contract: Contract = create_test_contract(&app_state, AnalysisState::UnderAnalysis);
        let app: Router = build_router(app_state);

        let (status, body) = send(
            &app,
            scoped(
                "POST",
                &format!("/api/admin/contracts/{}/analysis_state", contract.id),
                "admin",
                3,
            )
            .body(Body::from(r#"{"event":"approve"}"#))
            .unwrap(),
        )
        .await;

        assert_eq!(status, HttpStatusCode::BAD_REQUEST);
        assert!(body["errors"][0]["meta"]["data"]["event"].is_string());
    }

    #[tokio::test]
    async fn test_analysis_event_records_notification_per_channel() {
        let app_state: AppState = create_test_app_state();
        let contract: Contract = create_test_contract(&app_state, AnalysisState::UnderAnalysis);
        let app: Router = build_router(app_state);

        let (status, body) = send(
            &app,
            scoped(
                "POST",
                &format!("/api/admin/contracts/{}/analysis_state", contract.id),
                "admin",
                3,
            )
            .header("x-request-id", "req-analysis-1")
            .body(Body::from(r#"{"event":"complete_analysis"}"#))
            .unwrap(),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(body["contract"]["analysis_state"], "details_complete");

        let (status, body) = send(
            &app,
            scoped(
                "GET",
                &format!(
                    "/api/admin/notifications?entity_kind=contract&entity_id={}",
                    contract.id
                ),
                "admin",
                3,
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await;

        assert_eq!(status, HttpStatusCode::OK);
        let notifications = body["notifications"].as_array().unwrap();
        assert_eq!(notifications.len(), 2);
        let statuses: Vec<(&str, &str)> = notifications
            .iter()
            .map(|n| {
                (
                    n["channel"].as_str().unwrap(),
                    n["status"].as_str().unwrap(),
                )
            })
            .collect();
        assert!(statuses.contains(&("email", "delivered")));
        assert!(statuses.contains(&("messenger", "failed")));
    }

    #[tokio::test]
    async fn test_move_to_success_twice_returns_422() {
        let app_state: AppState = create_test_app_state();
        let opportunity: Opportunity = app_state
            .services
            .opportunities
            .create_opportunity(NewOpportunity {
                customer_id: CustomerId::new(CUSTOMER_ID),
                admin_id: None,
                state: OpportunityState::OfferPhase,
            })
            .unwrap();
        let app: Router = build_router(app_state);
        let uri: String = format!("/api/admin/opportunities/{}/move_to_success", opportunity.id);

        let (first, _) = send(
            &app,
            scoped("POST", &uri, "admin", 3).body(Body::empty()).unwrap(),
        )
        .await;
        let (second, body) = send(
            &app,
            scoped("POST", &uri, "admin", 3).body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(first, HttpStatusCode::OK);
        assert_eq!(second, HttpStatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"][0]["meta"]["data"]["transition"].is_string());
    }

    #[tokio::test]
    async fn test_recalculation_enqueue_is_idempotent() {
        let app: Router = build_router(create_test_app_state());

        let (status, first) = send(
            &app,
            scoped("POST", "/api/admin/payback/recalculate", "admin", 3)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        let (_, second) = send(
            &app,
            scoped("POST", "/api/admin/payback/recalculate", "admin", 3)
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(first["job"], "recalculate_payback_points");
        assert_eq!(first["enqueued"], true);
        assert_eq!(second["enqueued"], false);
    }

    #[test]
    fn test_worker_runs_scheduled_maintenance() {
        let app_state: AppState = create_test_app_state();
        let now: OffsetDateTime = OffsetDateTime::now_utc();

        worker::schedule_maintenance(&app_state.services, now);
        let report = worker::tick(&app_state.services, now).unwrap();

        assert_eq!(report.succeeded, 2);
        assert!(app_state.services.jobs.pending().unwrap().is_empty());
    }
}
