use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::bookingdtos::*,
    error::HttpError,
    AppState,
};

pub fn booking_handler() -> Router {
    Router::new()
        .route("/", post(create_job))
        .route("/", get(list_jobs))
        .route("/:job_id", put(update_job))
        .route("/:job_id", get(get_job))
        .route("/job-email", post(store_job_email))
        .route("/accept", post(accept_job))
        .route("/cancel", post(cancel_job))
        .route("/end", post(end_job))
        .route("/customer-not-call", post(customer_not_call))
        .route("/reopen", post(reopen_job))
        .route("/potential/:user_id", get(potential_jobs))
        .route("/user/:user_id", get(user_jobs))
        .route("/user/:user_id/history", get(user_jobs_history))
        .route("/distance-feed", post(distance_feed))
        .route("/resend-notifications", post(resend_notifications))
        .route("/resend-sms", post(resend_sms_notifications))
        // Operator screens
        .route("/alerts", get(session_alerts))
        .route("/expired", get(expired_no_accepted))
        .route("/:job_id/ignore-expiring", put(ignore_expiring))
        .route("/:job_id/ignore-expired", put(ignore_expired))
        .route("/:job_id/ignore-feedback", put(ignore_feedback))
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<u32>,
}

pub async fn create_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let created = app_state.booking_service.create_job(body).await?;

    Ok(Json(ApiResponse::success("Booking created successfully", created)))
}

pub async fn get_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    use crate::db::bookingdb::BookingExt;

    let job = app_state
        .db_client
        .get_job(job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Booking not found"))?;

    Ok(Json(ApiResponse::success("Booking", job)))
}

pub async fn update_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<UpdateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state.booking_service.update_job(job_id, body).await?;

    Ok(Json(ApiResponse::success("Booking updated", job)))
}

pub async fn store_job_email(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<JobEmailDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state.booking_service.store_job_email(body).await?;

    Ok(Json(ApiResponse::success("Booking confirmed", job)))
}

pub async fn list_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(params): Query<JobFilterDto>,
) -> Result<impl IntoResponse, HttpError> {
    params.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let jobs = app_state.booking_service.list_jobs(&params).await?;

    let page = params.page.unwrap_or(1);
    let limit = params.limit.unwrap_or(15);
    Ok(Json(PaginatedResponse {
        status: "success".to_string(),
        total: jobs.len() as i64,
        data: jobs,
        page,
        limit,
    }))
}

pub async fn accept_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<AcceptJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.booking_service.accept_job(body).await?;

    Ok(Json(ApiResponse::success(
        "You have now accepted and received the booking",
        job,
    )))
}

pub async fn cancel_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CancelJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.booking_service.cancel_job(body).await?;

    Ok(Json(ApiResponse::success("Booking cancelled", job)))
}

pub async fn end_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<EndJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.booking_service.end_job(body).await?;

    Ok(Json(ApiResponse::success("Session ended", job)))
}

pub async fn customer_not_call(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CustomerNotCallDto>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.booking_service.customer_not_call(body).await?;

    Ok(Json(ApiResponse::success("Booking closed", job)))
}

pub async fn reopen_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<ReopenJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.booking_service.reopen(body).await?;

    Ok(Json(ApiResponse::success("Booking reopened", job)))
}

pub async fn potential_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state
        .matching_service
        .find_potential_jobs_for_translator(user_id)
        .await?;

    Ok(Json(ApiResponse::success("Potential bookings", jobs)))
}

pub async fn user_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state.booking_service.get_users_jobs(user_id).await?;

    Ok(Json(ApiResponse::success("User bookings", jobs)))
}

pub async fn user_jobs_history(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<PageQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state
        .booking_service
        .get_users_jobs_history(user_id, params.page.unwrap_or(1))
        .await?;

    Ok(Json(ApiResponse::success("Booking history", jobs)))
}

pub async fn distance_feed(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<DistanceFeedDto>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.booking_service.distance_feed(body).await?;

    Ok(Json(ApiResponse::success("Record updated!", job)))
}

pub async fn resend_notifications(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<ResendNotificationsDto>,
) -> Result<impl IntoResponse, HttpError> {
    let count = app_state
        .booking_service
        .resend_notifications(body.job_id)
        .await?;

    Ok(Json(ApiResponse::success("Push sent", count)))
}

pub async fn resend_sms_notifications(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<ResendNotificationsDto>,
) -> Result<impl IntoResponse, HttpError> {
    // SMS transport failures come back as a message, not an error.
    let message = app_state
        .booking_service
        .resend_sms_notifications(body.job_id)
        .await?;

    Ok(Json(ApiResponse::success(&message, ())))
}

pub async fn session_alerts(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state.booking_service.session_alerts().await?;

    Ok(Json(ApiResponse::success("Session alerts", jobs)))
}

pub async fn expired_no_accepted(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state.booking_service.expired_no_accepted().await?;

    Ok(Json(ApiResponse::success("Expired bookings", jobs)))
}

pub async fn ignore_expiring(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    app_state.booking_service.ignore_expiring(job_id).await?;

    Ok(Json(ApiResponse::success("Changes saved", ())))
}

pub async fn ignore_expired(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    app_state.booking_service.ignore_expired(job_id).await?;

    Ok(Json(ApiResponse::success("Changes saved", ())))
}

pub async fn ignore_feedback(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    app_state.booking_service.ignore_feedback(job_id).await?;

    Ok(Json(ApiResponse::success("Changes saved", ())))
}
