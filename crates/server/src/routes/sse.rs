use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::IntoResponse;
use events::{DeploymentEvents, Event, EventEnvelope};
use futures::stream::{self, StreamExt};
use uuid::Uuid;

use crate::error::AppError;
use crate::routes::DeploymentStatusResponse;
use crate::state::AppState;

pub const SSE_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Name of the first event on every stream: the record as it stood when the
/// client subscribed.
pub const SNAPSHOT_EVENT: &str = "deployment.snapshot";

fn event_type(event: &Event) -> &'static str {
    match event {
        Event::DeploymentCreated { .. } => "deployment.created",
        Event::DeploymentStatusChanged { .. } => "deployment.status_changed",
        Event::DeploymentProgress { .. } => "deployment.progress",
        Event::DeploymentLogAppended { .. } => "deployment.log_appended",
    }
}

fn envelope_to_sse_event(envelope: &EventEnvelope) -> Result<SseEvent, Infallible> {
    let data = serde_json::to_string(envelope).unwrap_or_else(|_| "{}".to_string());

    Ok(SseEvent::default()
        .id(envelope.id.to_string())
        .event(event_type(&envelope.event))
        .data(data))
}

fn snapshot_to_sse_event(snapshot: &DeploymentStatusResponse) -> Result<SseEvent, Infallible> {
    let data = serde_json::to_string(snapshot).unwrap_or_else(|_| "{}".to_string());

    Ok(SseEvent::default().event(SNAPSHOT_EVENT).data(data))
}

/// Yields events until the terminal status change, which is sent last.
async fn next_until_terminal(
    events: Option<DeploymentEvents>,
) -> Option<(Result<SseEvent, Infallible>, Option<DeploymentEvents>)> {
    let mut events = events?;
    let envelope = events.next().await?;
    let rest = if envelope.event.is_terminal() {
        None
    } else {
        Some(events)
    };
    Some((envelope_to_sse_event(&envelope), rest))
}

#[utoipa::path(
    get,
    path = "/api/v1/deployments/{id}/events",
    params(("id" = Uuid, Path, description = "Deployment ID")),
    responses(
        (status = 200, description = "SSE stream: a snapshot, then live events until the deployment finishes"),
        (status = 404, description = "Deployment not found", body = crate::error::ErrorResponse)
    ),
    tag = "deployments"
)]
pub async fn deployment_events(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    // Subscribe before reading the record so no change falls in between.
    let events = state.event_bus.subscribe_deployment(id);
    let deployment = state.deployments.get(id).await?;

    let live = (!deployment.status.is_terminal()).then_some(events);
    let snapshot = snapshot_to_sse_event(&DeploymentStatusResponse::from(deployment));
    let stream = stream::once(async move { snapshot }).chain(stream::unfold(live, next_until_terminal));

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(SSE_KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    ))
}
