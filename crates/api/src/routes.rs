use crate::error::ApiError;
use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use radar_core::analytics::aggregate::{
    count_by, count_by_day, cross_tab, grouped_mean, share_above_threshold, top_by, CrossTab,
};
use radar_core::analytics::overview::Overview;
use radar_core::config::Settings;
use radar_core::domain::dimension::{Dimension, Metric};
use radar_core::domain::movement::{Kind, MovementCollection};
use radar_core::domain::recommendation::RecommendationResult;
use radar_core::query::Criteria;
use radar_core::session::Session;
use radar_core::time::window::DateWindow;
use radar_core::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

const MAX_SESSION_SIZE: usize = 100_000;
const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone)]
pub struct AppState {
    settings: Arc<Settings>,
    sessions: Arc<RwLock<SessionStore>>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
            sessions: Arc::new(RwLock::new(SessionStore::default())),
        }
    }

    async fn session(&self, id: Uuid) -> Result<Arc<Session>, ApiError> {
        self.sessions
            .read()
            .await
            .get(id)
            .ok_or(ApiError::SessionNotFound(id))
    }
}

/// Open sessions, bounded by `Settings::max_sessions`.
#[derive(Debug, Default)]
struct SessionStore {
    entries: HashMap<Uuid, StoredSession>,
    next_seq: u64,
}

#[derive(Debug)]
struct StoredSession {
    // Breaks ties between sessions created within the same clock tick.
    seq: u64,
    session: Arc<Session>,
}

impl SessionStore {
    fn get(&self, id: Uuid) -> Option<Arc<Session>> {
        self.entries.get(&id).map(|e| e.session.clone())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    /// Inserts `session`, first evicting the oldest sessions so at most `max` remain.
    /// Returns the evicted ids.
    fn insert(&mut self, session: Arc<Session>, max: usize) -> Vec<Uuid> {
        let mut evicted = Vec::new();
        while !self.entries.is_empty() && self.entries.len() >= max {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, e)| (e.session.created_at, e.seq))
                .map(|(id, _)| *id);
            let Some(id) = oldest else { break };
            self.entries.remove(&id);
            evicted.push(id);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(session.id, StoredSession { seq, session });
        evicted
    }

    fn remove(&mut self, id: Uuid) -> bool {
        self.entries.remove(&id).is_some()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", delete(delete_session))
        .route("/sessions/:id/movements", get(list_movements))
        .route("/sessions/:id/overview", get(get_overview))
        .route("/sessions/:id/counts/:dimension", get(get_counts))
        .route("/sessions/:id/crosstab/:row/:column", get(get_cross_tab))
        .route("/sessions/:id/means/:dimension/:metric", get(get_grouped_mean))
        .route("/sessions/:id/share/:metric/:threshold", get(get_share))
        .route("/sessions/:id/timeline", get(get_timeline))
        .route("/sessions/:id/top/:metric", get(get_top))
        .route("/recommendations/:category", get(get_recommendation))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

/// Dashboard filter widgets as query parameters. List values are comma separated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    pub companies: Option<String>,
    pub territories: Option<String>,
    pub categories: Option<String>,
    pub kinds: Option<String>,
    pub min_relevance: Option<u8>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl FilterParams {
    pub fn into_criteria(self) -> Result<Criteria, CoreError> {
        let kinds = split_list(self.kinds.as_deref())
            .into_iter()
            .map(|k| k.parse::<Kind>())
            .collect::<Result<Vec<_>, _>>()?;

        let date_range = match (self.start.as_deref(), self.end.as_deref()) {
            (None, None) => None,
            (Some(start), Some(end)) => Some(DateWindow::parse(start, end)?),
            _ => {
                return Err(CoreError::invalid_argument(
                    "`start` and `end` must be given together",
                ))
            }
        };

        Ok(Criteria {
            companies: split_list(self.companies.as_deref()).into_iter().collect(),
            territories: split_list(self.territories.as_deref()).into_iter().collect(),
            categories: split_list(self.categories.as_deref()).into_iter().collect(),
            kinds: kinds.into_iter().collect(),
            min_relevance: self.min_relevance,
            date_range,
        })
    }
}

fn split_list(v: Option<&str>) -> Vec<String> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

async fn filtered(
    state: &AppState,
    id: Uuid,
    params: FilterParams,
) -> Result<MovementCollection, ApiError> {
    let session = state.session(id).await?;
    let criteria = params.into_criteria()?;
    Ok(session.filter(&criteria)?)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub n: Option<usize>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub movements: usize,
    pub window: DateWindow,
}

async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionCreated>), ApiError> {
    let settings = state.settings.clone();
    let n = req.n.unwrap_or(settings.sample_size);
    if n > MAX_SESSION_SIZE {
        return Err(CoreError::invalid_argument(format!(
            "session size must be at most {MAX_SESSION_SIZE} (got {n})"
        ))
        .into());
    }

    let window = match (req.start.as_deref(), req.end.as_deref()) {
        (None, None) => settings.window,
        (start, end) => {
            let default_start = settings.window.start().to_string();
            let default_end = settings.window.end().to_string();
            DateWindow::parse(
                start.unwrap_or(&default_start),
                end.unwrap_or(&default_end),
            )?
        }
    };
    let seed = req.seed.or(settings.seed);

    let session = tokio::task::spawn_blocking(move || {
        Session::generate(n, &window, settings.domains.clone(), seed)
    })
    .await
    .context("session generation task failed")??;

    let created = SessionCreated {
        session_id: session.id,
        created_at: session.created_at,
        movements: session.movements().len(),
        window,
    };
    let max_sessions = state.settings.max_sessions;
    let mut sessions = state.sessions.write().await;
    for evicted in sessions.insert(Arc::new(session), max_sessions) {
        tracing::info!(session_id = %evicted, max_sessions, "evicted oldest session");
    }
    tracing::debug!(open_sessions = sessions.len(), "session stored");

    Ok((StatusCode::CREATED, Json(created)))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.sessions.write().await.remove(id) {
        return Err(ApiError::SessionNotFound(id));
    }
    tracing::info!(session_id = %id, "session closed");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct MovementsResponse {
    pub total: usize,
    pub movements: MovementCollection,
}

async fn list_movements(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<FilterParams>,
) -> Result<Json<MovementsResponse>, ApiError> {
    let movements = filtered(&state, id, params).await?;
    Ok(Json(MovementsResponse {
        total: movements.len(),
        movements,
    }))
}

async fn get_overview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Overview>, ApiError> {
    let movements = filtered(&state, id, params).await?;
    Ok(Json(Overview::compute(&movements)))
}

async fn get_counts(
    State(state): State<AppState>,
    Path((id, dimension)): Path<(Uuid, String)>,
    Query(params): Query<FilterParams>,
) -> Result<Json<BTreeMap<String, usize>>, ApiError> {
    let dimension = dimension.parse::<Dimension>()?;
    let movements = filtered(&state, id, params).await?;
    Ok(Json(count_by(&movements, dimension)))
}

async fn get_cross_tab(
    State(state): State<AppState>,
    Path((id, row, column)): Path<(Uuid, String, String)>,
    Query(params): Query<FilterParams>,
) -> Result<Json<CrossTab>, ApiError> {
    let row = row.parse::<Dimension>()?;
    let column = column.parse::<Dimension>()?;
    let movements = filtered(&state, id, params).await?;
    Ok(Json(cross_tab(&movements, row, column)))
}

async fn get_grouped_mean(
    State(state): State<AppState>,
    Path((id, dimension, metric)): Path<(Uuid, String, String)>,
    Query(params): Query<FilterParams>,
) -> Result<Json<BTreeMap<String, f64>>, ApiError> {
    let dimension = dimension.parse::<Dimension>()?;
    let metric = metric.parse::<Metric>()?;
    let movements = filtered(&state, id, params).await?;
    Ok(Json(grouped_mean(&movements, dimension, metric)))
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub metric: Metric,
    pub threshold: f64,
    pub share: f64,
}

async fn get_share(
    State(state): State<AppState>,
    Path((id, metric, threshold)): Path<(Uuid, String, f64)>,
    Query(params): Query<FilterParams>,
) -> Result<Json<ShareResponse>, ApiError> {
    let metric = metric.parse::<Metric>()?;
    let movements = filtered(&state, id, params).await?;
    let share = share_above_threshold(&movements, metric, threshold)?;
    Ok(Json(ShareResponse {
        metric,
        threshold,
        share,
    }))
}

async fn get_timeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<FilterParams>,
) -> Result<Json<BTreeMap<NaiveDate, usize>>, ApiError> {
    let movements = filtered(&state, id, params).await?;
    Ok(Json(count_by_day(&movements)))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopParams {
    pub n: Option<usize>,
}

// Both query extractors read the same query string; each ignores the other's keys.
async fn get_top(
    State(state): State<AppState>,
    Path((id, metric)): Path<(Uuid, String)>,
    Query(top): Query<TopParams>,
    Query(params): Query<FilterParams>,
) -> Result<Json<MovementCollection>, ApiError> {
    let metric = metric.parse::<Metric>()?;
    let movements = filtered(&state, id, params).await?;
    Ok(Json(top_by(&movements, metric, top.n.unwrap_or(DEFAULT_TOP_N))))
}

async fn get_recommendation(
    Path(category): Path<String>,
) -> Result<Json<RecommendationResult>, ApiError> {
    Ok(Json(radar_core::decision::recommend_by_name(&category)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        state_with(|_| None)
    }

    fn state_with(extra: impl Fn(&str) -> Option<String>) -> AppState {
        let settings = Settings::from_lookup(|key| match key {
            "RADAR_SAMPLE_SIZE" => Some("35".to_string()),
            _ => extra(key),
        })
        .unwrap();
        AppState::new(settings)
    }

    async fn open(state: &AppState, seed: u64) -> Uuid {
        let (status, Json(created)) = create_session(
            State(state.clone()),
            Json(CreateSessionRequest {
                seed: Some(seed),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.movements, 35);
        created.session_id
    }

    #[tokio::test]
    async fn session_round_trip_through_the_handlers() {
        let state = state();
        let id = open(&state, 42).await;

        let Json(all) =
            list_movements(State(state.clone()), Path(id), Query(FilterParams::default()))
                .await
                .unwrap();
        assert_eq!(all.total, 35);

        let Json(kinds) = get_counts(
            State(state.clone()),
            Path((id, "kind".to_string())),
            Query(FilterParams {
                min_relevance: Some(4),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert!(kinds.values().sum::<usize>() <= 35);

        let Json(table) = get_cross_tab(
            State(state.clone()),
            Path((id, "company".to_string(), "territory".to_string())),
            Query(FilterParams::default()),
        )
        .await
        .unwrap();
        assert_eq!(table.total(), 35);
    }

    #[tokio::test]
    async fn top_returns_highest_engagement_first() {
        let state = state();
        let id = open(&state, 77).await;
        let Json(top) = get_top(
            State(state),
            Path((id, "engagement".to_string())),
            Query(TopParams { n: Some(5) }),
            Query(FilterParams::default()),
        )
        .await
        .unwrap();
        assert_eq!(top.len(), 5);
        let engagement: Vec<u32> = top.iter().map(|m| m.engagement).collect();
        assert!(engagement.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn deleted_session_is_gone() {
        let state = state();
        let id = open(&state, 5).await;

        let status = delete_session(State(state.clone()), Path(id)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = get_overview(State(state.clone()), Path(id), Query(FilterParams::default()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = delete_session(State(state), Path(id)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deleting_an_unknown_session_is_not_found() {
        let err = delete_session(State(state()), Path(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn oldest_session_is_evicted_at_capacity() {
        let state = state_with(|key| (key == "RADAR_MAX_SESSIONS").then(|| "2".to_string()));
        let first = open(&state, 1).await;
        let second = open(&state, 2).await;
        let third = open(&state, 3).await;

        assert_eq!(state.sessions.read().await.len(), 2);
        let err = state.session(first).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(state.session(second).await.is_ok());
        assert!(state.session(third).await.is_ok());

        let fourth = open(&state, 4).await;
        assert!(state.session(second).await.is_err());
        assert!(state.session(third).await.is_ok());
        assert!(state.session(fourth).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let err = get_overview(
            State(state()),
            Path(Uuid::new_v4()),
            Query(FilterParams::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn bad_filters_and_dimensions_are_bad_requests() {
        let state = state();
        let id = open(&state, 1).await;

        let err = list_movements(
            State(state.clone()),
            Path(id),
            Query(FilterParams {
                companies: Some("Natura,Initech".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = get_counts(
            State(state.clone()),
            Path((id, "region".to_string())),
            Query(FilterParams::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = get_timeline(
            State(state),
            Path(id),
            Query(FilterParams {
                start: Some("2024-01-01".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn share_over_an_empty_selection_is_no_data() {
        let state = state();
        let id = open(&state, 9).await;
        let err = get_share(
            State(state),
            Path((id, "relevance".to_string(), 4.0)),
            Query(FilterParams {
                min_relevance: Some(6),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn recommendations_by_category_name() {
        let Json(res) = get_recommendation(Path("product_improvement".to_string()))
            .await
            .unwrap();
        assert_eq!(res.chosen, vec!["Price", "Fragrance"]);

        let err = get_recommendation(Path("world_domination".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn filter_params_split_and_parse() {
        let criteria = FilterParams {
            companies: Some(" Natura , Avon,".to_string()),
            kinds: Some("Bomba,covert".to_string()),
            start: Some("2024-01-01".to_string()),
            end: Some("2024-03-31".to_string()),
            ..Default::default()
        }
        .into_criteria()
        .unwrap();
        assert_eq!(criteria.companies.len(), 2);
        assert!(criteria.kinds.contains(&Kind::Major));
        assert!(criteria.kinds.contains(&Kind::Covert));
        assert_eq!(criteria.date_range.map(|r| r.num_days()), Some(91));
        assert!(criteria.territories.is_empty());
    }
}
