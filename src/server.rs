use std::fmt::Write as _;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, Json};
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::formats::TabularRow;
use crate::store::{Store, StoreError};
use crate::view::{FilterState, filter_rows, season_rows};

#[derive(Clone)]
struct AppState {
    db: Arc<PathBuf>,
}

type HandlerError = (StatusCode, String);

pub fn router(db: PathBuf) -> Router {
    let state = AppState { db: Arc::new(db) };
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(|| async { "ok\n" }))
        .route("/api/seasons", get(list_seasons))
        .route("/api/seasons/:season/rows", get(list_rows))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(db: PathBuf, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(db);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {addr}: {err}"))?;
    tracing::info!(addr = %addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

async fn list_seasons(State(state): State<AppState>) -> Result<Json<Vec<i32>>, HandlerError> {
    let seasons = with_store(&state, |store| store.seasons()).await?;
    Ok(Json(seasons))
}

async fn list_rows(
    State(state): State<AppState>,
    Path(season): Path<i32>,
    Query(filter): Query<FilterState>,
) -> Result<Json<Vec<TabularRow>>, HandlerError> {
    let rows = with_store(&state, |store| store.read_all()).await?;
    let rows = season_rows(&rows, season);
    if rows.is_empty() {
        return Err((StatusCode::NOT_FOUND, format!("unknown season: {season}")));
    }
    Ok(Json(filter_rows(&rows, &filter)))
}

async fn index(
    State(state): State<AppState>,
    Query(filter): Query<FilterState>,
) -> Result<Html<String>, HandlerError> {
    let (seasons, rows) =
        with_store(&state, |store| Ok((store.seasons()?, store.read_all()?))).await?;
    Ok(Html(render_page(&seasons, &rows, &filter)))
}

async fn with_store<T, F>(state: &AppState, query: F) -> Result<T, HandlerError>
where
    T: Send + 'static,
    F: FnOnce(&Store) -> Result<T, StoreError> + Send + 'static,
{
    let db = Arc::clone(&state.db);
    if !Store::exists(db.as_path()) {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            format!("database not populated: {}", db.display()),
        ));
    }
    tokio::task::spawn_blocking(move || {
        let store = Store::open_existing(db.as_path())?;
        query(&store)
    })
    .await
    .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, format!("store task: {err}")))?
    .map_err(|err| {
        tracing::error!(error = %err, "store query failed");
        (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    })
}

fn render_page(seasons: &[i32], rows: &[TabularRow], filter: &FilterState) -> String {
    let mut html = String::new();
    html.push_str(
        r#"<!doctype html>
<html>
  <head><meta charset="utf-8"><title>TOP games by BoardGameCo</title></head>
  <body>
    <h1>TOP games by BoardGameCo</h1>
"#,
    );
    let _ = write!(
        html,
        r#"    <form method="get" action="/">
      <input name="title" placeholder="Game Title" value="{}">
      <input name="player" placeholder="Player" value="{}">
      <button type="submit">Filter</button>
    </form>
"#,
        escape_html(&filter.title),
        escape_html(&filter.player),
    );

    for season in seasons.iter().rev() {
        let visible = filter_rows(&season_rows(rows, *season), filter);
        let _ = write!(
            html,
            "    <h2>{season}</h2>\n    <table>\n      <tr><th>Game</th><th>Player</th><th>Position</th></tr>\n"
        );
        for row in &visible {
            let _ = writeln!(
                html,
                "      <tr><td><strong>{title}</strong> [ {bgg} ] [ {youtube} ]</td><td>{player}</td><td>{position}</td></tr>",
                title = escape_html(&row.title),
                bgg = row.bgg_search,
                youtube = row.youtube_link,
                player = escape_html(&row.player),
                position = row.position,
            );
        }
        html.push_str("    </table>\n");
    }

    html.push_str("  </body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
