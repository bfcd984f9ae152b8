//! HTTP surface of the wiki
//!
//! Thin axum layer over the page model: every request builds a fresh
//! [`Page`], runs the store operations it needs, and renders the result.
//! Failures on the git side degrade to empty content rather than error
//! pages; only the glob listing can fail a request outright.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use tower_http::services::ServeDir;

use crate::listing::list_pages;
use crate::page::{clean_path, has_hidden_segment, Page, PAGE_EXTENSION};
use crate::render::{render_listing, render_page};
use crate::store::Repository;

/// Shared server state; one per running wiki.
pub struct WikiState {
    pub repo: Repository,
}

/// Query parameters recognized on page views.
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    /// Show the edit form instead of the rendered page.
    pub edit: Option<String>,
    /// Show the revision history below the page.
    pub show_revisions: Option<String>,
    /// View the page at this revision instead of head.
    pub revision: Option<String>,
}

/// Form fields accepted on page POSTs. Exactly one action is taken,
/// checked in order: rename, revert, save.
#[derive(Debug, Default, Deserialize)]
pub struct EditForm {
    pub content: Option<String>,
    pub msg: Option<String>,
    pub author: Option<String>,
    pub revert: Option<String>,
    pub rename: Option<String>,
}

/// Build the wiki router.
///
/// `theme_dir`, when given, is served under `/theme/` for stylesheets and
/// other static assets.
pub fn router(state: Arc<WikiState>, theme_dir: Option<PathBuf>) -> Router {
    let mut router = Router::new()
        .route("/", get(show_index))
        .route("/{*path}", get(show_page).post(edit_page));
    if let Some(dir) = theme_dir {
        router = router.nest_service("/theme", ServeDir::new(dir));
    }
    router.with_state(state)
}

/// Root view: index of the top-level pages.
async fn show_index(State(state): State<Arc<WikiState>>) -> Response {
    directory_listing(&state.repo, "/").await
}

async fn show_page(
    State(state): State<Arc<WikiState>>,
    Path(path): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Response {
    let repo = &state.repo;

    // Never resolve dot-leading segments (.git and friends), before any
    // repository command runs.
    if has_hidden_segment(&path) {
        return StatusCode::NOT_FOUND.into_response();
    }
    if path == "index.html" {
        return Redirect::to("/").into_response();
    }
    // Canonical URLs carry no .md suffix
    if let Some(stripped) = path.strip_suffix(PAGE_EXTENSION) {
        return Redirect::to(&format!("/{}", clean_path(stripped))).into_response();
    }
    // A trailing slash means a directory index
    if path.ends_with('/') {
        let dir = format!("/{}", clean_path(&path));
        return directory_listing(repo, &dir).await;
    }
    // Existing non-page files in the repository are static resources
    if let Some(response) = serve_static(repo, &clean_path(&path)).await {
        return response;
    }

    let mut page = Page::new(&path);
    page.revision = query.revision.clone().unwrap_or_default();
    log::debug!("showing {:?} at revision {:?}", page.file, page.revision);
    page.load_revision(repo).await;
    page.load_history(repo).await;

    let edit = query.edit.as_deref().is_some_and(|v| !v.is_empty());
    let show_revisions = query
        .show_revisions
        .as_deref()
        .is_some_and(|v| !v.is_empty());
    Html(render_page(&page, edit, show_revisions)).into_response()
}

async fn edit_page(
    State(state): State<Arc<WikiState>>,
    Path(path): Path<String>,
    Form(form): Form<EditForm>,
) -> Response {
    let repo = &state.repo;

    if has_hidden_segment(&path) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let mut page = Page::new(&path);
    let author = form.author.as_deref().unwrap_or("");

    if let Some(target) = form.rename.as_deref().filter(|t| !t.is_empty()) {
        if has_hidden_segment(target) {
            return StatusCode::NOT_FOUND.into_response();
        }
        match page.rename(repo, target, author).await {
            Ok(()) => return Redirect::to(&page.path).into_response(),
            Err(e) => {
                log::error!("rename of {} failed: {}", page.file, e);
                return Redirect::to(&page.path).into_response();
            }
        }
    }

    if let Some(revision) = form.revert.as_deref().filter(|r| !r.is_empty()) {
        page.revision = revision.to_string();
        page.revert(repo).await;
        page.commit(repo, &format!("Reverted to: {revision}"), author)
            .await;
        return Redirect::to(&page.path).into_response();
    }

    if let Some(content) = form.content.as_deref().filter(|c| !c.is_empty()) {
        let message = form.msg.as_deref().unwrap_or("");
        if let Err(e) = page.save(repo, content, message, author).await {
            log::error!("cannot save {}: {}", page.file, e);
        }
        return Redirect::to(&page.path).into_response();
    }

    // Nothing to do; bounce back to the page view
    Redirect::to(&page.path).into_response()
}

/// Render the glob listing for a directory path ending in `/`.
async fn directory_listing(repo: &Repository, dir: &str) -> Response {
    let pattern = if dir == "/" {
        "*".to_string()
    } else {
        format!("{}/*", dir.trim_matches('/'))
    };
    match list_pages(repo, &pattern).await {
        Ok(pages) => Html(render_listing(dir, &pages)).into_response(),
        Err(e) => {
            log::error!("listing {:?} failed: {}", pattern, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Content types for static files served out of the repository.
const STATIC_MIME_TYPES: &[(&str, &str)] = &[
    ("css", "text/css"),
    ("gif", "image/gif"),
    ("html", "text/html"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("js", "text/javascript"),
    ("png", "image/png"),
    ("svg", "image/svg+xml"),
    ("txt", "text/plain"),
];

/// Serve a non-page file straight from the repository working tree, if it
/// exists. Page URLs never collide with this: their backing files carry
/// the `.md` suffix the URL lacks.
async fn serve_static(repo: &Repository, file: &str) -> Option<Response> {
    if file.is_empty() {
        return None;
    }
    let full = repo.file_path(file);
    let metadata = tokio::fs::metadata(&full).await.ok()?;
    if !metadata.is_file() {
        return None;
    }
    let bytes = match tokio::fs::read(&full).await {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("cannot read static file {:?}: {}", full, e);
            return Some(StatusCode::INTERNAL_SERVER_ERROR.into_response());
        }
    };
    let ext = file.rsplit('.').next().unwrap_or("");
    let mime = STATIC_MIME_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, m)| *m)
        .unwrap_or("application/octet-stream");
    Some(
        Response::builder()
            .header(header::CONTENT_TYPE, mime)
            .body(Body::from(bytes))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
    )
}
