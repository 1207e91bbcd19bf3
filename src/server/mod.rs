//! HTTP server

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Form, Path, State},
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cms::ContentRepository;
use crate::editor::{Command, Platform};
use crate::pages::{EditorSession, PageOutcome, SitePages};
use crate::templates::{STYLESHEET, STYLESHEET_PATH};
use crate::Site;

/// Shared server state
pub struct AppState {
    pages: SitePages,
    repo: Arc<dyn ContentRepository>,
    editor: EditorSession,
    static_dir: PathBuf,
}

impl AppState {
    pub fn new(site: &Site, repo: Arc<dyn ContentRepository>) -> Result<Self> {
        Ok(Self {
            pages: SitePages::new(site.config.clone())?,
            editor: EditorSession::new(&site.config.editor),
            static_dir: site.static_dir.clone(),
            repo,
        })
    }
}

/// Build the router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/posts", get(posts_handler))
        .route("/post/:id", get(post_handler))
        .route("/links", get(links_handler))
        .route("/editor", get(editor_handler))
        .route("/editor/command", post(editor_command_handler))
        .route("/editor/text", post(editor_text_handler))
        .route(STYLESHEET_PATH, get(stylesheet_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(
    site: &Site,
    repo: Arc<dyn ContentRepository>,
    ip: &str,
    port: u16,
) -> Result<()> {
    let state = Arc::new(AppState::new(site, repo)?);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn cache_control(seconds: u64) -> HeaderValue {
    HeaderValue::from_str(&format!("s-maxage={}, stale-while-revalidate", seconds))
        .unwrap_or_else(|_| HeaderValue::from_static("no-cache"))
}

fn platform(headers: &HeaderMap) -> Platform {
    headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(Platform::from_user_agent)
        .unwrap_or(Platform::Other)
}

/// 200 page, or a plain 500 if rendering failed
fn page(result: Result<String>) -> Response {
    match result {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render page: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

fn not_found(state: &AppState) -> Response {
    match state.pages.not_found() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

fn content_unavailable(state: &AppState) -> Response {
    let message = "Content unavailable";
    match state.pages.error(message) {
        Ok(html) => (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, message).into_response(),
    }
}

async fn home_handler(State(state): State<Arc<AppState>>) -> Response {
    page(state.pages.home())
}

async fn links_handler(State(state): State<Arc<AppState>>) -> Response {
    page(state.pages.links())
}

async fn posts_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.pages.posts(state.repo.as_ref()).await {
        Ok(html) => {
            let seconds = state.pages.config().posts.revalidate_secs;
            ([(header::CACHE_CONTROL, cache_control(seconds))], Html(html)).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to load posts: {:#}", e);
            content_unavailable(&state)
        }
    }
}

async fn post_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.pages.post(state.repo.as_ref(), &id).await {
        Ok(PageOutcome::Found(html)) => {
            let seconds = state.pages.config().post.revalidate_secs;
            ([(header::CACHE_CONTROL, cache_control(seconds))], Html(html)).into_response()
        }
        Ok(PageOutcome::NotFound) => not_found(&state),
        Err(e) => {
            tracing::error!("Failed to load post {:?}: {:#}", id, e);
            content_unavailable(&state)
        }
    }
}

async fn editor_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    page(state.pages.editor(&state.editor, platform(&headers)))
}

#[derive(Debug, Deserialize)]
struct CommandForm {
    command: String,
    level: Option<u8>,
    generation: u64,
}

async fn editor_command_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CommandForm>,
) -> Response {
    let Some(command) = Command::parse(&form.command, form.level) else {
        return (StatusCode::BAD_REQUEST, "Unknown command").into_response();
    };
    let applied = state.editor.press(command, form.generation);
    tracing::debug!("Editor press {}: applied={}", command, applied);
    Redirect::to("/editor").into_response()
}

#[derive(Debug, Deserialize)]
struct TextForm {
    text: String,
}

async fn editor_text_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<TextForm>,
) -> Response {
    state.editor.append_text(&form.text);
    Redirect::to("/editor").into_response()
}

async fn stylesheet_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

/// Serve files from the static directory, or the 404 page
async fn fallback_handler(State(state): State<Arc<AppState>>, request: Request<Body>) -> Response {
    let mut service = ServeDir::new(&state.static_dir);
    match service.try_call(request).await {
        Ok(response) if response.status() != StatusCode::NOT_FOUND => response.into_response(),
        Ok(_) => not_found(&state),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::{CmsError, FixtureRepository};
    use crate::config::SiteConfig;
    use crate::content::{Post, PostListItem, Slug};
    use async_trait::async_trait;

    struct Offline;

    #[async_trait]
    impl ContentRepository for Offline {
        async fn list_posts(&self) -> Result<Vec<PostListItem>, CmsError> {
            Err(CmsError::Config("offline".to_string()))
        }

        async fn post_by_slug(&self, _slug: &str) -> Result<Option<Post>, CmsError> {
            Err(CmsError::Config("offline".to_string()))
        }

        async fn post_slugs(&self) -> Result<Vec<String>, CmsError> {
            Ok(Vec::new())
        }
    }

    fn record(slug: &str) -> Post {
        Post {
            id: format!("post-{}", slug),
            title: format!("Post {}", slug),
            slug: Some(Slug::new(slug)),
            body: None,
            published_at: Some("2024-01-15T12:00:00Z".to_string()),
            main_image: None,
            author: None,
            categories: None,
        }
    }

    fn state_with(repo: Arc<dyn ContentRepository>) -> (tempfile::TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::with_config(dir.path(), SiteConfig::default());
        std::fs::create_dir_all(&site.static_dir).unwrap();
        (dir, Arc::new(AppState::new(&site, repo).unwrap()))
    }

    fn fixture_state() -> (tempfile::TempDir, Arc<AppState>) {
        state_with(Arc::new(FixtureRepository::new(vec![record("hello")], 20)))
    }

    async fn body(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_posts_sets_cache_control() {
        let (_dir, state) = fixture_state();
        let response = posts_handler(State(state)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "s-maxage=120, stale-while-revalidate"
        );
        assert!(body(response).await.contains(r#"href="/post/hello""#));
    }

    #[tokio::test]
    async fn test_post_found_and_missing() {
        let (_dir, state) = fixture_state();

        let response = post_handler(State(state.clone()), Path("hello".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "s-maxage=60, stale-while-revalidate"
        );

        let response = post_handler(State(state), Path("unknown-slug".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body(response).await.contains("Page not found"));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_500() {
        let (_dir, state) = state_with(Arc::new(Offline));

        let response = posts_handler(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body(response).await.contains("Content unavailable"));

        let response = post_handler(State(state), Path("hello".to_string())).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_editor_command_round_trip() {
        let (_dir, state) = fixture_state();

        let form = CommandForm {
            command: "toggleBold".to_string(),
            level: None,
            generation: 0,
        };
        let response = editor_command_handler(State(state.clone()), Form(form)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/editor");

        let response = editor_handler(State(state), HeaderMap::new()).await;
        assert!(body(response).await.contains("<strong>"));
    }

    #[tokio::test]
    async fn test_unknown_command_is_rejected() {
        let (_dir, state) = fixture_state();
        let form = CommandForm {
            command: "launchRockets".to_string(),
            level: None,
            generation: 0,
        };
        let response = editor_command_handler(State(state), Form(form)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_editor_text() {
        let (_dir, state) = fixture_state();
        let form = TextForm {
            text: " <b>typed</b>".to_string(),
        };
        editor_text_handler(State(state.clone()), Form(form)).await;

        let html = body(editor_handler(State(state), HeaderMap::new()).await).await;
        assert!(html.contains("&lt;b&gt;typed&lt;/b&gt;"));
    }

    #[tokio::test]
    async fn test_fallback_serves_static_files() {
        let (_dir, state) = fixture_state();
        std::fs::write(state.static_dir.join("robots.txt"), "User-agent: *").unwrap();

        let request = Request::builder()
            .uri("/robots.txt")
            .body(Body::empty())
            .unwrap();
        let response = fallback_handler(State(state.clone()), request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, "User-agent: *");

        let request = Request::builder()
            .uri("/missing")
            .body(Body::empty())
            .unwrap();
        let response = fallback_handler(State(state), request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_platform_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(platform(&headers), Platform::Other);
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)"),
        );
        assert_eq!(platform(&headers), Platform::Mac);
    }
}
