//! Request routing and dispatch.

use std::backtrace::Backtrace;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arbor_auth::SessionAuth;

use crate::error::{HandlerError, Result, RouterError};
use crate::params::Params;
use crate::path::clean_path;
use crate::request::{urlencoding_decode, Method, Request};
use crate::response::Response;
use crate::tree::Node;

/// The result of a request handler.
pub type HandlerResult = std::result::Result<(), HandlerError>;

/// A request handler.
///
/// Handlers write into the response and return `Err` to signal a client
/// mistake, which the router turns into a 400.
pub type Handler = Arc<dyn Fn(&mut Response, &Request) -> HandlerResult + Send + Sync>;

/// A registered route: the pattern it was registered under and the
/// handler to run.
#[derive(Clone)]
struct Route {
    pattern: String,
    handler: Handler,
}

/// An HTTP request router.
///
/// Routes are registered up front, then the router is only read during
/// dispatch, so a built router can be shared freely across threads.
///
/// ```
/// use arbor_router::{Request, Response, Router};
///
/// let mut router = Router::new();
/// router
///     .get("/hello/:name", |response, request| {
///         *response = Response::text(format!("hi {}", request.params.by_name("name")));
///         Ok(())
///     })
///     .unwrap();
///
/// let response = router.dispatch(Request::get("/hello/world"));
/// assert_eq!(response.status, 200);
/// ```
pub struct Router {
    trees: HashMap<Method, Node<Route>>,
    auth: Option<Arc<dyn SessionAuth>>,
    /// When enabled, a request whose path differs from a registered
    /// route only by a trailing slash is redirected to it.
    pub redirect_trailing_slash: bool,
    /// When enabled, unmatched paths are cleaned and case-corrected, and
    /// redirected when that produces a registered route.
    pub redirect_fixed_path: bool,
}

impl Router {
    /// Creates a router with both redirect fixups enabled.
    pub fn new() -> Self {
        Self {
            trees: HashMap::new(),
            auth: None,
            redirect_trailing_slash: true,
            redirect_fixed_path: true,
        }
    }

    /// Creates a router that resolves session cookies to users before
    /// each dispatch.
    pub fn with_auth(auth: Arc<dyn SessionAuth>) -> Self {
        Self {
            auth: Some(auth),
            ..Self::new()
        }
    }

    /// Registers `handler` for `path` under every method in `methods`.
    ///
    /// Patterns may contain `:name` segment parameters and a trailing
    /// `*name` catch-all. Registration fails on malformed patterns and
    /// on conflicts with existing routes.
    pub fn route<F>(&mut self, path: &str, handler: F, methods: &[Method]) -> Result<()>
    where
        F: Fn(&mut Response, &Request) -> HandlerResult + Send + Sync + 'static,
    {
        if !path.starts_with('/') {
            return Err(RouterError::MissingLeadingSlash {
                path: path.to_string(),
            });
        }

        let handler: Handler = Arc::new(handler);
        for &method in methods {
            let root = self.trees.entry(method).or_insert_with(Node::empty);
            root.add_route(
                path,
                Route {
                    pattern: path.to_string(),
                    handler: handler.clone(),
                },
            )?;
        }
        Ok(())
    }

    /// Registers an infallible callback for `path` under every method in
    /// `methods`.
    ///
    /// Adapter for handlers with nothing to fail: dispatch always
    /// reports success for them.
    pub fn route_fn<F>(&mut self, path: &str, callback: F, methods: &[Method]) -> Result<()>
    where
        F: Fn(&mut Response, &Request) + Send + Sync + 'static,
    {
        self.route(
            path,
            move |response, request| {
                callback(response, request);
                Ok(())
            },
            methods,
        )
    }

    /// Registers a GET handler.
    pub fn get<F>(&mut self, path: &str, handler: F) -> Result<()>
    where
        F: Fn(&mut Response, &Request) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(path, handler, &[Method::Get])
    }

    /// Registers a POST handler.
    pub fn post<F>(&mut self, path: &str, handler: F) -> Result<()>
    where
        F: Fn(&mut Response, &Request) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(path, handler, &[Method::Post])
    }

    /// Registers a PUT handler.
    pub fn put<F>(&mut self, path: &str, handler: F) -> Result<()>
    where
        F: Fn(&mut Response, &Request) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(path, handler, &[Method::Put])
    }

    /// Registers a PATCH handler.
    pub fn patch<F>(&mut self, path: &str, handler: F) -> Result<()>
    where
        F: Fn(&mut Response, &Request) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(path, handler, &[Method::Patch])
    }

    /// Registers a DELETE handler.
    pub fn delete<F>(&mut self, path: &str, handler: F) -> Result<()>
    where
        F: Fn(&mut Response, &Request) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(path, handler, &[Method::Delete])
    }

    /// Serves files below `root` for GET requests matching `path`, which
    /// must end in `/*filepath`.
    ///
    /// This is an ordinary catch-all route, so it follows the same
    /// conflict rules as any other registration.
    pub fn serve_files(&mut self, path: &str, root: impl Into<PathBuf>) -> Result<()> {
        if !path.ends_with("/*filepath") {
            return Err(RouterError::BadStaticPattern {
                path: path.to_string(),
            });
        }

        let root = root.into();
        self.get(path, move |response, request| {
            serve_file(&root, request.params.by_name("filepath"), response)
        })
    }

    /// Looks up the handler registered for a method and path, without
    /// executing it.
    ///
    /// Returns the handler (if any), the parameters the path would bind,
    /// and whether a trailing-slash redirect would find a route instead.
    pub fn lookup(&self, method: Method, path: &str) -> (Option<Handler>, Params, bool) {
        if let Some(root) = self.trees.get(&method) {
            let (route, params, tsr) = root.get_value(path);
            return (route.map(|r| r.handler.clone()), params, tsr);
        }
        (None, Params::new(), false)
    }

    /// Returns the pattern that would handle a method and path, e.g.
    /// `/user/:name` for `GET /user/gopher`.
    pub fn pattern(&self, method: Method, path: &str) -> Option<&str> {
        let root = self.trees.get(&method)?;
        let (route, _, _) = root.get_value(path);
        route.map(|r| r.pattern.as_str())
    }

    /// Routes a request to its handler and returns the response.
    ///
    /// Unmatched paths get a redirect when a trailing-slash or
    /// case/cleaning fixup finds a registered route (301 for GET, 307
    /// otherwise, never for CONNECT or the root path), and a 404
    /// otherwise. A handler error becomes a 400; a handler panic is
    /// caught, logged with a backtrace, and becomes a 500.
    pub fn dispatch(&self, mut request: Request) -> Response {
        tracing::debug!(method = %request.method, path = %request.path, "dispatching request");

        // Resolve the session cookie to a user before the handler runs
        if request.user.is_none() {
            if let Some(auth) = &self.auth {
                if let Some(key) = request.cookie(auth.cookie_name()).map(str::to_string) {
                    request.user = auth.user_by_session(&key);
                }
            }
        }

        if let Some(root) = self.trees.get(&request.method) {
            let (route, params, tsr) = root.get_value(&request.path);
            if let Some(route) = route {
                request.params = params;
                return invoke(route, &request);
            }

            if request.method != Method::Connect && request.path != "/" {
                let code = if request.method == Method::Get { 301 } else { 307 };

                if tsr && self.redirect_trailing_slash {
                    let fixed = if request.path.len() > 1 && request.path.ends_with('/') {
                        request.path[..request.path.len() - 1].to_string()
                    } else {
                        format!("{}/", request.path)
                    };
                    return Response::redirect_with_status(fixed, code);
                }

                if self.redirect_fixed_path {
                    if let Some(fixed) = root.find_case_insensitive_path(
                        &clean_path(&request.path),
                        self.redirect_trailing_slash,
                    ) {
                        return Response::redirect_with_status(fixed, code);
                    }
                }
            }
        }

        Response::not_found()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a handler under panic supervision.
fn invoke(route: &Route, request: &Request) -> Response {
    let mut response = Response::ok();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        (route.handler)(&mut response, request)
    }));

    match outcome {
        Ok(Ok(())) => response,
        Ok(Err(err)) => Response::bad_request().body(err.to_string()),
        Err(payload) => {
            let backtrace = Backtrace::force_capture();
            tracing::error!(
                method = %request.method,
                path = %request.path,
                pattern = %route.pattern,
                panic = %panic_message(payload.as_ref()),
                "handler panicked:\n{backtrace}"
            );
            Response::internal_server_error()
        }
    }
}

/// Reads the requested file into the response, rejecting any `..` path
/// element before touching the filesystem.
///
/// The binding comes straight from the request path, so percent escapes
/// are decoded first; the traversal check runs on the decoded form.
fn serve_file(root: &Path, subpath: &str, response: &mut Response) -> HandlerResult {
    let decoded = urlencoding_decode(subpath);
    let rel = decoded.trim_start_matches('/');
    if rel.split('/').any(|segment| segment == "..") {
        return Err(HandlerError::new(format!("invalid file path: {subpath}")));
    }

    let full = root.join(rel);
    match std::fs::read(&full) {
        Ok(contents) => {
            *response = Response::ok().body(contents);
            if let Some(mime) = content_type(&full) {
                response
                    .headers
                    .insert("Content-Type".to_string(), mime.to_string());
            }
            Ok(())
        }
        Err(_) => {
            *response = Response::not_found();
            Ok(())
        }
    }
}

/// Guesses a Content-Type from the file extension.
fn content_type(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()? {
        "html" | "htm" => Some("text/html; charset=utf-8"),
        "css" => Some("text/css; charset=utf-8"),
        "js" => Some("text/javascript; charset=utf-8"),
        "json" => Some("application/json"),
        "txt" => Some("text/plain; charset=utf-8"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        "ico" => Some("image/x-icon"),
        "woff2" => Some("font/woff2"),
        _ => None,
    }
}

/// Renders a panic payload for the log.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use arbor_auth::Auth;
    use arbor_config::CookieConfig;

    use super::*;

    fn location(response: &Response) -> &str {
        response.headers.get("Location").map_or("", String::as_str)
    }

    #[test]
    fn test_route_requires_leading_slash() {
        let mut router = Router::new();
        let err = router.get("users", |_, _| Ok(())).unwrap_err();
        assert!(matches!(err, RouterError::MissingLeadingSlash { .. }));
    }

    #[test]
    fn test_dispatch_binds_params() {
        let routed = Arc::new(AtomicBool::new(false));
        let seen = routed.clone();

        let mut router = Router::new();
        router
            .get("/user/:name", move |response, request| {
                seen.store(true, Ordering::SeqCst);
                assert_eq!(request.params.by_name("name"), "gopher");
                *response = Response::text("hello gopher");
                Ok(())
            })
            .unwrap();

        let response = router.dispatch(Request::get("/user/gopher"));
        assert!(routed.load(Ordering::SeqCst));
        assert_eq!(response.status, 200);
        assert_eq!(response.body_string(), Some("hello gopher".to_string()));
    }

    #[test]
    fn test_method_helpers() {
        let mut router = Router::new();
        router.get("/r", |r, _| { *r = Response::text("get"); Ok(()) }).unwrap();
        router.post("/r", |r, _| { *r = Response::text("post"); Ok(()) }).unwrap();
        router.put("/r", |r, _| { *r = Response::text("put"); Ok(()) }).unwrap();
        router.patch("/r", |r, _| { *r = Response::text("patch"); Ok(()) }).unwrap();
        router.delete("/r", |r, _| { *r = Response::text("delete"); Ok(()) }).unwrap();

        for method in [
            Method::Get,
            Method::Post,
            Method::Put,
            Method::Patch,
            Method::Delete,
        ] {
            let response = router.dispatch(Request::new(method, "/r"));
            assert_eq!(response.status, 200, "{method}");
            assert_eq!(
                response.body_string(),
                Some(method.as_str().to_lowercase()),
                "{method}"
            );
        }
    }

    #[test]
    fn test_route_fn_adapter() {
        let mut router = Router::new();
        router
            .route_fn(
                "/ping",
                |response, _| *response = Response::text("pong"),
                &[Method::Get],
            )
            .unwrap();

        let response = router.dispatch(Request::get("/ping"));
        assert_eq!(response.status, 200);
        assert_eq!(response.body_string(), Some("pong".to_string()));
    }

    #[test]
    fn test_shared_route_registration() {
        let mut router = Router::new();
        router
            .route(
                "/thing",
                |r, _| {
                    *r = Response::text("done");
                    Ok(())
                },
                &[Method::Get, Method::Post],
            )
            .unwrap();

        assert_eq!(router.dispatch(Request::get("/thing")).status, 200);
        assert_eq!(router.dispatch(Request::post("/thing")).status, 200);
        assert_eq!(
            router.dispatch(Request::new(Method::Delete, "/thing")).status,
            404
        );
    }

    #[test]
    fn test_handler_error_becomes_400() {
        let mut router = Router::new();
        router
            .get("/user/:id", |_, request| {
                if request.params.as_id("id") == 0 {
                    return Err(HandlerError::new("bad id"));
                }
                Ok(())
            })
            .unwrap();

        let response = router.dispatch(Request::get("/user/abc"));
        assert_eq!(response.status, 400);
        assert_eq!(response.body_string(), Some("bad id".to_string()));

        let response = router.dispatch(Request::get("/user/7"));
        assert_eq!(response.status, 200);
    }

    #[test]
    fn test_panic_becomes_500_and_router_survives() {
        let mut router = Router::new();
        router
            .get("/boom", |_, _| panic!("handler exploded"))
            .unwrap();
        router.get("/fine", |_, _| Ok(())).unwrap();

        let response = router.dispatch(Request::get("/boom"));
        assert_eq!(response.status, 500);

        // The router is still usable afterwards
        let response = router.dispatch(Request::get("/fine"));
        assert_eq!(response.status, 200);
    }

    #[test]
    fn test_not_found_and_redirects() {
        let mut router = Router::new();
        router.get("/path", |_, _| Ok(())).unwrap();
        router.get("/dir/", |_, _| Ok(())).unwrap();

        let cases = [
            ("/path/", 301, "/path"),
            ("/dir", 301, "/dir/"),
            ("/PATH", 301, "/path"),
            ("/PATH/", 301, "/path"),
            ("/DIR", 301, "/dir/"),
            ("/DIR/", 301, "/dir/"),
            ("/../path", 301, "/path"),
            ("/path//", 301, "/path"),
        ];
        for (path, status, target) in cases {
            let response = router.dispatch(Request::get(path));
            assert_eq!(response.status, status, "{path}");
            assert_eq!(location(&response), target, "{path}");
        }

        let response = router.dispatch(Request::get("/nope"));
        assert_eq!(response.status, 404);
    }

    #[test]
    fn test_non_get_redirects_use_307() {
        let mut router = Router::new();
        router.post("/path", |_, _| Ok(())).unwrap();
        router.patch("/path", |_, _| Ok(())).unwrap();

        let response = router.dispatch(Request::post("/path/"));
        assert_eq!(response.status, 307);
        assert_eq!(location(&response), "/path");

        let response = router.dispatch(Request::new(Method::Patch, "/path/"));
        assert_eq!(response.status, 307);
        assert_eq!(location(&response), "/path");
    }

    #[test]
    fn test_connect_and_root_never_redirect() {
        let mut router = Router::new();
        router
            .route("/path", |_, _| Ok(()), &[Method::Connect])
            .unwrap();

        let response = router.dispatch(Request::new(Method::Connect, "/path/"));
        assert_eq!(response.status, 404);

        let response = router.dispatch(Request::get("/"));
        assert_eq!(response.status, 404);
    }

    #[test]
    fn test_redirects_can_be_disabled() {
        let mut router = Router::new();
        router.redirect_trailing_slash = false;
        router.redirect_fixed_path = false;
        router.get("/path", |_, _| Ok(())).unwrap();

        assert_eq!(router.dispatch(Request::get("/path/")).status, 404);
        assert_eq!(router.dispatch(Request::get("/PATH")).status, 404);
    }

    #[test]
    fn test_lookup() {
        let routed = Arc::new(AtomicBool::new(false));
        let seen = routed.clone();

        let mut router = Router::new();
        router
            .get("/user/:name", move |_, _| {
                seen.store(true, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        let (handler, params, tsr) = router.lookup(Method::Get, "/user/gopher");
        assert!(!tsr);
        assert_eq!(params.by_name("name"), "gopher");
        let handler = handler.expect("handler should be registered");

        // The returned handler is the registered one
        handler(&mut Response::ok(), &Request::get("/user/gopher")).unwrap();
        assert!(routed.load(Ordering::SeqCst));

        let (handler, _, tsr) = router.lookup(Method::Get, "/user/gopher/");
        assert!(handler.is_none());
        assert!(tsr);

        let (handler, _, tsr) = router.lookup(Method::Get, "/nope");
        assert!(handler.is_none());
        assert!(!tsr);

        // No tree for the method at all
        let (handler, _, tsr) = router.lookup(Method::Post, "/user/gopher");
        assert!(handler.is_none());
        assert!(!tsr);
    }

    #[test]
    fn test_pattern_introspection() {
        let mut router = Router::new();
        router.get("/user/:name", |_, _| Ok(())).unwrap();

        assert_eq!(
            router.pattern(Method::Get, "/user/gopher"),
            Some("/user/:name")
        );
        assert_eq!(router.pattern(Method::Get, "/nope"), None);
    }

    #[test]
    fn test_serve_files_requires_catchall_pattern() {
        let mut router = Router::new();
        let err = router.serve_files("/static", "/tmp").unwrap_err();
        assert!(matches!(err, RouterError::BadStaticPattern { .. }));

        let err = router.serve_files("/static/*other", "/tmp").unwrap_err();
        assert!(matches!(err, RouterError::BadStaticPattern { .. }));
    }

    #[test]
    fn test_serve_files() {
        let dir = std::env::temp_dir().join(format!("arbor-router-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("hello.txt"), "hello world").unwrap();
        std::fs::write(dir.join("hello world.txt"), "spaced").unwrap();

        let mut router = Router::new();
        router.serve_files("/static/*filepath", &dir).unwrap();

        let response = router.dispatch(Request::get("/static/hello.txt"));
        assert_eq!(response.status, 200);
        assert_eq!(response.body_string(), Some("hello world".to_string()));
        assert_eq!(
            response.headers.get("Content-Type").map(String::as_str),
            Some("text/plain; charset=utf-8")
        );

        // Percent escapes in the binding are decoded before the lookup
        let response = router.dispatch(Request::get("/static/hello%20world.txt"));
        assert_eq!(response.status, 200);
        assert_eq!(response.body_string(), Some("spaced".to_string()));

        let response = router.dispatch(Request::get("/static/missing.txt"));
        assert_eq!(response.status, 404);

        // Parent traversal is refused before hitting the filesystem,
        // whether spelled literally or percent-encoded
        let response = router.dispatch(Request::get("/static/../secret"));
        assert_eq!(response.status, 400);
        let response = router.dispatch(Request::get("/static/%2e%2e/secret"));
        assert_eq!(response.status, 400);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_session_user_attached_to_request() {
        let auth = Arc::new(Auth::in_memory(CookieConfig::default()));
        let user = auth
            .create_user("alice@example.com", "Alice", "Smith", "sw0rdfish")
            .unwrap();
        let (session, _) = auth.login(&user).unwrap();

        let mut router = Router::with_auth(auth.clone());
        router
            .get("/me", |response, request| {
                let user = request.user.as_ref().ok_or("not signed in")?;
                *response = Response::text(user.email.clone());
                Ok(())
            })
            .unwrap();

        let cookie = format!("{}={}", auth.cookie_name(), session.key);
        let response = router.dispatch(Request::get("/me").header("Cookie", cookie));
        assert_eq!(response.status, 200);
        assert_eq!(response.body_string(), Some("alice@example.com".to_string()));

        // Without the cookie the handler sees no user
        let response = router.dispatch(Request::get("/me"));
        assert_eq!(response.status, 400);
    }
}
