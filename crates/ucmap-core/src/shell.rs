//! Route table and login gate for the platform shell.
//!
//! The shell hosts three authenticated views under `/plataforma` and a
//! public `/login`. Authentication is nothing more than a non-empty token
//! persisted on disk.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RouteName {
    Login,
    Redes,
    Vendas,
    Uc,
}

impl RouteName {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            RouteName::Login => "/login",
            RouteName::Redes => "/plataforma/redes",
            RouteName::Vendas => "/plataforma/vendas",
            RouteName::Uc => "/plataforma/uc",
        }
    }

    #[must_use]
    pub fn is_public(self) -> bool {
        matches!(self, RouteName::Login)
    }

    /// Whether the view renders inside the sidebar layout.
    #[must_use]
    pub fn uses_layout(self) -> bool {
        !self.is_public()
    }
}

/// Landing route for authenticated users.
pub const DEFAULT_ROUTE: RouteName = RouteName::Vendas;

/// Outcome of matching a path against the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatch {
    Route(RouteName),
    Redirect(&'static str),
}

/// Matches a request path. Unknown paths redirect to `/login`.
#[must_use]
pub fn match_path(path: &str) -> PathMatch {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    match trimmed {
        "" => PathMatch::Redirect(DEFAULT_ROUTE.path()),
        "/login" => PathMatch::Route(RouteName::Login),
        "/plataforma" => PathMatch::Redirect(DEFAULT_ROUTE.path()),
        "/plataforma/redes" => PathMatch::Route(RouteName::Redes),
        "/plataforma/vendas" => PathMatch::Route(RouteName::Vendas),
        "/plataforma/uc" => PathMatch::Route(RouteName::Uc),
        _ => PathMatch::Redirect(RouteName::Login.path()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectTo(RouteName),
}

/// Runs before every navigation.
#[must_use]
pub fn guard(target: RouteName, authenticated: bool) -> GuardDecision {
    match (target, authenticated) {
        (RouteName::Login, true) => GuardDecision::RedirectTo(DEFAULT_ROUTE),
        (t, false) if !t.is_public() => GuardDecision::RedirectTo(RouteName::Login),
        _ => GuardDecision::Allow,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub route: RouteName,
    pub path: &'static str,
    /// Every path visited on the way, starting with the requested one.
    pub hops: Vec<String>,
}

/// Resolves `path` through table redirects and the guard to the view that
/// ends up rendered.
#[must_use]
pub fn navigate(path: &str, authenticated: bool) -> Navigation {
    // Upper bound on redirects followed before giving up.
    const MAX_HOPS: usize = 8;

    let mut hops = vec![path.to_string()];
    let mut current = path.to_string();
    for _ in 0..MAX_HOPS {
        let route = match match_path(&current) {
            PathMatch::Route(route) => route,
            PathMatch::Redirect(to) => {
                current = to.to_string();
                hops.push(current.clone());
                continue;
            }
        };
        match guard(route, authenticated) {
            GuardDecision::Allow => {
                return Navigation {
                    route,
                    path: route.path(),
                    hops,
                }
            }
            GuardDecision::RedirectTo(next) => {
                current = next.path().to_string();
                hops.push(current.clone());
            }
        }
    }

    tracing::warn!(path, "route resolution did not settle; falling back to login");
    Navigation {
        route: RouteName::Login,
        path: RouteName::Login.path(),
        hops,
    }
}

/// File-backed persistence for the user token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored token. A missing file or blank content means no token.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TokenIo`] if the file exists but cannot be read.
    pub fn load(&self) -> Result<Option<String>, CoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    /// # Errors
    ///
    /// Returns [`CoreError::TokenIo`] if the token cannot be read.
    pub fn is_authenticated(&self) -> Result<bool, CoreError> {
        Ok(self.load()?.is_some())
    }

    /// Persists `token`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TokenIo`] if the directory or file cannot be written.
    pub fn save(&self, token: &str) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, token.trim()).map_err(|e| self.io_error(e))
    }

    /// Removes the token. Clearing an absent token is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TokenIo`] if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), CoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> CoreError {
        CoreError::TokenIo {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_known_routes() {
        assert_eq!(match_path("/login"), PathMatch::Route(RouteName::Login));
        assert_eq!(
            match_path("/plataforma/redes"),
            PathMatch::Route(RouteName::Redes)
        );
        assert_eq!(match_path("/plataforma/uc/"), PathMatch::Route(RouteName::Uc));
        assert_eq!(
            match_path("/plataforma/vendas?periodo=2024"),
            PathMatch::Route(RouteName::Vendas)
        );
    }

    #[test]
    fn table_redirects_root_and_layout_to_default() {
        assert_eq!(match_path("/"), PathMatch::Redirect("/plataforma/vendas"));
        assert_eq!(
            match_path("/plataforma"),
            PathMatch::Redirect("/plataforma/vendas")
        );
    }

    #[test]
    fn unknown_paths_redirect_to_login() {
        assert_eq!(match_path("/nope"), PathMatch::Redirect("/login"));
        assert_eq!(
            match_path("/plataforma/relatorios"),
            PathMatch::Redirect("/login")
        );
    }

    #[test]
    fn guard_sends_anonymous_users_to_login() {
        assert_eq!(
            guard(RouteName::Uc, false),
            GuardDecision::RedirectTo(RouteName::Login)
        );
        assert_eq!(guard(RouteName::Login, false), GuardDecision::Allow);
    }

    #[test]
    fn guard_sends_authenticated_users_away_from_login() {
        assert_eq!(
            guard(RouteName::Login, true),
            GuardDecision::RedirectTo(RouteName::Vendas)
        );
        assert_eq!(guard(RouteName::Redes, true), GuardDecision::Allow);
    }

    #[test]
    fn anonymous_root_visit_ends_at_login() {
        let nav = navigate("/", false);
        assert_eq!(nav.route, RouteName::Login);
        assert_eq!(nav.hops, ["/", "/plataforma/vendas", "/login"]);
    }

    #[test]
    fn authenticated_root_visit_ends_at_vendas() {
        let nav = navigate("/", true);
        assert_eq!(nav.route, RouteName::Vendas);
        assert!(nav.route.uses_layout());
    }

    #[test]
    fn authenticated_login_visit_bounces_to_vendas() {
        let nav = navigate("/login", true);
        assert_eq!(nav.route, RouteName::Vendas);
        assert_eq!(nav.path, "/plataforma/vendas");
    }

    #[test]
    fn authenticated_unknown_path_goes_through_login_to_vendas() {
        let nav = navigate("/desconhecido", true);
        assert_eq!(nav.route, RouteName::Vendas);
        assert_eq!(nav.hops, ["/desconhecido", "/login", "/plataforma/vendas"]);
    }

    #[test]
    fn token_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("nested").join("user_token"));

        assert!(!store.is_authenticated().unwrap());
        store.save("  abc123\n").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc123"));
        assert!(store.is_authenticated().unwrap());

        store.clear().unwrap();
        assert!(!store.is_authenticated().unwrap());
        store.clear().unwrap();
    }

    #[test]
    fn blank_token_file_is_not_authenticated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_token");
        std::fs::write(&path, "   \n").unwrap();
        assert!(!TokenStore::new(path).is_authenticated().unwrap());
    }
}
