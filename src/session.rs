use tracing::info;

/// The only session state: whether the login action has run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Session {
    authenticated: bool,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// No credential is checked. There is no way back to anonymous.
    pub fn login(&mut self, username: Option<&str>) {
        info!(username = username.unwrap_or(""), "login");
        self.authenticated = true;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Root,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Root => "/",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.trim();
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        [Route::Login, Route::Dashboard, Route::Root]
            .into_iter()
            .find(|route| route.path() == path)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Login,
    Dashboard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Render(Page),
    Redirect(Route),
    NotFound,
}

pub fn resolve(path: &str, session: &Session) -> Resolution {
    match Route::from_path(path) {
        Some(Route::Login) => Resolution::Render(Page::Login),
        Some(Route::Dashboard) if session.is_authenticated() => {
            Resolution::Render(Page::Dashboard)
        }
        Some(Route::Dashboard) | Some(Route::Root) => Resolution::Redirect(Route::Login),
        None => Resolution::NotFound,
    }
}
