/// Path that redirects to the default destination
pub const ROOT_PATH: &str = "/";

/// Named navigation destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Clients,
    Services,
    Masters,
    Appointments,
    Reviews,
    Profile,
    Login,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Clients,
        Route::Services,
        Route::Masters,
        Route::Appointments,
        Route::Reviews,
        Route::Profile,
        Route::Login,
    ];

    /// Where the root path lands.
    pub const DEFAULT: Route = Route::Clients;

    pub fn path(&self) -> &'static str {
        match self {
            Route::Clients => "/clients",
            Route::Services => "/services",
            Route::Masters => "/masters",
            Route::Appointments => "/appointments",
            Route::Reviews => "/reviews",
            Route::Profile => "/profile",
            Route::Login => "/login",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Clients => "clients",
            Route::Services => "services",
            Route::Masters => "masters",
            Route::Appointments => "appointments",
            Route::Reviews => "reviews",
            Route::Profile => "profile",
            Route::Login => "login",
        }
    }

    /// Get the display title for this route.
    pub fn title(&self) -> &'static str {
        match self {
            Route::Clients => "Clients",
            Route::Services => "Services",
            Route::Masters => "Masters",
            Route::Appointments => "Appointments",
            Route::Reviews => "Reviews",
            Route::Profile => "Profile",
            Route::Login => "Login",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.path() == path)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }

    /// Reachable without a session
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login)
    }
}

/// Strip any query string or fragment, leaving the path component.
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// Apply static redirects. Only the root path has one.
pub fn resolve_redirect(path: &str) -> &str {
    if path == ROOT_PATH {
        Route::DEFAULT.path()
    } else {
        path
    }
}
