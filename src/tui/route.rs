//! Top-level console routes, mirroring the gateway's admin pages.

/// One page of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Providers,
    Models,
    Chat,
    Users,
    Settings,
}

impl Route {
    pub const ALL: [Route; 6] = [
        Route::Dashboard,
        Route::Providers,
        Route::Models,
        Route::Chat,
        Route::Users,
        Route::Settings,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Route::Dashboard => "Dashboard",
            Route::Providers => "Providers",
            Route::Models => "Models",
            Route::Chat => "Chat",
            Route::Users => "Users",
            Route::Settings => "Settings",
        }
    }

    /// The equivalent path in the browser console, shown in the header.
    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/",
            Route::Providers => "/model-providers",
            Route::Models => "/models",
            Route::Chat => "/chat",
            Route::Users => "/users",
            Route::Settings => "/settings",
        }
    }

    pub fn next(&self) -> Route {
        let index = Self::ALL.iter().position(|r| r == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Route {
        let index = Self::ALL.iter().position(|r| r == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn from_digit(c: char) -> Option<Route> {
        let index = c.to_digit(10)? as usize;
        Self::ALL.get(index.checked_sub(1)?).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(Route::Settings.next(), Route::Dashboard);
        assert_eq!(Route::Dashboard.prev(), Route::Settings);
    }

    #[test]
    fn test_from_digit() {
        assert_eq!(Route::from_digit('1'), Some(Route::Dashboard));
        assert_eq!(Route::from_digit('4'), Some(Route::Chat));
        assert_eq!(Route::from_digit('7'), None);
        assert_eq!(Route::from_digit('x'), None);
    }
}
