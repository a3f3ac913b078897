//! Per-interaction session state and the screen state machine.

/// Authentication state. Reset to default on logout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub logged_in: bool,
}

/// Screens of the interactive flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    /// Anonymous user looking at the Home/Login/Register menu.
    #[default]
    Menu,
    Registering,
    LoggingIn,
    /// Only screen from which the classifier may run.
    Authenticated,
}

/// Navigation choices offered before login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Home,
    Login,
    Register,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 3] = [MenuChoice::Home, MenuChoice::Login, MenuChoice::Register];

    pub fn label(self) -> &'static str {
        match self {
            MenuChoice::Home => "Home",
            MenuChoice::Login => "Login",
            MenuChoice::Register => "Register",
        }
    }

    /// Screen this choice leads to.
    pub fn target(self) -> Screen {
        match self {
            MenuChoice::Home => Screen::Menu,
            MenuChoice::Login => Screen::LoggingIn,
            MenuChoice::Register => Screen::Registering,
        }
    }
}

impl std::fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
