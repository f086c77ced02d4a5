//! Shell command parsing.

use anyhow::{anyhow, Result};
use salon_core::Route;

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Go(String),
    Login(Option<String>),
    Logout,
    /// Submit a code, or show the server-side status when no code is given
    Otp(Option<String>),
    WhoAmI,
    Profile,
    Routes,
    Help,
    Quit,
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            return Ok(Command::Empty);
        };
        let arg = parts.next().map(str::to_string);
        if parts.next().is_some() {
            return Err(anyhow!("Too many arguments for '{}'", word));
        }

        let command = match word {
            "go" | "cd" => Command::Go(target_path(&arg.ok_or_else(|| anyhow!("Usage: go <path>"))?)),
            "login" => Command::Login(arg),
            "logout" => Command::Logout,
            "otp" => Command::Otp(arg),
            "whoami" => Command::WhoAmI,
            "profile" if arg.is_none() => Command::Profile,
            "routes" => Command::Routes,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            path if path.starts_with('/') && arg.is_none() => Command::Go(path.to_string()),
            name => match Route::from_name(name) {
                Some(route) if arg.is_none() => Command::Go(route.path().to_string()),
                _ => return Err(anyhow!("Unknown command '{}', type 'help'", name)),
            },
        };
        Ok(command)
    }
}

/// Accept a path or a bare route name.
fn target_path(arg: &str) -> String {
    if arg.starts_with('/') {
        arg.to_string()
    } else {
        match Route::from_name(arg) {
            Some(route) => route.path().to_string(),
            None => format!("/{}", arg),
        }
    }
}

pub const HELP: &str = "\
Commands:
  go <path|name>     navigate (also: bare path or route name)
  login [username]   sign in
  logout             sign out and clear the saved session
  otp [code]         submit a one-time code, or show server OTP status
  whoami             show the current session
  profile            fetch account details
  routes             list destinations
  help               show this help
  quit               exit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation() {
        assert_eq!(Command::parse("go /clients").unwrap(), Command::Go("/clients".into()));
        assert_eq!(Command::parse("go reviews").unwrap(), Command::Go("/reviews".into()));
        assert_eq!(Command::parse("go stats").unwrap(), Command::Go("/stats".into()));
        assert_eq!(Command::parse("/masters").unwrap(), Command::Go("/masters".into()));
        assert_eq!(Command::parse("services").unwrap(), Command::Go("/services".into()));
        assert_eq!(Command::parse("  /  ").unwrap(), Command::Go("/".into()));
        assert!(Command::parse("go").is_err());
    }

    #[test]
    fn test_parse_session_commands() {
        assert_eq!(Command::parse("login").unwrap(), Command::Login(None));
        assert_eq!(Command::parse("login danil").unwrap(), Command::Login(Some("danil".into())));
        assert_eq!(Command::parse("logout").unwrap(), Command::Logout);
        assert_eq!(Command::parse("otp 123456").unwrap(), Command::Otp(Some("123456".into())));
        assert_eq!(Command::parse("otp").unwrap(), Command::Otp(None));
        assert_eq!(Command::parse("whoami").unwrap(), Command::WhoAmI);
    }

    #[test]
    fn test_parse_profile_command_vs_route() {
        // "profile" is both a command and a route name; the command wins.
        assert_eq!(Command::parse("profile").unwrap(), Command::Profile);
        assert_eq!(Command::parse("go profile").unwrap(), Command::Go("/profile".into()));
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(Command::parse("").unwrap(), Command::Empty);
        assert_eq!(Command::parse("   ").unwrap(), Command::Empty);
        assert_eq!(Command::parse("q").unwrap(), Command::Quit);
        assert_eq!(Command::parse("?").unwrap(), Command::Help);
        assert!(Command::parse("dance").is_err());
        assert!(Command::parse("login a b").is_err());
        assert!(Command::parse("clients now").is_err());
    }
}
