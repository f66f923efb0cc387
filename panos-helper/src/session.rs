//! The interactive menu loop.
//!
//! ```text
//! AwaitingConnection --connected--> MenuActive --4 / end of input--> Exited
//!         |                          ^      |
//!         +--connect failed--> Exited +------+ 1/2/3, bad input
//! ```

use std::io::{BufRead, Write};

use log::debug;
use panos_xapi::Firewall;
use thiserror::Error;

use crate::config::Settings;
use crate::connect::{connect_to_firewall, Connector};
use crate::console::{Console, ConsoleError};
use crate::logs::get_network_logs;
use crate::policy::create_security_policy;
use crate::report::{progress, warning};
use crate::upgrade::upgrade_pan_os;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingConnection,
    MenuActive,
    Exited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Upgrade,
    Logs,
    SecurityPolicy,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChoiceError {
    #[error("Invalid input. Please enter a number between 1 and 4.")]
    NotANumber,
    #[error("Invalid choice. Please select a valid option.")]
    OutOfRange(i64),
}

/// Parse a menu selection.
pub fn parse_choice(input: &str) -> Result<MenuChoice, ChoiceError> {
    let number: i64 = input.trim().parse().map_err(|_| ChoiceError::NotANumber)?;
    match number {
        1 => Ok(MenuChoice::Upgrade),
        2 => Ok(MenuChoice::Logs),
        3 => Ok(MenuChoice::SecurityPolicy),
        4 => Ok(MenuChoice::Exit),
        other => Err(ChoiceError::OutOfRange(other)),
    }
}

/// A connected session: owns the firewall handle until exit.
pub struct Session<'c, R, W> {
    console: &'c mut Console<R, W>,
    firewall: Firewall,
    settings: &'c Settings,
    state: SessionState,
}

impl<'c, R: BufRead, W: Write> Session<'c, R, W> {
    pub fn new(console: &'c mut Console<R, W>, firewall: Firewall, settings: &'c Settings) -> Self {
        debug!(
            "session open with {} (serial {})",
            firewall.host(),
            firewall.serial()
        );
        Self {
            console,
            firewall,
            settings,
            state: SessionState::MenuActive,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn firewall(&self) -> &Firewall {
        &self.firewall
    }

    /// Show the menu, read one selection and act on it.
    pub fn step(&mut self) -> Result<SessionState, ConsoleError> {
        if self.state == SessionState::Exited {
            return Ok(self.state);
        }

        self.console.blank()?;
        self.console.line("Available operations:")?;
        self.console
            .line("1. Upgrade\n2. Logs\n3. Security policy\n4. Exit")?;

        let raw = match self.console.prompt("Enter operation to perform [1 / 2 / 3 / 4]: ") {
            Ok(raw) => raw,
            Err(ConsoleError::Closed) => {
                debug!("input closed at menu");
                self.state = SessionState::Exited;
                return Ok(self.state);
            }
            Err(err) => return Err(err),
        };

        let choice = match parse_choice(&raw) {
            Ok(choice) => choice,
            Err(err) => {
                self.console.line(warning(err.to_string()))?;
                return Ok(self.state);
            }
        };
        debug!("menu choice {choice:?}");

        let result = match choice {
            MenuChoice::Upgrade => {
                self.console.blank()?;
                self.console.line(progress("Initializing OS upgrade"))?;
                upgrade_pan_os(self.console, &self.firewall, self.settings).map(drop)
            }
            MenuChoice::Logs => {
                self.console.blank()?;
                self.console.line(progress("Fetching logs"))?;
                get_network_logs(self.console, &self.firewall, self.settings).map(drop)
            }
            MenuChoice::SecurityPolicy => {
                self.console.blank()?;
                self.console.line(progress("Initializing security policies"))?;
                create_security_policy(self.console, &self.firewall, self.settings).map(drop)
            }
            MenuChoice::Exit => {
                self.console.blank()?;
                self.console.line("Exiting. Goodbye")?;
                self.state = SessionState::Exited;
                Ok(())
            }
        };

        match result {
            Ok(()) => Ok(self.state),
            // Input ended inside an operation's prompts.
            Err(ConsoleError::Closed) => {
                self.state = SessionState::Exited;
                Ok(self.state)
            }
            Err(err) => Err(err),
        }
    }

    /// Step until the operator exits.
    pub fn run(mut self) -> Result<SessionState, ConsoleError> {
        while self.step()? != SessionState::Exited {}
        Ok(self.state)
    }
}

/// Greet, connect once, then run the menu until exit.
pub fn run<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    connector: &dyn Connector,
    settings: &Settings,
) -> Result<SessionState, ConsoleError> {
    console.line("Welcome!\nEnter the requested information to proceed")?;

    let firewall = match connect_to_firewall(console, connector) {
        Ok(Some(firewall)) => firewall,
        Ok(None) | Err(ConsoleError::Closed) => return Ok(SessionState::Exited),
        Err(err) => return Err(err),
    };

    Session::new(console, firewall, settings).run()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::net::IpAddr;

    use panos_xapi::testing::{success, system_info, ScriptedTransport};
    use panos_xapi::{ApiError, Firewall};
    use secrecy::SecretString;

    use super::{parse_choice, run, ChoiceError, MenuChoice, Session, SessionState};
    use crate::config::Settings;
    use crate::console::Console;

    #[test]
    fn choices_parse() {
        assert_eq!(parse_choice("1"), Ok(MenuChoice::Upgrade));
        assert_eq!(parse_choice(" 4 "), Ok(MenuChoice::Exit));
        assert_eq!(parse_choice("+2"), Ok(MenuChoice::Logs));
        assert_eq!(parse_choice("five"), Err(ChoiceError::NotANumber));
        assert_eq!(parse_choice(""), Err(ChoiceError::NotANumber));
        assert_eq!(parse_choice("5"), Err(ChoiceError::OutOfRange(5)));
        assert_eq!(parse_choice("-1"), Err(ChoiceError::OutOfRange(-1)));
    }

    #[test]
    fn non_numeric_input_keeps_menu_active() {
        let (fw, log) = ScriptedTransport::firewall("0070", |_| Ok(success("")));
        let settings = Settings::default();
        let mut console = Console::new(Cursor::new("abc\n"), Vec::new());

        let mut session = Session::new(&mut console, fw, &settings);
        assert_eq!(session.step().expect("step"), SessionState::MenuActive);
        assert_eq!(session.state(), SessionState::MenuActive);
        assert_eq!(session.firewall().serial(), "0070");
        drop(session);

        let out = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(out.matches("Please enter a number between 1 and 4").count(), 1);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn each_bad_entry_reports_once_then_exit() {
        let (fw, _) = ScriptedTransport::firewall("0070", |_| Ok(success("")));
        let settings = Settings::default();
        let mut console = Console::new(Cursor::new("x\ny\n9\n4\n"), Vec::new());

        let state = Session::new(&mut console, fw, &settings).run().expect("run");
        assert_eq!(state, SessionState::Exited);

        let out = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(out.matches("Please enter a number between 1 and 4").count(), 2);
        assert_eq!(out.matches("Invalid choice").count(), 1);
        assert_eq!(out.matches("Available operations:").count(), 4);
        assert!(out.contains("Exiting. Goodbye"));
    }

    #[test]
    fn end_of_input_exits() {
        let (fw, _) = ScriptedTransport::firewall("0070", |_| Ok(success("")));
        let settings = Settings::default();
        let mut console = Console::new(Cursor::new(""), Vec::new());

        let state = Session::new(&mut console, fw, &settings).run().expect("run");
        assert_eq!(state, SessionState::Exited);
    }

    #[test]
    fn operations_share_one_handle_and_return_to_menu() {
        let connects = std::cell::Cell::new(0);
        let connector = |host: IpAddr, _: SecretString| -> Result<Firewall, ApiError> {
            connects.set(connects.get() + 1);
            Firewall::with_transport(
                host,
                Box::new(ScriptedTransport::new(|request| match request {
                    panos_xapi::ApiRequest::Op { cmd } if cmd.contains("<info/>") => {
                        Ok(system_info("0070"))
                    }
                    _ => Ok(success("<log><logs count=\"0\"/></log>")),
                })),
            )
        };
        let input = "10.0.0.1\nkey\n2\nsystem\n5\n\n\n2\nbogus\n4\n";
        let mut console = Console::new(Cursor::new(input), Vec::new());

        let state = run(&mut console, &connector, &Settings::default()).expect("run");
        assert_eq!(state, SessionState::Exited);
        assert_eq!(connects.get(), 1);

        let out = String::from_utf8(console.into_output()).unwrap();
        assert!(out.contains("Firewall serial: 0070"));
        assert_eq!(out.matches("Fetching logs").count(), 2);
        assert!(out.contains("No log entries found."));
        assert!(out.contains("Invalid log type: bogus"));
    }

    #[test]
    fn failed_connection_never_shows_menu() {
        let connector = |_: IpAddr, _: SecretString| -> Result<Firewall, ApiError> {
            Err(ApiError::Status {
                status: 403,
                body: "forbidden".to_string(),
            })
        };
        let mut console = Console::new(Cursor::new("10.0.0.1\nkey\n1\n"), Vec::new());

        let state = run(&mut console, &connector, &Settings::default()).expect("run");
        assert_eq!(state, SessionState::Exited);
        let out = String::from_utf8(console.into_output()).unwrap();
        assert!(out.contains("Failed to connect to firewall: HTTP 403: forbidden"));
        assert!(!out.contains("Available operations:"));
    }
}
