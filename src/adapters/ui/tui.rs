//! Implements InputPort. Inquire-based interactive prompts.
//!
//! Renders whatever screen the SessionController is on and feeds the user's
//! answers back into it. Esc / Ctrl-C at any prompt quits.

use crate::adapters::imaging::has_accepted_extension;
use crate::adapters::ui::banner::TAGLINE;
use crate::domain::{Diagnosis, DomainError, MenuChoice, RegistrationForm, Screen};
use crate::ports::InputPort;
use crate::usecases::{INVALID_CREDENTIALS, SessionController, SubmitOutcome};
use async_trait::async_trait;
use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::validator::Validation;
use inquire::{CustomUserError, InquireError, Password, PasswordDisplayMode, Select, Text};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::warn;

const UPLOAD: &str = "Upload leaf image";
const LOGOUT: &str = "Logout";

/// Leaf-green prompt prefix and highlight for every inquire prompt.
pub fn apply_theme() {
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("🌿").with_fg(Color::LightGreen))
        .with_highlighted_option_prefix(Styled::new("➤").with_fg(Color::LightGreen));
    inquire::set_global_render_config(config);
}

/// `Ok(None)` when the user cancelled (Esc / Ctrl-C), which ends the session loop.
fn answered<T>(r: Result<T, InquireError>) -> Result<Option<T>, DomainError> {
    match r {
        Ok(v) => Ok(Some(v)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(DomainError::Ui(e.to_string())),
    }
}

fn success(msg: &str) {
    println!("{}", format!("✔ {msg}").green());
}

fn error(msg: &str) {
    println!("{}", format!("✘ {msg}").red());
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    controller: Mutex<SessionController>,
}

impl TuiInputPort {
    pub fn new(controller: SessionController) -> Self {
        Self {
            controller: Mutex::new(controller),
        }
    }

    fn show_home() {
        println!();
        println!("{}", "🌿 Plant Disease Classification 🌿".bold().green());
        println!("{TAGLINE}");
        println!("Log in or register to classify a leaf photo.");
        println!();
    }

    /// Returns `false` when the user quit.
    async fn menu(&self, ctl: &mut SessionController) -> Result<bool, DomainError> {
        let cursor = match ctl.screen() {
            Screen::LoggingIn => 1,
            Screen::Registering => 2,
            _ => 0,
        };
        let choice = Select::new("Select an option", MenuChoice::ALL.to_vec())
            .with_starting_cursor(cursor)
            .prompt();
        let Some(choice) = answered(choice)? else {
            return Ok(false);
        };
        ctl.choose(choice);
        match ctl.screen() {
            Screen::Menu => {
                Self::show_home();
                Ok(true)
            }
            Screen::Registering => self.register(ctl).await,
            Screen::LoggingIn => self.login(ctl).await,
            // Unreachable from the menu; loop picks it up next round.
            Screen::Authenticated => Ok(true),
        }
    }

    async fn register(&self, ctl: &mut SessionController) -> Result<bool, DomainError> {
        println!("{}", "Create an Account".bold());
        let Some(username) = answered(Text::new("Username:").prompt())? else {
            return Ok(false);
        };
        let Some(email) = answered(Text::new("Email:").prompt())? else {
            return Ok(false);
        };
        let Some(password) = answered(password_prompt("Password:"))? else {
            return Ok(false);
        };
        let Some(confirm_password) = answered(password_prompt("Confirm Password:"))? else {
            return Ok(false);
        };
        let form = RegistrationForm {
            username,
            email,
            password,
            confirm_password,
        };
        match ctl.submit_registration(&form).await {
            Ok(SubmitOutcome::Authenticated) => {
                success("Registration successful! You are now logged in.");
            }
            Ok(_) => {}
            Err(e) => error(&e.to_string()),
        }
        Ok(true)
    }

    async fn login(&self, ctl: &mut SessionController) -> Result<bool, DomainError> {
        println!("{}", "Login to Your Account".bold());
        let Some(email) = answered(Text::new("Email:").prompt())? else {
            return Ok(false);
        };
        let Some(password) = answered(password_prompt("Password:"))? else {
            return Ok(false);
        };
        match ctl.submit_login(&email, &password).await {
            Ok(SubmitOutcome::Authenticated) => success("Login Successful!"),
            Ok(SubmitOutcome::InvalidCredentials) => error(INVALID_CREDENTIALS),
            Ok(SubmitOutcome::Ignored) => {}
            Err(e) => {
                warn!(error = %e, "login could not be checked");
                error(&e.to_string());
            }
        }
        Ok(true)
    }

    async fn authenticated(&self, ctl: &mut SessionController) -> Result<bool, DomainError> {
        let greeting = match ctl.username() {
            Some(name) => format!("Welcome, {name}. What next?"),
            None => "What next?".to_string(),
        };
        let Some(action) = answered(Select::new(&greeting, vec![UPLOAD, LOGOUT]).prompt())? else {
            return Ok(false);
        };
        if action == LOGOUT {
            ctl.logout();
            success("Logged out.");
            return Ok(true);
        }

        let Some(path) = answered(
            Text::new("Choose an image (jpg/jpeg/png path):")
                .with_validator(|s: &str| -> Result<Validation, CustomUserError> {
                    let path = PathBuf::from(s.trim());
                    if !has_accepted_extension(&path) {
                        Ok(Validation::Invalid("Only .jpg, .jpeg and .png files".into()))
                    } else if !path.is_file() {
                        Ok(Validation::Invalid("File not found".into()))
                    } else {
                        Ok(Validation::Valid)
                    }
                })
                .prompt(),
        )?
        else {
            return Ok(false);
        };

        let bytes = match tokio::fs::read(path.trim()).await {
            Ok(b) => b,
            Err(e) => {
                error(&format!("Could not read {}: {e}", path.trim()));
                return Ok(true);
            }
        };

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message("Classifying leaf...");
        spinner.enable_steady_tick(Duration::from_millis(80));
        let result = ctl.classify(bytes).await;
        spinner.finish_and_clear();

        match result {
            Ok(diagnosis) => render_diagnosis(&diagnosis),
            Err(e @ DomainError::Image(_)) => {
                warn!(error = %e, "upload could not be decoded");
                error(&e.to_string());
            }
            Err(e) => return Err(e),
        }
        Ok(true)
    }
}

fn password_prompt(message: &str) -> Result<String, InquireError> {
    Password::new(message)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
}

fn render_diagnosis(d: &Diagnosis) {
    let (w, h) = d.original_dimensions;
    println!();
    println!("Uploaded image: {w}x{h}");
    success(&format!(
        "Predicted Disease: {} ({:.1}% confidence)",
        d.prediction.label,
        d.prediction.confidence * 100.0
    ));
    println!("{}", "Precautions:".bold());
    for step in &d.precautions {
        println!("  - {step}");
    }
    println!();
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        let mut ctl = self.controller.lock().await;
        Self::show_home();
        loop {
            let keep_going = match ctl.screen() {
                Screen::Authenticated => self.authenticated(&mut ctl).await?,
                _ => self.menu(&mut ctl).await?,
            };
            if !keep_going {
                ctl.logout();
                println!("Goodbye!");
                return Ok(());
            }
        }
    }
}
