//! Session state machine. Gates classification behind a successful login.
//!
//! Menu -> {Registering, LoggingIn} -> Authenticated -> (logout) -> Menu.
//! The session is owned here and handed through every request; nothing is global.

use crate::domain::{
    Diagnosis, DomainError, MenuChoice, RegistrationError, RegistrationForm, Screen, Session,
};
use crate::usecases::{AuthService, ClassifyService};
use std::sync::Arc;
use tracing::{debug, info};

/// Shown for both unknown email and wrong password.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password.";

/// Result of submitting a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Accepted; the session is now authenticated.
    Authenticated,
    /// Login rejected. Deliberately does not say which part was wrong.
    InvalidCredentials,
    /// Submitted from a screen that has no such form; nothing happened.
    Ignored,
}

pub struct SessionController {
    auth: Arc<AuthService>,
    classify: Arc<ClassifyService>,
    session: Session,
    screen: Screen,
    username: Option<String>,
}

impl SessionController {
    pub fn new(auth: Arc<AuthService>, classify: Arc<ClassifyService>) -> Self {
        Self {
            auth,
            classify,
            session: Session::default(),
            screen: Screen::Menu,
            username: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn session(&self) -> Session {
        self.session
    }

    /// Username of the logged-in user, when known.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Navigate the pre-login menu. No-op once authenticated.
    pub fn choose(&mut self, choice: MenuChoice) {
        if self.session.logged_in {
            debug!(?choice, "menu choice ignored while authenticated");
            return;
        }
        self.screen = choice.target();
    }

    pub async fn submit_registration(
        &mut self,
        form: &RegistrationForm,
    ) -> Result<SubmitOutcome, RegistrationError> {
        if self.screen != Screen::Registering {
            return Ok(SubmitOutcome::Ignored);
        }
        self.auth
            .register(
                &form.username,
                &form.email,
                &form.password,
                &form.confirm_password,
            )
            .await?;
        self.enter_authenticated(Some(form.username.clone()));
        Ok(SubmitOutcome::Authenticated)
    }

    pub async fn submit_login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<SubmitOutcome, DomainError> {
        if self.screen != Screen::LoggingIn {
            return Ok(SubmitOutcome::Ignored);
        }
        if !self.auth.login(email, password).await? {
            return Ok(SubmitOutcome::InvalidCredentials);
        }
        let username = self
            .auth
            .user_by_email(email)
            .await?
            .map(|u| u.username);
        self.enter_authenticated(username);
        Ok(SubmitOutcome::Authenticated)
    }

    /// Classify an upload. Only allowed while authenticated.
    pub async fn classify(&self, bytes: Vec<u8>) -> Result<Diagnosis, DomainError> {
        if self.screen != Screen::Authenticated || !self.session.logged_in {
            return Err(DomainError::NotAuthenticated);
        }
        self.classify.diagnose(bytes).await
    }

    /// Reset the session and return to the menu.
    pub fn logout(&mut self) {
        if let Some(name) = self.username.take() {
            info!(username = %name, "logged out");
        }
        self.session = Session::default();
        self.screen = Screen::Menu;
    }

    fn enter_authenticated(&mut self, username: Option<String>) {
        self.session.logged_in = true;
        self.screen = Screen::Authenticated;
        self.username = username;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::imaging::ImagePreprocessor;
    use crate::adapters::persistence::SqliteUserRepo;
    use crate::adapters::security::Pbkdf2Hasher;
    use crate::domain::{DiseaseLabel, ImageTensor, NUM_CLASSES, Prediction, UserRecord};
    use crate::ports::{ClassifierPort, UserRepoPort};
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::time::Duration;

    /// Classifier whose output peaks at a fixed index.
    struct PeakClassifier(usize);

    impl ClassifierPort for PeakClassifier {
        fn predict(&self, _image: &ImageTensor) -> Result<Prediction, DomainError> {
            let mut probs = vec![0.01f32; NUM_CLASSES];
            probs[self.0] = 1.0 - 0.01 * (NUM_CLASSES as f32 - 1.0);
            Prediction::from_probabilities(probs).ok_or(DomainError::Model("size".into()))
        }
    }

    /// Store whose lookups fail, as when the database file is locked or gone.
    struct UnavailableRepo;

    #[async_trait::async_trait]
    impl UserRepoPort for UnavailableRepo {
        async fn initialize(&self) -> Result<(), DomainError> {
            Ok(())
        }

        async fn insert(&self, _: &str, _: &str, _: &str) -> Result<(), DomainError> {
            Err(DomainError::Repo("database is locked".into()))
        }

        async fn find_password_hash(&self, _: &str) -> Result<Option<String>, DomainError> {
            Err(DomainError::Repo("database is locked".into()))
        }

        async fn find_by_email(&self, _: &str) -> Result<Option<UserRecord>, DomainError> {
            Err(DomainError::Repo("database is locked".into()))
        }
    }

    async fn controller(dir: &std::path::Path, peak: usize) -> SessionController {
        let repo = SqliteUserRepo::open(dir, Duration::from_secs(5))
            .await
            .unwrap();
        repo.initialize().await.unwrap();
        let auth = AuthService::new(Arc::new(repo), Arc::new(Pbkdf2Hasher::new(1_000)));
        let classify = ClassifyService::new(
            Arc::new(ImagePreprocessor::new()),
            Arc::new(PeakClassifier(peak)),
        );
        SessionController::new(Arc::new(auth), Arc::new(classify))
    }

    fn leaf_png() -> Vec<u8> {
        let img = RgbImage::from_pixel(64, 64, Rgb([40, 160, 60]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn alice() -> RegistrationForm {
        RegistrationForm {
            username: "alice".into(),
            email: "alice@x.com".into(),
            password: "Secret1!".into(),
            confirm_password: "Secret1!".into(),
        }
    }

    #[tokio::test]
    async fn test_end_to_end_healthy_tomato() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller(dir.path(), 8).await;
        assert_eq!(ctl.screen(), Screen::Menu);

        ctl.choose(MenuChoice::Register);
        assert_eq!(
            ctl.submit_registration(&alice()).await.unwrap(),
            SubmitOutcome::Authenticated
        );
        ctl.logout();
        assert_eq!(ctl.screen(), Screen::Menu);
        assert!(!ctl.session().logged_in);

        ctl.choose(MenuChoice::Login);
        assert_eq!(
            ctl.submit_login("alice@x.com", "wrong").await.unwrap(),
            SubmitOutcome::InvalidCredentials
        );
        assert_eq!(ctl.screen(), Screen::LoggingIn);
        assert_eq!(
            ctl.submit_login("alice@x.com", "Secret1!").await.unwrap(),
            SubmitOutcome::Authenticated
        );
        assert_eq!(ctl.username(), Some("alice"));

        let diagnosis = ctl.classify(leaf_png()).await.unwrap();
        assert_eq!(diagnosis.prediction.label, DiseaseLabel::TomatoHealthy);
        assert_eq!(
            diagnosis.precautions,
            vec!["No action needed. Plant is healthy!".to_string()]
        );
        assert_eq!(diagnosis.original_dimensions, (64, 64));
    }

    #[tokio::test]
    async fn test_classify_requires_login() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller(dir.path(), 0).await;
        assert!(matches!(
            ctl.classify(leaf_png()).await,
            Err(DomainError::NotAuthenticated)
        ));

        ctl.choose(MenuChoice::Login);
        assert!(matches!(
            ctl.classify(leaf_png()).await,
            Err(DomainError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_submit_on_wrong_screen_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller(dir.path(), 0).await;

        assert_eq!(
            ctl.submit_registration(&alice()).await.unwrap(),
            SubmitOutcome::Ignored
        );
        ctl.choose(MenuChoice::Register);
        assert_eq!(
            ctl.submit_login("alice@x.com", "Secret1!").await.unwrap(),
            SubmitOutcome::Ignored
        );
        assert_eq!(ctl.screen(), Screen::Registering);
    }

    #[tokio::test]
    async fn test_failed_registration_keeps_form() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller(dir.path(), 0).await;
        ctl.choose(MenuChoice::Register);

        let mut form = alice();
        form.confirm_password = "different".into();
        assert!(matches!(
            ctl.submit_registration(&form).await,
            Err(RegistrationError::PasswordMismatch)
        ));
        assert_eq!(ctl.screen(), Screen::Registering);
        assert!(!ctl.session().logged_in);
    }

    #[tokio::test]
    async fn test_menu_ignored_while_authenticated() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller(dir.path(), 0).await;
        ctl.choose(MenuChoice::Register);
        ctl.submit_registration(&alice()).await.unwrap();

        ctl.choose(MenuChoice::Login);
        assert_eq!(ctl.screen(), Screen::Authenticated);
        ctl.choose(MenuChoice::Home);
        assert_eq!(ctl.screen(), Screen::Authenticated);
    }

    #[tokio::test]
    async fn test_missing_advice_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller(dir.path(), 12).await;
        ctl.choose(MenuChoice::Register);
        ctl.submit_registration(&alice()).await.unwrap();

        let diagnosis = ctl.classify(leaf_png()).await.unwrap();
        assert_eq!(diagnosis.prediction.label, DiseaseLabel::TomatoSpiderMites);
        assert_eq!(
            diagnosis.precautions,
            vec!["No specific precautions available.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_undecodable_upload_surfaces_image_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller(dir.path(), 0).await;
        ctl.choose(MenuChoice::Register);
        ctl.submit_registration(&alice()).await.unwrap();

        assert!(matches!(
            ctl.classify(b"garbage".to_vec()).await,
            Err(DomainError::Image(_))
        ));
        assert_eq!(ctl.screen(), Screen::Authenticated);
    }

    #[tokio::test]
    async fn test_storage_error_on_login_keeps_login_screen() {
        let auth = AuthService::new(Arc::new(UnavailableRepo), Arc::new(Pbkdf2Hasher::new(1_000)));
        let classify = ClassifyService::new(
            Arc::new(ImagePreprocessor::new()),
            Arc::new(PeakClassifier(0)),
        );
        let mut ctl = SessionController::new(Arc::new(auth), Arc::new(classify));
        ctl.choose(MenuChoice::Login);

        assert!(matches!(
            ctl.submit_login("alice@x.com", "Secret1!").await,
            Err(DomainError::Repo(_))
        ));
        assert_eq!(ctl.screen(), Screen::LoggingIn);
        assert!(!ctl.session().logged_in);

        // The same session can still navigate after the failure.
        ctl.choose(MenuChoice::Register);
        assert_eq!(ctl.screen(), Screen::Registering);
    }
}
