//! Identity operations: STUDENT registration, email verification, login and
//! ADMIN bootstrap
//!
//! Registration is two-phase. The STUDENT row is staged, the verification
//! email is sent, and only then is the row committed. A failed send rolls the
//! row back, so an unverifiable account is never visible to other readers.

use chrono::Utc;
use common::{
    calendar,
    error::{DomainError, DomainResult, VerificationFailure},
    models::{Role, User},
    password::{hash_password, verify_password},
    repositories::UserStore,
    token::JwtService,
    validation::{
        require, validate_code, validate_email, validate_name, validate_password,
        validate_student_email,
    },
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    config::AuthSettings,
    mailer::VerificationMailer,
    models::{
        AuthResponse, CreateAdminRequest, LoginRequest, MessageResponse, RegisterRequest,
        VerifyEmailRequest,
    },
    verification::CodeIssuer,
};

const INVALID_CREDENTIALS: &str = "Invalid email/username or password";

pub struct AuthService {
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn VerificationMailer>,
    jwt: JwtService,
    codes: CodeIssuer,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        mailer: Arc<dyn VerificationMailer>,
        jwt: JwtService,
        settings: AuthSettings,
    ) -> Self {
        Self {
            users,
            mailer,
            jwt,
            codes: CodeIssuer::new(settings.verification_ttl),
            settings,
        }
    }

    /// Register a STUDENT and email a verification code; the caller is not signed in
    pub async fn register(&self, input: RegisterRequest) -> DomainResult<MessageResponse> {
        validate_name(&input.name)?;
        validate_email(&input.email)?;
        validate_student_email(&input.email, &self.settings.student_domain)?;
        validate_password(&input.password)?;
        require(&input.whatsapp, "WhatsApp is required")?;
        let birth_date = calendar::parse_day(&input.birth_date)
            .map_err(|_| DomainError::validation("Invalid birth date"))?;

        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(DomainError::conflict("Email already registered"));
        }

        let pending = self.codes.issue();
        let code = pending.code.clone();
        let user = User::new_student(
            input.name.trim().to_string(),
            input.email,
            hash_password(&input.password)?,
            input.whatsapp.trim().to_string(),
            birth_date,
            pending,
        );

        let mut staged = self.users.stage(user).await?;
        let email = staged.user().email.clone();

        if let Err(e) = self.mailer.send_verification_code(&email, &code).await {
            warn!("Rolling back registration of {}: {}", email, e);
            staged.rollback().await?;
            return Err(DomainError::Dependency(
                "Failed to send verification email".to_string(),
            ));
        }

        let user = staged.commit().await?;
        info!("Registered student {} pending verification", user.id);

        Ok(MessageResponse::new("Registration started. Check your email."))
    }

    /// Sign in by email or username
    pub async fn login(&self, input: LoginRequest) -> DomainResult<AuthResponse> {
        require(&input.email, "Email or username is required")?;
        require(&input.password, "Password is required")?;

        let user = match self.users.find_by_email(&input.email).await? {
            Some(user) => Some(user),
            None => self.users.find_by_username(&input.email).await?,
        };

        let user = user
            .filter(|user| verify_password(&input.password, &user.password_hash))
            .ok_or_else(|| DomainError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !user.can_sign_in() {
            return Err(DomainError::UnverifiedAccount);
        }

        info!("User {} signed in as {}", user.id, user.role);
        self.issue(&user)
    }

    /// Confirm a STUDENT email with the code sent at registration
    ///
    /// An expired code is left in place; only a successful verification clears it.
    pub async fn verify_email(&self, input: VerifyEmailRequest) -> DomainResult<MessageResponse> {
        validate_email(&input.email)?;
        validate_code(&input.code)?;

        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))?;

        if user.email_verified {
            return Err(DomainError::Verification(VerificationFailure::AlreadyVerified));
        }

        let pending = user
            .verification
            .as_ref()
            .ok_or(DomainError::Verification(VerificationFailure::MissingCode))?;

        if pending.code != input.code {
            return Err(DomainError::Verification(VerificationFailure::CodeMismatch));
        }

        if pending.is_expired(Utc::now()) {
            return Err(DomainError::Verification(VerificationFailure::Expired));
        }

        self.users.mark_verified(user.id).await?;
        info!("Email verified for user {}", user.id);

        Ok(MessageResponse::new("Email verified successfully."))
    }

    /// Create a verified ADMIN, guarded by the configured setup key
    pub async fn create_admin(&self, input: CreateAdminRequest) -> DomainResult<AuthResponse> {
        validate_name(&input.name)?;
        validate_email(&input.email)?;
        validate_password(&input.password)?;

        if self.settings.setup_key.is_empty() || input.setup_key != self.settings.setup_key {
            warn!("Rejected admin bootstrap for {}", input.email);
            return Err(DomainError::Authorization("Invalid setup key".to_string()));
        }

        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(DomainError::conflict("Email already registered"));
        }

        let admin = User::new_staff(
            Role::Admin,
            input.name.trim().to_string(),
            input.email,
            None,
            hash_password(&input.password)?,
            None,
        );
        let admin = self.users.insert(admin).await?;
        info!("Created admin {}", admin.id);

        self.issue(&admin)
    }

    fn issue(&self, user: &User) -> DomainResult<AuthResponse> {
        Ok(AuthResponse {
            token: self.jwt.generate_token(user)?,
            user: user.to_public(),
        })
    }
}
