use crate::api::client::{ApiClient, Auth};
use crate::api::errors::{classify, ApiError, ClassifiedError, ErrorKind, Resource};
use crate::api::types::{Profile, SignIn, SignInRequest};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn sign_in(&self, credentials: &SignInRequest) -> Result<SignIn, ApiError>;

    async fn profile(&self) -> Result<Profile, ApiError>;
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn sign_in(&self, credentials: &SignInRequest) -> Result<SignIn, ApiError> {
        self.send_json(Method::POST, "authentication/sign-in", credentials, Auth::Anonymous)
            .await
    }

    async fn profile(&self) -> Result<Profile, ApiError> {
        self.get("users/profile", &[]).await
    }
}

/// Role name attached to a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperatorRole {
    SuperAdmin,
    Admin,
    Other(String),
}

impl OperatorRole {
    /// Only admins may use the console at all.
    pub fn can_sign_in(&self) -> bool {
        matches!(self, OperatorRole::SuperAdmin | OperatorRole::Admin)
    }

    /// Order status changes are reserved for super admins.
    pub fn can_advance_orders(&self) -> bool {
        matches!(self, OperatorRole::SuperAdmin)
    }
}

impl From<String> for OperatorRole {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "super admin" => OperatorRole::SuperAdmin,
            "admin" => OperatorRole::Admin,
            _ => OperatorRole::Other(value),
        }
    }
}

impl From<OperatorRole> for String {
    fn from(role: OperatorRole) -> Self {
        role.to_string()
    }
}

impl fmt::Display for OperatorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorRole::SuperAdmin => f.write_str("super admin"),
            OperatorRole::Admin => f.write_str("admin"),
            OperatorRole::Other(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Email is required")]
    MissingEmail,
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Password is required")]
    MissingPassword,
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Your account ({role}) is not authorized to use the admin console.")]
    NotAuthorized { role: OperatorRole },
    #[error("{0}")]
    Api(ClassifiedError),
}

impl From<ApiError> for LoginError {
    fn from(err: ApiError) -> Self {
        match err.kind() {
            ErrorKind::Unauthorized | ErrorKind::BadRequest => LoginError::InvalidCredentials,
            _ => LoginError::Api(classify(&err, Resource::Profile)),
        }
    }
}

/// Validate input locally before any request is made.
pub fn validate_credentials(email: &str, password: &str) -> Result<SignInRequest, LoginError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(LoginError::MissingEmail);
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err(LoginError::InvalidEmail);
    }
    if password.is_empty() {
        return Err(LoginError::MissingPassword);
    }

    Ok(SignInRequest {
        email: email.to_string(),
        password: password.to_string(),
    })
}

/// Sign in and refuse accounts whose role may not use the console.
pub async fn sign_in<A: AuthApi + ?Sized>(
    api: &A,
    email: &str,
    password: &str,
) -> Result<(SignIn, OperatorRole), LoginError> {
    let credentials = validate_credentials(email, password)?;
    let signed_in = api.sign_in(&credentials).await?;

    let role = OperatorRole::from(signed_in.user.role_name.clone());
    if !role.can_sign_in() {
        tracing::warn!(email = %signed_in.user.email, role = %role, "Sign-in refused for role");
        return Err(LoginError::NotAuthorized { role });
    }

    tracing::info!(email = %signed_in.user.email, role = %role, "Signed in");
    Ok((signed_in, role))
}
