use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, PublicUser},
        jwt::JwtKeys,
        password::verify_password,
    },
    error::{AppError, Result},
    repo::{Repository, Role},
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

/// The role-specific identifier of a login request.
fn identifier(req: &LoginRequest) -> Result<String> {
    let id = match req.role {
        Role::Student => non_blank(req.code.as_ref()),
        Role::Teacher => non_blank(req.dni.as_ref()).or_else(|| non_blank(req.code.as_ref())),
        Role::Admin => non_blank(req.email.as_ref()).map(|e| e.to_lowercase()),
    };
    let id = id.ok_or_else(|| {
        let field = match req.role {
            Role::Student => "code",
            Role::Teacher => "dni",
            Role::Admin => "email",
        };
        AppError::ValidationMissing(format!("{field} is required"))
    })?;
    if req.role == Role::Admin && !is_valid_email(&id) {
        return Err(AppError::ValidationMissing("a valid email is required".into()));
    }
    Ok(id)
}

pub async fn login(repo: &dyn Repository, keys: &JwtKeys, req: LoginRequest) -> Result<LoginResponse> {
    let identifier = identifier(&req)?;
    let password = req
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::ValidationMissing("password is required".into()))?;

    let record = repo.find_login(req.role, &identifier).await?.ok_or_else(|| {
        warn!(role = %req.role, %identifier, "login unknown user");
        AppError::NotFound("User not found".into())
    })?;

    if !verify_password(password, &record.password_hash)? {
        warn!(role = %req.role, user_id = record.user_id, "login invalid password");
        return Err(AppError::Unauthorized("Incorrect password".into()));
    }

    let token = keys.sign(record.user_id, req.role, &record.code)?;
    info!(role = %req.role, user_id = record.user_id, "user logged in");

    let (code, dni, email) = match req.role {
        Role::Student => (Some(record.code), None, None),
        Role::Teacher => (None, Some(record.code), None),
        Role::Admin => (None, None, Some(record.email)),
    };
    Ok(LoginResponse {
        success: true,
        token,
        user: PublicUser {
            id: record.user_id,
            role: req.role,
            name: format!("{} {}", record.name, record.surname),
            code,
            dni,
            email,
        },
    })
}
