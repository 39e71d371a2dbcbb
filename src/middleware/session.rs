//! Session middleware
//!
//! Logins are carried in a signed JWT cookie. One-shot notices after
//! signup/login/logout travel as a short code in a second cookie and are
//! cleared once a page has shown them.

use axum::{
    extract::{Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use axum::extract::FromRequestParts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::models::User;
use crate::views::NoticeShown;
use crate::{AppResult, AppState};

pub const SESSION_COOKIE: &str = "childwatch_session";
pub const FLASH_COOKIE: &str = "childwatch_flash";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // User ID
    pub name: String,     // Username
    pub exp: usize,       // Expiration timestamp
    pub iat: usize,       // Issued at
}

/// Logged-in user extracted from the session cookie
#[derive(Debug, Clone, PartialEq)]
pub struct UserContext {
    pub user_id: Uuid,
    pub username: String,
}

// ============================================================================
// FLASH MESSAGES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    SignupWelcome,
    LoginWelcome,
    LoggedOut,
    EmailTaken,
    UsernameTaken,
    MissingFields,
    WrongPassword,
    UnknownEmail,
}

impl Flash {
    const ALL: [Flash; 8] = [
        Flash::SignupWelcome,
        Flash::LoginWelcome,
        Flash::LoggedOut,
        Flash::EmailTaken,
        Flash::UsernameTaken,
        Flash::MissingFields,
        Flash::WrongPassword,
        Flash::UnknownEmail,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Flash::SignupWelcome => "signup",
            Flash::LoginWelcome => "login",
            Flash::LoggedOut => "logout",
            Flash::EmailTaken => "email_taken",
            Flash::UsernameTaken => "username_taken",
            Flash::MissingFields => "missing_fields",
            Flash::WrongPassword => "wrong_password",
            Flash::UnknownEmail => "unknown_email",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.code() == code)
    }

    pub fn level(&self) -> FlashLevel {
        match self {
            Flash::SignupWelcome | Flash::LoginWelcome | Flash::LoggedOut => FlashLevel::Success,
            _ => FlashLevel::Error,
        }
    }

    /// Display text; welcome messages address the logged-in user
    pub fn message(&self, username: Option<&str>) -> String {
        match (self, username) {
            (Flash::SignupWelcome, Some(name)) => format!("{}님, 가입을 축하합니다!", name),
            (Flash::SignupWelcome, None) => "가입을 축하합니다!".to_string(),
            (Flash::LoginWelcome, Some(name)) => format!("{}님, 환영합니다!", name),
            (Flash::LoginWelcome, None) => "환영합니다!".to_string(),
            (Flash::LoggedOut, _) => "로그아웃이 성공적으로 완료되었습니다.".to_string(),
            (Flash::EmailTaken, _) => "이미 등록된 이메일입니다.".to_string(),
            (Flash::UsernameTaken, _) => "이미 사용 중인 이름입니다.".to_string(),
            (Flash::MissingFields, _) => "이름, 이메일, 비밀번호를 모두 입력해 주세요.".to_string(),
            (Flash::WrongPassword, _) => "비밀번호가 올바르지 않습니다.".to_string(),
            (Flash::UnknownEmail, _) => "해당 이메일로 등록된 사용자가 없습니다.".to_string(),
        }
    }
}

/// Session and pending notice for the current request
#[derive(Debug, Clone, Default)]
pub struct Visitor {
    pub user: Option<UserContext>,
    pub flash: Option<Flash>,
}

impl Visitor {
    /// Rendered notice as (level, text)
    pub fn notice(&self) -> Option<(FlashLevel, String)> {
        let username = self.user.as_ref().map(|u| u.username.as_str());
        self.flash.map(|f| (f.level(), f.message(username)))
    }
}

// ============================================================================
// MIDDLEWARE
// ============================================================================

/// Middleware: resolve the session cookie and pending flash for every request
pub async fn load_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let user = cookie_value(req.headers(), SESSION_COOKIE)
        .and_then(|token| decode_session(token, &state.config.jwt_secret));
    let flash = cookie_value(req.headers(), FLASH_COOKIE).and_then(Flash::from_code);

    req.extensions_mut().insert(Visitor { user, flash });

    let mut response = next.run(req).await;

    // Only pages that displayed the notice consume it
    if flash.is_some() && response.extensions().get::<NoticeShown>().is_some() {
        let clear = expired_cookie(FLASH_COOKIE, &state.config);
        if let Ok(value) = HeaderValue::from_str(&clear) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    response
}

fn decode_session(token: &str, secret: &str) -> Option<UserContext> {
    let claims = match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => data.claims,
        Err(e) => {
            tracing::debug!("Ignoring session cookie: {}", e);
            return None;
        }
    };

    Some(UserContext {
        user_id: Uuid::parse_str(&claims.sub).ok()?,
        username: claims.name,
    })
}

// Implement FromRequestParts for Visitor
#[axum::async_trait]
impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Visitor>().cloned().unwrap_or_default())
    }
}

// ============================================================================
// COOKIES
// ============================================================================

/// Value of the named cookie in the `Cookie` request headers
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

fn set_cookie(name: &str, value: &str, max_age: i64, config: &Config) -> String {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}", name, value, max_age);
    if config.is_production() {
        cookie.push_str("; Secure");
    }
    cookie
}

fn expired_cookie(name: &str, config: &Config) -> String {
    set_cookie(name, "", 0, config)
}

/// Signed session token for `user`
pub fn issue_token(user_id: Uuid, username: &str, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(config.jwt_expiration_hours as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        name: username.to_string(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?)
}

/// Redirect home with a notice
pub fn redirect_with_flash(flash: Flash, config: &Config) -> Response {
    redirect_home(vec![set_cookie(FLASH_COOKIE, flash.code(), 60, config)])
}

/// Log `user` in and redirect home with a notice
pub fn login_redirect(user: &User, flash: Flash, config: &Config) -> AppResult<Response> {
    let token = issue_token(user.id, &user.username, config)?;
    Ok(redirect_home(vec![
        set_cookie(SESSION_COOKIE, &token, config.session_ttl_secs(), config),
        set_cookie(FLASH_COOKIE, flash.code(), 60, config),
    ]))
}

/// Drop the session and redirect home with a notice
pub fn logout_redirect(flash: Flash, config: &Config) -> Response {
    redirect_home(vec![
        expired_cookie(SESSION_COOKIE, config),
        set_cookie(FLASH_COOKIE, flash.code(), 60, config),
    ])
}

fn redirect_home(cookies: Vec<String>) -> Response {
    let headers = AppendHeaders(cookies.into_iter().map(|c| (SET_COOKIE, c)));
    (headers, Redirect::to("/")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; childwatch_flash=login"));
        headers.append(COOKIE, HeaderValue::from_static("childwatch_session=abc.def"));

        assert_eq!(cookie_value(&headers, FLASH_COOKIE), Some("login"));
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), Some("abc.def"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_session_token_decodes() {
        let config = Config::for_tests();
        let id = Uuid::new_v4();
        let token = issue_token(id, "박지민", &config).unwrap();

        let user = decode_session(&token, &config.jwt_secret).unwrap();
        assert_eq!(user, UserContext { user_id: id, username: "박지민".to_string() });

        assert!(decode_session(&token, "other-secret").is_none());
        assert!(decode_session("garbage", &config.jwt_secret).is_none());
    }

    #[test]
    fn test_flash_codes() {
        for flash in Flash::ALL {
            assert_eq!(Flash::from_code(flash.code()), Some(flash));
        }
        assert_eq!(Flash::from_code("unknown"), None);
        assert_eq!(Flash::UnknownEmail.level(), FlashLevel::Error);
    }

    #[test]
    fn test_notice_uses_session_name() {
        let visitor = Visitor {
            user: Some(UserContext { user_id: Uuid::nil(), username: "서윤".to_string() }),
            flash: Some(Flash::SignupWelcome),
        };
        assert_eq!(
            visitor.notice(),
            Some((FlashLevel::Success, "서윤님, 가입을 축하합니다!".to_string()))
        );
        assert_eq!(Visitor::default().notice(), None);
    }

    #[test]
    fn test_logout_redirect_clears_session() {
        let response = logout_redirect(Flash::LoggedOut, &Config::for_tests());
        assert!(response.status().is_redirection());

        let cookies: Vec<_> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("childwatch_session=;"));
        assert!(cookies[0].contains("Max-Age=0"));
        assert!(cookies[1].starts_with("childwatch_flash=logout;"));
    }
}
