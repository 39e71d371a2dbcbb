//! Server-side HTML rendering
//!
//! Pages are plain `format!` templates sharing one layout. Every value that
//! came from a user or the database goes through [`escape_html`].

pub mod form;
pub mod home;
pub mod predict;
pub mod pages;

use axum::response::{Html, IntoResponse, Response};

use crate::middleware::session::Visitor;

pub use home::HomePage;
pub use predict::{PredictPage, PredictionOutcome};

/// Response extension: the page body went through [`layout`] and showed the
/// pending notice
#[derive(Debug, Clone, Copy)]
pub struct NoticeShown;

/// A full page rendered with [`layout`]
pub struct Page(pub String);

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        let mut response = Html(self.0).into_response();
        response.extensions_mut().insert(NoticeShown);
        response
    }
}

/// Escape text for use in element content and quoted attributes
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"
    :root { --bg: #f8fafc; --card: #ffffff; --border: #e2e8f0; --text: #0f172a;
            --muted: #64748b; --primary: #2563eb; --danger: #dc2626; --ok: #16a34a; }
    * { box-sizing: border-box; }
    body { margin: 0; font-family: -apple-system, 'Segoe UI', 'Malgun Gothic', sans-serif;
           background: var(--bg); color: var(--text); line-height: 1.5; }
    header { background: var(--card); border-bottom: 1px solid var(--border);
             padding: 0.75rem 2rem; display: flex; align-items: center; gap: 1.5rem; flex-wrap: wrap; }
    header nav a { margin-right: 1rem; color: var(--primary); text-decoration: none; }
    header .auth { margin-left: auto; display: flex; gap: 0.75rem; align-items: center; }
    header .auth form { display: inline-flex; gap: 0.25rem; }
    main { max-width: 1200px; margin: 0 auto; padding: 2rem; }
    .card { background: var(--card); border: 1px solid var(--border); border-radius: 0.5rem;
            padding: 1.25rem; margin-bottom: 1.5rem; }
    .grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 1rem; }
    .stat .value { font-size: 1.75rem; font-weight: 700; }
    .stat .label { color: var(--muted); font-size: 0.875rem; }
    .flash { padding: 0.75rem 1rem; border-radius: 0.375rem; margin-bottom: 1rem; }
    .flash.success { background: #dcfce7; color: #166534; }
    .flash.error { background: #fee2e2; color: #991b1b; }
    table { width: 100%; border-collapse: collapse; font-size: 0.9rem; }
    th, td { padding: 0.5rem; border-bottom: 1px solid var(--border); text-align: left; }
    .badge { padding: 0.125rem 0.5rem; border-radius: 9999px; font-size: 0.8rem; color: #fff; }
    .badge.danger { background: var(--danger); }
    .badge.normal { background: var(--ok); }
    .field { display: flex; flex-direction: column; gap: 0.25rem; }
    .field .error { color: var(--danger); font-size: 0.8rem; }
    .bar-row { display: flex; align-items: center; gap: 0.5rem; margin: 0.25rem 0; }
    .bar-row .name { width: 8rem; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }
    .bar { height: 1rem; border-radius: 0.25rem; background: var(--primary); }
    .bar.danger { background: var(--danger); }
    .muted { color: var(--muted); }
    button { background: var(--primary); color: #fff; border: 0; border-radius: 0.375rem;
             padding: 0.4rem 0.9rem; cursor: pointer; }
    button.danger { background: var(--danger); }
"#;

/// Wrap page content in the shared layout
pub fn layout(title: &str, visitor: &Visitor, content: &str) -> String {
    let notice = match visitor.notice() {
        Some((level, text)) => format!(
            r#"<div class="flash {}">{}</div>"#,
            level.as_str(),
            escape_html(&text)
        ),
        None => String::new(),
    };

    format!(
        r##"<!DOCTYPE html>
<html lang="ko">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} | 아동 관찰 위험 예측</title>
    <style>{style}</style>
</head>
<body>
    <header>
        <strong>아동 관찰 위험 예측</strong>
        <nav>
            <a href="/">대시보드</a>
            <a href="/predict">단건 예측</a>
            <a href="/bulk">일괄 업로드</a>
            <a href="/index">소개</a>
        </nav>
        <div class="auth">{auth}</div>
    </header>
    <main>
        {notice}
        {content}
    </main>
</body>
</html>"##,
        title = escape_html(title),
        style = STYLE,
        auth = auth_section(visitor),
        notice = notice,
        content = content,
    )
}

fn auth_section(visitor: &Visitor) -> String {
    match &visitor.user {
        Some(user) => format!(
            r#"<span>{}님</span>
            <form method="post" action="/logout"><button type="submit">로그아웃</button></form>"#,
            escape_html(&user.username)
        ),
        None => r#"<form method="post" action="/login">
                <input type="email" name="email" placeholder="이메일" required>
                <input type="password" name="password" placeholder="비밀번호" required>
                <button type="submit">로그인</button>
            </form>
            <details>
                <summary>회원가입</summary>
                <form method="post" action="/signup">
                    <input type="text" name="name" placeholder="이름" required>
                    <input type="email" name="email" placeholder="이메일" required>
                    <input type="password" name="password" placeholder="비밀번호" required>
                    <button type="submit">가입</button>
                </form>
            </details>"#
            .to_string(),
    }
}

/// Standalone error page used by `AppError`
pub fn error_page(status: u16, message: &str) -> String {
    let content = format!(
        r#"<div class="card">
            <h1>{status}</h1>
            <p>{message}</p>
            <p><a href="/">대시보드로 돌아가기</a></p>
        </div>"#,
        status = status,
        message = escape_html(message),
    );
    layout("오류", &Visitor::default(), &content)
}

/// Badge for a stored verdict
pub(crate) fn verdict_badge(is_danger: bool) -> &'static str {
    if is_danger {
        r#"<span class="badge danger">위험</span>"#
    } else {
        r#"<span class="badge normal">정상</span>"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::session::{Flash, UserContext};
    use uuid::Uuid;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert('x')</script> & "q""#),
            "&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt; &amp; &quot;q&quot;"
        );
    }

    #[test]
    fn test_layout_shows_user_and_notice() {
        let visitor = Visitor {
            user: Some(UserContext { user_id: Uuid::nil(), username: "<민서>".to_string() }),
            flash: Some(Flash::LoginWelcome),
        };
        let html = layout("대시보드", &visitor, "<p>본문</p>");

        assert!(html.contains("&lt;민서&gt;님"));
        assert!(html.contains(r#"<div class="flash success">&lt;민서&gt;님, 환영합니다!</div>"#));
        assert!(html.contains("action=\"/logout\""));
        assert!(!html.contains("action=\"/signup\""));
    }

    #[test]
    fn test_anonymous_layout_offers_login() {
        let html = layout("소개", &Visitor::default(), "");
        assert!(html.contains("action=\"/login\""));
        assert!(html.contains("action=\"/signup\""));
    }
}
