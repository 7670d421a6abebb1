use axum::{extract::Query, response::Html};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    pub next: Option<String>,
}

/// Only same-site absolute paths are followed after login.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// GET /login - Bare sign-in form posting to `/api/auth/login`
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> Html<String> {
    let next = escape_attr(safe_next(query.next.as_deref()));

    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Sign in</title></head>
<body>
<form id="login" data-next="{next}">
  <label>Email <input name="email" type="email" autocomplete="email" required></label>
  <label>Password <input name="password" type="password" autocomplete="current-password" required></label>
  <button type="submit">Sign in</button>
  <p id="error" role="alert"></p>
</form>
<script>
document.getElementById("login").addEventListener("submit", async (event) => {{
  event.preventDefault();
  const form = event.target;
  const res = await fetch("/api/auth/login", {{
    method: "POST",
    headers: {{ "Content-Type": "application/json" }},
    body: JSON.stringify({{ email: form.email.value, password: form.password.value }}),
  }});
  if (res.ok) {{
    window.location.assign(form.dataset.next);
  }} else {{
    const body = await res.json().catch(() => ({{}}));
    document.getElementById("error").textContent = body.error || "Sign in failed";
  }}
}});
</script>
</body>
</html>
"#
    ))
}
