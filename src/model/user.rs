use serde::{Deserialize, Serialize};

/// An account as returned by `/auth/register` and `/auth/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub created_at: String,
}

/// Body of `POST /auth/register`
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Form fields of `POST /auth/login` (OAuth2 password flow: the email goes in
/// `username`)
#[derive(Debug, Clone, Serialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Response of `POST /auth/login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Response of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

/// Canonical form of an email address (the server compares lower-cased,
/// trimmed addresses).
pub fn canonical_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_email_trims_and_lowercases() {
        assert_eq!(canonical_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn login_form_is_url_encoded() {
        let form = LoginForm {
            username: "ada@example.com".into(),
            password: "p&ss word".into(),
        };
        assert_eq!(
            serde_urlencoded::to_string(&form).unwrap(),
            "username=ada%40example.com&password=p%26ss+word"
        );
    }

    #[test]
    fn health_ignores_extra_fields() {
        let h: Health = serde_json::from_str(r#"{"status":"ok","version":"0.2.0"}"#).unwrap();
        assert_eq!(h.status, "ok");
    }
}
