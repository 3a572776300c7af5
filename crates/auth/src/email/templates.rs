use crate::email::service::{EmailMessage, EmailService};
use crate::error::{AuthError, Result};
use serde_json::Value;
use sso_database::{Database, DatabaseError, EmailTemplateRepository};
use sso_models::email_template::{
    is_valid_template_key, CONFIRM_ACCOUNT_TEMPLATE, INVITE_USER_TEMPLATE, OTP_TEMPLATE,
};
use sso_models::{EmailTemplate, NewEmailTemplate, RenderedEmail, UpdateEmailTemplate};
use validator::Validate;

lazy_static::lazy_static! {
    // {{=it.path}} inserts raw, {{!it.path}} inserts HTML-escaped
    static ref PLACEHOLDER: regex::Regex =
        regex::Regex::new(r"\{\{\s*([=!])\s*it\.([A-Za-z0-9_.]+)\s*\}\}").unwrap();
    static ref TAG: regex::Regex = regex::Regex::new(r"<[^>]*>").unwrap();
}

/// Substitute placeholders in `template` with values from `data`.
/// Missing values render as an empty string.
pub fn render(template: &str, data: &Value) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures| {
            let value = lookup(data, &caps[2]).map(to_text).unwrap_or_default();
            if &caps[1] == "!" {
                escape_html(&value)
            } else {
                value
            }
        })
        .into_owned()
}

fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(data, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '/' => escaped.push_str("&#47;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Plain-text alternative of an HTML body
pub fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, "").trim().to_string()
}

pub fn render_template(template: &EmailTemplate, data: &Value, title_data: &Value) -> RenderedEmail {
    RenderedEmail {
        title: render(&template.title, title_data),
        body: render(&template.template, data),
    }
}

/// Built-in content for the keys the server sends itself,
/// used until an administrator stores a replacement.
pub fn default_template(key: &str) -> Option<EmailTemplate> {
    let (title, template, args) = match key {
        INVITE_USER_TEMPLATE => (
            "You have been invited",
            r#"<p>Hello,</p>
<p>An account has been created for you. Follow the link below to choose your password:</p>
<p><a href="{{=it.url}}">{{!it.url}}</a></p>"#,
            vec!["url"],
        ),
        CONFIRM_ACCOUNT_TEMPLATE => (
            "Confirm your account",
            r#"<p>Hello,</p>
<p>Please confirm your email address by following the link below:</p>
<p><a href="{{=it.url}}">{{!it.url}}</a></p>"#,
            vec!["url"],
        ),
        OTP_TEMPLATE => (
            "Your validation code",
            r#"<p>Your validation code is <strong>{{!it.otp}}</strong>.</p>"#,
            vec!["otp"],
        ),
        _ => return None,
    };

    Some(EmailTemplate {
        key: key.to_string(),
        title: title.to_string(),
        description: None,
        template: template.to_string(),
        args: serde_json::json!(args),
    })
}

/// Stored notification templates and delivery through them
#[derive(Clone)]
pub struct EmailTemplateService {
    templates: EmailTemplateRepository,
    email: EmailService,
}

impl EmailTemplateService {
    pub fn new(db: &Database, email: EmailService) -> Self {
        Self {
            templates: EmailTemplateRepository::new(db.pool().clone()),
            email,
        }
    }

    pub fn email(&self) -> &EmailService {
        &self.email
    }

    /// Stored template, or the built-in one for well-known keys
    pub async fn get(&self, key: &str) -> Result<EmailTemplate> {
        match self.templates.find_by_key(key).await {
            Ok(template) => Ok(template),
            Err(DatabaseError::NotFound(msg)) => {
                default_template(key).ok_or(AuthError::NotFound(msg))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn render(&self, key: &str, data: &Value, title_data: &Value) -> Result<RenderedEmail> {
        let template = self.get(key).await?;
        Ok(render_template(&template, data, title_data))
    }

    pub async fn send_template(
        &self,
        to: &str,
        key: &str,
        data: &Value,
        title_data: &Value,
    ) -> Result<()> {
        let rendered = self.render(key, data, title_data).await?;

        self.email
            .send(EmailMessage {
                to: to.to_string(),
                to_name: None,
                subject: rendered.title,
                text_body: strip_tags(&rendered.body),
                html_body: Some(rendered.body),
            })
            .await?;

        tracing::info!("Template {} sent to {}", key, to);
        Ok(())
    }

    pub async fn create(&self, template: NewEmailTemplate) -> Result<EmailTemplate> {
        template.validate()?;
        if !is_valid_template_key(&template.key) {
            return Err(AuthError::ValidationError(format!(
                "Template key {} must match [A-Z0-9_]+",
                template.key
            )));
        }

        Ok(self.templates.create(&template).await?)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<EmailTemplate>> {
        Ok(self.templates.list(limit, offset).await?)
    }

    pub async fn count(&self) -> Result<i64> {
        Ok(self.templates.count().await?)
    }

    pub async fn update(&self, key: &str, update: UpdateEmailTemplate) -> Result<EmailTemplate> {
        update.validate()?;
        Ok(self.templates.update(key, &update).await?)
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        if !self.templates.delete(key).await? {
            return Err(DatabaseError::not_found("EmailTemplate", key).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_raw_and_escaped() {
        let data = json!({"url": "https://sso.local/?a=1&b=2", "name": "<Ana>"});

        assert_eq!(
            render("Go to {{=it.url}}", &data),
            "Go to https://sso.local/?a=1&b=2"
        );
        assert_eq!(render("Hi {{!it.name}}", &data), "Hi &lt;Ana&gt;");
        assert_eq!(render("Hi {{= it.name }}", &data), "Hi <Ana>");
    }

    #[test]
    fn test_render_nested_and_missing() {
        let data = json!({"user": {"first": "Ana", "age": 31}, "tags": ["a", "b"]});

        assert_eq!(render("{{=it.user.first}} {{=it.user.age}}", &data), "Ana 31");
        assert_eq!(render("{{=it.tags.1}}", &data), "b");
        assert_eq!(render("[{{=it.user.last}}]", &data), "[]");
        assert_eq!(render("[{{=it.nothing.here}}]", &Value::Null), "[]");
    }

    #[test]
    fn test_text_outside_placeholders_is_untouched() {
        let template = "{{ not a placeholder }} {it.url}";
        assert_eq!(render(template, &json!({"url": "x"})), template);
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>Your code is <b>123456</b>.</p>"), "Your code is 123456.");
    }

    #[test]
    fn test_default_templates() {
        let otp = default_template(OTP_TEMPLATE).unwrap();
        let rendered = render_template(&otp, &json!({"otp": "042042"}), &Value::Null);

        assert_eq!(rendered.title, "Your validation code");
        assert!(rendered.body.contains("042042"));

        let invite = default_template(INVITE_USER_TEMPLATE).unwrap();
        let rendered = render_template(&invite, &json!({"url": "https://app/?otp=1"}), &Value::Null);
        assert!(rendered.body.contains(r#"href="https://app/?otp=1""#));

        assert!(default_template(CONFIRM_ACCOUNT_TEMPLATE).is_some());
        assert!(default_template("UNKNOWN").is_none());
    }
}
