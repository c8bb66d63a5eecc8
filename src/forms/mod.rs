use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

// Per-operation field constraints, applied to the raw submitted
// values before anything touches the database. Validation only
// runs on POST, the GET variants of the form routes render the
// form as-is.

pub const DEFAULT_THUMBNAIL: &str = "/static/img/default.png";

lazy_static! {
  // Intentionally loose, this only catches obvious typos.
  static ref EMAIL_REGEX: Regex = Regex::new(
    r"^[^@\s]+@[^@\s]+\.[^@\s]+$"
  ).unwrap();
}

#[derive(Debug, Serialize)]
pub struct FieldError {
  pub field: &'static str,
  pub message: String
}

// Bounds are counted in characters, not bytes.
fn check_length(
  errors: &mut Vec<FieldError>,
  field: &'static str,
  value: &str,
  min: usize,
  max: Option<usize>
) {
  let len = value.chars().count();
  if len == 0 {
    errors.push(FieldError {
      field,
      message: "This field is required".to_string()
    });
  } else if len < min || max.map(|m| len > m).unwrap_or(false) {
    let message = match max {
      Some(max) => format!("Must be between {} and {} characters long", min, max),
      None => format!("Must be at least {} characters long", min)
    };
    errors.push(FieldError { field, message });
  }
}

fn check_required(
  errors: &mut Vec<FieldError>,
  field: &'static str,
  value: &str
) {
  if value.is_empty() {
    errors.push(FieldError {
      field,
      message: "This field is required".to_string()
    });
  }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegisterForm {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password: String,
  #[serde(default)]
  pub confirm: String
}

impl RegisterForm {
  pub fn validate(&self) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    check_length(&mut errors, "name", &self.name, 3, Some(25));
    check_length(&mut errors, "username", &self.username, 3, Some(35));
    if self.email.is_empty() {
      check_required(&mut errors, "email", &self.email);
    } else if !EMAIL_REGEX.is_match(&self.email) {
      errors.push(FieldError {
        field: "email",
        message: "Please enter a valid email address".to_string()
      });
    }
    check_length(&mut errors, "password", &self.password, 8, Some(40));
    if self.password != self.confirm {
      errors.push(FieldError {
        field: "confirm",
        message: "Password does not match".to_string()
      });
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
  }
}

// No length or format checks on login, the values are only
// lookup keys at this point.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LoginForm {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String
}

impl LoginForm {
  pub fn validate(&self) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    check_required(&mut errors, "username", &self.username);
    check_required(&mut errors, "password", &self.password);
    if errors.is_empty() { Ok(()) } else { Err(errors) }
  }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ArticleForm {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub content: String,
  pub thumbnail: Option<String>
}

impl ArticleForm {
  pub fn validate(&self) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    check_length(&mut errors, "title", &self.title, 10, Some(255));
    check_length(&mut errors, "content", &self.content, 100, None);
    if errors.is_empty() { Ok(()) } else { Err(errors) }
  }

  // An omitted or blank thumbnail falls back to the placeholder.
  pub fn thumbnail_or_default(&self) -> String {
    match &self.thumbnail {
      Some(t) if !t.trim().is_empty() => t.clone(),
      _ => DEFAULT_THUMBNAIL.to_string()
    }
  }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PageForm {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub content: String
}

impl PageForm {
  pub fn validate(&self) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    check_length(&mut errors, "title", &self.title, 5, Some(255));
    check_length(&mut errors, "content", &self.content, 50, None);
    if errors.is_empty() { Ok(()) } else { Err(errors) }
  }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SearchForm {
  #[serde(rename = "search-key", default)]
  pub search_key: String
}

#[cfg(test)]
mod tests {
  use super::*;

  fn register_form() -> RegisterForm {
    RegisterForm {
      name: "Test User".to_string(),
      username: "testuser".to_string(),
      email: "test@example.com".to_string(),
      password: "password123".to_string(),
      confirm: "password123".to_string()
    }
  }

  #[test]
  fn register_accepts_valid_submission() {
    assert!(register_form().validate().is_ok());
  }

  #[test]
  fn register_rejects_password_mismatch() {
    let mut form = register_form();
    form.confirm = "different123".to_string();
    let errors = form.validate().unwrap_err();
    assert!(errors.iter().any(|e| e.field == "confirm"));
  }

  #[test]
  fn register_rejects_malformed_email() {
    let mut form = register_form();
    form.email = "not-an-email".to_string();
    let errors = form.validate().unwrap_err();
    assert!(errors.iter().any(|e| e.field == "email"));
  }

  #[test]
  fn register_rejects_short_name_and_password() {
    let mut form = register_form();
    form.name = "ab".to_string();
    form.password = "short".to_string();
    form.confirm = "short".to_string();
    let errors = form.validate().unwrap_err();
    assert!(errors.iter().any(|e| e.field == "name"));
    assert!(errors.iter().any(|e| e.field == "password"));
  }

  #[test]
  fn login_only_requires_presence() {
    let form = LoginForm {
      username: "x".to_string(),
      password: "y".to_string()
    };
    assert!(form.validate().is_ok());
    let empty = LoginForm::default();
    assert_eq!(empty.validate().unwrap_err().len(), 2);
  }

  #[test]
  fn article_content_boundary_is_100_characters() {
    let form = ArticleForm {
      title: "A Test Title For Blog".to_string(),
      content: "x".repeat(100),
      thumbnail: None
    };
    assert!(form.validate().is_ok());

    let form = ArticleForm {
      content: "x".repeat(99),
      ..form
    };
    let errors = form.validate().unwrap_err();
    assert!(errors.iter().any(|e| e.field == "content"));
  }

  #[test]
  fn article_title_bounds() {
    let mut form = ArticleForm {
      title: "Too short".to_string(),
      content: "x".repeat(100),
      thumbnail: None
    };
    assert!(form.validate().is_err());
    form.title = "Exactly10c".to_string();
    assert!(form.validate().is_ok());
  }

  #[test]
  fn article_thumbnail_defaults_to_placeholder() {
    let form = ArticleForm::default();
    assert_eq!(form.thumbnail_or_default(), DEFAULT_THUMBNAIL);
    let form = ArticleForm {
      thumbnail: Some("  ".to_string()),
      ..ArticleForm::default()
    };
    assert_eq!(form.thumbnail_or_default(), DEFAULT_THUMBNAIL);
    let form = ArticleForm {
      thumbnail: Some("/static/img/me.png".to_string()),
      ..ArticleForm::default()
    };
    assert_eq!(form.thumbnail_or_default(), "/static/img/me.png");
  }

  #[test]
  fn page_content_boundary_is_50_characters() {
    let form = PageForm {
      title: "About".to_string(),
      content: "x".repeat(50)
    };
    assert!(form.validate().is_ok());
    let form = PageForm {
      title: "About".to_string(),
      content: "x".repeat(49)
    };
    assert!(form.validate().is_err());
  }

  #[test]
  fn length_bounds_count_characters_not_bytes() {
    // 2 characters but 4 bytes: byte counting would let this
    // pass the [3,25] name bound, character counting must not.
    let mut form = register_form();
    form.name = "çğ".to_string();
    let errors = form.validate().unwrap_err();
    assert!(errors.iter().any(|e| e.field == "name"));
  }
}
