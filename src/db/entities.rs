use serde::{Deserialize, Serialize};

// Plain row structs, SQLite fits these naturally.
// The template-facing DTOs live in app::dtos.

#[derive(Debug, Serialize, Deserialize)]
pub struct User {
  pub id: i64,
  pub name: String,
  pub username: String,
  pub email: String,
  pub password_hash: String
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Article {
  pub id: i64,
  pub title: String,
  pub author: String,
  pub content: String,
  pub post_thumbnail: String,
  pub slug: String
}

// No author column: any authenticated session may edit or
// delete any page.
#[derive(Debug, Serialize, Deserialize)]
pub struct Page {
  pub id: i64,
  pub title: String,
  pub content: String,
  pub slug: String
}
