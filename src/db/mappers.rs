use super::entities::*;
use rusqlite::{Error, Row};

pub fn map_user(row: &Row) -> Result<User, Error> {
  Ok(User {
    id: row.get(0)?,
    name: row.get(1)?,
    username: row.get(2)?,
    email: row.get(3)?,
    password_hash: row.get(4)?
  })
}

pub fn map_article(row: &Row) -> Result<Article, Error> {
  Ok(Article {
    id: row.get(0)?,
    title: row.get(1)?,
    author: row.get(2)?,
    content: row.get(3)?,
    post_thumbnail: row.get(4)?,
    slug: row.get(5)?
  })
}

pub fn map_page(row: &Row) -> Result<Page, Error> {
  Ok(Page {
    id: row.get(0)?,
    title: row.get(1)?,
    content: row.get(2)?,
    slug: row.get(3)?
  })
}
