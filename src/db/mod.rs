use rusqlite::{params, OptionalExtension, Row, ToSql};
pub mod entities;
mod mappers;
use color_eyre::Result;
use entities::*;
use eyre::WrapErr;
use mappers::{map_article, map_page, map_user};

// Type alias to make function signatures much clearer:
pub type Pool = r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>;

const ARTICLE_FIELDS: &str = "id, title, author, content, post_thumbnail, slug";
const PAGE_FIELDS: &str = "id, title, content, slug";
const USER_FIELDS: &str = "id, name, username, email, password";

// Every route holds at most one connection from the pool and
// performs at most one statement, auto-committed. All user
// input goes through bound parameters, search included.

fn select_many<T, P, F>(
  pool: &Pool,
  query: &str,
  params: P,
  mapper: F
) -> Result<Vec<T>>
  where
    P: IntoIterator,
    P::Item: ToSql,
    F: FnMut(&Row<'_>) -> Result<T, rusqlite::Error>,
{
  let conn = pool.clone().get()?;
  let mut stmt = conn.prepare(query)?;
  stmt.query_map(params, mapper)
    .and_then(Iterator::collect)
    .context("Generic select_many query")
}

// Zero rows is not an error anywhere in this app, so the
// single-row variant goes through Option.
fn select_one<T, P, F>(
  pool: &Pool,
  query: &str,
  params: P,
  mapper: F
) -> Result<Option<T>>
  where
    P: IntoIterator,
    P::Item: ToSql,
    F: FnOnce(&Row<'_>) -> Result<T, rusqlite::Error>,
{
  let conn = pool.clone().get()?;
  let mut stmt = conn.prepare(query)?;
  stmt.query_row(params, mapper)
    .optional()
    .context("Generic select_one query")
}

// Returns the number of affected rows, which is how the
// ownership-predicated writes report "not yours or not there".
fn execute<P>(pool: &Pool, query: &str, params: P) -> Result<usize>
  where
    P: IntoIterator,
    P::Item: ToSql,
{
  let conn = pool.clone().get()?;
  conn.execute(query, params)
    .context("Generic execute query")
}

pub fn init_schema(pool: &Pool) -> Result<()> {
  let conn = pool.clone().get()?;
  conn.execute_batch(
    "CREATE TABLE IF NOT EXISTS users (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      name TEXT NOT NULL,
      username TEXT NOT NULL UNIQUE,
      email TEXT NOT NULL,
      password TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS articles (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      title TEXT NOT NULL,
      author TEXT NOT NULL,
      content TEXT NOT NULL,
      post_thumbnail TEXT NOT NULL,
      slug TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS pages (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      title TEXT NOT NULL,
      content TEXT NOT NULL,
      slug TEXT NOT NULL
    );"
  ).context("Creating database schema")?;
  Ok(())
}

/* --- Articles --- */

pub fn latest_articles(pool: &Pool, limit: i64) -> Result<Vec<Article>> {
  select_many(
    pool,
    &format!("SELECT {} FROM articles ORDER BY id DESC LIMIT ?", ARTICLE_FIELDS),
    params![limit],
    map_article
  )
}

pub fn all_articles(pool: &Pool) -> Result<Vec<Article>> {
  select_many(
    pool,
    &format!("SELECT {} FROM articles ORDER BY id DESC", ARTICLE_FIELDS),
    params![],
    map_article
  )
}

pub fn articles_by_author(pool: &Pool, author: &str) -> Result<Vec<Article>> {
  select_many(
    pool,
    &format!("SELECT {} FROM articles WHERE author = ? ORDER BY id DESC", ARTICLE_FIELDS),
    params![author],
    map_article
  )
}

// Detail lookups match both halves of the URL. A stale slug
// paired with a valid id is "not found", not a redirect.
pub fn article_by_id_and_slug(
  pool: &Pool,
  id: i64,
  slug: &str
) -> Result<Option<Article>> {
  select_one(
    pool,
    &format!("SELECT {} FROM articles WHERE id = ? AND slug = ?", ARTICLE_FIELDS),
    params![id, slug],
    map_article
  )
}

// Used to pre-fill the edit form, with the ownership check
// folded into the predicate.
pub fn article_for_author(
  pool: &Pool,
  id: i64,
  author: &str
) -> Result<Option<Article>> {
  select_one(
    pool,
    &format!("SELECT {} FROM articles WHERE id = ? AND author = ?", ARTICLE_FIELDS),
    params![id, author],
    map_article
  )
}

pub fn insert_article(pool: &Pool, article: &Article) -> Result<()> {
  execute(
    pool,
    "INSERT INTO articles (title, author, content, post_thumbnail, slug)
      VALUES (?, ?, ?, ?, ?)",
    params![
      article.title,
      article.author,
      article.content,
      article.post_thumbnail,
      article.slug
    ]
  )?;
  Ok(())
}

// Ownership lives in the WHERE clause: an update for somebody
// else's article simply touches zero rows.
pub fn update_article(
  pool: &Pool,
  id: i64,
  author: &str,
  title: &str,
  content: &str,
  post_thumbnail: &str,
  slug: &str
) -> Result<usize> {
  execute(
    pool,
    "UPDATE articles SET title = ?, content = ?, post_thumbnail = ?, slug = ?
      WHERE id = ? AND author = ?",
    params![title, content, post_thumbnail, slug, id, author]
  )
}

pub fn delete_article(pool: &Pool, id: i64, author: &str) -> Result<usize> {
  execute(
    pool,
    "DELETE FROM articles WHERE id = ? AND author = ?",
    params![id, author]
  )
}

// Case-insensitive substring match on title OR content. The
// key is a bound parameter, never spliced into the query text.
pub fn search_articles(pool: &Pool, key: &str) -> Result<Vec<Article>> {
  let pattern = format!("%{}%", key);
  select_many(
    pool,
    &format!(
      "SELECT {} FROM articles WHERE title LIKE ? OR content LIKE ?
        ORDER BY id DESC",
      ARTICLE_FIELDS
    ),
    params![pattern, pattern],
    map_article
  )
}

/* --- Pages --- */

pub fn all_pages(pool: &Pool) -> Result<Vec<Page>> {
  select_many(
    pool,
    &format!("SELECT {} FROM pages ORDER BY id DESC", PAGE_FIELDS),
    params![],
    map_page
  )
}

pub fn page_by_slug_and_id(
  pool: &Pool,
  slug: &str,
  id: i64
) -> Result<Option<Page>> {
  select_one(
    pool,
    &format!("SELECT {} FROM pages WHERE slug = ? AND id = ?", PAGE_FIELDS),
    params![slug, id],
    map_page
  )
}

pub fn page_by_id(pool: &Pool, id: i64) -> Result<Option<Page>> {
  select_one(
    pool,
    &format!("SELECT {} FROM pages WHERE id = ?", PAGE_FIELDS),
    params![id],
    map_page
  )
}

pub fn insert_page(pool: &Pool, page: &Page) -> Result<()> {
  execute(
    pool,
    "INSERT INTO pages (title, content, slug) VALUES (?, ?, ?)",
    params![page.title, page.content, page.slug]
  )?;
  Ok(())
}

// Pages carry no author, so no ownership predicate here.
pub fn update_page(
  pool: &Pool,
  id: i64,
  title: &str,
  content: &str,
  slug: &str
) -> Result<usize> {
  execute(
    pool,
    "UPDATE pages SET title = ?, content = ?, slug = ? WHERE id = ?",
    params![title, content, slug, id]
  )
}

pub fn delete_page(pool: &Pool, id: i64) -> Result<usize> {
  execute(pool, "DELETE FROM pages WHERE id = ?", params![id])
}

/* --- Users --- */

pub fn user_by_username(pool: &Pool, username: &str) -> Result<Option<User>> {
  select_one(
    pool,
    &format!("SELECT {} FROM users WHERE username = ?", USER_FIELDS),
    params![username],
    map_user
  )
}

pub fn insert_user(pool: &Pool, user: &User) -> Result<()> {
  execute(
    pool,
    "INSERT INTO users (name, username, email, password) VALUES (?, ?, ?, ?)",
    params![user.name, user.username, user.email, user.password_hash]
  )?;
  Ok(())
}
