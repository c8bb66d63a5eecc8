use super::session::{self, Notice};
use crate::config::SiteInfo;
use crate::db::entities::{Article, Page};
use crate::db::{self, Pool};
use crate::forms::FieldError;
use actix_session::Session;
use color_eyre::Result;
use serde::Serialize;

// Entity to view-model conversions through From, plus the
// shared base context every rendered view carries.

// How many articles show up in the footer of every page.
const RECENT_ARTICLES: i64 = 3;

pub fn article_url(id: i64, slug: &str) -> String {
  format!("/article/{}-{}", id, slug)
}

pub fn page_url(slug: &str, id: i64) -> String {
  format!("/page/{}-{}", slug, id)
}

// Listing card, no content.
#[derive(Debug, Serialize)]
pub struct ArticleCardDto {
  pub id: i64,
  pub title: String,
  pub author: String,
  pub post_thumbnail: String,
  pub url: String
}

impl From<Article> for ArticleCardDto {
  fn from(article: Article) -> Self {
    Self {
      url: article_url(article.id, &article.slug),
      id: article.id,
      title: article.title,
      author: article.author,
      post_thumbnail: article.post_thumbnail
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ArticleDto {
  pub id: i64,
  pub title: String,
  pub author: String,
  pub content: String,
  pub post_thumbnail: String,
  pub url: String
}

impl From<Article> for ArticleDto {
  fn from(article: Article) -> Self {
    Self {
      url: article_url(article.id, &article.slug),
      id: article.id,
      title: article.title,
      author: article.author,
      content: article.content,
      post_thumbnail: article.post_thumbnail
    }
  }
}

// Used both for the navigation bar and the dashboard listing.
#[derive(Debug, Serialize)]
pub struct PageLinkDto {
  pub id: i64,
  pub title: String,
  pub url: String
}

impl From<Page> for PageLinkDto {
  fn from(page: Page) -> Self {
    Self {
      url: page_url(&page.slug, page.id),
      id: page.id,
      title: page.title
    }
  }
}

#[derive(Debug, Serialize)]
pub struct PageDetailDto {
  pub id: i64,
  pub title: String,
  pub content: String
}

impl From<Page> for PageDetailDto {
  fn from(page: Page) -> Self {
    Self {
      id: page.id,
      title: page.title,
      content: page.content
    }
  }
}

// Data shared by every rendered view: site info, the page list
// for the navigation bar, the recent articles for the footer,
// the drained notice queue and the acting user.
#[derive(Serialize)]
pub struct BaseContext {
  pub site_title: String,
  pub site_description: String,
  pub nav_pages: Vec<PageLinkDto>,
  pub recent_articles: Vec<ArticleCardDto>,
  pub notices: Vec<Notice>,
  pub current_user: Option<String>
}

impl BaseContext {

  // Named read operations invoked explicitly for every
  // response, instead of some ambient context injection.
  pub fn load(
    pool: &Pool,
    site_info: &SiteInfo,
    session: &Session
  ) -> Result<Self> {
    let nav_pages = db::all_pages(pool)?
      .into_iter()
      .map(Into::into)
      .collect();
    let recent_articles = db::latest_articles(pool, RECENT_ARTICLES)?
      .into_iter()
      .map(Into::into)
      .collect();
    Ok(Self {
      site_title: site_info.title.clone(),
      site_description: site_info.description.clone(),
      nav_pages,
      recent_articles,
      notices: session::take_notices(session),
      current_user: session::authenticated_user(session)
    })
  }

}

#[derive(Serialize)]
pub struct ArticleListContext {
  #[serde(flatten)]
  pub base: BaseContext,
  pub articles: Vec<ArticleCardDto>
}

#[derive(Serialize)]
pub struct ArticleContext {
  #[serde(flatten)]
  pub base: BaseContext,
  pub article: ArticleDto
}

#[derive(Serialize)]
pub struct PageListContext {
  #[serde(flatten)]
  pub base: BaseContext,
  pub pages: Vec<PageLinkDto>
}

#[derive(Serialize)]
pub struct PageContext {
  #[serde(flatten)]
  pub base: BaseContext,
  pub page: PageDetailDto
}

// Shared by every form view. The action is the POST target so
// the add and edit flows can point the same markup at
// different routes.
#[derive(Serialize)]
pub struct FormPage<F: Serialize> {
  #[serde(flatten)]
  pub base: BaseContext,
  pub action: String,
  pub form: F,
  pub errors: Vec<FieldError>
}

impl<F: Serialize> FormPage<F> {

  pub fn new(base: BaseContext, action: &str, form: F) -> Self {
    Self {
      base,
      action: action.to_string(),
      form,
      errors: Vec::new()
    }
  }

  pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
    self.errors = errors;
    self
  }

}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn article_card_builds_detail_url() {
    let dto = ArticleCardDto::from(Article {
      id: 12,
      title: "A Test Title For Blog".to_string(),
      author: "alice".to_string(),
      content: String::new(),
      post_thumbnail: "/static/img/default.png".to_string(),
      slug: "a-test-title-for-blog".to_string()
    });
    assert_eq!(dto.url, "/article/12-a-test-title-for-blog");
  }

  #[test]
  fn page_link_puts_the_id_last() {
    let dto = PageLinkDto::from(Page {
      id: 7,
      title: "About This Site".to_string(),
      content: String::new(),
      slug: "about-this-site".to_string()
    });
    assert_eq!(dto.url, "/page/about-this-site-7");
  }
}
