use super::dtos::*;
use super::error::{map_db_error, Error};
use super::helpers;
use super::session::{self, SECONDARY, SUCCESS, DANGER};
use super::AppState;
use crate::db::{self, entities::*};
use crate::forms::{ArticleForm, LoginForm, PageForm, RegisterForm, SearchForm};
use crate::utils::text_utils;
use actix_session::Session;
use actix_web::{web, HttpResponse};
use handlebars::Handlebars;

// The whole HTTP surface lives in this module: each handler is
// one validate step, at most one SQL statement and a render or
// a redirect. Protected handlers check the session gate first,
// the body below the check never runs for anonymous visitors.

// How many articles the front page shows.
const FRONT_PAGE_ARTICLES: i64 = 3;

/* --- Public reads --- */

pub async fn index(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'_>>,
  session: Session
) -> Result<HttpResponse, Error> {
  let articles = db::latest_articles(&app_state.pool, FRONT_PAGE_ARTICLES)
    .map_err(map_db_error)?
    .into_iter()
    .map(Into::into)
    .collect();
  let base = BaseContext::load(&app_state.pool, &app_state.site_info, &session)
    .map_err(map_db_error)?;
  helpers::render(hb.get_ref(), "index", &ArticleListContext { base, articles })
}

pub async fn articles(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'_>>,
  session: Session
) -> Result<HttpResponse, Error> {
  let articles = db::all_articles(&app_state.pool)
    .map_err(map_db_error)?
    .into_iter()
    .map(Into::into)
    .collect();
  let base = BaseContext::load(&app_state.pool, &app_state.site_info, &session)
    .map_err(map_db_error)?;
  helpers::render(hb.get_ref(), "articles", &ArticleListContext { base, articles })
}

pub async fn article_detail(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'_>>,
  session: Session,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  let raw = path.into_inner().0;
  // Both halves of "<id>-<slug>" have to match. A stale slug
  // with a valid id is plain not-found, no canonical redirect.
  let article = match helpers::parse_id_slug(&raw) {
    Some((id, slug)) => db::article_by_id_and_slug(&app_state.pool, id, &slug)
      .map_err(map_db_error)?,
    None => None
  };
  let base = BaseContext::load(&app_state.pool, &app_state.site_info, &session)
    .map_err(map_db_error)?;
  match article {
    Some(a) => helpers::render(
      hb.get_ref(),
      "article",
      &ArticleContext { base, article: a.into() }
    ),
    None => helpers::render(hb.get_ref(), "article-error", &base)
  }
}

pub async fn page_detail(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'_>>,
  session: Session,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  let raw = path.into_inner().0;
  let page = match helpers::parse_slug_id(&raw) {
    Some((slug, id)) => db::page_by_slug_and_id(&app_state.pool, &slug, id)
      .map_err(map_db_error)?,
    None => None
  };
  let base = BaseContext::load(&app_state.pool, &app_state.site_info, &session)
    .map_err(map_db_error)?;
  match page {
    Some(p) => helpers::render(
      hb.get_ref(),
      "page",
      &PageContext { base, page: p.into() }
    ),
    None => helpers::render(hb.get_ref(), "page-error", &base)
  }
}

/* --- Search --- */

pub async fn search_form(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'_>>,
  session: Session
) -> Result<HttpResponse, Error> {
  let base = BaseContext::load(&app_state.pool, &app_state.site_info, &session)
    .map_err(map_db_error)?;
  helpers::render(hb.get_ref(), "search", &base)
}

pub async fn search_submit(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'_>>,
  session: Session,
  form: web::Form<SearchForm>
) -> Result<HttpResponse, Error> {
  let key = form.into_inner().search_key;
  let found = db::search_articles(&app_state.pool, &key)
    .map_err(map_db_error)?;
  if found.is_empty() {
    session::push_notice(
      &session,
      SECONDARY,
      "There is no article related to the content you are looking for."
    );
    let base = BaseContext::load(&app_state.pool, &app_state.site_info, &session)
      .map_err(map_db_error)?;
    helpers::render(hb.get_ref(), "search", &base)
  } else {
    session::push_notice(
      &session,
      SUCCESS,
      &format!("Showing results for \"{}\"", key)
    );
    let articles = found.into_iter().map(Into::into).collect();
    let base = BaseContext::load(&app_state.pool, &app_state.site_info, &session)
      .map_err(map_db_error)?;
    helpers::render(hb.get_ref(), "articles", &ArticleListContext { base, articles })
  }
}

/* --- Dashboard --- */

pub async fn dashboard(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'_>>,
  session: Session
) -> Result<HttpResponse, Error> {
  if let Err(resp) = session::require_login(&session) {
    return Ok(resp);
  }
  let base = BaseContext::load(&app_state.pool, &app_state.site_info, &session)
    .map_err(map_db_error)?;
  helpers::render(hb.get_ref(), "dashboard", &base)
}

pub async fn dashboard_articles(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'_>>,
  session: Session
) -> Result<HttpResponse, Error> {
  let username = match session::require_login(&session) {
    Ok(username) => username,
    Err(resp) => return Ok(resp)
  };
  let articles = db::articles_by_author(&app_state.pool, &username)
    .map_err(map_db_error)?
    .into_iter()
    .map(Into::into)
    .collect();
  let base = BaseContext::load(&app_state.pool, &app_state.site_info, &session)
    .map_err(map_db_error)?;
  helpers::render(
    hb.get_ref(),
    "dashboard-articles",
    &ArticleListContext { base, articles }
  )
}

pub async fn dashboard_pages(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'_>>,
  session: Session
) -> Result<HttpResponse, Error> {
  if let Err(resp) = session::require_login(&session) {
    return Ok(resp);
  }
  let pages = db::all_pages(&app_state.pool)
    .map_err(map_db_error)?
    .into_iter()
    .map(Into::into)
    .collect();
  let base = BaseContext::load(&app_state.pool, &app_state.site_info, &session)
    .map_err(map_db_error)?;
  helpers::render(hb.get_ref(), "dashboard-pages", &PageListContext { base, pages })
}

/* --- Article mutations --- */

pub async fn add_article_form(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'_>>,
  session: Session
) -> Result<HttpResponse, Error> {
  if let Err(resp) = session::require_login(&session) {
    return Ok(resp);
  }
  let base = BaseContext::load(&app_state.pool, &app_state.site_info, &session)
    .map_err(map_db_error)?;
  helpers::render(
    hb.get_ref(),
    "add-article",
    &FormPage::new(base, "/add-article", ArticleForm::default())
  )
}

pub async fn add_article_submit(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'_>>,
  session: Session,
  form: web::Form<ArticleForm>
) -> Result<HttpResponse, Error> {
  let username = match session::require_login(&session) {
    Ok(username) => username,
    Err(resp) => return Ok(resp)
  };
  let form = form.into_inner();
  if let Err(errors) = form.validate() {
    // Inline errors on the form, nothing touches storage.
    let base = BaseContext::load(&app_state.pool, &app_state.site_info, &session)
      .map_err(map_db_error)?;
    return helpers::render(
      hb.get_ref(),
      "add-article",
      &FormPage::new(base, "/add-article", form).with_errors(errors)
    );
  }
  let slug = text_utils::slugify(&form.title);
  let post_thumbnail = form.thumbnail_or_default();
  let article = Article {
    id: -1,
    title: form.title,
    author: username,
    content: form.content,
    post_thumbnail,
    slug
  };
  db::insert_article(&app_state.pool, &article).map_err(map_db_error)?;
  session::push_notice(&session, SUCCESS, "The article has been successfully added.");
  Ok(helpers::redirect("/dashboard"))
}

pub async fn edit_article_form(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'_>>,
  session: Session,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let username = match session::require_login(&session) {
    Ok(username) => username,
    Err(resp) => return Ok(resp)
  };
  let id = path.into_inner().0;
  match db::article_for_author(&app_state.pool, id, &username)
    .map_err(map_db_error)? {
    Some(article) => {
      let form = ArticleForm {
        title: article.title,
        content: article.content,
        thumbnail: Some(article.post_thumbnail)
      };
      let base = BaseContext::load(&app_state.pool, &app_state.site_info, &session)
        .map_err(map_db_error)?;
      helpers::render(
        hb.get_ref(),
        "update-article",
        &FormPage::new(base, &format!("/edit/article/{}", id), form)
      )
    }
    None => {
      session::push_notice(
        &session,
        DANGER,
        "There is no such article or you do not have permission to edit it."
      );
      Ok(helpers::redirect("/dashboard"))
    }
  }
}

pub async fn edit_article_submit(
  app_state: web::Data<AppState>,
  session: Session,
  path: web::Path<(i64,)>,
  form: web::Form<ArticleForm>
) -> Result<HttpResponse, Error> {
  let username = match session::require_login(&session) {
    Ok(username) => username,
    Err(resp) => return Ok(resp)
  };
  let id = path.into_inner().0;
  let form = form.into_inner();
  if form.validate().is_err() {
    session::push_notice(&session, DANGER, "Something went wrong.");
    return Ok(helpers::redirect("/dashboard"));
  }
  // The slug is recomputed from the new title, old links to
  // this article break on purpose.
  let slug = text_utils::slugify(&form.title);
  let updated = db::update_article(
    &app_state.pool,
    id,
    &username,
    &form.title,
    &form.content,
    &form.thumbnail_or_default(),
    &slug
  ).map_err(map_db_error)?;
  if updated > 0 {
    session::push_notice(&session, SUCCESS, "The article was successfully updated.");
  } else {
    session::push_notice(
      &session,
      DANGER,
      "There is no such article or you do not have permission to edit it."
    );
  }
  Ok(helpers::redirect("/dashboard"))
}

pub async fn delete_article(
  app_state: web::Data<AppState>,
  session: Session,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let username = match session::require_login(&session) {
    Ok(username) => username,
    Err(resp) => return Ok(resp)
  };
  let id = path.into_inner().0;
  let deleted = db::delete_article(&app_state.pool, id, &username)
    .map_err(map_db_error)?;
  if deleted > 0 {
    session::push_notice(&session, SUCCESS, "Article successfully deleted.");
  } else {
    session::push_notice(
      &session,
      DANGER,
      "There is no such article or you do not have permission to delete it."
    );
  }
  Ok(helpers::redirect("/dashboard"))
}

/* --- Page mutations --- */

pub async fn add_page_form(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'_>>,
  session: Session
) -> Result<HttpResponse, Error> {
  if let Err(resp) = session::require_login(&session) {
    return Ok(resp);
  }
  let base = BaseContext::load(&app_state.pool, &app_state.site_info, &session)
    .map_err(map_db_error)?;
  helpers::render(
    hb.get_ref(),
    "add-page",
    &FormPage::new(base, "/add-page", PageForm::default())
  )
}

pub async fn add_page_submit(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'_>>,
  session: Session,
  form: web::Form<PageForm>
) -> Result<HttpResponse, Error> {
  if let Err(resp) = session::require_login(&session) {
    return Ok(resp);
  }
  let form = form.into_inner();
  if let Err(errors) = form.validate() {
    let base = BaseContext::load(&app_state.pool, &app_state.site_info, &session)
      .map_err(map_db_error)?;
    return helpers::render(
      hb.get_ref(),
      "add-page",
      &FormPage::new(base, "/add-page", form).with_errors(errors)
    );
  }
  let slug = text_utils::slugify(&form.title);
  let page = Page {
    id: -1,
    title: form.title,
    content: form.content,
    slug
  };
  db::insert_page(&app_state.pool, &page).map_err(map_db_error)?;
  session::push_notice(&session, SUCCESS, "The page has been successfully added.");
  Ok(helpers::redirect("/dashboard/pages"))
}

pub async fn edit_page_form(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'_>>,
  session: Session,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  if let Err(resp) = session::require_login(&session) {
    return Ok(resp);
  }
  let id = path.into_inner().0;
  // No ownership filter on pages, any authenticated session
  // may edit any page.
  match db::page_by_id(&app_state.pool, id).map_err(map_db_error)? {
    Some(page) => {
      let form = PageForm {
        title: page.title,
        content: page.content
      };
      let base = BaseContext::load(&app_state.pool, &app_state.site_info, &session)
        .map_err(map_db_error)?;
      helpers::render(
        hb.get_ref(),
        "update-page",
        &FormPage::new(base, &format!("/edit/page/{}", id), form)
      )
    }
    None => {
      session::push_notice(&session, DANGER, "There is no such page.");
      Ok(helpers::redirect("/dashboard/pages"))
    }
  }
}

pub async fn edit_page_submit(
  app_state: web::Data<AppState>,
  session: Session,
  path: web::Path<(i64,)>,
  form: web::Form<PageForm>
) -> Result<HttpResponse, Error> {
  if let Err(resp) = session::require_login(&session) {
    return Ok(resp);
  }
  let id = path.into_inner().0;
  let form = form.into_inner();
  if form.validate().is_err() {
    session::push_notice(&session, DANGER, "Something went wrong.");
    return Ok(helpers::redirect("/dashboard/pages"));
  }
  let slug = text_utils::slugify(&form.title);
  let updated = db::update_page(&app_state.pool, id, &form.title, &form.content, &slug)
    .map_err(map_db_error)?;
  if updated > 0 {
    session::push_notice(&session, SUCCESS, "The page was successfully updated.");
  } else {
    session::push_notice(&session, DANGER, "There is no such page.");
  }
  Ok(helpers::redirect("/dashboard/pages"))
}

pub async fn delete_page(
  app_state: web::Data<AppState>,
  session: Session,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  if let Err(resp) = session::require_login(&session) {
    return Ok(resp);
  }
  let id = path.into_inner().0;
  let deleted = db::delete_page(&app_state.pool, id).map_err(map_db_error)?;
  if deleted > 0 {
    session::push_notice(&session, SUCCESS, "The page was successfully deleted.");
    Ok(helpers::redirect("/dashboard"))
  } else {
    session::push_notice(&session, DANGER, "There is no such page.");
    Ok(helpers::redirect("/dashboard/pages"))
  }
}

/* --- Register, login, logout --- */

pub async fn register_form(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'_>>,
  session: Session
) -> Result<HttpResponse, Error> {
  let base = BaseContext::load(&app_state.pool, &app_state.site_info, &session)
    .map_err(map_db_error)?;
  helpers::render(
    hb.get_ref(),
    "register",
    &FormPage::new(base, "/register", RegisterForm::default())
  )
}

pub async fn register_submit(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'_>>,
  session: Session,
  form: web::Form<RegisterForm>
) -> Result<HttpResponse, Error> {
  let form = form.into_inner();
  if let Err(errors) = form.validate() {
    let base = BaseContext::load(&app_state.pool, &app_state.site_info, &session)
      .map_err(map_db_error)?;
    return helpers::render(
      hb.get_ref(),
      "register",
      &FormPage::new(base, "/register", form).with_errors(errors)
    );
  }
  let password_hash = bcrypt::hash(&form.password, bcrypt::DEFAULT_COST)
    .map_err(|e| Error::InternalServerError(format!("Password hashing failed - {}", e)))?;
  let user = User {
    id: -1,
    name: form.name,
    username: form.username,
    email: form.email,
    password_hash
  };
  db::insert_user(&app_state.pool, &user).map_err(map_db_error)?;
  session::push_notice(&session, SUCCESS, "You have successfully registered.");
  Ok(helpers::redirect("/login"))
}

pub async fn login_form(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'_>>,
  session: Session
) -> Result<HttpResponse, Error> {
  let base = BaseContext::load(&app_state.pool, &app_state.site_info, &session)
    .map_err(map_db_error)?;
  helpers::render(
    hb.get_ref(),
    "login",
    &FormPage::new(base, "/login", LoginForm::default())
  )
}

pub async fn login_submit(
  app_state: web::Data<AppState>,
  hb: web::Data<Handlebars<'_>>,
  session: Session,
  form: web::Form<LoginForm>
) -> Result<HttpResponse, Error> {
  let form = form.into_inner();
  if let Err(errors) = form.validate() {
    let base = BaseContext::load(&app_state.pool, &app_state.site_info, &session)
      .map_err(map_db_error)?;
    return helpers::render(
      hb.get_ref(),
      "login",
      &FormPage::new(base, "/login", form).with_errors(errors)
    );
  }
  match db::user_by_username(&app_state.pool, &form.username)
    .map_err(map_db_error)? {
    Some(user) => {
      let password_ok =
        bcrypt::verify(&form.password, &user.password_hash).unwrap_or(false);
      if password_ok {
        session::log_in(&session, &user.username);
        session::push_notice(&session, SUCCESS, "Welcome :)");
        Ok(helpers::redirect("/"))
      } else {
        session::push_notice(&session, DANGER, "Password is wrong!");
        Ok(helpers::redirect("/login"))
      }
    }
    None => {
      session::push_notice(&session, DANGER, "Username is wrong!");
      Ok(helpers::redirect("/login"))
    }
  }
}

pub async fn logout(session: Session) -> Result<HttpResponse, Error> {
  // Clears everything whether or not anybody was logged in.
  session::log_out(&session);
  session::push_notice(&session, SUCCESS, "You logged out successfully, we wait again.");
  Ok(helpers::redirect("/"))
}

// Default response when no route matched the request.
pub async fn not_found() -> HttpResponse {
  HttpResponse::NotFound().body("Page not found")
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_session::CookieSession;
  use actix_web::http::StatusCode;
  use actix_web::{test, App};
  use r2d2_sqlite::SqliteConnectionManager;

  fn test_pool() -> db::Pool {
    let manager = SqliteConnectionManager::memory();
    let pool = db::Pool::builder()
      .max_size(1)
      .build(manager)
      .unwrap();
    db::init_schema(&pool).unwrap();
    pool
  }

  fn test_state(pool: db::Pool) -> web::Data<AppState> {
    web::Data::new(AppState {
      pool,
      site_info: crate::config::SiteInfo {
        title: "tkblog".to_string(),
        description: "test instance".to_string()
      }
    })
  }

  fn test_handlebars() -> web::Data<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();
    handlebars
      .register_templates_directory(".hbs", "./templates")
      .unwrap();
    web::Data::new(handlebars)
  }

  // Minimal bcrypt cost to keep the tests fast.
  fn make_user(pool: &db::Pool, username: &str, password: &str) {
    db::insert_user(
      pool,
      &User {
        id: -1,
        name: "Test User".to_string(),
        username: username.to_string(),
        email: "test@example.com".to_string(),
        password_hash: bcrypt::hash(password, 4).unwrap()
      }
    ).unwrap();
  }

  fn make_article(pool: &db::Pool, author: &str, title: &str, content: &str) -> i64 {
    db::insert_article(
      pool,
      &Article {
        id: -1,
        title: title.to_string(),
        author: author.to_string(),
        content: content.to_string(),
        post_thumbnail: crate::forms::DEFAULT_THUMBNAIL.to_string(),
        slug: text_utils::slugify(title)
      }
    ).unwrap();
    db::all_articles(pool).unwrap()[0].id
  }

  macro_rules! test_app {
    ($pool:expr) => {
      test::init_service(
        App::new()
          .app_data(test_state($pool))
          .app_data(test_handlebars())
          .wrap(CookieSession::signed(&[0; 32]).secure(false))
          .configure(super::super::base_endpoints_config)
      ).await
    };
  }

  fn location(resp: &actix_web::dev::ServiceResponse) -> &str {
    resp.headers()
      .get("location")
      .and_then(|h| h.to_str().ok())
      .unwrap_or("")
  }

  // The signed state from a login response, to carry into
  // follow-up requests on the same service.
  fn session_cookie(
    resp: &actix_web::dev::ServiceResponse
  ) -> actix_web::cookie::Cookie<'static> {
    resp.response()
      .cookies()
      .find(|c| c.name() == "actix-session")
      .map(|c| c.into_owned())
      .unwrap()
  }

  #[actix_rt::test]
  async fn register_with_mismatched_passwords_creates_no_user() {
    let pool = test_pool();
    let mut app = test_app!(pool.clone());
    let req = test::TestRequest::post()
      .uri("/register")
      .set_form(&[
        ("name", "Test User"),
        ("username", "testuser"),
        ("email", "test@example.com"),
        ("password", "password123"),
        ("confirm", "different123")
      ])
      .to_request();
    let resp = test::call_service(&mut app, req).await;

    // The form re-renders inline with the errors, HTTP 200.
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(db::user_by_username(&pool, "testuser").unwrap().is_none());
  }

  #[actix_rt::test]
  async fn register_then_login_round_trip() {
    let pool = test_pool();
    let mut app = test_app!(pool.clone());
    let req = test::TestRequest::post()
      .uri("/register")
      .set_form(&[
        ("name", "Test User"),
        ("username", "testuser"),
        ("email", "test@example.com"),
        ("password", "password123"),
        ("confirm", "password123")
      ])
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login");

    let user = db::user_by_username(&pool, "testuser").unwrap().unwrap();
    // The stored value is a hash, not the password itself.
    assert_ne!(user.password_hash, "password123");
    assert!(bcrypt::verify("password123", &user.password_hash).unwrap());
  }

  #[actix_rt::test]
  async fn login_with_unknown_username_redirects_to_login() {
    let pool = test_pool();
    let mut app = test_app!(pool);
    let req = test::TestRequest::post()
      .uri("/login")
      .set_form(&[("username", "nobody"), ("password", "whatever")])
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login");
  }

  #[actix_rt::test]
  async fn login_with_wrong_password_redirects_to_login() {
    let pool = test_pool();
    make_user(&pool, "alice", "correct-password");
    let mut app = test_app!(pool);
    let req = test::TestRequest::post()
      .uri("/login")
      .set_form(&[("username", "alice"), ("password", "wrong-password")])
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login");
  }

  #[actix_rt::test]
  async fn login_with_correct_password_redirects_home() {
    let pool = test_pool();
    make_user(&pool, "alice", "correct-password");
    let mut app = test_app!(pool);
    let req = test::TestRequest::post()
      .uri("/login")
      .set_form(&[("username", "alice"), ("password", "correct-password")])
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
  }

  #[actix_rt::test]
  async fn article_detail_round_trip_and_mismatched_slug() {
    let pool = test_pool();
    let id = make_article(
      &pool,
      "alice",
      "A Test Title For Blog",
      "Long enough content for a detail view."
    );
    let mut app = test_app!(pool);

    let req = test::TestRequest::get()
      .uri(&format!("/article/{}-a-test-title-for-blog", id))
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("A Test Title For Blog"));

    // Same id, wrong slug: the dedicated not-found view, still 200.
    let req = test::TestRequest::get()
      .uri(&format!("/article/{}-some-other-slug", id))
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("article you are looking for does not exist"));
  }

  #[actix_rt::test]
  async fn search_matches_content_only() {
    let pool = test_pool();
    make_article(&pool, "alice", "Gardening Notes Today", "There is rust on my shovel.");
    let mut app = test_app!(pool);
    let req = test::TestRequest::post()
      .uri("/search")
      .set_form(&[("search-key", "shovel")])
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("Gardening Notes Today"));
  }

  #[actix_rt::test]
  async fn mutation_routes_require_login() {
    let pool = test_pool();
    let mut app = test_app!(pool.clone());
    let content = "x".repeat(100);
    let req = test::TestRequest::post()
      .uri("/add-article")
      .set_form(&[
        ("title", "A Perfectly Valid Title"),
        ("content", content.as_str())
      ])
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login");
    // The gate short-circuited before any write.
    assert!(db::all_articles(&pool).unwrap().is_empty());
  }

  #[actix_rt::test]
  async fn logged_in_user_can_add_an_article() {
    let pool = test_pool();
    make_user(&pool, "alice", "correct-password");
    let mut app = test_app!(pool.clone());

    let req = test::TestRequest::post()
      .uri("/login")
      .set_form(&[("username", "alice"), ("password", "correct-password")])
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let cookie = session_cookie(&resp);

    let content = "x".repeat(100);
    let req = test::TestRequest::post()
      .uri("/add-article")
      .cookie(cookie)
      .set_form(&[
        ("title", "A Test Title For Blog"),
        ("content", content.as_str())
      ])
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/dashboard");

    // The row is attributed to the session user, slugged from
    // the title and thumbnailed with the placeholder.
    let articles = db::all_articles(&pool).unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].author, "alice");
    assert_eq!(articles[0].slug, "a-test-title-for-blog");
    assert_eq!(articles[0].post_thumbnail, crate::forms::DEFAULT_THUMBNAIL);
  }

  #[actix_rt::test]
  async fn delete_over_http_requires_matching_author() {
    let pool = test_pool();
    make_user(&pool, "alice", "alice-password");
    make_user(&pool, "bob", "bob-password-1");
    let id = make_article(&pool, "alice", "Owned By Alice Only", "Some content here.");
    let mut app = test_app!(pool.clone());

    let req = test::TestRequest::post()
      .uri("/login")
      .set_form(&[("username", "bob"), ("password", "bob-password-1")])
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    let bob = session_cookie(&resp);

    // Bob is past the login gate but the row is not his: the
    // handler redirects like a success, the article survives.
    let req = test::TestRequest::get()
      .uri(&format!("/delete/article/{}", id))
      .cookie(bob)
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/dashboard");
    assert_eq!(db::all_articles(&pool).unwrap().len(), 1);

    let req = test::TestRequest::post()
      .uri("/login")
      .set_form(&[("username", "alice"), ("password", "alice-password")])
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    let alice = session_cookie(&resp);

    let req = test::TestRequest::get()
      .uri(&format!("/delete/article/{}", id))
      .cookie(alice)
      .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(db::all_articles(&pool).unwrap().is_empty());
  }

  #[actix_rt::test]
  async fn dashboard_requires_login() {
    let pool = test_pool();
    let mut app = test_app!(pool);
    let req = test::TestRequest::get().uri("/dashboard").to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login");
  }

  #[actix_rt::test]
  async fn index_renders_for_anonymous_visitors() {
    let pool = test_pool();
    make_article(&pool, "alice", "Front Page Material", "Some content here.");
    let mut app = test_app!(pool);
    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("Front Page Material"));
  }
}
