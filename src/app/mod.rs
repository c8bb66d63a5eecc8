use actix_session::CookieSession;
use actix_web::{middleware, web, App, HttpServer};
use color_eyre::Result;
use eyre::WrapErr;
use handlebars::Handlebars;
use log::debug;
use r2d2_sqlite::SqliteConnectionManager;
// Fully qualified so the path can't collide with the config
// crate from the dependency tree.
use crate::config::{Config, SiteInfo};
use crate::db::{self, Pool};
mod dtos;
mod error;
mod handlers;
mod helpers;
mod session;

// Declare app state struct:
pub struct AppState {
  pub pool: Pool,
  pub site_info: SiteInfo
}

// Function to start the server. Has to be async because of the
// .await at the end, main wraps it with #[actix_web::main].
pub async fn run() -> Result<()> {
  let config = Config::from_env()
    .expect("Configuration (environment or .env file) is missing");
  debug!("Current config: {:?}", config);
  let manager = SqliteConnectionManager::file(&config.db_path);
  let pool = Pool::new(manager)
    .expect("Database connection failed");
  db::init_schema(&pool)
    .expect("Could not create the database schema");

  // Declare the template system, currently using handlebars:
  let mut handlebars = Handlebars::new();
  handlebars
    .register_templates_directory(".hbs", &config.template_dir)
    .expect("Fatal: templates directory might be missing or \
      not accessible");
  let handlebars_ref = web::Data::new(handlebars);

  // The signed session cookie needs 32 bytes of key material
  // minimum, better to die here than at the first request.
  assert!(
    config.session_key.len() >= 32,
    "session_key must be at least 32 bytes"
  );
  let session_key = config.session_key.clone().into_bytes();

  // Got to save the bind_address for later because "config"
  // gets destroyed by moving it into app_state as SiteInfo.
  let bind_address = config.bind_address.clone();

  let app_state = web::Data::new(
    AppState {
      pool,
      site_info: config.into()
    }
  );

  HttpServer::new(move || {
    App::new()
      .app_data(app_state.clone())
      .app_data(handlebars_ref.clone())
      .wrap(middleware::Logger::default())
      .wrap(
        CookieSession::signed(&session_key)
          .name("tkblog-session")
          .secure(false)
      )
      .configure(base_endpoints_config)
      .default_service(web::route().to(handlers::not_found))
  })
  .bind(bind_address)?
  .run()
  .await
  .context("Start Actix web server")
}

// Route configuration:
fn base_endpoints_config(cfg: &mut web::ServiceConfig) {
  cfg.route("/", web::get().to(handlers::index))
    .route("/articles", web::get().to(handlers::articles))
    .route("/article/{idSlug}", web::get().to(handlers::article_detail))
    .route("/add-article", web::get().to(handlers::add_article_form))
    .route("/add-article", web::post().to(handlers::add_article_submit))
    .route("/edit/article/{id}", web::get().to(handlers::edit_article_form))
    .route("/edit/article/{id}", web::post().to(handlers::edit_article_submit))
    .route("/delete/article/{id}", web::get().to(handlers::delete_article))
    .route("/page/{slugId}", web::get().to(handlers::page_detail))
    .route("/add-page", web::get().to(handlers::add_page_form))
    .route("/add-page", web::post().to(handlers::add_page_submit))
    .route("/edit/page/{id}", web::get().to(handlers::edit_page_form))
    .route("/edit/page/{id}", web::post().to(handlers::edit_page_submit))
    .route("/delete/page/{id}", web::get().to(handlers::delete_page))
    .route("/dashboard", web::get().to(handlers::dashboard))
    .route("/dashboard/articles", web::get().to(handlers::dashboard_articles))
    .route("/dashboard/pages", web::get().to(handlers::dashboard_pages))
    .route("/register", web::get().to(handlers::register_form))
    .route("/register", web::post().to(handlers::register_submit))
    .route("/login", web::get().to(handlers::login_form))
    .route("/login", web::post().to(handlers::login_submit))
    .route("/logout", web::get().to(handlers::logout))
    .route("/search", web::get().to(handlers::search_form))
    .route("/search", web::post().to(handlers::search_submit));
}
