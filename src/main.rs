mod app;
mod config;
mod db;
mod forms;
mod utils;

use color_eyre::Result;

#[actix_web::main]
async fn main() -> Result<()> {
  // Environment from .env if present, real env wins.
  dotenv::dotenv().ok();
  if std::env::var("RUST_LOG").is_err() {
    std::env::set_var("RUST_LOG", "info,actix_web=info");
  }
  env_logger::init();

  app::run().await
}
