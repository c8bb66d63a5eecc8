use actix_web::{error::ResponseError, HttpResponse};
use derive_more::Display;
use log::error;

// Full error detail only ever goes to the logs, clients get
// the generic display strings below. Validation failures and
// not-found lookups never end up here, they render as regular
// 200 views.
#[derive(Debug, Display)]
pub enum Error {
  #[display(fmt = "Internal Server Error")]
  InternalServerError(String),
  #[display(fmt = "Database Error")]
  DatabaseError(String),
  #[display(fmt = "Template Error")]
  TemplateError(String)
}

impl ResponseError for Error {
  fn error_response(&self) -> HttpResponse {
    HttpResponse::InternalServerError().body(self.to_string())
  }
}

// Storage failures are not handled locally anywhere, they all
// funnel through here and come out as a 500.
pub fn map_db_error<E: std::fmt::Display>(e: E) -> Error {
  error!("Database access failed - {}", e);
  Error::DatabaseError(e.to_string())
}
