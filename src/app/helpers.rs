use super::error::Error;
use actix_web::{http::header, HttpResponse};
use handlebars::Handlebars;
use log::error;
use serde::Serialize;

// 302 like the original framework's redirect helper did.
pub fn redirect(location: &str) -> HttpResponse {
  HttpResponse::Found()
    .header(header::LOCATION, location)
    .finish()
}

pub fn render(
  hb: &Handlebars,
  template: &str,
  data: &impl Serialize
) -> Result<HttpResponse, Error> {
  let body = hb.render(template, data)
    .map_err(|e| {
      error!("A template engine error occured when rendering '{}' - {}", template, e);
      Error::TemplateError(format!("Failed to render '{}'", template))
    })?;
  Ok(
    HttpResponse::Ok()
      .content_type("text/html; charset=utf-8")
      .body(body)
  )
}

// Article URLs look like "/article/12-some-slug". The slug may
// itself contain dashes, so only the first one separates.
pub fn parse_id_slug(raw: &str) -> Option<(i64, String)> {
  let mut parts = raw.splitn(2, '-');
  let id = parts.next()?.parse::<i64>().ok()?;
  let slug = parts.next()?;
  Some((id, slug.to_string()))
}

// Page URLs flip the order: "/page/some-slug-7".
pub fn parse_slug_id(raw: &str) -> Option<(String, i64)> {
  let sep = raw.rfind('-')?;
  let id = raw[sep + 1..].parse::<i64>().ok()?;
  Some((raw[..sep].to_string(), id))
}
