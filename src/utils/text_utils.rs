// Slug generation for article and page URLs.
// Slugs are never unique on their own, the numeric id paired
// with them in the URL is what actually identifies a row.

// Fold the accented characters we're likely to see in titles
// down to plain ASCII. Anything else non-alphanumeric becomes
// a separator.
fn fold_diacritic(c: char) -> Option<&'static str> {
  let folded = match c {
    'à' | 'á' | 'â' | 'ä' | 'ã' | 'å' => "a",
    'ç' => "c",
    'è' | 'é' | 'ê' | 'ë' => "e",
    'ì' | 'í' | 'î' | 'ï' | 'ı' => "i",
    'ñ' => "n",
    'ò' | 'ó' | 'ô' | 'ö' | 'õ' | 'ø' => "o",
    'ù' | 'ú' | 'û' | 'ü' => "u",
    'ý' | 'ÿ' => "y",
    'ş' => "s",
    'ğ' => "g",
    'æ' => "ae",
    'œ' => "oe",
    'ß' => "ss",
    // Lowercasing 'İ' leaves a combining dot behind, drop it
    // instead of turning it into a separator.
    '\u{0307}' => "",
    _ => return None
  };
  Some(folded)
}

pub fn slugify(text: &str) -> String {
  let mut slug = String::with_capacity(text.len());
  for c in text.to_lowercase().chars() {
    match c {
      'a'..='z' | '0'..='9' => slug.push(c),
      _ => match fold_diacritic(c) {
        Some(folded) => slug.push_str(folded),
        None => slug.push('-')
      }
    }
  }
  // Splitting and filtering collapses separator runs and trims
  // both ends in one go.
  slug.split('-')
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("-")
}
