//! Text layer helpers

use mupdf::{Page, TextPageOptions};

use crate::document::Result;

/// Get the plain text of a page's embedded text layer
///
/// Lines end with `\n`; a page without text objects yields an empty string.
pub fn extract_plain_text(page: &Page) -> Result<String> {
    let text_page = page.to_text_page(TextPageOptions::empty())?;
    Ok(text_page.to_text()?)
}
