pub mod html;
pub mod json;

pub use html::{render_html, HtmlSnapshot};
pub use json::{to_json_string, JsonWriter};
