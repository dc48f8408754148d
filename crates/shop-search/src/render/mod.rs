//! Result projection: JSON envelopes, HTML pages and the usage text.

pub mod help;
pub mod html;
pub mod json;

pub use help::help_text;
pub use html::{HtmlRenderer, ListingPage};
pub use json::{JsonRenderer, ProductJson, QueryBlock, LIST_TYPE, SINGLE_TYPE};
