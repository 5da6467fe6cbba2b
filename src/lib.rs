pub mod config;
pub mod fetch;
pub mod logging;
pub mod page;
pub mod record;
pub mod render;
pub mod renderer;
pub mod source;
pub mod species;

pub use page::Page;
pub use record::{Column, Record};
pub use render::{HtmlTable, Outcome, TableTarget};
pub use renderer::TableRenderer;
