pub mod loaders;
pub mod page;
pub mod partial_result;

pub use loaders::load_pages;
pub use page::{join_pages, Page};
pub use partial_result::PartialResult;
