pub mod app;
pub mod background;
pub mod clipboard;
pub mod navigation;
pub mod panel;

pub use app::App;
pub use clipboard::{Clipboard, ClipboardMode};
pub use panel::{Panel, SortColumn, SortDirection, SortSpec};
