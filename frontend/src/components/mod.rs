pub mod advisory_panel;
pub mod controls;
pub mod handlers;
pub mod header;
pub mod results;
pub mod upload_section;
pub mod utils;
