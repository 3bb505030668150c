pub mod display;
pub mod excel;
pub mod fetch;
pub mod html;
pub mod json_export;
pub mod loader;
pub mod utils;
