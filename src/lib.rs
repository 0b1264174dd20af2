pub mod accounts;
pub mod app;
pub mod github;
pub mod util;
