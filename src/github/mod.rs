pub mod auth;
pub mod client;
pub mod error;
pub mod fetch;
pub mod models;
pub mod parse;
pub mod queries;
pub mod repo_meta;

pub use client::GithubClient;
pub use error::FetchError;
pub use fetch::{PullRequestSource, QueryClient};
pub use models::*;
