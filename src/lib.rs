// Library for tests to access modules

pub mod config;
pub mod error;
pub mod history_repo;
pub mod loader;
pub mod models;
pub mod report;
pub mod routes;
pub mod service;
pub mod summarizer;
pub mod version;
