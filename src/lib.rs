// Library for tests to access modules

pub mod babel_repo;
pub mod config;
pub mod crawler;
pub mod host_repo;
pub mod link_repo;
pub mod models;
pub mod report;
pub mod version;
