pub mod api;
pub mod cache;
pub mod config;
pub mod encoder;
pub mod models;
pub mod redirect;
pub mod service;
pub mod storage;
