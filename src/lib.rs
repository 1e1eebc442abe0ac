pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod lcapi;
pub mod models;
pub mod scoring;
pub mod service;
pub mod validate;
