//! # fx-imoveis
//!
//! Back end of the Fort Xavier real-estate site: public listing pages, image
//! management on object storage, lead capture with e-mail notification and
//! the authenticated back office.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod images;
pub mod leads;
pub mod listings;
pub mod mail;
pub mod models;
pub mod properties;
pub mod repositories;
pub mod server;
pub mod slug;
pub mod storage;
pub mod telemetry;
pub use migration;
