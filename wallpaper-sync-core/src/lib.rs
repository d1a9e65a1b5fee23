#![doc = "wallpaper-sync-core: core logic library for wallpaper-sync."]

//! This crate contains the data model, the remote-service capability traits and
//! the synchronisation steps that mirror the monthly Bing wallpaper archive into
//! forum pages. The CLI crate supplies the page-service client, configuration
//! loading and the driver.
//!
//! # Usage
//! Depend on this crate for anything that decides *what* page operation to run;
//! plug in real or mocked [`contract::PageStore`], [`contract::ContentFetcher`]
//! and [`contract::StateStore`] implementations to run it.

pub mod archive;
pub mod config;
pub mod content;
pub mod contract;
pub mod error;
pub mod month;
pub mod overview;
pub mod roller;

pub use error::SyncError;
