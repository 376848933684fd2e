#![doc = "sharepoint-drive-core: core logic library for sharepoint-drive."]

//! This crate holds the path model, the folder resolver and the document
//! library service. It speaks to the remote drive only through the traits in
//! [`contract`]; the Graph HTTP client lives in the `sharepoint-drive` crate.
//!
//! # Usage
//! Build a [`library::DocumentLibrary`] around any client implementing
//! [`contract::RemoteResourceClient`] and [`contract::DocumentStore`], or use
//! [`resolver::PathResolver`] directly for folder creation alone.

pub mod config;
pub mod contract;
pub mod error;
pub mod library;
pub mod path;
pub mod resolver;
