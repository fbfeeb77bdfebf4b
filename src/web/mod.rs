//! Web server for browser-based plant matching.
//!
//! This module provides an interactive web interface using Axum.
//! Users enter a disease code and a region and get back the matching plants.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! phyto-match serve
//!
//! # Custom port, custom tables and auto-open browser
//! phyto-match serve --port 3000 --drugs drugs.csv --plants plants.csv --open
//!
//! # Bind to all interfaces
//! phyto-match serve --address 0.0.0.0
//! ```
//!
//! ## Endpoints
//!
//! - `GET /` - Main page with the search form
//! - `POST /` - Search form submission (urlencoded `disease` and `region`)
//! - `POST /api/match` - JSON `{disease, region, threshold?}` returning `{query, plants, stats}`
//! - `GET /api/tables` - Sizes of the loaded tables

pub mod render;
pub mod server;
