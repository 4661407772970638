//! # Email Intel
//!
//! Client for the Email Intelligence Collector service: look up what is
//! publicly known about an email address, run bulk lookups from a file,
//! browse collection statistics, and summarize a stored profile as a
//! "digital twin".
//!
//! The library is organized around dashboard screens. Each screen owns a
//! small request state machine and talks to the server through the
//! [`traits::IntelApi`] seam, so the HTTP client can be swapped for a fake
//! in tests.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌─────────────┐   ┌────────────┐   ┌──────────┐
//! │  CLI (eic) │──▶│  Dashboard  │──▶│ Controllers │──▶│ IntelApi │──▶ HTTP
//! └────────────┘   │ recall list │   │  + Screens  │   │ ApiClient│
//!                  └─────────────┘   └────────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! eic search ada@example.com          # single lookup
//! eic bulk emails.csv                 # upload a list
//! eic stats                           # collection statistics
//! eic twin derive ada@example.com     # completeness summary
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Response shapes |
//! | [`error`] | Client errors and screen failures |
//! | [`client`] | HTTP client for the service |
//! | [`traits`] | The `IntelApi` seam |
//! | [`screen`] | Per-screen request state machine |
//! | [`controller`] | One controller per screen |
//! | [`dashboard`] | Cross-screen wiring |
//! | [`recall`] | Recently searched addresses |
//! | [`twin`] | Digital twin derivation |
//! | [`metrics`] | Bulk rates and engine summaries |
//! | [`render`] | Terminal output |

pub mod client;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod error;
pub mod metrics;
pub mod models;
pub mod recall;
pub mod render;
pub mod screen;
pub mod traits;
pub mod twin;
