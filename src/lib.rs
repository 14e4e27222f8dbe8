//! Desktop audio downloader built on yt-dlp and ffmpeg.
//!
//! A single background worker fetches, converts and tags one track at a time
//! and reports typed progress to the egui front end over a channel.

pub mod app;
pub mod cancel;
pub mod config;
pub mod context;
pub mod download;
pub mod error;
pub mod extractor;
pub mod humanize;
pub mod localizations;
pub mod logging;
pub mod models;
pub mod progress;
pub mod session;
pub mod theme;
pub mod ui;

pub use error::{Error, Result};
