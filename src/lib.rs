//! qr-overlay - QR detection overlay for a camera preview
//!
//! Frames flow from a [`capture::FrameSource`] through a pre-built
//! [`vision::Detector`] into a [`session::ScanSession`], which freezes the
//! preview, maps each code into layout space and hands markers to the
//! UI-thread [`overlay::ResultPresenter`].

pub mod app;
pub mod capture;
pub mod config;
pub mod geometry;
pub mod overlay;
pub mod session;
pub mod shared;
pub mod storage;
pub mod vision;
