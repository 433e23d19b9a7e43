//! HTTP front end for the Tesseract OCR engine.
//!
//! Requests carry an image as base64 JSON, a URL, a raw `image/*` body or a
//! multipart upload. Each request is normalized to bytes and piped through a
//! short-lived `tesseract` process whose output is mapped back to JSON.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
