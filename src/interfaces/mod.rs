//! Outer surfaces over the application services

pub mod http;
