// src/lib.rs

//! photomgr: forum board listing and image download library

pub mod error;
pub mod fetch;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;
