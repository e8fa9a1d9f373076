#![doc = "The `taskledger` library crate."]
#![doc = ""]
#![doc = "Personal task management over HTTP/JSON: account registration and login with"]
#![doc = "bcrypt-hashed passwords and HS256 bearer tokens, plus owner-scoped task storage"]
#![doc = "with validation, partial updates and soft deletes."]
#![doc = ""]
#![doc = "The binary (`main.rs`) only reads configuration, picks a store and starts the"]
#![doc = "server; everything it wires together lives here."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use crate::error::AppError;
