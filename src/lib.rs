//! # Snippetbox
//!
//! A small snippet-sharing web application: visitors browse and read text
//! snippets, registered users log in to create them. Most of the interesting
//! work happens in the request pipeline (see [`middleware`] and [`routes`]).

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod render;
pub mod routes;
pub mod state;
