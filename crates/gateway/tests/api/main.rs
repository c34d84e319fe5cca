mod auth;
mod observations;
