pub mod client;
pub mod requests;
pub mod server;
pub mod tests;
