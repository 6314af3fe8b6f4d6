/*
[INPUT]:  Backend base URL and HTTP client configuration
[OUTPUT]: Wallet listings for seeding the dashboard store
[POS]:    HTTP layer - wallet directory collaborator
[UPDATE]: When adding new directory endpoints or changing client behavior
*/

pub mod client;

pub use client::{ClientConfig, HttpWalletDirectory, WalletDirectory};
