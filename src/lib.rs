//! Rust client for the N26 bank REST API.
//! Drives the two-factor, out-of-band login handshake and exposes one typed
//! operation per account resource (balance, cards, transactions, statements,
//! spaces and friends).

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod timestamp;
pub mod transport;

pub use auth::{AuthState, Authenticator, Credentials, PollPolicy, Token};
pub use client::Client;
pub use error::N26Error;
pub use models::{
    Address, Addresses, Balance, Card, Contact, ContactAccount, Limit, Paging, PersonalInfo,
    Space, SpaceBalance, Spaces, Statement, Statuses, Transaction, UserFeatures,
};
pub use timestamp::Timestamp;
pub use transport::{
    ApiRequest, ApiResponse, HttpTransport, RequestBody, ResponseBody, Transport,
};
