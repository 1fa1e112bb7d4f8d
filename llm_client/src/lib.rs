//! Streaming chat-completion clients behind a standardized interface, so the
//! webserver only deals in messages and credentials while the provider client
//! takes care of the wire details.

pub mod broker;
pub mod clients;
pub mod provider;
