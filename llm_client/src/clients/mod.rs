//! Exposes all the clients which we are interested in, and a standardized
//! format so the caller never has to care which provider is on the other end.

pub mod groq;
pub mod openai_compatible;
pub mod types;
