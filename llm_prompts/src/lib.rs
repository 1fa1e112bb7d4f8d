//! Prompt material for the chat assistant. Right now this is the catalogue
//! of simulated politician debate personas.

pub mod personas;
