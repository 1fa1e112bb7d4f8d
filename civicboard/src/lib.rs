//! Backend for the civic engagement platform: Wahlkompass quizzes with party
//! alignment scoring, Meinungscheck polls, news articles and a streaming AI
//! chat with politician debate personas.

pub mod application;
pub mod articles;
pub mod chat;
pub mod db;
pub mod polls;
pub mod quiz;
pub mod seed;
pub mod webserver;
