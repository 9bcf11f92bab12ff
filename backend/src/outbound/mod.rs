//! Driven adapters: relational store, broker, document store, mail
//! transport, task queue, and the PDF writer.

pub mod cache;
pub mod documents;
pub mod mail;
pub mod pdf;
pub mod persistence;
pub mod queue;
