pub mod client;
pub mod error;
pub mod event;
pub mod message;

pub use client::{EvolutionClient, Notifier};
pub use event::{Contact, NotificationEvent, Recipients};
