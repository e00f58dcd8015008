//! Outbound messaging.

/// Fixed notification phrases.
pub mod notice;
/// WhatsApp Business Cloud client.
pub mod whatsapp;
