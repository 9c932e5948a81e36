//! Password generation.
//!
//! A generated password is a random identifier (UUID v4), nothing more.
//! There is deliberately no strength policy or character-class
//! configuration.

use uuid::Uuid;

/// Generate a new random password.
pub fn generate() -> String {
    Uuid::new_v4().to_string()
}
