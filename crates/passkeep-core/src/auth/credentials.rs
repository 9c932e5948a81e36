use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "passkeep";

/// OS-keychain storage for the account password, keyed by email.
///
/// Written on successful login and deleted on logout, so the login form
/// can be pre-filled when the server expires a session. Re-authentication
/// stays user-initiated; nothing here retries automatically.
pub struct CredentialStore;

impl CredentialStore {
    /// Store the password for an email in the OS keychain
    pub fn store(email: &str, password: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, email).context("Failed to create keyring entry")?;
        entry
            .set_password(password)
            .context("Failed to store password in keychain")?;
        Ok(())
    }

    /// Retrieve the password for an email from the OS keychain
    pub fn get_password(email: &str) -> Result<String> {
        let entry = Entry::new(SERVICE_NAME, email).context("Failed to create keyring entry")?;
        entry
            .get_password()
            .context("Failed to retrieve password from keychain")
    }

    /// Delete the stored password for an email
    pub fn delete(email: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, email).context("Failed to create keyring entry")?;
        entry
            .delete_credential()
            .context("Failed to delete credential from keychain")?;
        Ok(())
    }

    /// Check whether a password is stored for an email
    pub fn has_credentials(email: &str) -> bool {
        match Entry::new(SERVICE_NAME, email) {
            Ok(entry) => entry.get_password().is_ok(),
            Err(_) => false,
        }
    }
}
