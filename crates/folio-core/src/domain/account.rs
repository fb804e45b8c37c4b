use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account entity - the identity issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with generated ID and timestamp.
    pub fn new(email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            created_at: Utc::now(),
        }
    }

    /// Email with the local part masked, safe for logs.
    pub fn masked_email(&self) -> String {
        mask_email(&self.email)
    }
}

pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let masked_local = match local.chars().next() {
                Some(first) if local.chars().count() > 1 => format!("{}***", first),
                _ => "***".to_string(),
            };
            format!("{}@{}", masked_local, domain)
        }
        None => "***".to_string(),
    }
}

/// Profile entity - the public-facing details of an account, one per account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Create the profile that accompanies a freshly signed-up account.
    pub fn for_account(account: &Account, full_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: account.id,
            email: Some(account.email.clone()),
            full_name: super::non_blank(full_name),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("sarah@beamx.io"), "s***@beamx.io");
        assert_eq!(mask_email("a@beamx.io"), "***@beamx.io");
        assert_eq!(mask_email("not-an-email"), "***");
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let account = Account::new("sarah@beamx.io".into(), "$argon2id$secret".into());
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("argon2"));
    }
}
