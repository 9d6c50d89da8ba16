//! Account lifecycle for MODULIST.
//!
//! Administrators create, deactivate, reactivate and delete accounts;
//! every principal may change its own password. New and reactivated
//! accounts get a placeholder hash and a password link, and only become
//! enabled once the link is consumed.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::info;
use validator::ValidateEmail;

use super::password::{verify_password, CredentialHasher, PasswordError};
use super::password_link::{LinkError, PasswordLinkIssuer};
use crate::db::{
    NewPrincipal, PasswordLink, PasswordLinkRepository, Principal, PrincipalRepository,
    PrincipalUpdate, PrivilegeRank,
};
use crate::{Database, ModulistError};

/// Account lifecycle errors.
#[derive(Error, Debug)]
pub enum AccountError {
    /// The contact address is malformed.
    #[error("invalid mail address")]
    InvalidMail,

    /// The privilege rank is negative.
    #[error("invalid privilege rank")]
    InvalidPrivileges,

    /// The contact address is already taken.
    #[error("mail address already in use")]
    DuplicateMail,

    /// No principal with that id.
    #[error("user not found")]
    NotFound,

    /// An administrator tried to deactivate, reactivate or delete itself.
    #[error("cannot change the status of your own account")]
    SelfModification,

    /// The current password did not verify.
    #[error("current password is incorrect")]
    WrongPassword,

    /// The new password and its repetition differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Password policy or hashing failure.
    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    /// Password link failure.
    #[error("password link error: {0}")]
    Link(#[from] LinkError),

    /// Storage failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<ModulistError> for AccountError {
    fn from(e: ModulistError) -> Self {
        AccountError::Storage(e.to_string())
    }
}

/// Data for an administrator-created account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Contact address.
    pub mail: String,
    /// Privilege rank.
    pub privileges: PrivilegeRank,
}

/// Create a disabled account and issue its first password link.
pub async fn create_account(
    db: &Database,
    hasher: &CredentialHasher,
    account: &NewAccount,
    link_validity: Duration,
    now: DateTime<Utc>,
) -> Result<(Principal, PasswordLink), AccountError> {
    let mail = account.mail.trim();
    if !mail.validate_email() {
        return Err(AccountError::InvalidMail);
    }
    if !account.privileges.is_valid() {
        return Err(AccountError::InvalidPrivileges);
    }

    let repo = PrincipalRepository::new(db.pool());
    if repo.mail_exists(mail).await? {
        return Err(AccountError::DuplicateMail);
    }

    let new_principal = NewPrincipal::new(
        account.first_name.trim(),
        account.last_name.trim(),
        mail,
        hasher.placeholder_hash()?,
    )
    .with_privileges(account.privileges);

    let principal = repo.create(&new_principal).await.map_err(|e| match e {
        // Lost a race against another create with the same address.
        ModulistError::Validation(_) => AccountError::DuplicateMail,
        other => AccountError::from(other),
    })?;

    let store = PasswordLinkRepository::new(db.pool());
    let link = PasswordLinkIssuer::new(&store)
        .issue(&principal, link_validity, now)
        .await?;

    info!(
        user_id = %principal.id,
        privileges = %principal.privileges,
        "Account created"
    );
    Ok((principal, link))
}

/// Disable an account. The acting administrator cannot disable itself.
pub async fn deactivate_account(
    db: &Database,
    actor: &Principal,
    target_id: &str,
) -> Result<Principal, AccountError> {
    if actor.id == target_id {
        return Err(AccountError::SelfModification);
    }

    let principal = PrincipalRepository::new(db.pool())
        .update(target_id, &PrincipalUpdate::new().enabled(false))
        .await?
        .ok_or(AccountError::NotFound)?;

    info!(user_id = %principal.id, by = %actor.id, "Account deactivated");
    Ok(principal)
}

/// Reset an account to a placeholder hash and issue a fresh link.
///
/// The account is disabled until the link is consumed, so the acting
/// administrator cannot reactivate itself.
pub async fn reactivate_account(
    db: &Database,
    hasher: &CredentialHasher,
    actor: &Principal,
    target_id: &str,
    link_validity: Duration,
    now: DateTime<Utc>,
) -> Result<(Principal, PasswordLink), AccountError> {
    if actor.id == target_id {
        return Err(AccountError::SelfModification);
    }

    let update = PrincipalUpdate::new()
        .password_hash(hasher.placeholder_hash()?)
        .enabled(false);

    let principal = PrincipalRepository::new(db.pool())
        .update(target_id, &update)
        .await?
        .ok_or(AccountError::NotFound)?;

    let store = PasswordLinkRepository::new(db.pool());
    let link = PasswordLinkIssuer::new(&store)
        .issue(&principal, link_validity, now)
        .await?;

    info!(user_id = %principal.id, by = %actor.id, "Account reactivated");
    Ok((principal, link))
}

/// Delete an account and its links. The acting administrator cannot
/// delete itself.
pub async fn delete_account(
    db: &Database,
    actor: &Principal,
    target_id: &str,
) -> Result<(), AccountError> {
    if actor.id == target_id {
        return Err(AccountError::SelfModification);
    }

    if !PrincipalRepository::new(db.pool()).delete(target_id).await? {
        return Err(AccountError::NotFound);
    }

    info!(user_id = %target_id, by = %actor.id, "Account deleted");
    Ok(())
}

/// Change the caller's own password.
///
/// The new hash is stored and outstanding password links are dropped in
/// one transaction.
pub async fn change_password(
    db: &Database,
    hasher: &CredentialHasher,
    principal: &Principal,
    current_password: &str,
    new_password: &str,
    repeat_new_password: &str,
) -> Result<Principal, AccountError> {
    verify_password(current_password, &principal.password_hash).map_err(|e| match e {
        PasswordError::VerificationFailed => AccountError::WrongPassword,
        other => AccountError::Password(other),
    })?;

    if new_password != repeat_new_password {
        return Err(AccountError::PasswordMismatch);
    }

    let new_hash = hasher.hash(new_password)?;

    let updated = PrincipalRepository::new(db.pool())
        .replace_password(&principal.id, &new_hash)
        .await?
        .ok_or(AccountError::NotFound)?;

    info!(user_id = %principal.id, "Password changed");
    Ok(updated)
}

/// Set a password through a link and return the now-enabled principal.
pub async fn complete_password_link(
    db: &Database,
    hasher: &CredentialHasher,
    secret: &str,
    password: &str,
    repeat_password: &str,
    now: DateTime<Utc>,
) -> Result<Principal, AccountError> {
    let store = PasswordLinkRepository::new(db.pool());
    let issuer = PasswordLinkIssuer::new(&store);
    let link = issuer.resolve(secret, now).await?;

    if password != repeat_password {
        return Err(AccountError::PasswordMismatch);
    }
    let new_hash = hasher.hash(password)?;

    let user_id = issuer.consume(&link, &new_hash, now).await?;

    PrincipalRepository::new(db.pool())
        .get_by_id(&user_id)
        .await?
        .ok_or(AccountError::NotFound)
}

/// Create the first administrator: enabled, verified, rank `ADMIN`.
pub async fn bootstrap_admin(
    db: &Database,
    hasher: &CredentialHasher,
    first_name: &str,
    last_name: &str,
    mail: &str,
    password: &str,
) -> Result<Principal, AccountError> {
    let mail = mail.trim();
    if !mail.validate_email() {
        return Err(AccountError::InvalidMail);
    }

    let new_principal = NewPrincipal::new(
        first_name.trim(),
        last_name.trim(),
        mail,
        hasher.hash(password)?,
    )
    .with_privileges(PrivilegeRank::ADMIN)
    .with_enabled(true)
    .with_mail_verified(true);

    let principal = PrincipalRepository::new(db.pool())
        .create(&new_principal)
        .await
        .map_err(|e| match e {
            ModulistError::Validation(_) => AccountError::DuplicateMail,
            other => AccountError::from(other),
        })?;

    info!(user_id = %principal.id, "Administrator account created");
    Ok(principal)
}
