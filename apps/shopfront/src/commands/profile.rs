//! # Profile Commands
//!
//! The signed-in person's own record.

use tracing::{debug, info};

use shopfront_core::validation::validate_required;
use shopfront_core::{Person, PersonUpdate, SessionUser};

use crate::error::AppResult;
use crate::state::AppContext;

/// Editable profile fields. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Fetches the signed-in person.
pub async fn profile(ctx: &AppContext) -> AppResult<Person> {
    debug!("profile command");

    let email = ctx.session.require_email().await?;
    Ok(ctx.backend().person(&email).await?)
}

/// Updates name, address and phone; role and frequent flag are sent back
/// unchanged.
///
/// On success the stored `user` and `is_frequent` are refreshed from the
/// backend's answer.
pub async fn update_profile(ctx: &AppContext, form: ProfileForm) -> AppResult<Person> {
    debug!("update_profile command");

    let current = profile(ctx).await?;

    let update = PersonUpdate {
        email: None,
        name: match form.name {
            Some(name) => validate_required("name", &name)?,
            None => current.name,
        },
        address: match form.address {
            Some(address) => validate_required("address", &address)?,
            None => current.address,
        },
        phone: match form.phone {
            Some(phone) => validate_required("phone", &phone)?,
            None => current.phone,
        },
        is_frequent_customer: Some(current.is_frequent_customer),
        role: current.role,
    };

    let updated = ctx.backend().update_person(&current.email, &update).await?;

    let store = ctx.session.store();
    store
        .set_user(&SessionUser {
            name: updated.name.clone(),
            role: updated.role,
            email: updated.email.clone(),
        })
        .await?;
    store.set_is_frequent(updated.is_frequent_customer).await?;

    info!(email = %updated.email, "Profile updated");
    Ok(updated)
}
