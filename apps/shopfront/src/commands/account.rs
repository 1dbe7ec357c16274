//! # Account Commands
//!
//! Login, registration and logout.
//!
//! ## Login Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  login(email, password)                                                 │
//! │     │                                                                   │
//! │     ├── POST /persons/login ──────► failure: "Invalid credentials"      │
//! │     │                                                                   │
//! │     ├── store `user`, `email`                                           │
//! │     │                                                                   │
//! │     ├── GET /sales/top-frequent-customers                               │
//! │     │      email listed ──► is_frequent = "true"                        │
//! │     │      otherwise / error ──► is_frequent removed                    │
//! │     │                                                                   │
//! │     ├── GET /discounts/active                                           │
//! │     │      200 ──► store `discount`                                     │
//! │     │      other status ──► remove `discount`                           │
//! │     │      transport error ──► logged, left as is                       │
//! │     │                                                                   │
//! │     └── next view: reports (admin) / sales history (user)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info, warn};

use shopfront_api::BackendError;
use shopfront_core::validation::{validate_email, validate_required};
use shopfront_core::{LoginRequest, Registration, SessionUser};

use crate::commands::NextView;
use crate::error::{AppError, AppResult};
use crate::state::AppContext;

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub user: SessionUser,
    pub is_frequent: bool,
    pub next_view: NextView,
}

/// Registration form input.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub name: String,
    pub address: String,
    pub phone: String,
}

/// Signs in and caches identity and discounts locally.
pub async fn login(ctx: &AppContext, email: &str, password: &str) -> AppResult<LoginOutcome> {
    debug!(email = %email, "login command");

    let email = validate_email(email)?;
    if password.is_empty() {
        return Err(AppError::validation("Password is required"));
    }

    let response = ctx
        .backend()
        .login(&LoginRequest {
            email: email.clone(),
            password: password.to_string(),
        })
        .await
        .map_err(|e| {
            warn!(email = %email, error = %e, "Login rejected");
            AppError::validation("Invalid credentials")
        })?;

    let user = SessionUser {
        name: response.person.name,
        role: response.role,
        email: response.person.email,
    };

    let store = ctx.session.store();
    store.set_user(&user).await?;
    store.set_email(&user.email).await?;

    let is_frequent = is_frequent_customer(ctx, &user.email).await;
    store.set_is_frequent(is_frequent).await?;

    refresh_active_discount(ctx).await?;

    // Pricing inputs changed under the cart
    ctx.cart.notify_changed();

    let next_view = if user.role.is_admin() {
        NextView::Reports
    } else {
        NextView::SalesHistory
    };

    info!(email = %user.email, role = %user.role, is_frequent, "Logged in");
    Ok(LoginOutcome {
        user,
        is_frequent,
        next_view,
    })
}

async fn is_frequent_customer(ctx: &AppContext, email: &str) -> bool {
    match ctx.backend().top_frequent_customers().await {
        Ok(customers) => customers.iter().any(|c| c.email == email),
        Err(e) => {
            warn!(error = %e, "Frequent-customer lookup failed; treating as not frequent");
            false
        }
    }
}

async fn refresh_active_discount(ctx: &AppContext) -> AppResult<()> {
    let store = ctx.session.store();

    match ctx.backend().active_discount().await {
        Ok(Some(discount)) => {
            debug!(id = discount.id, percent = %discount.discount_avg, "Active discount stored");
            store.set_discount(&discount).await?;
        }
        Ok(None) => {
            debug!("No active discount");
            store.remove_discount().await?;
        }
        Err(e) => warn!(error = %e, "Active discount lookup failed"),
    }

    Ok(())
}

/// Creates a plain user account.
///
/// Registration does not sign in.
pub async fn register(ctx: &AppContext, form: RegistrationForm) -> AppResult<()> {
    debug!(email = %form.email, "register command");

    let email = validate_email(&form.email)?;
    let name = validate_required("name", &form.name)?;
    let address = validate_required("address", &form.address)?;
    let phone = validate_required("phone", &form.phone)?;
    if form.password.is_empty() {
        return Err(AppError::validation("Password is required"));
    }

    let registration = Registration::new(email, form.password, name, address, phone);

    match ctx.backend().register(&registration).await {
        Ok(()) => {
            info!(email = %registration.email, "Registered");
            Ok(())
        }
        Err(BackendError::Status { status, message }) if !message.is_empty() => {
            warn!(status, message = %message, "Registration rejected");
            Err(AppError::validation(message))
        }
        Err(e) => Err(e.into()),
    }
}

/// Wipes all local state.
pub async fn logout(ctx: &AppContext) -> AppResult<()> {
    debug!("logout command");

    ctx.session.store().clear_all().await?;
    ctx.cart.reset();

    info!("Logged out");
    Ok(())
}
