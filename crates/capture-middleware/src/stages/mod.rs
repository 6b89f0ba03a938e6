//! The capture pipeline's gates.
//!
//! | Stage | Middleware | Rejects with |
//! |-------|------------|--------------|
//! | 1 | [`RecoveryMiddleware`] | 500 on panic |
//! | 2 | [`MethodMiddleware`] | 405 |
//! | 3 | [`AuthMiddleware`] | 401 |
//! | 4 | [`ValidationMiddleware`] | 400 |

mod auth;
mod method;
mod recovery;
mod validation;

pub use auth::{AuthMiddleware, Credentials};
pub use method::MethodMiddleware;
pub use recovery::{panic_message, RecoveryMiddleware};
pub use validation::{BodyLimits, ValidationMiddleware};
