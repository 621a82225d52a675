//! Core types for the taskflow client: the error taxonomy, user records with
//! role derivation, and the in-process event bus the coordinators build on.

pub mod error;
pub mod event;
pub mod user;

pub use error::{ClientError, Result};
pub use event::{Callback, Delivery, DeliveryPolicy, EventBus, Subscription};
pub use user::{
    derive_role_rank, label_is_manager, rank_from_role_name, RoleNum, User, DIRECTOR_RANK,
    MANAGER_RANK, STAFF_RANK,
};
