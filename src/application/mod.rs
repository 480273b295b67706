//! Application layer: command handlers orchestrating domain logic over ports.

pub mod checkout;
pub mod media;
pub mod notification;
pub mod provisioning;

pub use checkout::{
    CheckoutFlowError, CheckoutSettings, CreateCheckoutCommand, CreateCheckoutHandler,
};
pub use media::MediaUploader;
pub use notification::NotificationComposer;
pub use provisioning::{ProvisionCardHandler, ProvisionOutcome};
