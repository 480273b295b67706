//! Email adapter: SMTP transport via lettre.

mod smtp;

pub use smtp::SmtpMailer;
