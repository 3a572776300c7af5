pub mod email;
pub mod error;
pub mod extra_fields;
pub mod factor;
pub mod invitation;
pub mod jwt;
pub mod organisation_service;
pub mod otp;
pub mod password;
pub mod role_service;
pub mod settings;
pub mod sms;
pub mod token;
pub mod user_service;

#[cfg(test)]
mod test_support;

pub use email::{EmailMessage, EmailProvider, EmailService, EmailTemplateService};
pub use error::{AuthError, Result};
pub use extra_fields::ExtraFieldService;
pub use factor::AuthFactorSender;
pub use invitation::{InvitationOutcome, InvitationService};
pub use jwt::{Claims, JwtService, TokenSubject, TokenType};
pub use organisation_service::{Actor, OrganisationService};
pub use password::{validate_password, PasswordHasher};
pub use role_service::{RoleDiff, RoleService};
pub use settings::AccountSettings;
pub use sms::{SmsMessage, SmsProvider, SmsService};
pub use token::TokenService;
pub use user_service::UserService;
