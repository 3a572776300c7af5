//! Service wiring for tests that run against a live database

use crate::email::{EmailProvider, EmailService, EmailTemplateService};
use crate::factor::AuthFactorSender;
use crate::invitation::InvitationService;
use crate::organisation_service::OrganisationService;
use crate::role_service::RoleService;
use crate::settings::AccountSettings;
use crate::sms::{SmsProvider, SmsService};
use crate::user_service::UserService;
use sso_database::Database;

pub(crate) fn user_service(db: &Database) -> UserService {
    let templates = EmailTemplateService::new(
        db,
        EmailService::new(EmailProvider::MailHog {
            host: "localhost".to_string(),
            port: 1025,
            from_email: "noreply@example.com".to_string(),
            from_name: "SSO".to_string(),
        }),
    );
    let factors = AuthFactorSender::new(db, templates.clone(), SmsService::new(SmsProvider::Disabled));

    UserService::new(
        db,
        RoleService::new(db),
        templates,
        factors,
        AccountSettings::default(),
    )
}

pub(crate) fn organisation_service(db: &Database) -> OrganisationService {
    let invitations = InvitationService::new(db, user_service(db));
    OrganisationService::new(db, invitations, RoleService::new(db))
}
