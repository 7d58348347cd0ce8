use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("MailError::InvalidEmailAddress: {0}")]
    InvalidEmailAddress(String),
    #[error("MailError::Message: {0}")]
    Message(String),
    #[error("MailError::Smtp: {0}")]
    Smtp(String),
}

impl From<lettre::address::AddressError> for MailError {
    fn from(e: lettre::address::AddressError) -> Self { MailError::InvalidEmailAddress(e.to_string()) }
}
impl From<lettre::error::Error> for MailError {
    fn from(e: lettre::error::Error) -> Self { MailError::Message(e.to_string()) }
}
impl From<lettre::transport::smtp::Error> for MailError {
    fn from(e: lettre::transport::smtp::Error) -> Self { MailError::Smtp(e.to_string()) }
}
