// src/middleware/password_extractor.rs
use actix_web::error::ErrorUnauthorized;
use actix_web::{Error, FromRequest, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

pub const PASSWORD_HEADER: &str = "X-Portfolio-Password";

/// Edit password presented by the caller. Checking it against the stored
/// portfolio is the handler's job.
pub struct EditPassword(pub String);

impl FromRequest for EditPassword {
    type Error = Error;
    type Future = Ready<Result<EditPassword, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let header = match req.headers().get(PASSWORD_HEADER) {
            Some(header) => header,
            None => return ready(Err(ErrorUnauthorized("Missing X-Portfolio-Password header"))),
        };

        // any UTF-8 is a valid password; compared byte-for-byte, untrimmed
        match std::str::from_utf8(header.as_bytes()) {
            Ok(value) => ready(Ok(EditPassword(value.to_string()))),
            Err(_) => ready(Err(ErrorUnauthorized("Invalid X-Portfolio-Password header"))),
        }
    }
}
