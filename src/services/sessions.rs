//! Session identifiers handed out on book creation

use axum_extra::extract::cookie::Cookie;
use rand::Rng;

pub const SESSION_COOKIE: &str = "session_id";

const SESSION_ID_BYTES: usize = 16;

#[derive(Clone, Default)]
pub struct SessionService;

impl SessionService {
    pub fn new() -> Self {
        Self
    }

    /// Fresh random identifier, hex-encoded
    pub fn new_session_id(&self) -> String {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        rand::thread_rng().fill(&mut bytes);
        hex::encode(bytes)
    }

    /// `session_id=<hex>; HttpOnly; Path=/`
    pub fn session_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, self.new_session_id()))
            .http_only(true)
            .path("/")
            .build()
    }
}
