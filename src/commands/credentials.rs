use crate::config::Credentials;
use crate::output::mask_secret;

pub fn run(credentials: &Credentials, reveal: bool) {
    let token = if reveal {
        credentials.api_token.clone()
    } else {
        mask_secret(&credentials.api_token)
    };
    println!("API Token: {}", token);
    println!("Base URL: {}", credentials.base_url);
}
