//! Bearer token acquisition.
//!
//! Clients with a credential reference get a token through the OAuth2
//! client-credentials grant before their trigger call. Any rejection from the
//! token endpoint degrades to an unauthenticated call; transport failures are
//! fatal.

mod oauth;
mod traits;
mod types;

pub use oauth::OAuthTokenIssuer;
pub use traits::{TokenError, TokenIssuer};
pub use types::AccessToken;
