// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Authorization header providers.
//!
//! Obtaining a session token (login, token renewal) happens outside this
//! crate; the token is handed over through [`crate::Config`].

use crate::error::Result;
use std::fmt::Debug;

/// Trait for authentication providers.
pub trait AuthProvider: Send + Sync + Debug {
    /// Returns the authorization header value for HTTP requests.
    fn get_auth_header(&self) -> Result<String>;
}

/// Session token issued by the login endpoint.
#[derive(Clone)]
pub struct SessionToken {
    token: String,
}

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

// Keep the token out of logs.
impl Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken").finish_non_exhaustive()
    }
}

impl AuthProvider for SessionToken {
    fn get_auth_header(&self) -> Result<String> {
        Ok(format!("Snowflake Token=\"{}\"", self.token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_header() {
        let token = SessionToken::new("abc123");
        assert_eq!(token.get_auth_header().unwrap(), "Snowflake Token=\"abc123\"");
    }

    #[test]
    fn test_session_token_debug_hides_secret() {
        let token = SessionToken::new("super-secret");
        assert!(!format!("{:?}", token).contains("super-secret"));
    }
}
