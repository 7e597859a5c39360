use std::fmt;

/// Bearer credential for one signed-in user.
///
/// Created from a successful login and handed to the remote store that uses it;
/// nothing reads it from ambient storage.
#[derive(Clone, Default)]
pub struct Session {
    credential: Option<Credential>,
}

#[derive(Clone)]
struct Credential {
    email: String,
    token: String,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(email: impl Into<String>, token: impl Into<String>) -> Self {
        Self { credential: Some(Credential { email: email.into(), token: token.into() }) }
    }

    pub fn sign_in(&mut self, email: impl Into<String>, token: impl Into<String>) {
        *self = Self::signed_in(email, token);
    }

    pub fn sign_out(&mut self) {
        self.credential = None;
    }

    pub fn is_signed_in(&self) -> bool {
        self.credential.is_some()
    }

    pub fn bearer(&self) -> Option<&str> {
        self.credential.as_ref().map(|c| c.token.as_str())
    }

    pub fn email(&self) -> Option<&str> {
        self.credential.as_ref().map(|c| c.email.as_str())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("email", &self.email())
            .field("token", &self.credential.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_and_out() {
        let mut session = Session::anonymous();
        assert!(!session.is_signed_in());
        assert_eq!(session.bearer(), None);

        session.sign_in("ada@example.com", "tok-1");
        assert_eq!(session.bearer(), Some("tok-1"));
        assert_eq!(session.email(), Some("ada@example.com"));

        session.sign_out();
        assert!(!session.is_signed_in());
        assert_eq!(session.email(), None);
    }

    #[test]
    fn debug_hides_token() {
        let session = Session::signed_in("ada@example.com", "secret-token");
        let printed = format!("{session:?}");
        assert!(printed.contains("ada@example.com"));
        assert!(!printed.contains("secret-token"));
    }
}
