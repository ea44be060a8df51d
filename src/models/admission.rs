use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("Incorrect password. Please try again.")]
    IncorrectPassword,
}

/// What the identity provider reports about the current caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentitySnapshot {
    pub is_loaded: bool,
    pub is_signed_in: bool,
    pub primary_verified_email: Option<String>,
}

impl IdentitySnapshot {
    pub fn loading() -> Self {
        Self::default()
    }

    pub fn signed_out() -> Self {
        Self {
            is_loaded: true,
            ..Self::default()
        }
    }

    pub fn signed_in(primary_verified_email: Option<String>) -> Self {
        Self {
            is_loaded: true,
            is_signed_in: true,
            primary_verified_email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthorizationSource {
    Federated { email: String },
    LocalSecret,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The identity provider has not settled; nothing is decided yet.
    Loading,
    Granted(AuthorizationSource),
    Denied,
}

impl Admission {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Admission::Granted(_))
    }

    pub fn source(&self) -> Option<&AuthorizationSource> {
        match self {
            Admission::Granted(source) => Some(source),
            _ => None,
        }
    }
}

/// Per-channel view of one gate evaluation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AdmissionState {
    pub identity_loaded: bool,
    pub identity_authorized: bool,
    pub local_password_authorized: bool,
}

impl AdmissionState {
    #[cfg(test)]
    pub fn is_authorized(&self) -> bool {
        self.identity_authorized || self.local_password_authorized
    }
}

#[derive(Clone)]
pub struct AdmissionGate {
    authorized_email: String,
    admin_password: String,
}

impl AdmissionGate {
    pub fn new(authorized_email: &str, admin_password: &str) -> Self {
        Self {
            authorized_email: authorized_email.to_string(),
            admin_password: admin_password.to_string(),
        }
    }

    pub fn state(&self, identity: &IdentitySnapshot, local_flag: bool) -> AdmissionState {
        let identity_authorized = identity.is_loaded
            && identity.is_signed_in
            && identity.primary_verified_email.as_deref() == Some(self.authorized_email.as_str());

        AdmissionState {
            identity_loaded: identity.is_loaded,
            identity_authorized,
            local_password_authorized: identity.is_loaded && local_flag,
        }
    }

    /// Resolves both channels into a single decision. The federated match is
    /// preferred when both hold.
    pub fn resolve(&self, identity: &IdentitySnapshot, local_flag: bool) -> Admission {
        if !identity.is_loaded {
            return Admission::Loading;
        }

        let state = self.state(identity, local_flag);
        if state.identity_authorized {
            let email = identity.primary_verified_email.clone().unwrap_or_default();
            Admission::Granted(AuthorizationSource::Federated { email })
        } else if state.local_password_authorized {
            Admission::Granted(AuthorizationSource::LocalSecret)
        } else {
            Admission::Denied
        }
    }

    pub fn check_password(&self, candidate: &str) -> Result<(), AdmissionError> {
        if !self.admin_password.is_empty() && candidate == self.admin_password {
            Ok(())
        } else {
            Err(AdmissionError::IncorrectPassword)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AdmissionGate {
        AdmissionGate::new("owner@shop.co", "hunter2")
    }

    #[test]
    fn matching_email_is_federated() {
        let identity = IdentitySnapshot::signed_in(Some("owner@shop.co".to_string()));
        let admission = gate().resolve(&identity, false);
        assert_eq!(
            admission,
            Admission::Granted(AuthorizationSource::Federated {
                email: "owner@shop.co".to_string()
            })
        );
    }

    #[test]
    fn email_match_is_case_sensitive() {
        let identity = IdentitySnapshot::signed_in(Some("Owner@shop.co".to_string()));
        assert_eq!(gate().resolve(&identity, false), Admission::Denied);
    }

    #[test]
    fn non_matching_email_without_flag_is_denied() {
        let identity = IdentitySnapshot::signed_in(Some("someone@else.com".to_string()));
        let admission = gate().resolve(&identity, false);
        assert!(!admission.is_authorized());
        assert!(!gate().state(&identity, false).is_authorized());
    }

    #[test]
    fn local_flag_grants_without_identity() {
        let admission = gate().resolve(&IdentitySnapshot::signed_out(), true);
        assert_eq!(admission, Admission::Granted(AuthorizationSource::LocalSecret));
    }

    #[test]
    fn loading_defers_decision() {
        let admission = gate().resolve(&IdentitySnapshot::loading(), true);
        assert_eq!(admission, Admission::Loading);
        assert!(!gate().state(&IdentitySnapshot::loading(), true).is_authorized());
    }

    #[test]
    fn password_must_match_exactly() {
        assert!(gate().check_password("hunter2").is_ok());
        assert_eq!(gate().check_password("hunter2 "), Err(AdmissionError::IncorrectPassword));
        assert_eq!(
            AdmissionGate::new("owner@shop.co", "").check_password(""),
            Err(AdmissionError::IncorrectPassword)
        );
    }
}
