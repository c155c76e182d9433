//! What a client session shows: the live list plus its own state.

use printboard_core::{
    BackendKind, DebugResponse, Fingerprint, ListResponse, RegisterResponse, TransportError,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegistrationState {
    #[default]
    Idle,
    Deriving,
    Registering,
    Registered,
    Refreshing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListingState {
    #[default]
    Idle,
    Listing,
    Listed,
}

/// Which operation raised the current advisory. A later success of the
/// same operation clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdvisorySource {
    Registration,
    Listing,
    Session,
}

#[derive(Debug, Clone, Default)]
pub struct View {
    pub registration: RegistrationState,
    pub listing: ListingState,
    own: Option<Fingerprint>,
    fingerprints: Vec<Fingerprint>,
    storage_type: Option<BackendKind>,
    registered_count: Option<usize>,
    last_registered: Option<i64>,
    last_fetch: Option<i64>,
    advisory: Option<(AdvisorySource, String)>,
    debug: Option<DebugResponse>,
}

impl View {
    pub fn own(&self) -> Option<&Fingerprint> {
        self.own.as_ref()
    }

    /// Newest first. Always contains the session's own fingerprint once it
    /// has been derived.
    pub fn fingerprints(&self) -> &[Fingerprint] {
        &self.fingerprints
    }

    pub fn storage_type(&self) -> Option<BackendKind> {
        self.storage_type
    }

    /// Entry count reported by the last successful registration.
    pub fn registered_count(&self) -> Option<usize> {
        self.registered_count
    }

    pub fn last_registered(&self) -> Option<i64> {
        self.last_registered
    }

    pub fn last_fetch(&self) -> Option<i64> {
        self.last_fetch
    }

    /// Transient, non-blocking message about the last failure.
    pub fn advisory(&self) -> Option<&str> {
        self.advisory.as_ref().map(|(_, message)| message.as_str())
    }

    pub fn debug(&self) -> Option<&DebugResponse> {
        self.debug.as_ref()
    }

    /// Shown while the server runs on its fallback backend. Registration
    /// behaves the same either way.
    pub fn storage_notice(&self) -> Option<&'static str> {
        match self.storage_type {
            Some(BackendKind::InMemory) => {
                Some("Using fallback storage: entries will not survive a server restart")
            }
            _ => None,
        }
    }

    pub fn set_own(&mut self, own: Fingerprint) {
        self.fingerprints.retain(|f| f.id != own.id);
        self.fingerprints.insert(0, own.clone());
        self.own = Some(own);
    }

    pub fn apply_registered(&mut self, response: &RegisterResponse, now: i64) {
        self.registration = RegistrationState::Registered;
        self.storage_type = Some(response.storage_type);
        self.registered_count = Some(response.count);
        self.last_registered = Some(now);
        self.clear_advisory(AdvisorySource::Registration);
    }

    pub fn apply_register_error(&mut self, err: &TransportError) {
        self.registration = if self.last_registered.is_some() {
            RegistrationState::Registered
        } else {
            RegistrationState::Idle
        };
        self.advisory = Some((
            AdvisorySource::Registration,
            format!("Failed to register fingerprint: {}", err),
        ));
    }

    /// Replace the displayed list with a server snapshot, re-inserting the
    /// session's own fingerprint (stamped `now`) if the snapshot lacks it.
    pub fn apply_list(&mut self, response: ListResponse, now: i64) {
        let mut fingerprints = response.fingerprints;
        if let Some(own) = &self.own {
            if !fingerprints.iter().any(|f| f.id == own.id) {
                fingerprints.insert(0, own.clone().with_timestamp(now));
            }
        }
        self.fingerprints = fingerprints;
        self.storage_type = Some(response.storage_type);
        self.last_fetch = Some(now);
        self.listing = ListingState::Listed;
        self.clear_advisory(AdvisorySource::Listing);
    }

    /// Keep whatever is displayed; just say what went wrong.
    pub fn apply_list_error(&mut self, err: &TransportError) {
        self.listing = if self.last_fetch.is_some() {
            ListingState::Listed
        } else {
            ListingState::Idle
        };
        self.advisory = Some((
            AdvisorySource::Listing,
            format!("Connection error: showing last known fingerprints ({})", err),
        ));
    }

    pub fn apply_debug(&mut self, response: DebugResponse) {
        self.debug = Some(response);
    }

    /// Advisory that no later request clears.
    pub fn set_advisory(&mut self, message: impl Into<String>) {
        self.advisory = Some((AdvisorySource::Session, message.into()));
    }

    fn clear_advisory(&mut self, source: AdvisorySource) {
        if self.advisory.as_ref().map(|(s, _)| *s) == Some(source) {
            self.advisory = None;
        }
    }
}
