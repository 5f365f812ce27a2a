use crate::domain::{AppState, VerificationSettings, notifications::StatusNotifier, repository::Repository};

pub mod http;
#[cfg(test)]
pub mod memory;
pub mod persistence;
pub mod settings;

#[derive(Clone)]
pub struct AppStateImpl<R, N> {
    repository: R,
    notifier: N,
    verification: VerificationSettings,
}

impl<R, N> AppStateImpl<R, N> {
    pub fn new(repository: R, notifier: N, verification: VerificationSettings) -> Self {
        Self {
            repository,
            notifier,
            verification,
        }
    }
}

impl<R: Repository, N: StatusNotifier> AppState for AppStateImpl<R, N> {
    type R = R;
    type N = N;

    fn repository(&self) -> &Self::R {
        &self.repository
    }

    fn notifier(&self) -> &Self::N {
        &self.notifier
    }

    fn verification(&self) -> &VerificationSettings {
        &self.verification
    }
}
