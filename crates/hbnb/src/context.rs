use crate::credentials::CredentialHasher;
use crate::store::DataStore;

/// Collaborators handed to every command: the store and the credential hasher.
pub struct Context<'a, S: DataStore> {
    pub store: &'a S,
    pub hasher: &'a dyn CredentialHasher,
}

impl<'a, S: DataStore> Context<'a, S> {
    pub fn new(store: &'a S, hasher: &'a dyn CredentialHasher) -> Self {
        Self { store, hasher }
    }
}

impl<S: DataStore> Clone for Context<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: DataStore> Copy for Context<'_, S> {}
