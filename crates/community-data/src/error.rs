use community_shared::RemoteFailure;
use community_store::StoreError;
use thiserror::Error;

/// Errors surfaced by repositories and ledgers.
#[derive(Error, Debug)]
pub enum DataError {
    /// The remote call failed; carries the HTTP-equivalent status code.
    #[error(transparent)]
    Remote(#[from] RemoteFailure),

    /// A write that was the point of the operation did not land.
    #[error("Local write failed: {0}")]
    LocalWrite(#[source] StoreError),

    /// Reading the local store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Caller input rejected before any I/O.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Not found")]
    NotFound,

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl DataError {
    pub(crate) fn local_write(err: StoreError) -> Self {
        Self::LocalWrite(err)
    }

    /// The remote failure behind this error, if any.
    pub fn remote(&self) -> Option<&RemoteFailure> {
        match self {
            Self::Remote(failure) => Some(failure),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_lists_every_problem() {
        let err = DataError::Validation(vec![
            "Email is required".into(),
            "Passwords do not match".into(),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: Email is required; Passwords do not match"
        );
    }

    #[test]
    fn remote_is_transparent() {
        let err: DataError = RemoteFailure::new(RemoteFailure::NOT_FOUND).into();
        assert_eq!(err.remote().map(|f| f.code), Some(404));
        assert_eq!(err.to_string(), RemoteFailure::new(404).to_string());
    }

    #[test]
    fn converts_into_resource() {
        use community_shared::Resource;

        let failed: Resource<u32> = Err::<u32, _>(DataError::NotLoggedIn).into();
        assert_eq!(failed.error(), Some("Not logged in"));

        let ok: Resource<u32> = Ok::<_, DataError>(3).into();
        assert_eq!(ok.data(), Some(&3));
    }
}
