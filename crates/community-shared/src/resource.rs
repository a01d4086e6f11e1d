//! Three-state result handed to presentation code.

/// Either data, an error message, or "still loading".
///
/// Repositories return `Result`; consumers that render state convert with
/// `Resource::from(result)` and match exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
    Success(T),
    Error(String),
    Loading,
}

impl<T> Resource<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Error(_) | Self::Loading => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Error(_) | Self::Loading => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            Self::Success(_) | Self::Loading => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Resource<U> {
        match self {
            Self::Success(data) => Resource::Success(f(data)),
            Self::Error(message) => Resource::Error(message),
            Self::Loading => Resource::Loading,
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Resource<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(e) => Self::Error(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_result() {
        let ok: Resource<u32> = Ok::<_, String>(3).into();
        assert_eq!(ok.data(), Some(&3));
        assert!(ok.is_success());

        let err: Resource<u32> = Err::<u32, _>("offline").into();
        assert_eq!(err.error(), Some("offline"));
        assert!(err.data().is_none());
    }

    #[test]
    fn map_preserves_state() {
        assert_eq!(Resource::Success(2).map(|n| n * 10), Resource::Success(20));
        assert_eq!(
            Resource::<u8>::Error("x".into()).map(|n| n + 1),
            Resource::Error("x".into())
        );
        assert!(Resource::<u8>::Loading.map(|n| n + 1).is_loading());
    }
}
