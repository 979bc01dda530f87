//! Per-panel view state and stale-response fencing.
//!
//! Each panel (ranking, industry charts, analysis) owns one `ViewState` and one
//! `RequestFence`. A request moves the panel to `Loading` and hands out a
//! token; only the response carrying the latest token may settle the panel.

/// What a panel currently shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            ViewState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Settle from a finished request, reducing the error to its message.
    pub fn settle<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => ViewState::Loaded(value),
            Err(err) => ViewState::Failed(err.to_string()),
        }
    }
}

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Issues monotonically increasing tokens and accepts only the latest.
#[derive(Debug, Default)]
pub struct RequestFence {
    latest: u64,
}

impl RequestFence {
    pub fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    pub fn accepts(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }

    /// Invalidate every outstanding token without issuing a new request.
    pub fn reset(&mut self) {
        self.latest += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_accepts_only_latest_token() {
        let mut fence = RequestFence::default();
        let first = fence.issue();
        assert!(fence.accepts(first));

        let second = fence.issue();
        assert!(second > first);
        assert!(!fence.accepts(first));
        assert!(fence.accepts(second));

        fence.reset();
        assert!(!fence.accepts(second));
    }

    #[test]
    fn settle_maps_results() {
        let ok: ViewState<u32> = ViewState::settle(Ok::<_, String>(3));
        assert_eq!(ok.loaded(), Some(&3));
        assert!(ok.error().is_none());

        let failed: ViewState<u32> = ViewState::settle(Err("HTTP 500"));
        assert_eq!(failed.error(), Some("HTTP 500"));
        assert!(failed.loaded().is_none());
        assert!(!failed.is_loading());
    }

    #[test]
    fn default_is_idle() {
        let state: ViewState<Vec<u8>> = ViewState::default();
        assert_eq!(state, ViewState::Idle);
        assert!(ViewState::<()>::Loading.is_loading());
    }
}
