use strum_macros::Display;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BookingState {
    Searching,
    Selecting,
    Confirming,
    /// Trip persisted under this id.
    Booked(i32),
    Abandoned,
}

impl BookingState {
    pub fn is_terminal(self) -> bool {
        matches!(self, BookingState::Booked(_) | BookingState::Abandoned)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum BookingEvent {
    /// A new search replaced the running one.
    NewSearch,
    ResultsReady,
    ReviseQuery,
    Confirm,
    EditSelection,
    Booked(i32),
    Abandon,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("cannot {event} while {state}")]
    InvalidTransition {
        state: BookingState,
        event: BookingEvent,
    },
}

/// Search → select → confirm, with the two backward edges a user can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingFlow {
    state: BookingState,
}

impl Default for BookingFlow {
    fn default() -> Self {
        BookingFlow::new()
    }
}

impl BookingFlow {
    pub fn new() -> Self {
        BookingFlow {
            state: BookingState::Searching,
        }
    }

    pub fn state(&self) -> BookingState {
        self.state
    }

    pub fn apply(&mut self, event: BookingEvent) -> Result<BookingState, FlowError> {
        use BookingEvent as E;
        use BookingState as S;

        let next = match (self.state, event) {
            (S::Searching, E::NewSearch) => S::Searching,
            (S::Searching, E::ResultsReady) => S::Selecting,
            (S::Selecting, E::ReviseQuery) => S::Searching,
            (S::Selecting, E::Confirm) => S::Confirming,
            (S::Confirming, E::EditSelection) => S::Selecting,
            (S::Confirming, E::Booked(trip_id)) => S::Booked(trip_id),
            (state, E::Abandon) if !state.is_terminal() => S::Abandoned,
            (state, event) => return Err(FlowError::InvalidTransition { state, event }),
        };

        self.state = next;
        Ok(next)
    }
}
