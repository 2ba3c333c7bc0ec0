//! Client-side trip building.
//!
//! [`flow::BookingFlow`] tracks where a user is in search, select and
//! confirm. [`session::SearchSession`] makes sure a slow search that was
//! superseded by a newer one cannot overwrite fresher results.

pub mod flow;
pub mod session;
