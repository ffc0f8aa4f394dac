//! Search and display state of the weather widget.
//!
//! Every request the widget issues carries a [`RequestId`]. Only the most
//! recently issued request may change what is displayed; completions that
//! arrive for older ids are dropped.

use tracing::{debug, info, warn};

use crate::error::{LocateError, WeatherError};
use crate::geolocate::Coordinates;
use crate::weather::WeatherSnapshot;
use crate::weatherapi::Query;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestId(u64);

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Status {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// Waiting for the position lookup.
    Locating,
    /// Waiting for a weather answer.
    Loading,
    /// The held snapshot answers the latest request.
    Ready,
    /// The latest request failed. A previous snapshot, if any, is kept.
    Failed(String),
}

#[derive(Debug, Default)]
pub struct Widget {
    query: String,
    snapshot: Option<WeatherSnapshot>,
    status: Status,
    issued: u64,
    last_query: Option<Query>,
}

impl Widget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    fn issue(&mut self) -> RequestId {
        self.issued += 1;
        RequestId(self.issued)
    }

    fn is_latest(&self, id: RequestId) -> bool {
        id == RequestId(self.issued)
    }

    fn issue_fetch(&mut self, query: Query) -> (RequestId, Query) {
        let id = self.issue();
        info!("Request {} for {}", id.0, query);
        self.status = Status::Loading;
        self.last_query = Some(query.clone());
        (id, query)
    }

    pub fn start_locate(&mut self) -> RequestId {
        let id = self.issue();
        self.status = Status::Locating;
        id
    }

    /// Returns the coordinates fetch to issue, if the lookup is still wanted
    /// and succeeded.
    pub fn locate_finished(
        &mut self,
        id: RequestId,
        result: Result<Coordinates, LocateError>,
    ) -> Option<(RequestId, Query)> {
        if !self.is_latest(id) {
            debug!("Dropping stale position for request {}", id.0);
            return None;
        }
        match result {
            Ok(coords) => Some(self.issue_fetch(coords.into())),
            Err(err) => {
                warn!("Position lookup failed: {}", err);
                self.status = Status::Failed(format!("unable to determine your location: {err}"));
                None
            }
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
    }

    /// Blank input is a no-op and returns `None`.
    pub fn submit_search(&mut self) -> Option<(RequestId, Query)> {
        let place = self.query.trim();
        if place.is_empty() {
            return None;
        }
        let query = Query::Place(place.to_string());
        Some(self.issue_fetch(query))
    }

    /// Asks again for the most recent query.
    pub fn refresh(&mut self) -> Option<(RequestId, Query)> {
        let query = self.last_query.clone()?;
        Some(self.issue_fetch(query))
    }

    /// Applies a weather answer. Returns `false` when the answer was stale.
    pub fn fetch_finished(
        &mut self,
        id: RequestId,
        result: Result<WeatherSnapshot, WeatherError>,
    ) -> bool {
        if !self.is_latest(id) {
            debug!("Dropping stale weather answer for request {}", id.0);
            return false;
        }
        match result {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                self.status = Status::Ready;
            }
            Err(err) => {
                match &err {
                    WeatherError::Api { status, code, .. } => {
                        warn!(status, code = ?code, "Request {} rejected: {}", id.0, err)
                    }
                    _ => warn!("Request {} failed: {}", id.0, err),
                }
                self.status = Status::Failed(err.to_string());
            }
        }
        true
    }
}
