use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

use tracing::debug;

use crate::error::{LocateError, WeatherError};
use crate::geolocate::{Coordinates, Geolocator};
use crate::weather::WeatherSnapshot;
use crate::weatherapi::{Query, WeatherSource};
use crate::widget::RequestId;

#[derive(Debug)]
pub enum Outcome {
    Position(Result<Coordinates, LocateError>),
    Weather(Result<WeatherSnapshot, WeatherError>),
}

#[derive(Debug)]
pub struct Completion {
    pub id: RequestId,
    pub outcome: Outcome,
}

/// Runs every request on its own thread and hands the results back to the
/// UI loop in completion order.
pub struct Fetcher {
    weather: Arc<dyn WeatherSource>,
    locator: Option<Arc<dyn Geolocator>>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl Fetcher {
    pub fn new(weather: Arc<dyn WeatherSource>, locator: Option<Arc<dyn Geolocator>>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            weather,
            locator,
            tx,
            rx,
        }
    }

    pub fn can_locate(&self) -> bool {
        self.locator.is_some()
    }

    pub fn locate(&self, id: RequestId) {
        let Some(locator) = self.locator.clone() else {
            return;
        };
        let tx = self.tx.clone();
        thread::spawn(move || {
            let outcome = Outcome::Position(locator.locate());
            // The receiver is gone only when the app is shutting down.
            let _ = tx.send(Completion { id, outcome });
        });
    }

    pub fn fetch(&self, id: RequestId, query: Query) {
        let weather = Arc::clone(&self.weather);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let outcome = Outcome::Weather(weather.current(&query));
            let _ = tx.send(Completion { id, outcome });
        });
    }

    /// Next finished request, without blocking.
    pub fn try_recv(&self) -> Option<Completion> {
        match self.rx.try_recv() {
            Ok(completion) => Some(completion),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                debug!("Completion channel closed");
                None
            }
        }
    }
}
