//! Background request execution for the TUI.
//!
//! Each request runs on its own short-lived thread with a clone of the
//! client and reports back over an `mpsc` channel. The event loop drains the
//! channel between key presses, so the UI never blocks on the network.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

use crate::app::pipeline;
use crate::app::view::RequestToken;
use crate::data::{ApiError, StocksClient};
use crate::domain::{AnalyzeOutcome, IndustryCharts, YearLowRecord};

/// A finished request, tagged with the token it was issued under.
#[derive(Debug)]
pub enum WorkerEvent {
    YearLow(RequestToken, Result<Vec<YearLowRecord>, ApiError>),
    Industry(RequestToken, String, Result<IndustryCharts, ApiError>),
    Analysis(RequestToken, String, Result<AnalyzeOutcome, ApiError>),
}

pub struct Worker {
    client: StocksClient,
    tx: Sender<WorkerEvent>,
}

impl Worker {
    pub fn new(client: StocksClient) -> (Self, Receiver<WorkerEvent>) {
        let (tx, rx) = channel();
        (Self { client, tx }, rx)
    }

    pub fn base_url(&self) -> String {
        self.client.base_url().to_string()
    }

    pub fn year_low(&self, token: RequestToken) {
        self.spawn(move |client| WorkerEvent::YearLow(token, pipeline::load_year_low(client, true)));
    }

    pub fn industry(&self, token: RequestToken, code: String) {
        self.spawn(move |client| {
            let result = pipeline::load_industry(client, &code);
            WorkerEvent::Industry(token, code, result)
        });
    }

    pub fn analysis(&self, token: RequestToken, ticker: String) {
        self.spawn(move |client| {
            let result = pipeline::analyze(client, &ticker);
            WorkerEvent::Analysis(token, ticker, result)
        });
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce(&StocksClient) -> WorkerEvent + Send + 'static,
    {
        let client = self.client.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let event = job(&client);
            if tx.send(event).is_err() {
                log::debug!("UI closed before a request finished; dropping its response");
            }
        });
    }
}
