use crate::airport::AirportDirectory;
use crate::api::ApiClient;
use crate::config::FlowDirection;
use crate::error::Result;
use crate::flow::FlowRecord;
use crate::station::Station;
use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Airports,
    Flows,
    Stations,
}

/// Parameters of one flow query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlowQuery {
    pub hours: u32,
    pub direction: FlowDirection,
}

pub enum FetchResult {
    Airports(Result<AirportDirectory>),
    Flows(FlowQuery, Result<Vec<FlowRecord>>),
    Stations(Result<Vec<Station>>),
}

impl FetchResult {
    pub fn kind(&self) -> FetchKind {
        match self {
            FetchResult::Airports(_) => FetchKind::Airports,
            FetchResult::Flows(..) => FetchKind::Flows,
            FetchResult::Stations(_) => FetchKind::Stations,
        }
    }
}

/// Runs API calls on worker threads so the frame loop never blocks.
/// At most one request of each kind is in flight.
pub struct Fetcher {
    client: ApiClient,
    in_flight: HashSet<FetchKind>,
    queued_flows: Option<FlowQuery>,
    receiver: Receiver<FetchResult>,
    sender: Sender<FetchResult>,
}

impl Fetcher {
    pub fn new(client: ApiClient) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            client,
            in_flight: HashSet::new(),
            queued_flows: None,
            receiver: rx,
            sender: tx,
        }
    }

    pub fn is_in_flight(&self, kind: FetchKind) -> bool {
        self.in_flight.contains(&kind)
    }

    pub fn request_airports(&mut self) {
        self.spawn(FetchKind::Airports, |client| FetchResult::Airports(client.airports()));
    }

    /// Fetch flows; if a flow fetch is already running the newest query is
    /// queued and sent once it finishes.
    pub fn request_flows(&mut self, query: FlowQuery) {
        if self.is_in_flight(FetchKind::Flows) {
            self.queued_flows = Some(query);
            return;
        }
        self.spawn(FetchKind::Flows, move |client| {
            FetchResult::Flows(query, client.flows(query.hours, query.direction))
        });
    }

    pub fn request_stations(&mut self) {
        self.spawn(FetchKind::Stations, |client| FetchResult::Stations(client.stations()));
    }

    fn spawn<F>(&mut self, kind: FetchKind, job: F)
    where
        F: FnOnce(&ApiClient) -> FetchResult + Send + 'static,
    {
        if !self.in_flight.insert(kind) {
            return;
        }
        let client = self.client.clone();
        let tx = self.sender.clone();
        thread::spawn(move || {
            let _ = tx.send(job(&client));
        });
    }

    /// Drain finished requests without blocking.
    pub fn poll(&mut self) -> Vec<FetchResult> {
        let mut done = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(result) => {
                    self.in_flight.remove(&result.kind());
                    done.push(result);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        if !self.is_in_flight(FetchKind::Flows) {
            if let Some(query) = self.queued_flows.take() {
                self.request_flows(query);
            }
        }
        done
    }
}
