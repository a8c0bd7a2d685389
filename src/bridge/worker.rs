//! The bridge runtime: a single worker thread that owns the engine,
//! drains requests in arrival order, and reports every outcome.

use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};

use super::{decode, encode, BridgeMessage, DecodeInput, EncodeInput, Request, RequestPayload};
use crate::engine::FlifEngine;
use crate::error::{BridgeError, EngineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Pending,
    Ready,
    Failed,
}

/// One-shot readiness signal: flips out of `Pending` exactly once, when
/// engine initialization finishes.
struct ReadyGate {
    state: Mutex<GateState>,
    ready: Condvar,
}

impl ReadyGate {
    fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Pending),
            ready: Condvar::new(),
        }
    }

    fn open(&self, ok: bool) {
        let mut state = self.state.lock();
        *state = if ok { GateState::Ready } else { GateState::Failed };
        self.ready.notify_all();
    }

    fn wait(&self) -> bool {
        let mut state = self.state.lock();
        while *state == GateState::Pending {
            self.ready.wait(&mut state);
        }
        *state == GateState::Ready
    }

    fn is_ready(&self) -> bool {
        *self.state.lock() == GateState::Ready
    }
}

/// Handle to a running bridge worker.
///
/// Requests submitted before the engine finishes initializing are held in
/// the request queue and processed in arrival order once it is up; none
/// are dropped. Dropping the handle closes the queue and joins the worker.
pub struct FlifBridge {
    requests: Option<Sender<Request>>,
    in_flight: Arc<Mutex<HashSet<String>>>,
    gate: Arc<ReadyGate>,
    worker: Option<JoinHandle<()>>,
}

impl FlifBridge {
    /// Spawn the worker thread and return the handle together with the
    /// receiver for everything the worker emits.
    ///
    /// `init` runs on the worker thread itself; the engine never crosses
    /// threads. If it fails, the bridge never becomes ready and every
    /// request is answered with a terminal error instead.
    pub fn spawn<E, F>(init: F) -> (Self, Receiver<BridgeMessage>)
    where
        E: FlifEngine + 'static,
        F: FnOnce() -> Result<E, EngineError> + Send + 'static,
    {
        let (request_tx, request_rx) = channel::<Request>();
        let (message_tx, message_rx) = channel();
        let gate = Arc::new(ReadyGate::new());
        let in_flight: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));
        let worker = {
            let gate = Arc::clone(&gate);
            let in_flight = Arc::clone(&in_flight);
            thread::spawn(move || worker_loop(init, request_rx, message_tx, gate, in_flight))
        };
        (
            Self {
                requests: Some(request_tx),
                in_flight,
                gate,
                worker: Some(worker),
            },
            message_rx,
        )
    }

    /// Queue a decode request.
    pub fn decode(&self, uuid: impl Into<String>, input: DecodeInput) -> Result<(), BridgeError> {
        self.submit(Request {
            uuid: uuid.into(),
            payload: RequestPayload::Decode(input),
        })
    }

    /// Queue an encode request.
    pub fn encode(&self, uuid: impl Into<String>, input: EncodeInput) -> Result<(), BridgeError> {
        self.submit(Request {
            uuid: uuid.into(),
            payload: RequestPayload::Encode(input),
        })
    }

    /// Queue a request. Rejects an empty uuid, or one that already has a
    /// request in flight, before any codec work happens.
    pub fn submit(&self, request: Request) -> Result<(), BridgeError> {
        if request.uuid.is_empty() {
            return Err(BridgeError::Protocol("request uuid must not be empty".into()));
        }
        {
            let mut in_flight = self.in_flight.lock();
            if !in_flight.insert(request.uuid.clone()) {
                return Err(BridgeError::Protocol(format!(
                    "request uuid {:?} is already in flight",
                    request.uuid
                )));
            }
        }
        let uuid = request.uuid.clone();
        let sent = match &self.requests {
            Some(requests) => requests.send(request).map_err(|_| BridgeError::Closed),
            None => Err(BridgeError::Closed),
        };
        if sent.is_err() {
            self.in_flight.lock().remove(&uuid);
        }
        sent
    }

    /// Block until engine initialization finishes; `true` if it came up.
    pub fn wait_until_ready(&self) -> bool {
        self.gate.wait()
    }

    pub fn is_ready(&self) -> bool {
        self.gate.is_ready()
    }

    /// Whether `uuid` still has a request awaiting its terminal message.
    pub fn is_in_flight(&self, uuid: &str) -> bool {
        self.in_flight.lock().contains(uuid)
    }
}

impl Drop for FlifBridge {
    fn drop(&mut self) {
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn worker_loop<E, F>(
    init: F,
    requests: Receiver<Request>,
    messages: Sender<BridgeMessage>,
    gate: Arc<ReadyGate>,
    in_flight: Arc<Mutex<HashSet<String>>>,
) where
    E: FlifEngine,
    F: FnOnce() -> Result<E, EngineError>,
{
    let engine = match init() {
        Ok(engine) => {
            log::debug!("codec engine initialized");
            gate.open(true);
            engine
        }
        Err(err) => {
            log::error!("codec engine failed to initialize: {err}");
            gate.open(false);
            for request in requests.iter() {
                in_flight.lock().remove(&request.uuid);
                let _ = messages.send(BridgeMessage::Error {
                    uuid: request.uuid,
                    message: format!("engine initialization failed: {err}"),
                });
            }
            return;
        }
    };

    for request in requests.iter() {
        handle_request(&engine, request, &messages, &in_flight);
    }
}

/// The per-request failure boundary: every exit (success, error, or
/// panic) ends in exactly one terminal message for the request's uuid.
fn handle_request<E: FlifEngine>(
    engine: &E,
    request: Request,
    messages: &Sender<BridgeMessage>,
    in_flight: &Mutex<HashSet<String>>,
) {
    let Request { uuid, payload } = request;
    log::debug!("handling {} request {uuid}", payload.kind());

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| match &payload {
        RequestPayload::Decode(input) => decode::run_decode(engine, input, &mut |event| {
            let _ = messages.send(BridgeMessage::Progress {
                uuid: uuid.clone(),
                event,
            });
        })
        .map(|()| BridgeMessage::Complete { uuid: uuid.clone() }),
        RequestPayload::Encode(input) => {
            encode::run_encode(engine, input).map(|data| BridgeMessage::Result {
                uuid: uuid.clone(),
                data,
            })
        }
    }));

    let terminal = match outcome {
        Ok(Ok(message)) => message,
        Ok(Err(err)) => {
            log::warn!("request {uuid} failed: {err}");
            BridgeMessage::Error {
                uuid: uuid.clone(),
                message: err.to_string(),
            }
        }
        Err(panic_payload) => {
            let message = panic_message(panic_payload.as_ref());
            log::warn!("request {uuid} panicked: {message}");
            BridgeMessage::Error {
                uuid: uuid.clone(),
                message,
            }
        }
    };

    // Release the uuid before the terminal message goes out, so a caller
    // that sees the terminal can immediately reuse it.
    in_flight.lock().remove(&uuid);
    let _ = messages.send(terminal);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unspecified error occurred".to_string()
    }
}
