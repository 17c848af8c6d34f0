/*
 * Copyright 2019 Cargill Incorporated
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 * -----------------------------------------------------------------------------
 */

//! Process bootstrap and the long-lived service loop.
//!
//! A `ContractProcess` registers the contract with the peer-facing runtime
//! through a `PeerConnector` and then blocks for the life of the process,
//! serving dispatched invocations.  Registration happens before the first
//! invocation is accepted; if it fails, the caller must exit the process
//! rather than linger half-started, and `run` does exactly that.  Transport
//! to a real peer (endpoints, TLS material) is supplied outside this crate;
//! `LoopbackPeer` provides the in-process connector used by tests and demos.

mod error;
pub mod loopback;

use std::sync::mpsc::Receiver;

use crate::context::TransactionContext;
use crate::dispatch::Dispatcher;
use crate::protocol::{InvocationRequest, Response};
pub use crate::process::error::ProcessError;
use crate::state::{Read, StateChange};

/// Invoked with the terminal response and, on success, the transaction's
/// finalized write set.  A failed transaction is not applied, so its write
/// set is always empty.
pub type OnDoneCallback = Box<dyn FnOnce(Response, Vec<StateChange>) + Send>;

/// A message delivered by the peer-facing runtime to a contract process.
pub enum PeerMessage {
    Init(Box<(InvocationRequest, OnDoneCallback)>),
    Invoke(Box<(InvocationRequest, OnDoneCallback)>),
    Shutdown,
}

/// The peer-facing runtime seam: registers a contract and yields the stream
/// of messages dispatched to it.
pub trait PeerConnector {
    fn connect(&self, contract_name: &str) -> Result<Receiver<PeerMessage>, ProcessError>;
}

pub struct ContractProcess {
    name: String,
    dispatcher: Dispatcher,
    state: Box<dyn Read>,
}

impl ContractProcess {
    /// Assembles a process from a fully built dispatcher and the committed
    /// state view for this contract's namespace.
    pub fn new(name: &str, dispatcher: Dispatcher, state: Box<dyn Read>) -> Self {
        ContractProcess {
            name: name.to_string(),
            dispatcher,
            state,
        }
    }

    /// Registers with the peer runtime and serves invocations until the
    /// peer sends `Shutdown` (clean, `Ok`) or the connection is severed
    /// (`Err`).  Blocks for the lifetime of the process.
    pub fn start(&self, connector: &dyn PeerConnector) -> Result<(), ProcessError> {
        let receiver = connector.connect(&self.name)?;
        info!("Contract {} registered with peer runtime", self.name);

        loop {
            match receiver.recv() {
                Ok(PeerMessage::Init(call)) => {
                    let (request, on_done) = *call;
                    let mut context = TransactionContext::new(request, self.state.clone());
                    let response = self.dispatcher.init(&mut context);
                    complete(context, response, on_done);
                }
                Ok(PeerMessage::Invoke(call)) => {
                    let (request, on_done) = *call;
                    let mut context = TransactionContext::new(request, self.state.clone());
                    let response = self.dispatcher.invoke(&mut context);
                    complete(context, response, on_done);
                }
                Ok(PeerMessage::Shutdown) => {
                    info!("Contract {} received shutdown", self.name);
                    return Ok(());
                }
                Err(_) => {
                    return Err(ProcessError::ConnectionClosed(format!(
                        "peer connection closed for contract {}",
                        self.name
                    )));
                }
            }
        }
    }

    /// Runs the service loop and terminates the process when it returns:
    /// zero on clean shutdown, non-zero with a logged diagnostic on any
    /// bootstrap or connection error.
    pub fn run(&self, connector: &dyn PeerConnector) -> ! {
        match self.start(connector) {
            Ok(()) => {
                info!("Contract {} shut down", self.name);
                std::process::exit(0)
            }
            Err(err) => {
                error!("Contract {} terminated: {}", self.name, err);
                std::process::exit(1)
            }
        }
    }
}

fn complete(mut context: TransactionContext, response: Response, on_done: OnDoneCallback) {
    let state_changes = if response.is_success() {
        context.finalize()
    } else {
        Vec::new()
    };
    on_done(response, state_changes);
}
