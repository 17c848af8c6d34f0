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

//! An in-process peer connector over `std::sync::mpsc`.
//!
//! The loopback peer stands in for the peer-facing runtime when the contract
//! process and its driver share a process: tests and demo binaries hold the
//! `LoopbackHandle` and dispatch invocations into the service loop exactly
//! the way a transport binding would.  Dropping every handle severs the
//! connection, which the service loop reports as `ConnectionClosed`.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

use crate::process::{OnDoneCallback, PeerConnector, PeerMessage, ProcessError};
use crate::protocol::{InvocationRequest, Response};
use crate::state::StateChange;

pub struct LoopbackPeer {
    receiver: Mutex<Option<Receiver<PeerMessage>>>,
}

impl LoopbackPeer {
    /// Creates the peer side and the driver's handle to it.
    pub fn new() -> (LoopbackPeer, LoopbackHandle) {
        let (sender, receiver) = channel();
        (
            LoopbackPeer {
                receiver: Mutex::new(Some(receiver)),
            },
            LoopbackHandle { sender },
        )
    }
}

impl PeerConnector for LoopbackPeer {
    fn connect(&self, contract_name: &str) -> Result<Receiver<PeerMessage>, ProcessError> {
        self.receiver
            .lock()
            .map_err(|err| {
                ProcessError::RegistrationError(format!(
                    "loopback peer lock poisoned while registering {}: {}",
                    contract_name, err
                ))
            })?
            .take()
            .ok_or_else(|| {
                ProcessError::RegistrationError(format!(
                    "contract {} is already registered with the loopback peer",
                    contract_name
                ))
            })
    }
}

/// The driver's side of the loopback connection.
#[derive(Clone)]
pub struct LoopbackHandle {
    sender: Sender<PeerMessage>,
}

impl LoopbackHandle {
    /// Dispatches an instantiation/upgrade invocation and blocks for its
    /// response and write set.
    pub fn init(
        &self,
        request: InvocationRequest,
    ) -> Result<(Response, Vec<StateChange>), ProcessError> {
        self.call(request, PeerMessage::Init)
    }

    /// Dispatches an ordinary transaction invocation and blocks for its
    /// response and write set.
    pub fn invoke(
        &self,
        request: InvocationRequest,
    ) -> Result<(Response, Vec<StateChange>), ProcessError> {
        self.call(request, PeerMessage::Invoke)
    }

    pub fn shutdown(&self) -> Result<(), ProcessError> {
        self.send(PeerMessage::Shutdown)
    }

    /// Delivers a raw message to the service loop.
    pub fn send(&self, message: PeerMessage) -> Result<(), ProcessError> {
        self.sender.send(message).map_err(|_| {
            ProcessError::ConnectionClosed("contract process is no longer serving".to_string())
        })
    }

    fn call(
        &self,
        request: InvocationRequest,
        message: fn(Box<(InvocationRequest, OnDoneCallback)>) -> PeerMessage,
    ) -> Result<(Response, Vec<StateChange>), ProcessError> {
        let (reply_sender, reply_receiver) = channel();
        let on_done: OnDoneCallback = Box::new(move |response, state_changes| {
            // The driver may have stopped listening; nothing to do then.
            let _ = reply_sender.send((response, state_changes));
        });

        self.send(message(Box::new((request, on_done))))?;

        reply_receiver.recv().map_err(|_| {
            ProcessError::ConnectionClosed(
                "contract process dropped the invocation without responding".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_yields_the_receiver_once() {
        let (peer, handle) = LoopbackPeer::new();

        let receiver = peer.connect("kv").expect("Unable to connect");
        match peer.connect("kv") {
            Err(ProcessError::RegistrationError(msg)) => {
                assert!(msg.contains("already registered"))
            }
            res => panic!("Expected RegistrationError, got {:?}", res.map(|_| ())),
        }

        handle.shutdown().expect("Unable to send shutdown");
        match receiver.recv().expect("Unable to receive") {
            PeerMessage::Shutdown => (),
            _ => panic!("Expected Shutdown message"),
        }
    }

    #[test]
    fn send_after_peer_dropped_reports_closed() {
        let (peer, handle) = LoopbackPeer::new();
        let receiver = peer.connect("kv").expect("Unable to connect");
        drop(receiver);
        drop(peer);

        match handle.shutdown() {
            Err(ProcessError::ConnectionClosed(_)) => (),
            res => panic!("Expected ConnectionClosed, got {:?}", res),
        }
    }
}
