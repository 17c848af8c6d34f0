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

//! The two lifecycle entry points of a contract.
//!
//! `init` runs once when the contract is instantiated or upgraded on a
//! channel; `invoke` runs once per ordinary transaction.  Both translate
//! every handler outcome, including a panic, into a terminal success or
//! failure response: a fault that escaped here would abort the contract
//! container and stall every pending transaction on the channel, so nothing
//! is allowed to escape.  Retries are the peer and orderer's business.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::context::TransactionContext;
use crate::handler::{ApplyError, FunctionHandler};
use crate::protocol::Response;
use crate::router::FunctionRouter;

/// Serves `init` and `invoke` for one contract.
///
/// All entry points take `&self`: the dispatcher holds no per-invocation
/// state, so the peer may present distinct transactions concurrently.
pub struct Dispatcher {
    router: FunctionRouter,
    initializer: Option<Box<dyn FunctionHandler>>,
}

impl Dispatcher {
    /// Wraps a fully registered router.  Taking the router by value is what
    /// closes registration: once the dispatcher exists, the handler map can
    /// no longer change.
    pub fn new(router: FunctionRouter) -> Self {
        Dispatcher {
            router,
            initializer: None,
        }
    }

    /// Sets the handler run on contract instantiation or upgrade.  Without
    /// one, `init` succeeds with an empty payload.
    pub fn with_initializer(mut self, initializer: Box<dyn FunctionHandler>) -> Self {
        self.initializer = Some(initializer);
        self
    }

    /// Runs the instantiation/upgrade entry point.  The initializer's state
    /// writes become part of the genesis or upgrade transaction's write set.
    pub fn init(&self, context: &mut TransactionContext) -> Response {
        debug!(
            "Init transaction {} in context {:?}",
            context.transaction_id(),
            context.id()
        );
        match &self.initializer {
            Some(initializer) => execute(initializer.as_ref(), context),
            None => Response::success(Vec::new()),
        }
    }

    /// Routes one ordinary transaction to its handler and returns the
    /// terminal response.  An unknown function name is an ordinary failure
    /// response, never a process fault.
    pub fn invoke(&self, context: &mut TransactionContext) -> Response {
        debug!(
            "Invoke function {:?} for transaction {} in context {:?}",
            context.function(),
            context.transaction_id(),
            context.id()
        );
        let handler = match self.router.resolve(context.function()) {
            Ok(handler) => handler,
            Err(err) => {
                warn!(
                    "No handler for function {:?} invoked by transaction {}",
                    context.function(),
                    context.transaction_id()
                );
                return Response::failure(err.to_string());
            }
        };
        execute(handler, context)
    }
}

fn execute(handler: &dyn FunctionHandler, context: &mut TransactionContext) -> Response {
    match panic::catch_unwind(AssertUnwindSafe(|| handler.apply(context))) {
        Ok(outcome) => Response::from(outcome),
        Err(fault) => {
            let message = fault_message(fault);
            error!(
                "Handler fault during transaction {}: {}",
                context.transaction_id(),
                message
            );
            Response::from(Err(ApplyError::InternalError(format!(
                "handler fault: {}",
                message
            ))))
        }
    }
}

fn fault_message(fault: Box<dyn Any + Send>) -> String {
    if let Some(message) = fault.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = fault.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown fault".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::thread;

    use crate::protocol::{InvocationRequest, InvocationRequestBuilder};
    use crate::state::btree::BTreeState;

    fn make_request(transaction_id: &str, function: &str, args: Vec<&str>) -> InvocationRequest {
        InvocationRequestBuilder::new()
            .with_transaction_id(transaction_id.to_string())
            .with_function(function.to_string())
            .with_args(args.into_iter().map(String::from).collect())
            .build()
            .expect("Unable to build request")
    }

    fn make_context(request: InvocationRequest) -> TransactionContext {
        TransactionContext::new(request, Box::new(BTreeState::new()))
    }

    fn create_handler(context: &mut TransactionContext) -> Result<Vec<u8>, ApplyError> {
        let args = context.args().to_vec();
        if args.len() != 1 {
            return Err(ApplyError::InvalidTransaction(format!(
                "create expects 1 argument, got {}",
                args.len()
            )));
        }
        context.set_state(args[0].clone(), b"created".to_vec())?;
        Ok(Vec::new())
    }

    fn make_dispatcher() -> Dispatcher {
        let mut router = FunctionRouter::new();
        router
            .register("create", Box::new(create_handler))
            .expect("Unable to register create");
        router
            .register(
                "transfer",
                Box::new(|_context: &mut TransactionContext| -> Result<Vec<u8>, ApplyError> {
                    panic!("transfer ledger entry poisoned")
                }),
            )
            .expect("Unable to register transfer");
        Dispatcher::new(router)
    }

    #[test]
    fn init_without_initializer_succeeds_empty() {
        let dispatcher = make_dispatcher();
        let mut context = make_context(make_request("txn-init", "", vec![]));

        let response = dispatcher.init(&mut context);
        assert_eq!(response, Response::success(Vec::new()));
        assert!(context.finalize().is_empty());
    }

    #[test]
    fn init_runs_registered_initializer() {
        let initializer =
            |context: &mut TransactionContext| -> Result<Vec<u8>, ApplyError> {
                context.set_state("defaults".to_string(), b"v1".to_vec())?;
                Ok(Vec::new())
            };
        let dispatcher = make_dispatcher().with_initializer(Box::new(initializer));
        let mut context = make_context(make_request("txn-init", "", vec![]));

        let response = dispatcher.init(&mut context);
        assert!(response.is_success());
        assert_eq!(context.finalize().len(), 1);
    }

    #[test]
    fn unknown_function_is_a_failure_response() {
        let dispatcher = make_dispatcher();
        let mut context = make_context(make_request("txn-1", "does_not_exist", vec![]));

        match dispatcher.invoke(&mut context) {
            Response::Failure { message } => assert!(message.contains("does_not_exist")),
            res => panic!("Expected failure, got {:?}", res),
        }
    }

    #[test]
    fn arity_violation_is_a_failure_with_a_validation_message() {
        let dispatcher = make_dispatcher();
        let mut context = make_context(make_request("txn-2", "create", vec![]));

        match dispatcher.invoke(&mut context) {
            Response::Failure { message } => {
                assert!(message.contains("expects 1 argument"))
            }
            res => panic!("Expected failure, got {:?}", res),
        }
        assert!(context.finalize().is_empty());
    }

    #[test]
    fn handler_fault_is_contained_and_dispatch_continues() {
        let dispatcher = make_dispatcher();

        let mut faulty = make_context(make_request("txn-3", "transfer", vec![]));
        match dispatcher.invoke(&mut faulty) {
            Response::Failure { message } => {
                assert!(message.contains("handler fault"));
                assert!(message.contains("transfer ledger entry poisoned"));
            }
            res => panic!("Expected failure, got {:?}", res),
        }

        // The dispatcher must keep serving after a fault.
        let mut next = make_context(make_request("txn-4", "create", vec!["asset-1"]));
        assert!(dispatcher.invoke(&mut next).is_success());
        assert_eq!(next.finalize().len(), 1);
    }

    #[test]
    fn distinct_transactions_dispatch_concurrently() {
        let dispatcher = Arc::new(make_dispatcher());

        let threads = (0..8)
            .map(|i| {
                let dispatcher = Arc::clone(&dispatcher);
                thread::Builder::new()
                    .name(format!("invoke-{}", i))
                    .spawn(move || {
                        let key = format!("asset-{}", i);
                        let mut context = make_context(make_request(
                            &format!("txn-{}", i),
                            "create",
                            vec![key.as_str()],
                        ));
                        let response = dispatcher.invoke(&mut context);
                        (response, context.finalize())
                    })
                    .expect("Unable to spawn invoke thread")
            })
            .collect::<Vec<_>>();

        for handle in threads {
            let (response, changes) = handle.join().expect("Invoke thread panicked");
            assert!(response.is_success());
            assert_eq!(changes.len(), 1);
        }
    }
}
