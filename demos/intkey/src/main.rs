// Copyright 2019 Cargill Incorporated
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A demonstration contract holding named unsigned integers, served over the
//! in-process peer loopback: `set` stores a value, `inc` adds to it, `show`
//! returns it.  The driver plays the peer, committing each successful
//! transaction's write set before dispatching the next one.

#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

use std::process;
use std::str;
use std::thread;

use clap::Arg;
use log::LevelFilter;

use chaincode::context::TransactionContext;
use chaincode::dispatch::Dispatcher;
use chaincode::handler::ApplyError;
use chaincode::process::loopback::LoopbackPeer;
use chaincode::process::ContractProcess;
use chaincode::protocol::{InvocationRequestBuilder, Response};
use chaincode::router::{FunctionRouter, RoutingError};
use chaincode::state::btree::BTreeState;
use chaincode::state::{Read, Write};

fn main() {
    let matches = clap::App::new("intkey-contract")
        .version(crate_version!())
        .about("Runs the intkey demonstration contract against an in-process peer")
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("increase output verbosity"),
        )
        .get_matches();

    let logger = simple_logger::SimpleLogger::new()
        // Switch to UTC timestamps, as local timestamps are not stable, by default. They are only
        // available if the compiler flag "unsound_local_offset" has been set.
        .with_utc_timestamps();
    let logger = match matches.occurrences_of("verbose") {
        0 => logger.with_level(LevelFilter::Warn),
        1 => logger.with_level(LevelFilter::Info),
        2 => logger.with_level(LevelFilter::Debug),
        _ => logger.with_level(LevelFilter::Trace),
    };
    logger.init().expect("Failed to create logger");

    let mut router = FunctionRouter::new();
    if let Err(err) = register_handlers(&mut router) {
        error!("Handler registration failed: {}", err);
        process::exit(1);
    }

    let state = BTreeState::new();
    let contract = ContractProcess::new("intkey", Dispatcher::new(router), state.clone_box());
    let (peer, handle) = LoopbackPeer::new();

    let service = thread::Builder::new()
        .name("intkey-process".into())
        .spawn(move || contract.start(&peer))
        .expect("Failed to spawn service thread");

    let script: Vec<(&str, Vec<&str>)> = vec![
        ("set", vec!["alice", "100"]),
        ("set", vec!["bob", "40"]),
        ("inc", vec!["alice", "5"]),
        ("show", vec!["alice"]),
        ("inc", vec!["carol", "1"]),
        ("show", vec!["bob"]),
        ("history", vec![]),
    ];

    for (sequence, (function, args)) in script.into_iter().enumerate() {
        let request = InvocationRequestBuilder::new()
            .with_transaction_id(format!("txn-{}", sequence))
            .with_function(function.to_string())
            .with_args(args.into_iter().map(String::from).collect())
            .build()
            .expect("Failed to build invocation request");

        let (response, state_changes) = handle
            .invoke(request)
            .expect("Contract process stopped serving");

        match response {
            Response::Success { payload } => {
                state
                    .commit(&state_changes)
                    .expect("Failed to commit write set");
                println!(
                    "txn-{} {}: ok {}",
                    sequence,
                    function,
                    str::from_utf8(&payload).unwrap_or("<binary>")
                );
            }
            Response::Failure { message } => {
                println!("txn-{} {}: failed: {}", sequence, function, message);
            }
        }
    }

    handle.shutdown().expect("Contract process stopped serving");
    match service.join().expect("Service thread panicked") {
        Ok(()) => info!("Contract shut down cleanly"),
        Err(err) => {
            error!("Contract terminated: {}", err);
            process::exit(1);
        }
    }
}

fn register_handlers(router: &mut FunctionRouter) -> Result<(), RoutingError> {
    router.register("set", Box::new(apply_set))?;
    router.register("inc", Box::new(apply_inc))?;
    router.register("show", Box::new(apply_show))?;
    Ok(())
}

fn apply_set(context: &mut TransactionContext) -> Result<Vec<u8>, ApplyError> {
    let (name, amount) = unpack_name_and_amount(context, "set")?;
    context.set_state(name, amount.to_string().into_bytes())?;
    Ok(Vec::new())
}

fn apply_inc(context: &mut TransactionContext) -> Result<Vec<u8>, ApplyError> {
    let (name, amount) = unpack_name_and_amount(context, "inc")?;
    let current = load_value(context, &name)?;
    let total = current.checked_add(amount).ok_or_else(|| {
        ApplyError::InvalidTransaction(format!("incrementing {} overflows", name))
    })?;
    context.set_state(name, total.to_string().into_bytes())?;
    Ok(Vec::new())
}

fn apply_show(context: &mut TransactionContext) -> Result<Vec<u8>, ApplyError> {
    let args = context.args().to_vec();
    if args.len() != 1 {
        return Err(ApplyError::InvalidTransaction(format!(
            "show expects 1 argument, got {}",
            args.len()
        )));
    }
    let value = load_value(context, &args[0])?;
    Ok(value.to_string().into_bytes())
}

fn unpack_name_and_amount(
    context: &TransactionContext,
    function: &str,
) -> Result<(String, u64), ApplyError> {
    let args = context.args();
    if args.len() != 2 {
        return Err(ApplyError::InvalidTransaction(format!(
            "{} expects 2 arguments, got {}",
            function,
            args.len()
        )));
    }
    let amount = args[1].parse::<u64>().map_err(|err| {
        ApplyError::InvalidTransaction(format!("{} is not an amount: {}", args[1], err))
    })?;
    Ok((args[0].clone(), amount))
}

fn load_value(context: &TransactionContext, name: &str) -> Result<u64, ApplyError> {
    let bytes = context
        .get_state(name)?
        .ok_or_else(|| ApplyError::InvalidTransaction(format!("no such key: {}", name)))?;
    let text = str::from_utf8(&bytes).map_err(|err| {
        ApplyError::InternalError(format!("stored value for {} is not utf-8: {}", name, err))
    })?;
    text.parse::<u64>().map_err(|err| {
        ApplyError::InternalError(format!("stored value for {} is not a number: {}", name, err))
    })
}
