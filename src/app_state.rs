use crate::cli::CommandLineArgs;
use crate::evaluation::{EndpointProbe, HttpProbe};
use crate::store::UserStore;

use std::sync::Arc;
use std::time::Duration;

/// Shared application state passed to each request handler.
pub struct AppState {
    /// Command line arguments.
    pub args: CommandLineArgs,

    /// Currently loaded users.
    pub store: UserStore,

    /// Probe used by the evaluation endpoint to call the other endpoints.
    pub probe: Box<dyn EndpointProbe>,
}

impl AppState {
    /// Create and return an [AppState] that evaluates itself over HTTP.
    pub fn new(args: &CommandLineArgs) -> Self {
        let probe = HttpProbe::new(
            &args.self_url(),
            Duration::from_secs(args.evaluation_timeout),
        );
        Self::with_probe(args, Box::new(probe))
    }

    /// Create and return an [AppState] with an empty store and the given probe.
    pub fn with_probe(args: &CommandLineArgs, probe: Box<dyn EndpointProbe>) -> Self {
        Self {
            args: args.clone(),
            store: UserStore::new(),
            probe,
        }
    }
}

/// AppState wrapped in an Atomic Reference Count (Arc) to allow multiple references.
pub type SharedAppState = Arc<AppState>;
