//! Command Line Interface (CLI) arguments.

use clap::Parser;

/// User insights command line interface
#[derive(Clone, Debug, Parser)]
pub struct CommandLineArgs {
    /// The IP address on which the server should listen
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    pub host: String,
    /// The port to which the server should bind
    #[arg(long, default_value_t = 3000, env = "PORT")]
    pub port: u16,
    /// Path to the JSON file containing the array of users to load
    #[arg(long, default_value = "users.json", env = "USERS_FILE")]
    pub users_file: String,
    /// Base URL used by the evaluation endpoint to call this server.
    /// Defaults to `http://127.0.0.1:<port>`.
    #[arg(long, env = "SELF_URL")]
    pub self_url: Option<String>,
    /// Maximum time in seconds to wait for each request made by the evaluation endpoint.
    #[arg(long, default_value_t = 10, env = "EVALUATION_TIMEOUT")]
    pub evaluation_timeout: u64,
    /// Maximum time in seconds to wait for requests to complete upon receiving `ctrl+c` signal.
    #[arg(long, default_value_t = 60, env = "SHUTDOWN_TIMEOUT")]
    pub graceful_shutdown_timeout: u64,
}

impl CommandLineArgs {
    /// Base URL of this server as seen by the evaluation endpoint.
    pub fn self_url(&self) -> String {
        self.self_url
            .clone()
            .unwrap_or_else(|| format!("http://127.0.0.1:{}", self.port))
    }
}

/// Returns parsed command line arguments.
pub fn parse() -> CommandLineArgs {
    CommandLineArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = CommandLineArgs::parse_from(["user-insights"]);
        assert_eq!(3000, args.port);
        assert_eq!("http://127.0.0.1:3000", args.self_url());
    }

    #[test]
    fn overrides() {
        let args = CommandLineArgs::parse_from([
            "user-insights",
            "--port",
            "8080",
            "--users-file",
            "/tmp/users.json",
            "--self-url",
            "http://insights:8080",
        ]);
        assert_eq!(8080, args.port);
        assert_eq!("/tmp/users.json", args.users_file);
        assert_eq!("http://insights:8080", args.self_url());
    }
}
