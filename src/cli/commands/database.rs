use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_DSN: &str = "dsn";
pub const ARG_DB_PASSWORD: &str = "db-password";
pub const ARG_DB_MAX_CONNECTIONS: &str = "db-max-connections";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long("dsn")
                .help("Database connection string")
                .long_help(
                    "Postgres connection string. The password may be left out and supplied with --db-password instead.",
                )
                .env("AUTOGRADER_DSN")
                .required(true),
        )
        .arg(
            Arg::new(ARG_DB_PASSWORD)
                .long("db-password")
                .help("Database password injected into the DSN")
                .env("AUTOGRADER_DB_PASSWORD")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_DB_MAX_CONNECTIONS)
                .long("db-max-connections")
                .help("Maximum number of pooled database connections")
                .env("AUTOGRADER_DB_MAX_CONNECTIONS")
                .default_value("5")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub dsn: String,
    pub password: Option<SecretString>,
    pub max_connections: u32,
}

impl Options {
    /// Read database options from validated matches.
    ///
    /// # Errors
    /// Returns an error if the DSN is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let dsn = matches
            .get_one::<String>(ARG_DSN)
            .cloned()
            .context("missing required argument: --dsn")?;
        let password = matches
            .get_one::<String>(ARG_DB_PASSWORD)
            .filter(|password| !password.is_empty())
            .map(|password| SecretString::from(password.clone()));
        let max_connections = matches
            .get_one::<u32>(ARG_DB_MAX_CONNECTIONS)
            .copied()
            .unwrap_or(5);
        Ok(Self {
            dsn,
            password,
            max_connections,
        })
    }
}
