use clap::{Arg, ArgAction, ArgMatches, Command};

pub const ARG_SESSION_TTL: &str = "session-ttl";
pub const ARG_COOKIE_SECURE: &str = "cookie-secure";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_TTL)
                .long("session-ttl")
                .help("Session lifetime in seconds")
                .env("AUTOGRADER_SESSION_TTL")
                .default_value("43200")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long("cookie-secure")
                .help("Mark the session cookie Secure (serve over HTTPS)")
                .env("AUTOGRADER_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub ttl_seconds: u64,
    pub cookie_secure: bool,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            ttl_seconds: matches
                .get_one::<u64>(ARG_SESSION_TTL)
                .copied()
                .unwrap_or(43_200),
            cookie_secure: matches.get_flag(ARG_COOKIE_SECURE),
        }
    }
}
