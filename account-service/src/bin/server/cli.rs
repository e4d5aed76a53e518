use anyhow::Context;
use anyhow::Result;
use clap::Arg;
use clap::Command;

/// What the process was asked to do.
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Serve,
    CreateSuperuser { email: String, password: String },
}

pub fn new() -> Command {
    Command::new("account-service")
        .about("Account registration and token authentication service")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(Command::new("serve").about("Run the HTTP server (default)"))
        .subcommand(
            Command::new("create-superuser")
                .about("Create an account holding every administrative capability")
                .arg(
                    Arg::new("email")
                        .help("E-mail address of the new account")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .long("password")
                        .help("Password of the new account")
                        .env("ACCOUNT_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                ),
        )
}

pub fn dispatch(matches: &clap::ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some(("create-superuser", sub_m)) => Ok(Action::CreateSuperuser {
            email: sub_m
                .get_one::<String>("email")
                .cloned()
                .context("missing required argument: <email>")?,
            password: sub_m
                .get_one::<String>("password")
                .cloned()
                .context("missing required argument: --password")?,
        }),
        _ => Ok(Action::Serve),
    }
}
