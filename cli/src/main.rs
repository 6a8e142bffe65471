use cdup_cli::Outcome;
use cdup_cli::USAGE;
use cdup_cli::init_tracing;
use cdup_cli::run;
use cdup_core::ArgsError;
use cdup_core::CdupError;
use cdup_core::Config;
use cdup_core::config::find_cdup_home;
use cdup_core::tree::RealTree;
use std::process::ExitCode;

fn main() -> ExitCode {
    init_tracing();

    let result = collect_args().and_then(|tokens| {
        run(&tokens, &RealTree, || {
            let home = find_cdup_home(|key| std::env::var(key).ok());
            Config::load(home.as_deref())
        })
    });

    match result {
        Ok(Outcome::Help) => {
            eprint!("{USAGE}");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Line(Some(line))) => {
            println!("{line}");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Line(None)) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("cdup: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn collect_args() -> Result<Vec<String>, CdupError> {
    std::env::args_os()
        .skip(1)
        .map(|arg| {
            arg.into_string().map_err(|raw| {
                CdupError::from(ArgsError::new(format!("invalid Unicode in {raw:?}")))
            })
        })
        .collect()
}
