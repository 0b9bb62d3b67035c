//! Took - タスク単位の作業時間トラッキングツール

mod cli;
mod config;
mod error;
mod hooks;
mod ledger;
mod logging;
mod report;
mod store;
mod view;

use std::process::ExitCode;

fn main() -> ExitCode {
    logging::init();
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("エラー: {:#}", err);
            ExitCode::from(cli::exit_code(&err))
        }
    }
}
