use clap::Parser;

use multi_version::cli::Cli;
use multi_version::ui;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
