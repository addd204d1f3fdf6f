use clap::Parser;

use setup_fnm::cli::Cli;
use setup_fnm::commands::setup::{self, SetupDeps};
use setup_fnm::installers::fnm::FnmCli;
use setup_fnm::installers::package_manager::SystemPackageManager;
use setup_fnm::libs::reporter::{ConsoleReporter, Reporter};
use setup_fnm::libs::shells::ShellPaths;
use setup_fnm::libs::store;
use setup_fnm::logger;

fn main() {
    let cli = Cli::parse();
    logger::init(cli.debug);

    let reporter = ConsoleReporter;
    let Some(paths) = ShellPaths::discover() else {
        // Every mutation target hangs off the home directory; without it
        // there is nothing this tool can safely do.
        reporter.error("Could not determine the current user's home directory; nothing to configure.");
        std::process::exit(1);
    };

    let ctx = cli.context();
    let mut autorun_store = store::platform_store(&paths.home);
    let installer = SystemPackageManager;
    let manager = FnmCli;

    let mut deps = SetupDeps {
        reporter: &reporter,
        store: autorun_store.as_mut(),
        installer: &installer,
        manager: &manager,
        paths,
    };

    std::process::exit(setup::run(&ctx, &mut deps));
}
