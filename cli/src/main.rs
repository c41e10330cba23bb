mod commands;
mod terminal;

use commands::{CommandLine, Commands, discover, version};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);
    print::banner(commands.no_banner);

    let result = match commands.command {
        Commands::Discover(args) => {
            print::header("hardware revision discovery");
            discover::discover(args).await
        }
        Commands::Version(args) => {
            print::header("cluster version");
            version::version(args).await
        }
    };

    print::end_of_program();
    result
}
