mod commands;
mod terminal;

use commands::{CommandLine, Commands, filter, scan};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLine::parse_args();

    logging::init_logging(cli.quiet);

    match &cli.command {
        Commands::Identify(args) => scan::identify(args, &cli).await,
        Commands::Streams(args) => scan::streams(args, &cli).await,
        Commands::Rtsp(args) => scan::rtsp(args, &cli).await,
        Commands::Filter(args) => {
            print::header("filtering results", cli.quiet);
            filter::filter(args).map(|_| ())
        }
    }
}
