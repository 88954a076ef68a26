use {anyhow::Result, clap::Parser, log::error};

#[derive(Parser)]
#[command(
    name = "cut-release",
    about = "Cut a major, minor, or patch release from the current branch",
    version
)]
struct CutRelease {
    #[command(flatten)]
    args: cut_release::release::CommandArgs,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

fn main() {
    if let Err(err) = try_main() {
        error!("Error: {err}");
        for (i, cause) in err.chain().skip(1).enumerate() {
            error!("  {}: {}", i.saturating_add(1), cause);
        }
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = CutRelease::parse();

    if cli.verbose {
        std::env::set_var("RUST_LOG", "debug");
    } else {
        std::env::set_var("RUST_LOG", "info");
    }
    // Everything, errors included, goes to stdout alongside the forwarded
    // command output.
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stdout)
        .init();

    cut_release::release::run(cli.args)
}
