use clap::{Parser, Subcommand};
use relm4::prelude::*;
use servstack_gtk::config;
use servstack_gtk::gui::app::AppModel;
use servstack_gtk::sys::{ControlCommand, client, runtime};

#[derive(Parser)]
#[command(version, about = "Looping services stack")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the stack in the running instance
    Open,
    /// Hide the stack in the running instance
    Close,
    /// Show or hide the stack
    Toggle,
    /// Open the project request form
    Project,
    /// Write the default config file and print its path
    Init,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Open) => client::send_command(ControlCommand::Open),
        Some(Commands::Close) => client::send_command(ControlCommand::Close),
        Some(Commands::Toggle) => client::send_command(ControlCommand::Toggle),
        Some(Commands::Project) => client::send_command(ControlCommand::Project),
        Some(Commands::Init) => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
        None => {
            let config = config::load_or_default();
            let (tx, rx) = async_channel::bounded(32);

            runtime::start_background_services(tx)?;

            RelmApp::new("org.cavebeat.servstack")
                .with_args(Vec::new())
                .run::<AppModel>((config, rx));
            Ok(())
        }
    }
}
