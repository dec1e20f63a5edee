use std::fs;

use log::info;

use raid_squads::config::{Config, Mode};
use raid_squads::display::{print_squads, write_squads_to_file};
use raid_squads::export::export_squads_to_csv;
use raid_squads::session::Session;
use raid_squads::web;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    match config.mode {
        Mode::Web { bind, port } => {
            println!("Starting web server on {}:{}...", bind, port);
            println!("Access the API at http://localhost:{}/api/squads", port);
            web::start_server(&bind, port).await?;
        }
        Mode::Cli { roster_path, spec } => {
            let text = fs::read_to_string(&roster_path)?;
            let mut session = Session::new();
            let count = match session.import(&text) {
                Ok(count) => count,
                Err(e) => {
                    eprintln!("Import failed: {}", e);
                    std::process::exit(1);
                }
            };
            info!("loaded {} member(s) from {}", count, roster_path.display());

            let squads = session.generate(&spec)?;
            if squads.is_empty() {
                eprintln!("Could not form any teams. Check sign-ups and boss codes.");
                std::process::exit(1);
            }
            print_squads(squads);

            fs::create_dir_all(&config.output_dir)?;
            let text_path = config.output_dir.join("squads.txt");
            let csv_path = config.output_dir.join("squads.csv");
            write_squads_to_file(squads, &text_path)?;
            export_squads_to_csv(squads, &csv_path)?;
            println!("\nSquads saved to:");
            println!("  - {}", text_path.display());
            println!("  - {}", csv_path.display());
        }
        Mode::Usage => {
            eprintln!("usage: raid-squads web [port]");
            eprintln!("       raid-squads <roster-file> <codes, e.g. P2 Z1 F1>");
            std::process::exit(2);
        }
    }

    Ok(())
}
