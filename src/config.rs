use std::env;
use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// `raid-squads web [port]`
    Web { bind: String, port: u16 },
    /// `raid-squads <roster-file> <spec...>`
    Cli { roster_path: PathBuf, spec: String },
    Usage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    pub output_dir: PathBuf,
}

impl Config {
    /// Reads the process arguments and the `RAID_SQUADS_*` environment variables
    pub fn from_env() -> Config {
        let args: Vec<String> = env::args().collect();
        Config::from_parts(&args, |key| env::var(key).ok())
    }

    /// Builds a config from explicit arguments and an environment lookup.
    /// A port given on the command line beats `RAID_SQUADS_PORT`.
    pub fn from_parts<F>(args: &[String], lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let output_dir = lookup("RAID_SQUADS_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let mode = match args.get(1).map(String::as_str) {
            Some("web") => {
                let port = args
                    .get(2)
                    .and_then(|p| p.parse::<u16>().ok())
                    .or_else(|| lookup("RAID_SQUADS_PORT").and_then(|p| p.parse().ok()))
                    .unwrap_or(DEFAULT_PORT);
                let bind = lookup("RAID_SQUADS_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
                Mode::Web { bind, port }
            }
            Some(path) if args.len() > 2 => Mode::Cli {
                roster_path: PathBuf::from(path),
                spec: args[2..].join(" "),
            },
            _ => Mode::Usage,
        };

        Config { mode, output_dir }
    }
}
