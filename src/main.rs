use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use tbm::{
    commands::{self, Invocation},
    paths::Paths,
    ui::{ColorMode, Ui},
};

#[derive(Parser)]
#[command(name = "tbm")]
#[command(about = "Taskbook profile manager - switch between taskbook storage profiles")]
#[command(version)]
struct Cli {
    /// Taskbook directory (defaults to ~/.taskbook)
    #[arg(long, global = true, value_name = "DIR", env = "TBM_ROOT")]
    root: Option<PathBuf>,

    /// Print every rename and pointer write
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// When to use colors: always, auto, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Switch/change to another profile
    #[command(short_flag = 's', long_flag = "switch")]
    Switch {
        /// Name of the profile to activate
        name: String,
    },

    /// Rename the current profile (no data files are moved)
    #[command(short_flag = 'r', long_flag = "rename")]
    Rename {
        /// New name for the current profile
        name: String,
    },

    /// Create a new, empty profile
    #[command(short_flag = 'n', long_flag = "new")]
    New {
        /// Name of the profile; "-" generates new0, new1, ...
        name: String,
    },

    /// Show the current profile
    #[command(short_flag = 'p', long_flag = "profile")]
    Profile,

    /// List all available profiles
    #[command(name = "all-profiles", short_flag = 'a', long_flag = "all-profiles")]
    AllProfiles,

    /// Check the taskbook layout for problems
    Doctor {
        /// Remove the journal of an interrupted switch after manual repair
        #[arg(long)]
        clear_journal: bool,
    },

    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

impl Commands {
    fn invocation(&self) -> Invocation<'_> {
        let (command, argument) = match self {
            Self::Switch { name } => ("switch", Some(name.as_str())),
            Self::Rename { name } => ("rename", Some(name.as_str())),
            Self::New { name } => ("new", Some(name.as_str())),
            Self::Profile => ("profile", None),
            Self::AllProfiles => ("all-profiles", None),
            Self::Doctor { .. } => ("doctor", None),
            Self::Completions { .. } => ("completions", None),
        };
        Invocation { command, argument }
    }
}

/// Lowercase the method token so `tbm SWITCH work` and `tbm --Switch work` work
///
/// Only the first argument after the program name is touched, and only when
/// it names a command or method flag; profile names keep their case.
fn normalize_method(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut args: Vec<OsString> = args.into_iter().collect();
    let Some(method) = args.get_mut(1) else {
        return args;
    };
    let Some(lowered) = method.to_str().map(str::to_lowercase) else {
        return args;
    };
    let command = Cli::command();
    let is_method = match lowered.strip_prefix("--") {
        Some(flag) => command
            .get_subcommands()
            .any(|cmd| cmd.get_long_flag() == Some(flag)),
        None => command.get_subcommands().any(|cmd| cmd.get_name() == lowered),
    };
    if is_method {
        *method = OsString::from(lowered);
    }
    args
}

fn run(cli: &Cli, paths: &Paths, ui: &Ui) -> Result<()> {
    match &cli.command {
        Commands::Switch { name } => commands::switch(paths, name, ui),
        Commands::Rename { name } => commands::rename(paths, name, ui),
        Commands::New { name } => commands::new(paths, name, ui),
        Commands::Profile => commands::profile(paths, ui),
        Commands::AllProfiles => commands::all_profiles(paths, ui),
        Commands::Doctor { clear_journal } => commands::doctor(paths, *clear_journal, ui),
        Commands::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "tbm", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse_from(normalize_method(std::env::args_os())) {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version requests are not failures
            let code = if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            anstream::println!("{}", e.render().ansi());
            return code;
        }
    };
    let ui = Ui::new(cli.color, cli.no_color).with_verbose(cli.verbose);

    let result = Paths::resolve(cli.root.clone()).and_then(|paths| {
        run(&cli, &paths, &ui)?;

        let cwd = std::env::current_dir()?;
        if commands::debug_sentinel_present(&cwd) {
            commands::debug_dump(&paths, cli.command.invocation(), &ui)?;
        }
        Ok(())
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui.err(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_method_flags_match_commands() {
        let cli = Cli::try_parse_from(["tbm", "-s", "work"]).unwrap();
        assert!(matches!(cli.command, Commands::Switch { ref name } if name == "work"));

        let cli = Cli::try_parse_from(["tbm", "--new", "-"]).unwrap();
        assert!(matches!(cli.command, Commands::New { ref name } if name == "-"));

        let cli = Cli::try_parse_from(["tbm", "all-profiles"]).unwrap();
        assert!(matches!(cli.command, Commands::AllProfiles));

        let cli = Cli::try_parse_from(["tbm", "-p"]).unwrap();
        assert_eq!(cli.command.invocation().command, "profile");
    }

    #[test]
    fn test_method_is_case_insensitive() {
        let args = |argv: &[&str]| normalize_method(argv.iter().map(OsString::from));

        let cli = Cli::try_parse_from(args(&["tbm", "SWITCH", "Work"])).unwrap();
        assert!(matches!(cli.command, Commands::Switch { ref name } if name == "Work"));

        let cli = Cli::try_parse_from(args(&["tbm", "--Switch", "work"])).unwrap();
        assert!(matches!(cli.command, Commands::Switch { .. }));

        let cli = Cli::try_parse_from(args(&["tbm", "All-Profiles"])).unwrap();
        assert!(matches!(cli.command, Commands::AllProfiles));

        // Short flags stay case sensitive
        assert_eq!(args(&["tbm", "-S", "work"])[1], "-S");
        assert_eq!(args(&["tbm", "Work"])[1], "Work");
    }

    #[test]
    fn test_switch_requires_name() {
        assert!(Cli::try_parse_from(["tbm", "switch"]).is_err());
        assert!(Cli::try_parse_from(["tbm"]).is_err());
    }

    #[test]
    #[serial]
    fn test_root_from_env() {
        unsafe { std::env::set_var("TBM_ROOT", "/tmp/tbm-env-root") };
        let cli = Cli::try_parse_from(["tbm", "profile"]);
        unsafe { std::env::remove_var("TBM_ROOT") };

        assert_eq!(cli.unwrap().root, Some(PathBuf::from("/tmp/tbm-env-root")));
    }
}
