use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "ledis", about = "Ledis command console and server", version)]
pub struct Cli {
    /// Send a single command and exit (e.g. "SET key value").
    #[arg(value_name = "COMMAND", conflicts_with = "serve")]
    pub command: Option<String>,

    /// Server base URL; the console posts to <URL>/execute.
    #[arg(long)]
    pub url: Option<String>,

    /// Seconds to wait for a reply (0 waits forever).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Show replies in submission order instead of arrival order.
    #[arg(long)]
    pub ordered: bool,

    /// Read commands line by line from stdin instead of the full-screen console,
    /// which is used whenever stdin and stdout are terminals.
    #[arg(long = "no-tui")]
    pub no_tui: bool,

    /// Disable colored output in line mode.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Run the Ledis server instead of the console.
    #[arg(long)]
    pub serve: bool,

    /// Address the server listens on.
    #[arg(long, requires = "serve")]
    pub bind: Option<String>,

    /// Directory holding views/index.html and static/ for the server.
    #[arg(long = "static-dir", requires = "serve")]
    pub static_dir: Option<String>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long = "log-level")]
    pub log_level: Option<String>,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_mode_switch() {
        let cli = Cli::try_parse_from(["ledis", "--no-tui", "--ordered"]).unwrap();
        assert!(cli.no_tui);
        assert!(cli.ordered);
        assert!(Cli::try_parse_from(["ledis", "--tui"]).is_err());
    }

    #[test]
    fn test_server_flags_require_serve() {
        assert!(Cli::try_parse_from(["ledis", "--bind", ":9000"]).is_err());
        let cli = Cli::try_parse_from(["ledis", "--serve", "--bind", ":9000"]).unwrap();
        assert_eq!(cli.bind.as_deref(), Some(":9000"));
        assert!(Cli::try_parse_from(["ledis", "--serve", "KEYS"]).is_err());
    }
}
