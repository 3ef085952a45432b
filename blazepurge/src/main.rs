use blazepurge_lib::config::{ContentSource, CssSource};
use blazepurge_lib::{write_results, PurgeConfig, PurgeCss, PurgeError};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

const BLAZEPURGE_INTRO: &str = r#"
        ____  __                 ____
       / __ )/ /___ _____  ___  / __ \__  ___________ ____
      / __  / / __ `/_  / / _ \/ /_/ / / / / ___/ __ `/ _ \
     / /_/ / / /_/ / / /_/  __/ ____/ /_/ / /  / /_/ /  __/
    /_____/_/\__,_/ /___/\___/_/    \__,_/_/   \__, /\___/
                                              /____/
    BlazePurge - strip the CSS your markup never uses.
"#;

#[derive(Parser)]
#[command(name = "BlazePurge")]
#[command(about = "Remove unused CSS selectors")]
struct Args {
    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Glob of content files to scan for used selectors (repeatable).
    #[arg(long)]
    content: Vec<String>,

    /// Glob of stylesheets to purge (repeatable).
    #[arg(long)]
    css: Vec<String>,

    /// Selector name to always keep (repeatable).
    #[arg(long)]
    whitelist: Vec<String>,

    /// Regex protecting matching rules (repeatable).
    #[arg(long = "whitelist-pattern")]
    whitelist_patterns: Vec<String>,

    /// Regex protecting matching rules and their children (repeatable).
    #[arg(long = "whitelist-pattern-children")]
    whitelist_patterns_children: Vec<String>,

    /// Remove unused @keyframes.
    #[arg(long)]
    keyframes: bool,

    /// Remove unused @font-face rules.
    #[arg(long)]
    font_face: bool,

    /// Print removed selectors to stderr.
    #[arg(long)]
    rejected: bool,

    /// Output file (single stylesheet) or directory. Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// More log output (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// Layer command-line flags over the config file (or an empty config).
    fn into_config(self) -> Result<PurgeConfig, PurgeError> {
        let mut config = match &self.config {
            Some(path) => PurgeConfig::from_file(path)?,
            None => PurgeConfig::default(),
        };

        config
            .content
            .extend(self.content.into_iter().map(ContentSource::Glob));
        config.css.extend(self.css.into_iter().map(CssSource::Glob));
        config.whitelist.extend(self.whitelist);
        config.whitelist_patterns.extend(self.whitelist_patterns);
        config
            .whitelist_patterns_children
            .extend(self.whitelist_patterns_children);
        config.keyframes |= self.keyframes;
        config.font_face |= self.font_face;
        config.rejected |= self.rejected;
        if self.output.is_some() {
            config.output = self.output;
        }
        Ok(config)
    }
}

fn main() {
    // parse the args given in terminal
    let args: Args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), PurgeError> {
    let config = args.into_config()?;
    let options = config.compile()?;
    let report_rejected = options.rejected;
    let output = options.output.clone();

    let results = PurgeCss::new(options).purge()?;

    if report_rejected {
        for result in &results {
            let origin = result
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<raw>".to_string());
            for selector in &result.rejected {
                eprintln!("{}: removed {}", origin, selector);
            }
        }
    }

    match output {
        Some(output) => {
            eprintln!("{}", BLAZEPURGE_INTRO);
            for path in write_results(&results, &output)? {
                eprintln!("Wrote {}", path.display());
            }
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for result in &results {
                out.write_all(result.css.as_bytes())
                    .map_err(|source| PurgeError::Write {
                        path: PathBuf::from("<stdout>"),
                        source,
                    })?;
            }
        }
    }
    Ok(())
}
