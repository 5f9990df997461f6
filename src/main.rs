use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use gopretty::debug::dump_tree;
use gopretty::formatter::{FormatOptions, Mode, format_source};
use gopretty::parser;
use log::{debug, error, info};
use rayon::prelude::*;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "gopretty", version, about = "Comment-preserving Go pretty printer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Fmt {
        /// Paths (files or directories) to format (defaults to current dir)
        paths: Vec<PathBuf>,
        /// Write the formatted content back to the files
        #[arg(long)]
        write: bool,
        /// Check if files are formatted; non-zero exit if changes needed
        #[arg(long)]
        check: bool,
        /// Tab width
        #[arg(long, default_value_t = 8)]
        tabwidth: usize,
        /// Align with blanks instead of tabs
        #[arg(long)]
        spaces: bool,
        /// Ignore blank lines of the source
        #[arg(long)]
        no_newlines: bool,
        /// Maximum number of consecutive newlines
        #[arg(long, default_value_t = 3)]
        maxnewlines: usize,
        /// Drop comments
        #[arg(long)]
        no_comments: bool,
        /// Print semicolons before closing braces too
        #[arg(long)]
        optsemicolons: bool,
        /// Produce an HTML page with cross references
        #[arg(long)]
        html: bool,
        /// Spell declaration keywords as `def`
        #[arg(long)]
        def: bool,
        /// Prefix tokens and comments with their source position
        #[arg(long)]
        debug_positions: bool,
    },
    Debug {
        /// File to debug
        file: PathBuf,
    },
}

fn init_logging() {
    if cfg!(debug_assertions) {
        colog::default_builder()
            .filter_level(log::LevelFilter::Trace)
            .init();
    } else {
        colog::default_builder().init();
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Fmt {
            paths,
            write,
            check,
            tabwidth,
            spaces,
            no_newlines,
            maxnewlines,
            no_comments,
            optsemicolons,
            html,
            def,
            debug_positions,
        } => {
            if write && check {
                bail!("--write and --check are mutually exclusive");
            }
            let mode = if write {
                Mode::Write
            } else if check {
                Mode::Check
            } else {
                Mode::Stdout
            };
            let opts = FormatOptions {
                tab_width: tabwidth,
                use_tabs: !spaces,
                respect_newlines: !no_newlines,
                max_newlines: maxnewlines,
                comments: !no_comments,
                optional_semicolons: optsemicolons,
                html,
                def_keywords: def,
                debug_positions,
                mode,
            };
            let targets = if paths.is_empty() {
                vec![PathBuf::from(".")]
            } else {
                paths
            };
            let mut go_files = Vec::new();
            for p in targets {
                collect_go_files(&p, &mut go_files);
            }
            debug!("{} file(s) to format", go_files.len());

            let results: Vec<_> = go_files
                .par_iter()
                .map(|path| process_file(path, &opts))
                .collect();
            let mut had_change = false;
            let mut had_error = false;
            for (path, r) in go_files.iter().zip(results) {
                match r {
                    Ok(changed) => had_change |= changed,
                    Err(e) => {
                        error!("{}: {:#}", path.display(), e);
                        had_error = true;
                    }
                }
            }
            if had_error || (matches!(mode, Mode::Check) && had_change) {
                std::process::exit(1);
            }
        }
        Commands::Debug { file } => {
            debug_file(&file)?;
        }
    }
    Ok(())
}

fn debug_file(path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let tree = parser::parse(&content)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "===== {} =====", path.display())?;
    dump_tree(&mut out, tree.root_node(), &content, 0)?;
    Ok(())
}

fn collect_go_files(path: &Path, out: &mut Vec<PathBuf>) {
    if path.is_file() {
        if path.extension().and_then(|s| s.to_str()) == Some("go") {
            out.push(path.to_path_buf());
        }
        return;
    }
    for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("go") {
            out.push(p.to_path_buf());
        }
    }
}

fn process_file(path: &Path, opts: &FormatOptions) -> Result<bool> {
    let content = fs::read_to_string(path)?;
    let formatted = format_source(&content, opts)?;
    let changed = formatted != content;
    match opts.mode {
        Mode::Stdout => {
            // one lock per file keeps parallel output from interleaving
            let stdout = io::stdout();
            let mut out = stdout.lock();
            if !opts.html {
                writeln!(out, "===== {} =====", path.display())?;
            }
            out.write_all(formatted.as_bytes())?;
        }
        Mode::Write => {
            if changed {
                fs::write(path, formatted)?;
                info!("formatted {}", path.display());
            }
        }
        Mode::Check => {
            if changed {
                info!("{} needs formatting", path.display());
            }
        }
    }
    Ok(changed)
}
