use std::{env, fs, io::Write};

use anyhow::{Context, Result};
use log::{error, info};
use simplelog::{LevelFilter, WriteLogger};

use article_toc::config::TocConfig;
use article_toc::controller::TocController;
use article_toc::dom::parse_html;
use article_toc::panic_handler;
use article_toc::preferences::JsonFileStore;
use article_toc::scroll_tracker::HeadlessViewport;

const USAGE: &str = "Usage: article-toc <input.html> [--output <file>] [--state <file>] \
                     [--config <file>] [--toggle] [--verbose]";

#[derive(Debug, Default)]
struct CliArgs {
    input: String,
    output: Option<String>,
    state: Option<String>,
    config: Option<String>,
    toggle: bool,
    verbose: bool,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut input = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--output" | "-o" => {
                parsed.output = Some(iter.next().context(USAGE)?.clone());
            }
            "--state" => parsed.state = Some(iter.next().context(USAGE)?.clone()),
            "--config" => parsed.config = Some(iter.next().context(USAGE)?.clone()),
            "--toggle" => parsed.toggle = true,
            "--verbose" | "-v" => parsed.verbose = true,
            flag if flag.starts_with('-') => anyhow::bail!("Unknown option {flag}\n{USAGE}"),
            path if input.is_none() => input = Some(path.to_string()),
            extra => anyhow::bail!("Unexpected argument {extra}\n{USAGE}"),
        }
    }

    parsed.input = input.context(USAGE)?;
    Ok(parsed)
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let args = parse_args(&args)?;

    // html5ever is noisy at debug level
    WriteLogger::init(
        if args.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
        simplelog::ConfigBuilder::new()
            .add_filter_ignore_str("html5ever")
            .build(),
        std::io::stderr(),
    )?;
    panic_handler::initialize_panic_handler();

    let result = run(&args);
    if let Err(err) = &result {
        error!("article-toc failed: {err:?}");
    }
    result
}

fn run(args: &CliArgs) -> Result<()> {
    info!("Generating table of contents for {}", args.input);

    let html = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input))?;
    let config = TocConfig::load_or_default(args.config.as_deref());
    let store = JsonFileStore::load_or_ephemeral(args.state.as_deref());

    let page = parse_html(&html);
    let mut toc = TocController::new(page.document.clone(), config, Box::new(store))?;
    toc.on_ready(&mut HeadlessViewport);
    if args.toggle {
        toc.toggle();
    }

    for entry in toc.entries() {
        info!("  h{} #{} {}", entry.level, entry.id, entry.text);
    }

    let rendered = toc.to_html()?;
    match &args.output {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("Failed to write {path}"))?;
            info!("Wrote {path}");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let args = parse_args(&strings(&[
            "post.html", "-o", "out.html", "--state", "s.json", "--toggle",
        ]))
        .unwrap();

        assert_eq!(args.input, "post.html");
        assert_eq!(args.output.as_deref(), Some("out.html"));
        assert_eq!(args.state.as_deref(), Some("s.json"));
        assert!(args.toggle);
        assert!(!args.verbose);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&[]).is_err());
        assert!(parse_args(&strings(&["post.html", "--output"])).is_err());
        assert!(parse_args(&strings(&["post.html", "--bogus"])).is_err());
        assert!(parse_args(&strings(&["a.html", "b.html"])).is_err());
    }
}
