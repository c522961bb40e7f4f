// src/main.rs

use anyhow::Context;
use clap::Parser;
use olaf::Options;
use olaf::diagnostics;
use olaf::preprocess::normalize_line_endings;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// 把 Olaf 方言编译成 JavaScript
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// 需要编译的源文件路径。不提供时从标准输入读取
    input: Option<PathBuf>,

    /// 输出文件的路径。不提供时写到标准输出
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 只检查结构，不输出 JavaScript
    #[arg(long)]
    check: bool,

    /// 每一层缩进的空格数
    #[arg(long, default_value_t = 2)]
    indent: usize,

    /// `wait` 暂停的毫秒数
    #[arg(long = "wait-ms", default_value_t = 1000)]
    wait_ms: u64,

    /// 日志详细程度（-v: info, -vv: debug）
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    // RUST_LOG 优先
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_source(input: Option<&PathBuf>) -> anyhow::Result<(String, String)> {
    match input {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("Failed to read file '{}'", path.display()))?;
            Ok((path.display().to_string(), source))
        }
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read from stdin")?;
            Ok(("<stdin>".to_string(), source))
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (source_name, source) = read_source(cli.input.as_ref())?;
    info!(file = %source_name, bytes = source.len(), "compiling");

    let options = Options::new()
        .with_indent_width(cli.indent)
        .with_wait_millis(cli.wait_ms);

    let javascript = match olaf::compile_with(&source, &options) {
        Ok(js) => js,
        Err(errors) => {
            // 诊断按规范化换行后的文本渲染，与编译器看到的行号一致
            let normalized = normalize_line_endings(&source);
            eprint!("{}", diagnostics::render(&source_name, &normalized, &errors));
            eprintln!(
                "Compilation of '{}' failed with {} error(s).",
                source_name,
                errors.len()
            );
            process::exit(1);
        }
    };

    if cli.check {
        info!(file = %source_name, "no structural errors");
        return Ok(());
    }

    match &cli.output {
        Some(path) => {
            fs::write(path, &javascript)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            info!(file = %path.display(), "wrote JavaScript");
        }
        None => print!("{javascript}"),
    }

    Ok(())
}
