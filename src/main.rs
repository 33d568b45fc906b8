use clap::Parser;
use online_compiler::{
    language_for_extension, CompilerClient, ExecutionRequest, DEFAULT_SERVER_URL,
};
use std::{path::PathBuf, process::ExitCode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source file to execute
    #[arg(required_unless_present = "list")]
    file: Option<PathBuf>,

    /// Language id; inferred from the file extension when omitted
    #[arg(short, long)]
    language: Option<String>,

    /// File whose contents are fed to the program's standard input
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Requested timeout in milliseconds
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Server base URL
    #[arg(long, env = "COMPILER_URL", default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// List the languages the server supports and exit
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let client = CompilerClient::new(&args.server)?;

    if args.list {
        for language in client.languages().await? {
            println!(
                "{:<12} {:<12} .{:<6} {}ms{}",
                language.id,
                language.name,
                language.extension,
                language.timeout_ms,
                if language.compiled { " (compiled)" } else { "" }
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(file) = args.file else {
        return Err("a source file is required".into());
    };

    let language = match args.language {
        Some(language) => language,
        None => file
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(language_for_extension)
            .map(str::to_string)
            .ok_or("cannot infer the language; pass --language")?,
    };

    let code = tokio::fs::read_to_string(&file).await?;
    let mut request = ExecutionRequest::new(language, code);
    if let Some(input) = &args.input {
        request = request.with_input(tokio::fs::read_to_string(input).await?);
    }
    request.timeout_ms = args.timeout_ms;

    tracing::debug!("Submitting {} to {}", file.display(), args.server);
    let result = client.execute(&request).await?;

    if result.success {
        print!("{}", result.output.unwrap_or_default());
        eprintln!("({} ms)", result.execution_time);
        Ok(ExitCode::SUCCESS)
    } else {
        let kind = result
            .error_type
            .map(|kind| format!("{:?}", kind))
            .unwrap_or_else(|| "Error".to_string());
        eprintln!("[{}] {}", kind, result.error.unwrap_or_default());
        eprintln!("({} ms)", result.execution_time);
        Ok(ExitCode::FAILURE)
    }
}
