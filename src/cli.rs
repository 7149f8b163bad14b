use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use colored::*;

use postbench::Settings;
use postbench::generator::{self, SnippetFormat};
use postbench::history::{HistoryRecorder, printer::print_history};
use postbench::http::{Client, Normalizer, RequestDescriptor};
use postbench::identity::OwnerId;
use postbench::server;
use postbench::stats::{printer::print_statistics, summarize};
use postbench::utils::formatter::{ResponseFormat, ResponseFormatter};

pub type Result<T> = std::result::Result<T, anyhow::Error>;

const DEFAULT_OWNER: &str = "local";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 配置文件路径 (默认查找 postbench.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 启动 HTTP API 服务
    Serve {
        /// 监听地址，覆盖配置文件
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// 发送一个请求并写入历史
    Send {
        method: String,
        url: String,
        /// 请求头，格式 "Key: Value"，可重复
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
        /// 请求体 (GET 会被忽略)
        #[arg(short = 'd', long = "data")]
        body: Option<String>,
        #[arg(long, env = "POSTBENCH_OWNER", default_value = DEFAULT_OWNER)]
        owner: String,
        /// 显示响应头和完整响应体
        #[arg(short, long)]
        verbose: bool,
        /// 不写入历史
        #[arg(long)]
        no_history: bool,
    },
    /// 分页查看历史 (最新在前)
    History {
        #[arg(long, env = "POSTBENCH_OWNER", default_value = DEFAULT_OWNER)]
        owner: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// 查看使用统计
    Stats {
        #[arg(long, env = "POSTBENCH_OWNER", default_value = DEFAULT_OWNER)]
        owner: String,
    },
    /// 删除一条历史记录
    Delete {
        id: String,
        #[arg(long, env = "POSTBENCH_OWNER", default_value = DEFAULT_OWNER)]
        owner: String,
    },
    /// 把历史记录导出为 fetch / curl / .http 片段
    Export {
        /// 记录 ID，省略时按时间顺序导出全部
        id: Option<String>,
        #[arg(short, long, default_value = "fetch")]
        format: SnippetFormat,
        #[arg(long, env = "POSTBENCH_OWNER", default_value = DEFAULT_OWNER)]
        owner: String,
    },
    /// 清空历史
    Clear {
        #[arg(long, env = "POSTBENCH_OWNER", default_value = DEFAULT_OWNER)]
        owner: String,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                settings.server.bind = bind;
            }
            server::serve(settings).await?;
        }
        Commands::Send {
            method,
            url,
            headers,
            body,
            owner,
            verbose,
            no_history,
        } => {
            let mut descriptor = RequestDescriptor::new(&method, &url);
            for raw in &headers {
                let (key, value) = parse_header(raw)?;
                descriptor = descriptor.with_header(key, value);
            }
            if let Some(body) = &body {
                descriptor = descriptor.with_body(body);
            }
            send(&settings, descriptor, OwnerId::new(owner), verbose, !no_history).await?;
        }
        Commands::History { owner, page, limit } => {
            let recorder = HistoryRecorder::from_settings(&settings.history);
            let page = recorder
                .list(&OwnerId::new(owner), Some(page), limit)
                .await?;
            print_history(&page);
        }
        Commands::Stats { owner } => {
            let recorder = HistoryRecorder::from_settings(&settings.history);
            let records = recorder.all(&OwnerId::new(owner)).await?;
            print_statistics(&summarize(&records));
        }
        Commands::Delete { id, owner } => {
            let recorder = HistoryRecorder::from_settings(&settings.history);
            if recorder.delete(&OwnerId::new(owner), &id).await? {
                println!("Deleted {}", id);
            } else {
                return Err(anyhow!("History record not found: {}", id));
            }
        }
        Commands::Export { id, format, owner } => {
            let recorder = HistoryRecorder::from_settings(&settings.history);
            let owner = OwnerId::new(owner);
            let records = match id {
                Some(id) => match recorder.find(&owner, &id).await? {
                    Some(record) => vec![record],
                    None => return Err(anyhow!("History record not found: {}", id)),
                },
                None => {
                    let mut records = recorder.all(&owner).await?;
                    records.reverse();
                    records
                }
            };
            print!("{}", generator::generate(format, &records)?);
        }
        Commands::Clear { owner } => {
            let recorder = HistoryRecorder::from_settings(&settings.history);
            let count = recorder.clear(&OwnerId::new(owner)).await?;
            println!("Deleted {} history records", count);
        }
    }
    Ok(())
}

async fn send(
    settings: &Settings,
    descriptor: RequestDescriptor,
    owner: OwnerId,
    verbose: bool,
    record: bool,
) -> Result<()> {
    let request = Normalizer::new(&settings.executor).normalize(descriptor)?;
    let client = Client::new(&settings.executor)?;

    let result = match client.execute(&request).await {
        Ok(result) => result,
        Err(e) => {
            println!("{}: {}", "Request failed".red().bold(), e);
            return Err(e.into());
        }
    };

    let format = if verbose {
        ResponseFormat::Verbose
    } else {
        ResponseFormat::Compact
    };
    println!("{}", ResponseFormatter::new(format).format(&result));

    if record {
        let recorder = HistoryRecorder::from_settings(&settings.history);
        match recorder.record(&owner, &request, &result).await {
            Ok(saved) => println!("{}", format!("Saved to history as {}", saved.id).dimmed()),
            Err(e) => println!("{}: {}", "Warning".yellow(), e),
        }
    }
    Ok(())
}

/// "Key: Value" -> ("Key", "Value")
fn parse_header(raw: &str) -> Result<(&str, &str)> {
    let (key, value) = raw
        .split_once(':')
        .with_context(|| format!("Invalid header '{}', expected 'Key: Value'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("Invalid header '{}', name is empty", raw));
    }
    Ok((key, value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Content-Type: application/json").unwrap(),
            ("Content-Type", "application/json")
        );
        assert_eq!(
            parse_header("Authorization:Bearer a:b").unwrap(),
            ("Authorization", "Bearer a:b")
        );
        assert!(parse_header("no-colon").is_err());
        assert!(parse_header(": value").is_err());
    }

    #[test]
    fn test_parse_send_command() {
        let cli = Cli::try_parse_from([
            "postbench",
            "send",
            "POST",
            "https://api.example.com/users",
            "-H",
            "X-Trace: 1",
            "-H",
            "Accept: */*",
            "-d",
            r#"{"name":"foo"}"#,
            "--owner",
            "alice",
        ])
        .unwrap();

        match cli.command {
            Commands::Send {
                method,
                headers,
                body,
                owner,
                no_history,
                ..
            } => {
                assert_eq!(method, "POST");
                assert_eq!(headers, vec!["X-Trace: 1", "Accept: */*"]);
                assert_eq!(body.as_deref(), Some(r#"{"name":"foo"}"#));
                assert_eq!(owner, "alice");
                assert!(!no_history);
            }
            _ => panic!("Expected send command"),
        }
    }

    #[test]
    fn test_parse_history_defaults() {
        let cli = Cli::try_parse_from(["postbench", "history", "--limit", "6"]).unwrap();
        match cli.command {
            Commands::History { page, limit, .. } => {
                assert_eq!(page, 1);
                assert_eq!(limit, Some(6));
            }
            _ => panic!("Expected history command"),
        }
    }

    #[test]
    fn test_parse_export_command() {
        let cli = Cli::try_parse_from(["postbench", "export", "abc123", "-f", "curl"]).unwrap();
        match cli.command {
            Commands::Export { id, format, .. } => {
                assert_eq!(id.as_deref(), Some("abc123"));
                assert_eq!(format, SnippetFormat::Curl);
            }
            _ => panic!("Expected export command"),
        }

        let cli = Cli::try_parse_from(["postbench", "export"]).unwrap();
        match cli.command {
            Commands::Export { id, format, .. } => {
                assert!(id.is_none());
                assert_eq!(format, SnippetFormat::Fetch);
            }
            _ => panic!("Expected export command"),
        }

        assert!(Cli::try_parse_from(["postbench", "export", "--format", "wget"]).is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli =
            Cli::try_parse_from(["postbench", "stats", "--config", "/tmp/postbench.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/postbench.toml")));
    }
}
