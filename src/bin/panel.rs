//! Project Analyzer 控制面板命令行
//!
//! 每个子命令对应面板上的一个操作，执行后打印该操作的显示区域

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

use project_analyzer::panel::{ControlPanel, UploadFile, DEFAULT_SERVER};

#[derive(Parser, Debug)]
#[command(name = "panel", about = "Project Analyzer control panel")]
struct Cli {
    /// 后端地址
    #[arg(long, default_value = DEFAULT_SERVER)]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 按服务器上的路径分析项目
    Analyze {
        path: String,
        /// DOCX 保存目录
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// 上传本地文件夹并分析
    Upload {
        dir: PathBuf,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// 构建 Prompt
    Prompt {
        task: String,
        #[arg(long)]
        summary: Option<String>,
    },
    /// 应用补丁
    #[command(group(ArgGroup::new("operations").required(true).args(["ops", "ops_file"])))]
    Apply {
        root: String,
        /// 操作列表 JSON
        #[arg(long)]
        ops: Option<String>,
        /// 从文件读取操作列表
        #[arg(long)]
        ops_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let panel = ControlPanel::new(&cli.server)
        .with_context(|| format!("invalid server address {}", cli.server))?;

    match cli.command {
        Command::Analyze { path, out } => {
            panel.analyze_by_path(&path).await;
            finish_analysis(&panel, &out).await?;
        }
        Command::Upload { dir, out } => {
            // 读取失败时按空选择处理
            let files = match UploadFile::collect_folder(&dir) {
                Ok(files) => files,
                Err(e) => {
                    eprintln!("Failed to read {}: {}", dir.display(), e);
                    Vec::new()
                }
            };
            panel.analyze_upload(files).await;
            finish_analysis(&panel, &out).await?;
        }
        Command::Prompt { task, summary } => {
            panel.build_prompt(&task, summary.as_deref()).await;
            println!("{}", panel.view().prompt_output);
        }
        Command::Apply {
            root,
            ops,
            ops_file,
        } => {
            let operations = match (ops, ops_file) {
                (Some(ops), _) => ops,
                (None, Some(file)) => std::fs::read_to_string(&file)
                    .with_context(|| format!("failed to read {}", file.display()))?,
                (None, None) => anyhow::bail!("either --ops or --ops-file is required"),
            };
            panel.apply_patch(&root, &operations).await;
            println!("{}", panel.view().apply_output);
        }
    }

    Ok(())
}

/// 打印状态，若有下载地址则保存文档
async fn finish_analysis(panel: &ControlPanel, out: &std::path::Path) -> anyhow::Result<()> {
    let view = panel.view();
    println!("{}", view.status);

    if let Some(url) = view.navigation {
        let saved = panel
            .download(&url, out)
            .await
            .with_context(|| format!("failed to download {}", url))?;
        println!("Saved {}", saved.display());
    }
    Ok(())
}
