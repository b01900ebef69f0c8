use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use wavebulk::services::{HistoryEntry, HistoryFilter, StatusFilter};
use wavebulk::utils::logging;
use wavebulk::{App, Config};

/// 批量音频处理命令行
#[derive(Parser, Debug)]
#[command(name = "wavebulk")]
#[command(about = "批量上传音频到处理后端并等待结果")]
#[command(version)]
struct Args {
    /// 处理后端地址（覆盖 WAVEBULK_BASE_URL）
    #[arg(long, env = "WAVEBULK_BASE_URL")]
    base_url: Option<String>,

    /// 显示详细日志
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 逐个上传并处理文件
    Process {
        /// 文件或文件夹
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// 处理选项 TOML 文件
        #[arg(short, long)]
        options: Option<PathBuf>,

        /// 封面图，附加到每个文件
        #[arg(long)]
        cover_art: Option<PathBuf>,
    },
    /// 监视处理中的任务（`任务ID:文件名`）
    Watch {
        #[arg(required = true, value_parser = parse_task)]
        tasks: Vec<(String, String)>,

        /// 按文件名筛选（不区分大小写）
        #[arg(short, long, default_value = "")]
        search: String,

        /// 按状态筛选
        #[arg(long, value_enum, default_value_t = StatusArg::All)]
        status: StatusArg,
    },
    /// 批量删除已处理的文件
    Delete { ids: Vec<String> },
    /// 批量下载已处理的文件
    Download {
        ids: Vec<String>,

        /// 保存目录
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StatusArg {
    All,
    Completed,
    Processing,
    Failed,
}

impl From<StatusArg> for StatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::All => StatusFilter::All,
            StatusArg::Completed => StatusFilter::Completed,
            StatusArg::Processing => StatusFilter::Processing,
            StatusArg::Failed => StatusFilter::Failed,
        }
    }
}

fn parse_task(raw: &str) -> Result<(String, String), String> {
    match raw.split_once(':') {
        Some((id, name)) if !id.is_empty() => Ok((id.to_string(), name.to_string())),
        None if !raw.is_empty() => Ok((raw.to_string(), raw.to_string())),
        _ => Err(format!("无效的任务: {}", raw)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 加载配置
    let mut config = Config::from_env();
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    config.verbose_logging |= args.verbose;

    // 初始化日志
    logging::init_with_verbose(config.verbose_logging);

    let app = App::initialize(config).await?;

    match args.command {
        Command::Process {
            paths,
            options,
            cover_art,
        } => {
            app.process(&paths, options.as_deref(), cover_art.as_deref())
                .await?;
        }
        Command::Watch {
            tasks,
            search,
            status,
        } => {
            let entries = tasks
                .into_iter()
                .map(|(id, name)| HistoryEntry::pending(id, name))
                .collect();
            let filter = HistoryFilter {
                search,
                status: status.into(),
            };
            app.watch(entries, &filter).await;
        }
        Command::Delete { ids } => {
            app.delete(&ids).await?;
        }
        Command::Download { ids, dir } => {
            app.download(&ids, &dir).await?;
        }
    }

    Ok(())
}
