use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use resx_sync::{
    editor::serve, EditOperation, LineEnding, RenameConflictPolicy, ResourceSession, SyncConfig,
    VariantId, SUPPORTED_EXTENSIONS,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "resx_sync")]
#[command(about = "并排查看和编辑 .resx 资源文件的各语言版本")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// 配置文件路径(JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 覆盖写入前创建备份
    #[arg(long, global = true)]
    backup: bool,

    /// 强制使用 CRLF 换行写入（默认沿用各文件原有的换行符）
    #[arg(long, global = true)]
    crlf: bool,

    /// 重命名时允许覆盖已存在的键
    #[arg(long, global = true)]
    overwrite_on_rename: bool,

    /// 静默模式(仅输出错误)
    #[arg(long, global = true)]
    quiet: bool,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// 显示合并后的网格
    Show {
        file: PathBuf,
        /// 以JSON输出
        #[arg(long)]
        json: bool,
        /// 单元格最大显示宽度
        #[arg(long, default_value_t = 40)]
        width: usize,
    },
    /// 列出文件族成员
    Variants { file: PathBuf },
    /// 设置某个语言中某个键的值
    Set {
        file: PathBuf,
        variant: String,
        key: String,
        value: String,
    },
    /// 在所有语言中添加键
    Add { file: PathBuf, key: String },
    /// 在所有语言中删除键
    Delete { file: PathBuf, key: String },
    /// 在所有语言中重命名键
    Rename {
        file: PathBuf,
        old_key: String,
        new_key: String,
    },
    /// 检查重新生成的文件与磁盘内容是否一致
    Check { file: PathBuf },
    /// 宿主模式：从标准输入逐行读取JSON操作，向标准输出逐行写回结果
    Host { file: PathBuf },
}

impl Command {
    fn file(&self) -> &Path {
        match self {
            Command::Show { file, .. }
            | Command::Variants { file }
            | Command::Set { file, .. }
            | Command::Add { file, .. }
            | Command::Delete { file, .. }
            | Command::Rename { file, .. }
            | Command::Check { file }
            | Command::Host { file } => file,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli);
    validate_input(cli.command.file())?;
    let config = build_config(&cli)?;

    match &cli.command {
        Command::Show { file, json, width } => handle_show(file, config, *json, *width),
        Command::Variants { file } => handle_variants(file, config),
        Command::Set {
            file,
            variant,
            key,
            value,
        } => handle_operation(
            &cli,
            file,
            config,
            EditOperation::SetValue {
                variant: VariantId::new(variant.as_str()),
                key: key.clone(),
                value: value.clone(),
            },
        ),
        Command::Add { file, key } => {
            handle_operation(&cli, file, config, EditOperation::AddKey { key: key.clone() })
        }
        Command::Delete { file, key } => {
            handle_operation(&cli, file, config, EditOperation::DeleteKey { key: key.clone() })
        }
        Command::Rename {
            file,
            old_key,
            new_key,
        } => handle_operation(
            &cli,
            file,
            config,
            EditOperation::RenameKey {
                old_key: old_key.clone(),
                new_key: new_key.clone(),
            },
        ),
        Command::Check { file } => handle_check(&cli, file, config),
        Command::Host { file } => handle_host(file, config),
    }
}

/// 初始化日志（输出到标准错误，避免干扰宿主协议）
fn init_logging(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// 验证输入文件
fn validate_input(input: &Path) -> anyhow::Result<()> {
    if !input.exists() {
        bail!("输入文件不存在: {:?}", input);
    }

    let extension = input
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    if !SUPPORTED_EXTENSIONS.iter().any(|&ext| Some(ext) == extension.as_deref()) {
        bail!("输入文件必须是 .resx 文件");
    }

    Ok(())
}

/// 合并配置文件与命令行参数（命令行优先）
fn build_config(cli: &Cli) -> anyhow::Result<SyncConfig> {
    let mut config = match &cli.config {
        Some(path) => SyncConfig::load(path)
            .with_context(|| format!("读取配置文件失败: {:?}", path))?,
        None => SyncConfig::default(),
    };

    if cli.backup {
        config.backup = true;
    }
    if cli.crlf {
        config.line_ending = Some(LineEnding::Crlf);
    }
    if cli.overwrite_on_rename {
        config.rename_conflict = RenameConflictPolicy::Overwrite;
    }

    Ok(config)
}

fn open_session(file: &Path, config: SyncConfig) -> anyhow::Result<ResourceSession> {
    ResourceSession::open(file, config).with_context(|| format!("加载资源文件族失败: {:?}", file))
}

/// 显示合并网格
fn handle_show(file: &Path, config: SyncConfig, json: bool, width: usize) -> anyhow::Result<()> {
    let session = open_session(file, config)?;
    let view = session.view();

    if json {
        println!("{}", serde_json::to_string_pretty(&view).context("序列化JSON失败")?);
    } else {
        print!("{}", view.render_text(width));
        println!("\n共 {} 个键，{} 个语言", view.len(), view.variants.len());
    }

    Ok(())
}

/// 列出文件族成员
fn handle_variants(file: &Path, config: SyncConfig) -> anyhow::Result<()> {
    let session = open_session(file, config)?;

    for variant in &session.family().variants {
        let count = session.table(&variant.id).map(|t| t.len()).unwrap_or(0);
        println!("{:<12} {:>5} 个键  {}", variant.id, count, variant.path.display());
    }

    Ok(())
}

/// 执行单个编辑操作
fn handle_operation(
    cli: &Cli,
    file: &Path,
    config: SyncConfig,
    operation: EditOperation,
) -> anyhow::Result<()> {
    let mut session = open_session(file, config)?;
    let description = operation.describe();

    let view = session
        .apply(operation)
        .with_context(|| format!("操作失败: {}", description))?;

    if !cli.quiet {
        println!("✓ {}", description);
        println!("共 {} 个键，{} 个语言", view.len(), view.variants.len());
    }
    if cli.verbose {
        println!("{}", session.history().summary());
    }

    Ok(())
}

/// 检查往返一致性
fn handle_check(cli: &Cli, file: &Path, config: SyncConfig) -> anyhow::Result<()> {
    let line_ending = config.line_ending;
    let session = open_session(file, config)?;

    let mut mismatched = 0;
    for variant in &session.family().variants {
        let Some(table) = session.table(&variant.id) else {
            continue;
        };
        let on_disk = std::fs::read(&variant.path)
            .with_context(|| format!("读取文件失败: {:?}", variant.path))?;

        if on_disk == table.to_file_bytes(line_ending) {
            if !cli.quiet {
                println!("✓ {} {}", variant.id, variant.path.display());
            }
        } else {
            mismatched += 1;
            println!("⚠ {} {} 保存后内容会改变", variant.id, variant.path.display());
        }
    }

    if mismatched > 0 {
        bail!("{} 个文件与重新生成的内容不一致", mismatched);
    }

    Ok(())
}

/// 宿主模式：JSON 行协议
fn handle_host(file: &Path, config: SyncConfig) -> anyhow::Result<()> {
    let mut session = open_session(file, config)?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    serve(&mut session, stdin.lock(), stdout.lock()).context("宿主协议中断")?;

    Ok(())
}
