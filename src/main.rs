use anyhow::{bail, Context};
use blocksweep::app::{App, SearchSpec};
use blocksweep::config::{ConfigOverrides, SweepConfig};
use blocksweep::controller::Controller;
use blocksweep::logging::{self, EventLog};
use blocksweep::render::RenderOptions;
use blocksweep::transform::{ShellTransformer, StagingPaths};
use blocksweep::error;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

/// 正規表現で区切ったブロックを外部スクリプトで変換し、ファイルへ書き戻す
#[derive(Debug, Parser)]
#[command(name = "blocksweep", version, about)]
struct Cli {
    /// コーパスのルートディレクトリ
    root: PathBuf,

    /// 対象ファイルのグロブ（カンマ区切り）
    #[arg(short, long, default_value = "**/*")]
    glob: String,

    /// ブロック開始行の正規表現
    #[arg(short, long)]
    begin: String,

    /// ブロック終了行の正規表現（省略時は固定行数）
    #[arg(short, long, default_value = "")]
    end: String,

    /// 変換スクリプト（$INPUT を読み $OUTPUT へ書く）
    #[arg(short, long, conflicts_with = "script_file")]
    script: Option<String>,

    /// 変換スクリプトを読み込むファイル
    #[arg(long)]
    script_file: Option<PathBuf>,

    /// すべてのブロックに適用・コミットして終了
    #[arg(long)]
    batch: bool,

    /// 設定ファイル（JSON）
    #[arg(long)]
    config: Option<PathBuf>,

    /// ステージングディレクトリ
    #[arg(long)]
    staging_dir: Option<PathBuf>,

    /// 終了パターン省略時の行数
    #[arg(long)]
    window: Option<usize>,

    /// イベントログ（JSON Lines）の出力先
    #[arg(long)]
    event_log: Option<PathBuf>,

    /// ログを詳細にする（複数指定可）
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    error::setup_panic_handler();
    let cli = Cli::parse();

    let config = SweepConfig::discover(cli.config.as_deref())?.merged_with(&ConfigOverrides {
        staging_dir: cli.staging_dir.clone(),
        window: cli.window,
        event_log: cli.event_log.clone(),
        log_level: None,
    })?;
    logging::init(config.log_level.as_deref(), cli.verbose);

    let script = match (&cli.script, &cli.script_file) {
        (Some(script), _) => script.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script file {}", path.display()))?,
        (None, None) => String::new(),
    };
    if cli.batch && script.is_empty() {
        bail!("--batch needs --script or --script-file");
    }

    let root = blocksweep::config::expand_path(&cli.root);
    let transformer = ShellTransformer::new(StagingPaths::from_config(&config));
    let mut controller = Controller::with_window(transformer, config.window);
    if let Some(path) = config.resolve_event_log() {
        controller = controller.with_event_log(EventLog::new(path)?);
    }

    let spec = SearchSpec {
        root,
        globs: cli.glob.clone(),
        begin_pattern: cli.begin.clone(),
        end_pattern: cli.end.clone(),
    };
    let options = RenderOptions {
        color: std::io::stdout().is_terminal(),
        ..RenderOptions::default()
    };
    let mut app = App::new(controller, spec, script).with_render_options(options);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if cli.batch {
        let committed = app.run_batch(&mut out)?;
        eprintln!("{} blocks committed", committed);
    } else {
        let stdin = std::io::stdin();
        app.run_interactive(stdin.lock(), &mut out)?;
    }

    Ok(())
}
