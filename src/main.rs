//! 命令行入口

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use shuijiao::core::{Lang, ShuijiaoError, ShuijiaoResult};
use shuijiao::env::{self, EnvVar};
use shuijiao::hsk::{HskLevel, HskRegistry};
use shuijiao::parsers::html::{decode_bytes, escape_html};
use shuijiao::parsers::stroke::{render_svg, StrokeAnimation, StrokeData, SvgStyle};
use shuijiao::parsers::text::split_sentences;
use shuijiao::store::HistoryStore;
use shuijiao::translation::constants::{DESCRIPTION_INDEX, TITLE_INDEX};
use shuijiao::translation::{
    default_session, render, segments_to_html, translate_article, Article, ConfigManager,
    RenderSegment, SegmentMode, Segmenter, TranslationConfig,
};

#[derive(Parser, Debug)]
#[command(name = "shuijiao")]
#[command(version, about = "Bilingual reader for Chinese/English articles", long_about = None)]
struct Cli {
    /// Config file (default: first of ./shuijiao.toml, ~/.config/shuijiao/config.toml, ...)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate an article and print it with translations interleaved
    Translate(TranslateArgs),
    /// Split text into sentences, one per line
    Sentences(SentencesArgs),
    /// Parse stroke data and render an animation frame as SVG
    Strokes(StrokesArgs),
    /// List HSK lessons
    Hsk(HskArgs),
    /// Show or edit the lookup history
    History(HistoryArgs),
    /// Print documentation for environment variables
    EnvDocs,
    /// Write an example config file
    InitConfig {
        #[arg(value_name = "FILE", default_value = "shuijiao.toml")]
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Input file, or - for stdin
    #[arg(value_name = "FILE", default_value = "-")]
    input: String,

    /// Input encoding label (e.g. utf-8, gbk, big5)
    #[arg(short = 'E', long, default_value = "utf-8")]
    encoding: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Html,
    Sentences,
}

#[derive(Args, Debug)]
struct TranslateArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Content id used to look up pre-translated payloads
    #[arg(long)]
    id: Option<String>,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(short, long, default_value = "zh")]
    source: Lang,

    /// Target language (default: from config)
    #[arg(short, long)]
    target: Option<Lang>,

    #[arg(short, long, value_enum, default_value = "html")]
    mode: ModeArg,

    /// Print only the original content
    #[arg(long)]
    hide_translation: bool,

    /// Print the translation map as JSON instead of HTML
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct SentencesArgs {
    #[command(flatten)]
    input: InputArgs,

    #[arg(short, long, default_value = "zh")]
    lang: Lang,
}

#[derive(Args, Debug)]
struct StrokesArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Frame to render (default: the finished character)
    #[arg(long)]
    frame: Option<usize>,

    #[arg(long, default_value_t = 10)]
    frames_per_stroke: usize,

    #[arg(long, default_value_t = 256)]
    size: u32,
}

#[derive(Args, Debug)]
struct HskArgs {
    /// Data directory containing hsk1.json ... hsk6.json
    #[arg(long)]
    dir: Option<PathBuf>,

    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=6))]
    level: Option<u8>,

    /// Show the words of one lesson
    #[arg(long, requires = "level")]
    lesson: Option<u32>,
}

#[derive(Args, Debug)]
struct HistoryArgs {
    /// History file (default: from config)
    #[arg(long)]
    path: Option<PathBuf>,

    #[command(subcommand)]
    action: Option<HistoryAction>,
}

#[derive(Subcommand, Debug)]
enum HistoryAction {
    /// List entries, most recent first
    List,
    /// Record a looked-up word
    Record { word: String },
    /// Remove all entries
    Clear,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Translate(args) => {
            let config = load_config(cli.config.as_deref())?;
            translate(args, &config).await?;
        }
        Command::Sentences(args) => {
            let content = read_input(&args.input)?;
            let mut stdout = io::stdout().lock();
            for sentence in split_sentences(&content, args.lang) {
                writeln!(stdout, "{}", sentence)?;
            }
        }
        Command::Strokes(args) => strokes(args)?,
        Command::Hsk(args) => {
            let config = load_config(cli.config.as_deref())?;
            hsk(args, &config)?;
        }
        Command::History(args) => {
            let path = match args.path {
                Some(path) => path,
                None => load_config(cli.config.as_deref())?.history_path(),
            };
            history(&path, args.action.unwrap_or(HistoryAction::List))?;
        }
        Command::EnvDocs => print!("{}", env::generate_env_docs()),
        Command::InitConfig { path } => {
            ConfigManager::generate_example_config(&path)?;
            println!("已生成示例配置: {}", path.display());
        }
    }

    Ok(())
}

/// 日志输出到 stderr，级别来自 SHUIJIAO_LOG_LEVEL
fn init_logging() {
    let level = env::core::LogLevel::get().unwrap_or_else(|e| {
        eprintln!("{}", e);
        "info".to_string()
    });
    let filter = EnvFilter::try_new(format!("shuijiao={}", level)).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(!env::core::NoColor::get_or_default(false))
        .init();
}

fn load_config(path: Option<&Path>) -> ShuijiaoResult<TranslationConfig> {
    let manager = match path {
        Some(path) => ConfigManager::from_file(path)?,
        None => ConfigManager::new()?,
    };
    Ok(manager.get_config().clone())
}

fn read_input(args: &InputArgs) -> ShuijiaoResult<String> {
    let bytes = if args.input == "-" {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer)?;
        buffer
    } else {
        fs::read(&args.input)?
    };
    Ok(decode_bytes(&bytes, &args.encoding))
}

async fn translate(args: TranslateArgs, config: &TranslationConfig) -> ShuijiaoResult<()> {
    let content = read_input(&args.input)?;
    let target = match args.target {
        Some(target) => target,
        None => config.target_lang.parse()?,
    };
    let show = !args.hide_translation;
    let session = default_session(config)?;

    let output = match args.mode {
        ModeArg::Html => {
            let article = Article {
                id: args.id.unwrap_or_default(),
                title: args.title.unwrap_or_default(),
                description: args.description.unwrap_or_default(),
                body_html: content,
                lang: args.source,
            };
            let translation = translate_article(&session, &article, target).await;

            if args.json {
                serde_json::to_string_pretty(&translation.translations)?
            } else {
                let rendered = translation.render(show);
                let mut html = String::new();
                let headers = [
                    (TITLE_INDEX, "h1", &rendered.title),
                    (DESCRIPTION_INDEX, "p", &rendered.description),
                ];
                for (index, tag, slot) in headers {
                    if slot.original.is_empty() {
                        continue;
                    }
                    html.push_str(&format!("<{0}>{1}</{0}>\n", tag, escape_html(&slot.original)));
                    if let Some(text) = &slot.translation {
                        html.push_str(&segments_to_html(&[RenderSegment::Translation {
                            index,
                            text: text.clone(),
                        }]));
                    }
                }
                html.push_str(&rendered.body_html());
                html
            }
        }
        ModeArg::Sentences => {
            let units = Segmenter::new().segment(&content, SegmentMode::Sentences, args.source);
            let id = args.id.as_deref();
            session.start(id, &units, args.source, target).await.settled().await;

            if args.json {
                serde_json::to_string_pretty(&session.snapshot())?
            } else {
                segments_to_html(&render(&units, &session.snapshot(), show))
            }
        }
    };

    print!("{}", output);
    Ok(())
}

fn strokes(args: StrokesArgs) -> ShuijiaoResult<()> {
    let raw = read_input(&args.input)?;
    let data = StrokeData::from_raw(&raw)?;
    let mut animation = StrokeAnimation::new(&data, args.frames_per_stroke)?;
    let total = animation.total_frames();

    let frame = match args.frame {
        Some(index) if index >= total => {
            return Err(ShuijiaoError::StrokeData(format!(
                "帧 {} 超出范围（共 {} 帧）",
                index, total
            )))
        }
        Some(index) => animation.nth(index),
        None => animation.last(),
    }
    .ok_or_else(|| ShuijiaoError::StrokeData("没有可渲染的帧".to_string()))?;

    tracing::info!("{} 笔, {} 帧", data.stroke_count(), total);
    let style = SvgStyle {
        size: args.size,
        ..SvgStyle::default()
    };
    println!("{}", render_svg(&data, &frame, &style));
    Ok(())
}

fn hsk(args: HskArgs, config: &TranslationConfig) -> ShuijiaoResult<()> {
    let dir = args.dir.unwrap_or_else(|| config.hsk_data_dir());
    let registry = HskRegistry::from_dir(&dir)?;
    let mut stdout = io::stdout().lock();

    let Some(level) = args.level.map(HskLevel::new).transpose()? else {
        for level in registry.levels() {
            let count = registry.lessons(level).map_or(0, <[_]>::len);
            writeln!(stdout, "{}: {} lessons", level, count)?;
        }
        return Ok(());
    };

    let lessons = registry
        .lessons(level)
        .ok_or_else(|| ShuijiaoError::Hsk(format!("{} 没有数据", level)))?;

    match args.lesson {
        Some(id) => {
            let lesson = registry
                .lesson(level, id)
                .ok_or_else(|| ShuijiaoError::Hsk(format!("{} 没有第 {} 课", level, id)))?;
            writeln!(stdout, "{} {}", lesson.id, lesson.title)?;
            for word in &lesson.words {
                match &word.han_viet {
                    Some(han_viet) => {
                        writeln!(stdout, "{}\t{}\t{}\t{}", word.hanzi, word.pinyin, han_viet, word.meaning)?
                    }
                    None => writeln!(stdout, "{}\t{}\t{}", word.hanzi, word.pinyin, word.meaning)?,
                }
            }
        }
        None => {
            for lesson in lessons {
                writeln!(stdout, "{}\t{}\t{} words", lesson.id, lesson.title, lesson.words.len())?;
            }
        }
    }

    Ok(())
}

fn history(path: &Path, action: HistoryAction) -> ShuijiaoResult<()> {
    let mut store = HistoryStore::open(path)?;
    match action {
        HistoryAction::List => {
            let mut stdout = io::stdout().lock();
            for entry in store.entries() {
                writeln!(stdout, "{}\t{}", entry.looked_up_at.to_rfc3339(), entry.word)?;
            }
        }
        HistoryAction::Record { word } => store.record(&word)?,
        HistoryAction::Clear => store.clear()?,
    }
    Ok(())
}
